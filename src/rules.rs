//! The closed catalogue of proof rule variants.

use itertools::Itertools;
use num_bigint::BigInt;
use num_traits::{One, Zero};

use crate::constraint::{boolean_upper_bound, Constraint, Term};
use crate::error::CheckerError;
use crate::rpn::{self, RpnToken};

/// One `(factor, antecedent id)` pair shared by `a`, `d`, and `s`.
#[derive(Debug, Clone)]
pub struct Summand {
    pub factor: BigInt,
    pub antecedent_id: u64,
}

/// A single parsed proof line. The tag used in proof text is documented on
/// each variant; dispatch on it lives in the proof parser, not here.
#[derive(Debug, Clone)]
pub enum RuleLine {
    /// `f` — loads the constraints of the parsed formula, in order. The
    /// parser has already checked the claimed count, if any, against
    /// `formula.len()`.
    LoadFormula { formula: Vec<Constraint> },
    /// `l` — for `i` in `1..=num_literals`, axioms `xᵢ ≥ 0` and `¬xᵢ ≥ 0`.
    LoadLiteralAxioms { num_literals: u64 },
    /// `a` — linear combination of the listed antecedents.
    LinearCombination { summands: Vec<Summand> },
    /// `d` — linear combination then ceiling-division by `divisor`.
    Division {
        divisor: BigInt,
        summands: Vec<Summand>,
    },
    /// `s` — linear combination then saturation.
    Saturation { summands: Vec<Summand> },
    /// `p` — the reverse-Polish expression evaluator.
    Rpn { instructions: Vec<RpnToken> },
    /// `e` — equality check against a named antecedent. A goal rule.
    ConstraintEquals {
        antecedent_id: u64,
        constraint: Constraint,
    },
    /// `c` — contradiction check against a named antecedent. A goal rule.
    IsContradiction { antecedent_id: u64 },
}

impl RuleLine {
    pub fn antecedent_ids(&self) -> Vec<u64> {
        match self {
            RuleLine::LoadFormula { .. } | RuleLine::LoadLiteralAxioms { .. } => Vec::new(),
            RuleLine::LinearCombination { summands }
            | RuleLine::Division { summands, .. }
            | RuleLine::Saturation { summands } => {
                summands.iter().map(|s| s.antecedent_id).collect()
            }
            RuleLine::Rpn { instructions } => rpn::antecedent_ids(instructions),
            RuleLine::ConstraintEquals { antecedent_id, .. }
            | RuleLine::IsContradiction { antecedent_id } => vec![*antecedent_id],
        }
    }

    pub fn num_constraints(&self) -> usize {
        match self {
            RuleLine::LoadFormula { formula } => formula.len(),
            RuleLine::LoadLiteralAxioms { num_literals } => 2 * (*num_literals as usize),
            RuleLine::LinearCombination { .. }
            | RuleLine::Division { .. }
            | RuleLine::Saturation { .. }
            | RuleLine::Rpn { .. } => 1,
            RuleLine::ConstraintEquals { .. } | RuleLine::IsContradiction { .. } => 0,
        }
    }

    pub fn is_goal(&self) -> bool {
        matches!(
            self,
            RuleLine::ConstraintEquals { .. } | RuleLine::IsContradiction { .. }
        )
    }

    /// Executes the rule given its resolved antecedents (in the order
    /// `antecedent_ids()` returned), producing the constraints to append to
    /// the database. Goal rules return an empty vector on success and an
    /// error on failure; non-goal rules never fail here (a malformed
    /// instruction sequence is rejected earlier, at parse time).
    pub fn compute(&self, antecedents: &[&Constraint]) -> Result<Vec<Constraint>, CheckerError> {
        match self {
            RuleLine::LoadFormula { formula } => Ok(formula.clone()),

            RuleLine::LoadLiteralAxioms { num_literals } => {
                let mut result = Vec::with_capacity(2 * (*num_literals as usize));
                for i in 1..=*num_literals {
                    let i = i as i64;
                    result.push(Constraint::new(
                        vec![Term::new(BigInt::one(), i)],
                        BigInt::zero(),
                        boolean_upper_bound(),
                    ));
                    result.push(Constraint::new(
                        vec![Term::new(BigInt::one(), -i)],
                        BigInt::zero(),
                        boolean_upper_bound(),
                    ));
                }
                Ok(result)
            }

            RuleLine::LinearCombination { summands } => {
                Ok(vec![linear_combination(summands, antecedents)])
            }

            RuleLine::Division { divisor, summands } => {
                let mut result = linear_combination(summands, antecedents);
                result.divide(divisor);
                Ok(vec![result])
            }

            RuleLine::Saturation { summands } => {
                let mut result = linear_combination(summands, antecedents);
                result.saturate();
                Ok(vec![result])
            }

            RuleLine::Rpn { instructions } => {
                Ok(vec![rpn::evaluate(instructions, antecedents)?])
            }

            RuleLine::ConstraintEquals { constraint, .. } => {
                if !constraint.equals(antecedents[0]) {
                    return Err(CheckerError::EqualityCheckFailed {
                        expected: Box::new(constraint.clone()),
                        got: Box::new(antecedents[0].clone()),
                    });
                }
                Ok(Vec::new())
            }

            RuleLine::IsContradiction { .. } => {
                if !antecedents[0].is_contradiction() {
                    return Err(CheckerError::ContradictionCheckFailed);
                }
                Ok(Vec::new())
            }
        }
    }
}

/// Starts from `0 ≥ 0` and accumulates `add_with_factor(factor, ante)` for
/// each summand, in order — the shared core of `a`, `d`, and `s`.
fn linear_combination(summands: &[Summand], antecedents: &[&Constraint]) -> Constraint {
    let mut result = Constraint::empty(boolean_upper_bound());
    for (summand, ante) in summands.iter().zip_eq(antecedents) {
        result.add_with_factor(&summand.factor, ante);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(terms: Vec<(i64, i64)>, degree: i64) -> Constraint {
        Constraint::new(
            terms
                .into_iter()
                .map(|(coeff, lit)| Term::new(BigInt::from(coeff), lit))
                .collect(),
            BigInt::from(degree),
            boolean_upper_bound(),
        )
    }

    #[test]
    fn linear_combination_matches_unit_clause_contradiction() {
        let unit1 = c(vec![(1, 1)], 1);
        let unit2 = c(vec![(1, -1)], 1);
        let rule = RuleLine::LinearCombination {
            summands: vec![
                Summand {
                    factor: BigInt::one(),
                    antecedent_id: 1,
                },
                Summand {
                    factor: BigInt::one(),
                    antecedent_id: 2,
                },
            ],
        };
        let result = rule.compute(&[&unit1, &unit2]).unwrap();
        assert_eq!(result.len(), 1);
        assert!(result[0].is_contradiction());
    }

    #[test]
    fn load_literal_axioms_produces_interleaved_pairs() {
        let rule = RuleLine::LoadLiteralAxioms { num_literals: 2 };
        let result = rule.compute(&[]).unwrap();
        assert_eq!(result.len(), 4);
        assert_eq!(rule.num_constraints(), 4);
    }

    #[test]
    fn constraint_equals_fails_on_mismatched_goal() {
        let expected = c(vec![(1, 1)], 1);
        let got = c(vec![(1, 1)], 2);
        let rule = RuleLine::ConstraintEquals {
            antecedent_id: 1,
            constraint: expected,
        };
        let err = rule.compute(&[&got]).unwrap_err();
        assert!(matches!(err, CheckerError::EqualityCheckFailed { .. }));
    }

    #[test]
    fn is_contradiction_succeeds_when_slack_is_negative() {
        let ante = c(vec![(1, 1)], 2);
        let rule = RuleLine::IsContradiction { antecedent_id: 1 };
        assert!(rule.compute(&[&ante]).is_ok());
    }

    #[test]
    fn is_contradiction_fails_when_satisfiable() {
        let ante = c(vec![(2, 1)], 2);
        let rule = RuleLine::IsContradiction { antecedent_id: 1 };
        let err = rule.compute(&[&ante]).unwrap_err();
        assert!(matches!(err, CheckerError::ContradictionCheckFailed));
    }
}
