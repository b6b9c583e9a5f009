//! The reverse-Polish expression evaluator behind rule `p`.

use num_bigint::BigInt;
use num_traits::One;

use crate::constraint::Constraint;
use crate::error::CheckerError;
use crate::lazy_constraint::LazyConstraint;

/// One token of an already-preprocessed RPN sequence: multiplication and
/// division operators have already been swapped with their scalar operand,
/// so by the time this type is built an `Int` is unambiguously either an
/// antecedent id or — when it directly follows `Mul`/`Div` — a constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpnToken {
    Int(u64),
    Add,
    Mul,
    Div,
    Sat,
}

/// Swaps every `*`/`d` token with the token immediately before it, so that
/// in the returned sequence each operator precedes its scalar operand.
/// `raw` is in the order the tokens were written in the proof line.
pub fn preprocess(mut raw: Vec<RpnToken>) -> Vec<RpnToken> {
    for i in 0..raw.len() {
        if matches!(raw[i], RpnToken::Mul | RpnToken::Div) {
            raw.swap(i, i - 1);
        }
    }
    raw
}

/// Yields the antecedent ids referenced by a preprocessed token sequence,
/// in the order the evaluator will consume them — skipping the scalar
/// operand that now trails every `Mul`/`Div`.
pub fn antecedent_ids(instructions: &[RpnToken]) -> Vec<u64> {
    let mut ids = Vec::new();
    let mut it = instructions.iter();
    while let Some(tok) = it.next() {
        match tok {
            RpnToken::Int(id) => ids.push(*id),
            RpnToken::Mul | RpnToken::Div => {
                it.next();
            }
            RpnToken::Add | RpnToken::Sat => {}
        }
    }
    ids
}

/// Executes a preprocessed token sequence against its resolved antecedents,
/// returning the single resulting (materialized, contracted) constraint.
pub fn evaluate(
    instructions: &[RpnToken],
    antecedents: &[&Constraint],
) -> Result<Constraint, CheckerError> {
    let mut stack: Vec<LazyConstraint<'_>> = Vec::new();
    let mut antecedent_it = antecedents.iter();
    let mut it = instructions.iter().peekable();

    while let Some(tok) = it.next() {
        match tok {
            RpnToken::Int(_) => {
                let ante = antecedent_it.next().ok_or_else(|| {
                    CheckerError::Internal("RPN ran out of antecedents".into())
                })?;
                stack.push(LazyConstraint::new(ante));
            }
            RpnToken::Add => {
                let b = pop(&mut stack)?;
                let a = pop(&mut stack)?;
                stack.push(a.add_with_factor(&BigInt::one(), &b));
            }
            RpnToken::Mul => {
                let k = next_int(&mut it)?;
                let mut c = pop(&mut stack)?;
                c.multiply(BigInt::from(k));
                stack.push(c);
            }
            RpnToken::Div => {
                let k = next_int(&mut it)?;
                if k == 0 {
                    return Err(CheckerError::Internal(
                        "RPN division by a zero divisor".into(),
                    ));
                }
                let mut c = pop(&mut stack)?;
                c.divide(BigInt::from(k));
                stack.push(c);
            }
            RpnToken::Sat => {
                let mut c = pop(&mut stack)?;
                c.saturate();
                stack.push(c);
            }
        }
    }

    if stack.len() != 1 {
        return Err(CheckerError::Internal(format!(
            "RPN sequence left {} constraints on the stack, expected 1",
            stack.len()
        )));
    }
    Ok(stack.into_iter().next().unwrap().contract())
}

fn pop<'a>(stack: &mut Vec<LazyConstraint<'a>>) -> Result<LazyConstraint<'a>, CheckerError> {
    stack
        .pop()
        .ok_or_else(|| CheckerError::Internal("RPN stack underflow".into()))
}

fn next_int<'a>(
    it: &mut std::iter::Peekable<std::slice::Iter<'a, RpnToken>>,
) -> Result<u64, CheckerError> {
    match it.next() {
        Some(RpnToken::Int(k)) => Ok(*k),
        _ => Err(CheckerError::Internal(
            "RPN operator is missing its constant operand".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::{boolean_upper_bound, Term};

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
    fn plus_only_matches_linear_combination_with_unit_factors() {
        let c1 = c(vec![(1, 1)], 1);
        let c2 = c(vec![(1, 2)], 1);
        let instructions = preprocess(vec![RpnToken::Int(1), RpnToken::Int(2), RpnToken::Add]);
        let result = evaluate(&instructions, &[&c1, &c2]).unwrap();

        let mut expected = Constraint::empty(boolean_upper_bound());
        expected.add_with_factor(&BigInt::one(), &c1);
        expected.add_with_factor(&BigInt::one(), &c2);
        expected.contract();

        assert!(result.equals(&expected));
    }

    #[test]
    fn multiply_distributes_like_a_scaled_linear_combination() {
        let c1 = c(vec![(1, 1)], 1);
        let c2 = c(vec![(1, 2)], 1);
        // "id1 id2 + k *" written in RPN source order.
        let instructions = preprocess(vec![
            RpnToken::Int(1),
            RpnToken::Int(2),
            RpnToken::Add,
            RpnToken::Int(3),
            RpnToken::Mul,
        ]);
        let result = evaluate(&instructions, &[&c1, &c2]).unwrap();

        let mut expected = Constraint::empty(boolean_upper_bound());
        expected.add_with_factor(&BigInt::from(3), &c1);
        expected.add_with_factor(&BigInt::from(3), &c2);
        expected.contract();

        assert!(result.equals(&expected));
    }

    #[test]
    fn antecedent_ids_skip_the_constant_after_mul_and_div() {
        let instructions = preprocess(vec![
            RpnToken::Int(1),
            RpnToken::Int(2),
            RpnToken::Add,
            RpnToken::Int(4),
            RpnToken::Div,
        ]);
        assert_eq!(antecedent_ids(&instructions), vec![1, 2]);
    }
}
