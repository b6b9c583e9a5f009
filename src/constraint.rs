//! Normalized pseudo-Boolean constraints and the cutting-planes operations
//! on them.
//!
//! A constraint represents `sum(c_i * l_i) >= degree`, where each literal
//! `l_i` is a Boolean variable or its negation. Internally a literal is a
//! non-zero signed `i64`: the absolute value is the variable index, the
//! sign is the polarity (`+k` is `x_k`, `-k` is `not x_k`).

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

/// Maps a variable to its upper bound. Booleans are uniformly bounded by 1;
/// this indirection is the stated extension point for general integer
/// variables and is not otherwise exercised here.
pub trait UpperBound: fmt::Debug {
    fn get(&self, variable: u64) -> BigInt;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BooleanUpperBound;

impl UpperBound for BooleanUpperBound {
    fn get(&self, _variable: u64) -> BigInt {
        BigInt::one()
    }
}

pub fn boolean_upper_bound() -> Rc<dyn UpperBound> {
    Rc::new(BooleanUpperBound)
}

/// A `(coefficient, literal)` pair. `coefficient` is always non-negative once
/// it is stored inside a [`Constraint`]; raw, possibly-negative input
/// coefficients are only ever seen transiently during [`Constraint::new`].
#[derive(Debug, Clone)]
pub struct Term {
    pub coefficient: BigInt,
    pub literal: i64,
}

impl Term {
    pub fn new(coefficient: BigInt, literal: i64) -> Self {
        assert_ne!(literal, 0, "a literal must not be zero");
        Term {
            coefficient,
            literal,
        }
    }

    pub fn variable(&self) -> u64 {
        self.literal.unsigned_abs()
    }
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        self.coefficient == other.coefficient && self.literal == other.literal
    }
}

fn signed(coefficient: &BigInt, literal: i64) -> BigInt {
    if literal >= 0 {
        coefficient.clone()
    } else {
        -coefficient.clone()
    }
}

/// Ceiling division, valid for any `d >= 1` and any (possibly negative) `a`.
pub fn ceil_div(a: &BigInt, d: &BigInt) -> BigInt {
    debug_assert!(d >= &BigInt::one());
    (a + d - BigInt::one()).div_floor(d)
}

/// A normalized PB constraint `sum(terms) >= degree`.
#[derive(Debug, Clone)]
pub struct Constraint {
    terms: HashMap<u64, Term>,
    order: Vec<u64>,
    pub degree: BigInt,
    upper_bounds: Rc<dyn UpperBound>,
}

impl Constraint {
    /// Constructs and normalizes a constraint: negative input coefficients
    /// are rewritten via `-c*x = c*(ub-x) - c*ub`, and any terms that land
    /// on the same variable are merged with the same cancellation math as
    /// [`Constraint::add_with_factor`].
    pub fn new(terms: Vec<Term>, degree: BigInt, upper_bounds: Rc<dyn UpperBound>) -> Self {
        let mut result = Constraint {
            terms: HashMap::new(),
            order: Vec::new(),
            degree,
            upper_bounds,
        };
        for term in terms {
            result.normalize_and_merge(term);
        }
        result
    }

    pub fn empty(upper_bounds: Rc<dyn UpperBound>) -> Self {
        Constraint::new(Vec::new(), BigInt::zero(), upper_bounds)
    }

    pub fn upper_bounds(&self) -> Rc<dyn UpperBound> {
        self.upper_bounds.clone()
    }

    pub fn iter_terms(&self) -> impl Iterator<Item = &Term> {
        self.order.iter().map(move |v| &self.terms[v])
    }

    fn normalize_and_merge(&mut self, mut term: Term) {
        if term.coefficient.is_negative() {
            term.literal = -term.literal;
            term.coefficient = -term.coefficient;
            self.degree += &term.coefficient * self.upper_bounds.get(term.variable());
        }
        self.merge_term(term.coefficient, term.literal);
    }

    /// Folds a single `(coefficient, literal)` pair — `coefficient` assumed
    /// already non-negative — into this constraint's term map, applying the
    /// cancellation rule below when a term for that variable already
    /// exists.
    fn merge_term(&mut self, coefficient: BigInt, literal: i64) {
        let variable = literal.unsigned_abs();
        match self.terms.get(&variable) {
            None => {
                self.order.push(variable);
                self.terms.insert(variable, Term::new(coefficient, literal));
            }
            Some(existing) => {
                let a = signed(&existing.coefficient, existing.literal);
                let b = signed(&coefficient, literal);
                let combined = a + b;
                let new_coefficient = combined.abs();
                let new_literal = match combined.cmp(&BigInt::zero()) {
                    Ordering::Less => -(variable as i64),
                    _ => variable as i64,
                };
                let max_input = existing.coefficient.clone().max(coefficient);
                let cancellation = (max_input - &new_coefficient).max(BigInt::zero());
                self.degree -= cancellation * self.upper_bounds.get(variable);
                self.terms
                    .insert(variable, Term::new(new_coefficient, new_literal));
            }
        }
    }

    /// `self.degree += factor * other.degree`; merges every term of `other`,
    /// scaled by `factor`, into `self`. `factor` must be >= 1 — the proof
    /// grammar never produces `factor = 0`, so this is a no-op defense
    /// rather than a hard error.
    pub fn add_with_factor(&mut self, factor: &BigInt, other: &Constraint) -> &mut Self {
        self.add_parts(factor, other.iter_terms(), &other.degree)
    }

    pub fn add_parts<'t>(
        &mut self,
        factor: &BigInt,
        other_terms: impl Iterator<Item = &'t Term>,
        other_degree: &BigInt,
    ) -> &mut Self {
        if factor.is_zero() {
            return self;
        }
        self.degree += factor * other_degree;
        for term in other_terms {
            let scaled = factor * &term.coefficient;
            self.merge_term(scaled, term.literal);
        }
        self
    }

    /// Replaces each coefficient by `min(coefficient, max(0, degree))`.
    pub fn saturate(&mut self) -> &mut Self {
        let bound = self.degree.clone().max(BigInt::zero());
        for variable in &self.order {
            let term = self.terms.get_mut(variable).unwrap();
            if term.coefficient > bound {
                term.coefficient = bound.clone();
            }
        }
        self
    }

    /// Ceiling-divides every coefficient and the degree by `d >= 1`.
    pub fn divide(&mut self, d: &BigInt) -> &mut Self {
        debug_assert!(d >= &BigInt::one());
        for variable in &self.order {
            let term = self.terms.get_mut(variable).unwrap();
            term.coefficient = ceil_div(&term.coefficient, d);
        }
        self.degree = ceil_div(&self.degree, d);
        self
    }

    /// Multiplies every coefficient and the degree by `f >= 1`.
    pub fn multiply(&mut self, f: &BigInt) -> &mut Self {
        for variable in &self.order {
            let term = self.terms.get_mut(variable).unwrap();
            term.coefficient *= f;
        }
        self.degree *= f;
        self
    }

    /// `sum(coefficients) < degree`. All literals evaluate to at most 1
    /// under the Boolean upper bound, so this is sound regardless of the
    /// assignment.
    pub fn is_contradiction(&self) -> bool {
        let sum: BigInt = self.order.iter().map(|v| &self.terms[v].coefficient).sum();
        sum < self.degree
    }

    /// Drops any term whose coefficient has become zero.
    pub fn contract(&mut self) -> &mut Self {
        self.order.retain(|variable| {
            let keep = !self.terms[variable].coefficient.is_zero();
            if !keep {
                self.terms.remove(variable);
            }
            keep
        });
        self
    }

    /// Structural equality after both sides are contracted: same degree,
    /// same multiset of terms (keyed by variable). Term order is not part
    /// of a constraint's observable identity.
    pub fn equals(&self, other: &Constraint) -> bool {
        let mut a = self.clone();
        let mut b = other.clone();
        a.contract();
        b.contract();
        a.degree == b.degree && a.terms == b.terms
    }
}

impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for variable in &self.order {
            let term = &self.terms[variable];
            if term.literal < 0 {
                write!(f, "{:+}~x{} ", term.coefficient, -term.literal)?;
            } else {
                write!(f, "{:+}x{} ", term.coefficient, term.literal)?;
            }
        }
        write!(f, ">= {}", self.degree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(c: i64, l: i64) -> Term {
        Term::new(BigInt::from(c), l)
    }

    fn ub() -> Rc<dyn UpperBound> {
        boolean_upper_bound()
    }

    #[test]
    fn negation_round_trip() {
        let a = Constraint::new(vec![term(-3, 2)], BigInt::zero(), ub());
        let b = Constraint::new(vec![term(3, -2)], BigInt::from(3), ub());
        assert!(a.equals(&b));
    }

    #[test]
    fn add_with_factor_is_commutative() {
        let a = Constraint::new(vec![term(1, 1), term(2, 2)], BigInt::from(1), ub());
        let b = Constraint::new(vec![term(1, -1), term(1, 3)], BigInt::from(1), ub());

        let mut ab = a.clone();
        ab.add_with_factor(&BigInt::one(), &b);

        let mut ba = b.clone();
        ba.add_with_factor(&BigInt::one(), &a);

        assert!(ab.equals(&ba));
    }

    #[test]
    fn distributivity_of_multiply_over_add() {
        let a = Constraint::new(vec![term(1, 1)], BigInt::from(1), ub());
        let b = Constraint::new(vec![term(1, 2)], BigInt::from(1), ub());
        let k = BigInt::from(3);

        let mut lhs = a.clone();
        lhs.add_with_factor(&BigInt::one(), &b);
        lhs.multiply(&k);

        let mut rhs_a = a.clone();
        rhs_a.multiply(&k);
        let mut rhs_b = b.clone();
        rhs_b.multiply(&k);
        rhs_a.add_with_factor(&BigInt::one(), &rhs_b);

        assert!(lhs.equals(&rhs_a));
    }

    #[test]
    fn divide_is_ceiling_and_inverts_multiply() {
        let c = Constraint::new(vec![term(3, 1), term(5, 2)], BigInt::from(7), ub());
        let d = BigInt::from(4);

        let mut scaled = c.clone();
        scaled.multiply(&d);
        scaled.divide(&d);

        assert!(scaled.equals(&c));
    }

    #[test]
    fn saturation_is_idempotent_and_bounded() {
        let mut c = Constraint::new(vec![term(5, 1), term(3, 2)], BigInt::from(2), ub());
        c.saturate();
        let once = c.clone();
        c.saturate();
        assert!(c.equals(&once));

        let bound = c.degree.clone().max(BigInt::zero());
        for t in c.iter_terms() {
            assert!(t.coefficient <= bound);
        }
    }

    #[test]
    fn saturation_with_nonpositive_degree_zeroes_everything() {
        let mut c = Constraint::new(vec![term(5, 1)], BigInt::from(-2), ub());
        c.saturate();
        for t in c.iter_terms() {
            assert!(t.coefficient.is_zero());
        }
    }

    #[test]
    fn is_contradiction_matches_slack() {
        let a = Constraint::new(vec![term(1, 1)], BigInt::from(2), ub());
        assert!(a.is_contradiction());
        let b = Constraint::new(vec![term(2, 1)], BigInt::from(2), ub());
        assert!(!b.is_contradiction());
    }

    #[test]
    fn merge_cancels_opposite_literals() {
        // x1 and ~x1, added together, cancel to a constant: x1 + (1-x1) = 1,
        // so the shared variable's coefficient must vanish rather than add.
        let a = Constraint::new(vec![term(1, 1)], BigInt::zero(), ub());
        let b = Constraint::new(vec![term(1, -1)], BigInt::zero(), ub());
        let mut combo = Constraint::empty(ub());
        combo.add_with_factor(&BigInt::one(), &a);
        combo.add_with_factor(&BigInt::one(), &b);
        combo.contract();
        assert!(combo.iter_terms().next().is_none());
        assert_eq!(combo.degree, BigInt::from(-1));
    }
}
