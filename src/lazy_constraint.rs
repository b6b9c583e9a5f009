//! A borrowed constraint plus a deferred pipeline of scalar ops.
//!
//! Used by the RPN evaluator so that intermediate `*`/`d`/`s` steps don't
//! need to materialize a fresh [`Constraint`] until an `add_with_factor` (or
//! the end of the sequence) actually requires one.

use std::rc::Rc;

use num_bigint::BigInt;
use num_traits::Zero;

use crate::constraint::{ceil_div, Constraint, Term, UpperBound};

enum PendingOp {
    /// Caches the effective degree at the moment `saturate` was recorded,
    /// so later applies don't need to re-walk earlier ops to find it.
    Saturate(BigInt),
    Divide(BigInt),
    Multiply(BigInt),
}

enum Base<'a> {
    Borrowed(&'a Constraint),
    Owned(Constraint),
}

impl<'a> Base<'a> {
    fn constraint(&self) -> &Constraint {
        match self {
            Base::Borrowed(c) => c,
            Base::Owned(c) => c,
        }
    }
}

pub struct LazyConstraint<'a> {
    base: Base<'a>,
    ops: Vec<PendingOp>,
}

impl<'a> LazyConstraint<'a> {
    pub fn new(base: &'a Constraint) -> Self {
        LazyConstraint {
            base: Base::Borrowed(base),
            ops: Vec::new(),
        }
    }

    fn from_owned(constraint: Constraint) -> Self {
        LazyConstraint {
            base: Base::Owned(constraint),
            ops: Vec::new(),
        }
    }

    fn apply(&self, mut value: BigInt) -> BigInt {
        for op in &self.ops {
            value = match op {
                PendingOp::Saturate(cached_degree) => value.min(cached_degree.clone()),
                PendingOp::Divide(d) => ceil_div(&value, d),
                PendingOp::Multiply(f) => value * f,
            };
        }
        value
    }

    pub fn degree(&self) -> BigInt {
        self.apply(self.base.constraint().degree.clone())
    }

    pub fn terms(&self) -> Vec<Term> {
        self.base
            .constraint()
            .iter_terms()
            .map(|t| Term::new(self.apply(t.coefficient.clone()), t.literal))
            .collect()
    }

    pub fn upper_bounds(&self) -> Rc<dyn UpperBound> {
        self.base.constraint().upper_bounds()
    }

    pub fn saturate(&mut self) -> &mut Self {
        let cached_degree = self.degree().max(BigInt::zero());
        self.ops.push(PendingOp::Saturate(cached_degree));
        self
    }

    pub fn divide(&mut self, d: BigInt) -> &mut Self {
        self.ops.push(PendingOp::Divide(d));
        self
    }

    pub fn multiply(&mut self, f: BigInt) -> &mut Self {
        self.ops.push(PendingOp::Multiply(f));
        self
    }

    /// Materializes the current (terms, degree) view into a fresh owned
    /// constraint, dropping the pending op pipeline.
    fn materialize(&self) -> Constraint {
        Constraint::new(self.terms(), self.degree(), self.upper_bounds())
    }

    /// Adds `factor * other` into `self`, materializing `self` into an
    /// owned constraint first. The result is wrapped back into
    /// a `LazyConstraint` with an empty pipeline so it can keep participating
    /// in the RPN stack.
    pub fn add_with_factor(&self, factor: &BigInt, other: &LazyConstraint) -> LazyConstraint<'static> {
        let mut result = self.materialize();
        result.add_parts(factor, other.terms().iter(), &other.degree());
        LazyConstraint::from_owned(result)
    }

    pub fn contract(self) -> Constraint {
        let mut c = self.materialize();
        c.contract();
        c
    }
}
