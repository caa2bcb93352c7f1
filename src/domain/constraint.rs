//! Linear constraint types for the MILP formulation.
//!
//! Constraints are sparse: the allocation model has one variable per
//! (demand unit, eligible listing) pair and every row touches only a handful
//! of them.

use serde::{Deserialize, Serialize};

/// A single linear constraint: `sum(coef * x[var]) {>=, <=, =} rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// `(variable index, coefficient)` pairs; absent variables have
    /// coefficient zero.
    pub terms: Vec<(usize, f64)>,
    /// Constraint sense (>=, <=, =).
    pub sense: ConstraintSense,
    /// Right-hand side value.
    pub rhs: f64,
}

impl Constraint {
    /// Create a >= constraint.
    #[must_use]
    pub const fn geq(terms: Vec<(usize, f64)>, rhs: f64) -> Self {
        Self {
            terms,
            sense: ConstraintSense::GreaterEqual,
            rhs,
        }
    }

    /// Create a <= constraint.
    #[must_use]
    pub const fn leq(terms: Vec<(usize, f64)>, rhs: f64) -> Self {
        Self {
            terms,
            sense: ConstraintSense::LessEqual,
            rhs,
        }
    }

    /// Create an = constraint.
    #[must_use]
    pub const fn eq(terms: Vec<(usize, f64)>, rhs: f64) -> Self {
        Self {
            terms,
            sense: ConstraintSense::Equal,
            rhs,
        }
    }

    /// Whether `values` satisfy this constraint within `tolerance`.
    #[must_use]
    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        let lhs: f64 = self
            .terms
            .iter()
            .map(|(var, coef)| coef * values.get(*var).copied().unwrap_or(0.0))
            .sum();
        match self.sense {
            ConstraintSense::GreaterEqual => lhs >= self.rhs - tolerance,
            ConstraintSense::LessEqual => lhs <= self.rhs + tolerance,
            ConstraintSense::Equal => (lhs - self.rhs).abs() <= tolerance,
        }
    }
}

/// Constraint sense (comparison operator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintSense {
    /// Greater than or equal (>=).
    GreaterEqual,
    /// Less than or equal (<=).
    LessEqual,
    /// Equal (=).
    Equal,
}

/// Domain of one decision variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VariableKind {
    /// 0 or 1.
    Binary,
    /// Real-valued within bounds (`None` = unbounded on that side).
    Continuous {
        lower: Option<f64>,
        upper: Option<f64>,
    },
}

impl VariableKind {
    /// Non-negative continuous variable [0, +inf).
    #[must_use]
    pub const fn non_negative() -> Self {
        Self::Continuous {
            lower: Some(0.0),
            upper: None,
        }
    }
}
