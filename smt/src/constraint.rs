use crate::expression::Expr;

/// Comparison relation of a single assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rel {
    Le,
    Ge,
    Eq,
}

/// One comparison between two expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct Cmp {
    pub lhs: Expr,
    pub rel: Rel,
    pub rhs: Expr,
}

impl Cmp {
    pub fn le(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Cmp {
        Cmp {
            lhs: lhs.into(),
            rel: Rel::Le,
            rhs: rhs.into(),
        }
    }

    pub fn ge(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Cmp {
        Cmp {
            lhs: lhs.into(),
            rel: Rel::Ge,
            rhs: rhs.into(),
        }
    }

    pub fn eq(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Cmp {
        Cmp {
            lhs: lhs.into(),
            rel: Rel::Eq,
            rhs: rhs.into(),
        }
    }

    /// `|lhs - center| <= tolerance`, as its two one-sided comparisons.
    pub fn within(lhs: Expr, center: Expr, tolerance: f64) -> Vec<Cmp> {
        vec![
            Cmp::le(lhs.clone(), center.clone() + Expr::Const(tolerance)),
            Cmp::ge(lhs, center - Expr::Const(tolerance)),
        ]
    }
}

/// An assertion for the context: a plain comparison, or a conjunction of
/// comparisons that only has to hold while the gate holds.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Cmp(Cmp),
    Implies { gate: Cmp, body: Vec<Cmp> },
}

impl Constraint {
    pub fn implies(gate: Cmp, body: Vec<Cmp>) -> Constraint {
        Constraint::Implies { gate, body }
    }
}

impl From<Cmp> for Constraint {
    fn from(cmp: Cmp) -> Constraint {
        Constraint::Cmp(cmp)
    }
}
