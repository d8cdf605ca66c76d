use derive_more::{Display, From};
use std::ops::{Add, Mul, Sub};

/// Handle to a real-valued variable of a [`Context`](crate::Context).
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display(fmt = "x{}", _0)]
pub struct Var(pub(crate) usize);

/// A quantity that is either a concrete number or still symbolic.
#[derive(Debug, Clone, Copy, PartialEq, From)]
pub enum Value {
    Num(f64),
    Sym(Var),
}

impl Value {
    pub fn is_symbolic(&self) -> bool {
        matches!(self, Value::Sym(_))
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            Value::Num(n) => Some(*n),
            Value::Sym(_) => None,
        }
    }
}

/// Arithmetic over mixed concrete and symbolic operands.
///
/// The constructors fold fully-constant subtrees to `Const`, so a sum of
/// plain numbers stays a plain number. Callers match on the variant to
/// decide between a solver assertion and a native computation.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Const(f64),
    Sym(Var),
    Sum(Vec<Expr>),
    Mul(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Sum of the given terms. Nested sums are flattened and all constant
    /// terms are folded into one.
    pub fn sum(terms: impl IntoIterator<Item = Expr>) -> Expr {
        let mut stack: Vec<Expr> = terms.into_iter().collect();
        stack.reverse();
        let mut constant = 0.0;
        let mut symbolic = Vec::new();
        while let Some(term) = stack.pop() {
            match term {
                Expr::Const(c) => constant += c,
                Expr::Sum(inner) => {
                    stack.extend(inner.into_iter().rev());
                }
                other => symbolic.push(other),
            }
        }
        if symbolic.is_empty() {
            return Expr::Const(constant);
        }
        if constant != 0.0 {
            symbolic.push(Expr::Const(constant));
        }
        if symbolic.len() == 1 {
            symbolic.pop().unwrap()
        } else {
            Expr::Sum(symbolic)
        }
    }

    pub fn mul(lhs: Expr, rhs: Expr) -> Expr {
        if let (Some(a), Some(b)) = (lhs.as_const(), rhs.as_const()) {
            return Expr::Const(a * b);
        }
        if lhs.as_const() == Some(0.0) || rhs.as_const() == Some(0.0) {
            return Expr::Const(0.0);
        }
        Expr::Mul(Box::new(lhs), Box::new(rhs))
    }

    pub fn as_const(&self) -> Option<f64> {
        match self {
            Expr::Const(c) => Some(*c),
            _ => None,
        }
    }

    pub fn is_symbolic(&self) -> bool {
        self.as_const().is_none()
    }
}

impl From<f64> for Expr {
    fn from(constant: f64) -> Expr {
        Expr::Const(constant)
    }
}

impl From<Var> for Expr {
    fn from(var: Var) -> Expr {
        Expr::Sym(var)
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Expr {
        match value {
            Value::Num(n) => Expr::Const(n),
            Value::Sym(var) => Expr::Sym(var),
        }
    }
}

impl Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Expr {
        Expr::sum([self, rhs])
    }
}

impl Sub for Expr {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Expr {
        Expr::sum([self, Expr::mul(Expr::Const(-1.0), rhs)])
    }
}

impl Mul for Expr {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        Expr::mul(self, rhs)
    }
}
