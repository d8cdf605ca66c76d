use crate::expression::{Expr, Value, Var};

/// Concrete variable assignment produced by a satisfiable check.
#[derive(Debug, Clone, Default)]
pub struct Model {
    values: Vec<f64>,
}

impl Model {
    pub(crate) fn new(values: Vec<f64>) -> Model {
        Model { values }
    }

    pub fn value(&self, var: Var) -> f64 {
        self.values.get(var.0).copied().unwrap_or(0.0)
    }

    /// Evaluate the variable and round to the given number of decimal places.
    pub fn decimal(&self, var: Var, places: u32) -> f64 {
        let scale = 10f64.powi(places as i32);
        (self.value(var) * scale).round() / scale
    }

    /// Numeric values pass through unchanged, symbolic ones are looked up.
    pub fn resolve(&self, value: Value) -> f64 {
        match value {
            Value::Num(n) => n,
            Value::Sym(var) => self.value(var),
        }
    }

    pub fn eval(&self, expr: &Expr) -> f64 {
        match expr {
            Expr::Const(c) => *c,
            Expr::Sym(var) => self.value(*var),
            Expr::Sum(terms) => terms.iter().map(|term| self.eval(term)).sum(),
            Expr::Mul(lhs, rhs) => self.eval(lhs) * self.eval(rhs),
        }
    }
}
