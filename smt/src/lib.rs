mod constraint;
mod context;
mod expression;
mod model;

pub use constraint::{Cmp, Constraint, Rel};
pub use context::{Context, SatResult};
pub use expression::{Expr, Value, Var};
pub use model::Model;

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
