use std::fmt;

use model::Network;
use smt::{Model, Value};

/// Route-flow matrix of an accepted model, one row per demand, values on a
/// five-decimal grid.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowAssignment {
    f_r_vals: Vec<Vec<f64>>,
}

impl FlowAssignment {
    /// Evaluate the model, write the concrete flows and prices back into
    /// the network, and record the per-route flows. Flows a strategy has
    /// already committed to numbers pass through unchanged.
    pub fn materialize(
        network: &mut Network,
        model: &Model,
        flow_vars: &[Vec<Value>],
    ) -> FlowAssignment {
        let f_r_vals = flow_vars
            .iter()
            .map(|row| {
                row.iter()
                    .map(|value| match value {
                        Value::Num(n) => *n,
                        Value::Sym(var) => model.decimal(*var, 5),
                    })
                    .collect()
            })
            .collect();
        for (_, edge) in network.edges_mut() {
            if let Some(Value::Sym(var)) = edge.flow {
                edge.flow = Some(Value::Num(model.decimal(var, 5)));
            }
            if let Some(Value::Sym(var)) = edge.price {
                edge.price = Some(Value::Num(model.decimal(var, 5)));
            }
        }
        FlowAssignment { f_r_vals }
    }

    pub fn route_flows(&self, demand: usize) -> &[f64] {
        &self.f_r_vals[demand]
    }

    pub fn number_of_demands(&self) -> usize {
        self.f_r_vals.len()
    }

    /// Total flow routed for the demand.
    pub fn demand_total(&self, demand: usize) -> f64 {
        self.f_r_vals[demand].iter().sum()
    }
}

impl fmt::Display for FlowAssignment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, row) in self.f_r_vals.iter().enumerate() {
            write!(f, "demand {}:", i)?;
            for flow in row {
                write!(f, " {}", flow)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
