use model::network::Network;
use smt::{Expr, Value};

use crate::expressions::route_cost;
use crate::routes::Route;

/// Total system cost `F = Σ flow_i_j · cost(route_i_j)`.
pub fn total_cost(network: &Network, route_sets: &[Vec<Route>], flow_vars: &[Vec<Value>]) -> Expr {
    Expr::sum(route_sets.iter().zip(flow_vars).flat_map(|(routes, row)| {
        routes
            .iter()
            .zip(row)
            .map(|(route, value)| Expr::mul(Expr::from(*value), route_cost(network, route)))
    }))
}
