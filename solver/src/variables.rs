use model::network::Network;
use smt::{Context, Value};

use crate::routes::Route;

/// Attach an `f_e` variable to every edge, make undetermined prices
/// symbolic, and create one `flow_i_j` variable per (demand, route) pair.
///
/// Names follow the `f_<u>-<v>-<color>` / `p_<u>-<v>-<color>` /
/// `flow_<i>_<j>` conventions, so re-running a builder against the same
/// context addresses the same variables.
pub fn allocate_variables(
    network: &mut Network,
    route_sets: &[Vec<Route>],
    context: &mut Context,
) -> Vec<Vec<Value>> {
    for (reference, edge) in network.edges_mut() {
        let flow_name = format!("f_{}-{}-{}", reference.from, reference.to, edge.color);
        edge.flow = Some(Value::Sym(context.real(&flow_name)));
        if edge.price.is_none() {
            let price_name = format!("p_{}-{}-{}", reference.from, reference.to, edge.color);
            edge.price = Some(Value::Sym(context.real(&price_name)));
        }
    }
    route_sets
        .iter()
        .enumerate()
        .map(|(i, routes)| {
            (0..routes.len())
                .map(|j| Value::Sym(context.real(&format!("flow_{}_{}", i, j))))
                .collect()
        })
        .collect()
}
