pub mod constraints;
pub mod expressions;
pub mod objective;
pub mod routes;
pub mod strategy;
pub mod variables;

#[cfg(test)]
mod test_utilities;
#[cfg(test)]
#[path = "tests.rs"]
mod tests;

pub use strategy::Strategy;

use model::json_serialisation::{
    load_instance_from_json, load_routes_extension_from_json, LoadError,
};
use model::{Config, Network};
use smt::Context;
use solution::FlowAssignment;

/// Load an instance, enumerate candidate routes, solve with the given
/// strategy and return the solved network together with its flow
/// assignment. An unsatisfiable instance is reported through the returned
/// flag, never as an error.
pub fn run(
    input: &serde_json::Value,
    routes_extension: Option<&serde_json::Value>,
    strategy: Strategy,
) -> Result<(Network, Option<FlowAssignment>, bool), LoadError> {
    let (mut network, demands) = load_instance_from_json(input)?;
    if let Some(extension) = routes_extension {
        network.merge(load_routes_extension_from_json(extension)?);
    }
    let config = Config::default();

    let route_sets = routes::all_possible_routes(&mut network, &demands, &config.enumeration);
    let mut context = Context::new();
    let mut flow_vars = variables::allocate_variables(&mut network, &route_sets, &mut context);

    let (model, solved) = strategy.solve(
        &mut network,
        &route_sets,
        &mut flow_vars,
        &demands,
        &mut context,
        &config,
    );
    let assignment =
        model.map(|model| FlowAssignment::materialize(&mut network, &model, &flow_vars));
    Ok((network, assignment, solved))
}
