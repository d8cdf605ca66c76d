use model::network::{EdgeRef, Network};
use model::{Config, Demand};
use smt::{Context, Model, Value};
use solution::FlowAssignment;

use crate::constraints::{add_flow_and_capacity_constraints, add_relaxed_constraints};
use crate::expressions::{route_cost, route_price};
use crate::routes::{all_possible_routes, Route};
use crate::strategy::Strategy;
use crate::test_utilities::{edge, parallel_instance};
use crate::variables::allocate_variables;

const TOLERANCE: f64 = 1.0e-4;

struct Solved {
    network: Network,
    route_sets: Vec<Vec<Route>>,
    flow_vars: Vec<Vec<Value>>,
    model: Option<Model>,
    solved: bool,
    context: Context,
}

fn solve(strategy: Strategy, mut network: Network, demands: &[Demand]) -> Solved {
    let config = Config::default();
    let route_sets = all_possible_routes(&mut network, demands, &config.enumeration);
    let mut context = Context::new();
    let mut flow_vars = allocate_variables(&mut network, &route_sets, &mut context);
    let (model, solved) = strategy.solve(
        &mut network,
        &route_sets,
        &mut flow_vars,
        demands,
        &mut context,
        &config,
    );
    Solved {
        network,
        route_sets,
        flow_vars,
        model,
        solved,
        context,
    }
}

#[test]
fn test_parallel_edges_split_the_demand() {
    // ARRANGE: the red mode alone cannot carry the demand
    let (network, demands) = parallel_instance(100.0, 500.0, 120.0);

    // ACT
    let mut result = solve(Strategy::Optimize, network, &demands);

    // ASSERT
    assert!(result.solved);
    let model = result.model.unwrap();
    let assignment =
        FlowAssignment::materialize(&mut result.network, &model, &result.flow_vars);

    let flows = assignment.route_flows(0).to_vec();
    assert_eq!(flows.len(), 2);
    assert!((assignment.demand_total(0) - 120.0).abs() < TOLERANCE);
    assert!(flows[0] <= 100.0 + TOLERANCE);
    assert!(flows[1] >= 20.0 - TOLERANCE);
    assert!(flows.iter().all(|flow| *flow >= -TOLERANCE));

    // every used route runs at the equilibrium cost
    let t_0 = model.value(result.context.real("T_0"));
    for (j, route) in result.route_sets[0].iter().enumerate() {
        if flows[j] >= 1.0 {
            let cost = model.eval(&route_cost(&result.network, route));
            assert!(
                (cost - t_0).abs() <= 5.0 + TOLERANCE,
                "route {} costs {} but the equilibrium cost is {}",
                j,
                cost,
                t_0
            );
        }
    }

    // the edge flows are exactly the route flows over them
    for (j, key) in ["0", "1"].into_iter().enumerate() {
        let edge = result.network.edge(&EdgeRef::new("A", "C", key)).unwrap();
        let f_e = edge.flow.unwrap().as_num().unwrap();
        assert!((f_e - flows[j]).abs() < TOLERANCE);
        assert!(f_e <= edge.capacity.unwrap() + TOLERANCE);
    }
}

#[test]
fn test_demand_with_missing_endpoint_is_skipped() {
    let (mut network, _) = parallel_instance(100.0, 500.0, 120.0);
    let demands = vec![Demand::new("X", "Y", 10.0)];
    let config = Config::default();

    let route_sets = all_possible_routes(&mut network, &demands, &config.enumeration);

    // no routes and no synthetic personal edge either
    assert!(route_sets[0].is_empty());
    assert_eq!(network.number_of_edges(), 2);
    assert!(!network.contains_node("X"));

    // the remaining system is still satisfiable with the demand dropped
    let result = solve(Strategy::Optimize, network, &demands);
    assert!(result.solved);
}

#[test]
fn test_disconnected_demand_gets_personal_edge() {
    // two components with the demand across them
    let mut network = Network::default();
    network.add_edge("A", "B", "0", edge("red", 100.0, 5.0, 1.0));
    network.add_edge("C", "D", "0", edge("red", 100.0, 5.0, 1.0));
    let demands = vec![Demand::new("A", "C", 10.0)];

    let result = solve(Strategy::Optimize, network, &demands);

    assert_eq!(result.route_sets[0].len(), 1);
    assert_eq!(result.route_sets[0][0].len(), 1);
    let auto = result
        .network
        .edge(&EdgeRef::new("A", "C", "auto_A_C"))
        .unwrap();
    assert_eq!(auto.color, "personal");
    assert_eq!(auto.capacity, Some(500.0));
    assert_eq!(auto.k, 1.0);

    assert!(result.solved);
    let model = result.model.unwrap();
    let flow = model.resolve(result.flow_vars[0][0]);
    assert!((flow - 10.0).abs() < TOLERANCE);
}

#[test]
fn test_descending_price_resolves_unknown_price() {
    // a single edge whose price is left to the solver
    let mut network = Network::default();
    network.add_edge(
        "A",
        "C",
        "0",
        model::network::Edge::new("red", Some(500.0), None, 1.0),
    );
    let demands = vec![Demand::new("A", "C", 100.0)];

    let result = solve(Strategy::DescendingPrice, network, &demands);

    assert!(result.solved);
    let resolved = result
        .network
        .edge(&EdgeRef::new("A", "C", "0"))
        .unwrap()
        .price
        .unwrap()
        .as_num()
        .unwrap();
    assert!((5.0..=120.0).contains(&resolved));
    assert!((resolved / 5.0).fract().abs() < TOLERANCE);

    // re-running the vanilla strategy with the resolved price stays feasible
    let second = solve(Strategy::Optimize, result.network.clone(), &demands);
    assert!(second.solved);
}

#[test]
fn test_binary_search_finds_uniform_capacity() {
    // undersized to the point where the vanilla strategy gives up
    let (network, demands) = parallel_instance(30.0, 30.0, 120.0);
    let unsolved = solve(Strategy::Optimize, network, &demands);
    assert!(!unsolved.solved);
    assert!(unsolved.model.is_none());

    let (network, demands) = parallel_instance(30.0, 30.0, 120.0);
    let result = solve(Strategy::BinarySearchCapacity, network, &demands);

    assert!(result.solved);
    let capacities: Vec<f64> = result
        .network
        .edges()
        .map(|(_, edge)| edge.capacity.unwrap())
        .collect();
    assert!(capacities.windows(2).all(|pair| pair[0] == pair[1]));
    assert!((500.0..=5000.0).contains(&capacities[0]));

    let model = result.model.unwrap();
    let routed: f64 = result.flow_vars[0]
        .iter()
        .map(|value| model.resolve(*value))
        .sum();
    assert!((routed - 120.0).abs() < TOLERANCE);
}

#[test]
fn test_capacity_inflation_recovers_feasibility() {
    let (network, demands) = parallel_instance(30.0, 30.0, 120.0);

    let result = solve(Strategy::InflateCapacity, network, &demands);

    assert!(result.solved);
    // one round of inflation suffices here
    for (_, edge) in result.network.edges() {
        assert_eq!(edge.capacity, Some(80.0));
    }
}

#[test]
fn test_route_enumeration_truncates_deterministically() {
    let build = || {
        let mut network = Network::default();
        for (key, color) in [("0", "red"), ("1", "Bus"), ("2", "Tram")] {
            network.add_edge("A", "B", key, edge(color, 100.0, 5.0, 1.0));
            network.add_edge("B", "C", key, edge(color, 100.0, 5.0, 1.0));
        }
        network
    };
    let demands = vec![Demand::new("A", "C", 10.0)];
    let config = Config::default();

    // 3 x 3 combinations, cut down to the route limit
    let first = all_possible_routes(&mut build(), &demands, &config.enumeration);
    let second = all_possible_routes(&mut build(), &demands, &config.enumeration);

    assert_eq!(first[0].len(), 6);
    assert_eq!(first, second);
    for route in &first[0] {
        assert_eq!(route[0].from, "A");
        assert_eq!(route[route.len() - 1].to, "C");
        assert_eq!(route[0].to, route[1].from);
    }
}

fn example_instance() -> serde_json::Value {
    serde_json::json!({
        "k": { "red": 1, "Bus": 2 },
        "networks": [{ "name": "city", "edge_list": [
            "A C {'color': 'red', 'capacity': 100, 'price': 5, 'k': 1}",
            "A C {'color': 'Bus', 'capacity': 500, 'price': 5, 'k': 2}"
        ]}],
        "demands": [{ "s": "A", "t": "C", "d": 120 }]
    })
}

#[test]
fn test_run_solves_a_parsed_instance() {
    let (network, assignment, solved) =
        crate::run(&example_instance(), None, Strategy::Optimize).unwrap();

    assert!(solved);
    let assignment = assignment.unwrap();
    assert!((assignment.demand_total(0) - 120.0).abs() < TOLERANCE);
    // every edge attribute is concrete after the solve
    for (_, edge) in network.edges() {
        assert!(edge.flow.unwrap().as_num().is_some());
        assert!(edge.price.unwrap().as_num().is_some());
    }
}

#[test]
fn test_run_merges_a_routes_extension() {
    let extension = serde_json::json!({
        "edge_list": ["A E {'k': 1, 'color': 'red', 'capacity': 80, 'price': None}"]
    });

    let (network, _, solved) =
        crate::run(&example_instance(), Some(&extension), Strategy::Optimize).unwrap();

    assert!(solved);
    assert_eq!(network.number_of_edges(), 3);
    // the extension edge's open price was made symbolic and then resolved
    let added = network.edge(&EdgeRef::new("A", "E", "0")).unwrap();
    assert!(added.price.unwrap().as_num().unwrap() >= 5.0 - TOLERANCE);
}

#[test]
fn test_relaxed_constraints_pin_every_route_to_the_equilibrium() {
    let (mut network, demands) = parallel_instance(100.0, 500.0, 120.0);
    let config = Config::default();
    let route_sets = all_possible_routes(&mut network, &demands, &config.enumeration);
    let mut context = Context::new();
    let flow_vars = allocate_variables(&mut network, &route_sets, &mut context);

    context.push();
    add_flow_and_capacity_constraints(
        &network,
        &route_sets,
        &flow_vars,
        &mut context,
        &config.tolerances,
    );
    add_relaxed_constraints(
        &network,
        &route_sets,
        &flow_vars,
        &demands,
        &mut context,
        &config.tolerances,
    );
    assert!(context.check().is_sat());

    let model = context.model().unwrap();
    let t_0 = model.value(context.real("T_0"));
    for route in &route_sets[0] {
        let cost = model.eval(&route_cost(&network, route));
        assert!((cost - t_0).abs() <= 5.0 + TOLERANCE);
    }
    context.pop();
}

#[test]
fn test_descending_price_pre_commits_concrete_splits() {
    // all route prices are concrete, so the split is decided up front
    let (mut network, demands) = parallel_instance(100.0, 500.0, 10.0);
    let config = Config::default();
    let route_sets = all_possible_routes(&mut network, &demands, &config.enumeration);
    let mut context = Context::new();
    let mut flow_vars = allocate_variables(&mut network, &route_sets, &mut context);

    let prices: Vec<f64> = route_sets[0]
        .iter()
        .map(|route| route_price(&network, route).as_const().unwrap())
        .collect();
    assert_eq!(prices, vec![5.0, 5.0]);

    let (model, solved) = Strategy::DescendingPrice.solve(
        &mut network,
        &route_sets,
        &mut flow_vars,
        &demands,
        &mut context,
        &config,
    );
    assert!(solved);
    assert!(model.is_some());

    // an even split of the demand, committed as numbers
    assert_eq!(flow_vars[0], vec![Value::Num(5.0), Value::Num(5.0)]);
}
