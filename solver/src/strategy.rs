use log::{debug, info};

use model::base_types::DEFAULT_CAPACITY;
use model::network::Network;
use model::{Config, Demand};
use smt::{Context, Model, Value};

use crate::constraints::add_constraints;
use crate::expressions::route_price;
use crate::objective::total_cost;
use crate::routes::Route;

/// The feasibility-search strategies.
///
/// All five share one signature and report `(model, solved)` instead of
/// failing; a caller may reuse the same context across invocations since
/// every assertion frame a strategy opens is closed again on every exit
/// path. The price sweep probes on clones of the network; the capacity
/// strategies adjust the network itself, so clone up front if the original
/// capacities matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Assert everything, minimize the total system cost, check once.
    Optimize,
    /// Sweep a uniform price for all undetermined prices from high to low
    /// and keep the lowest one that stays feasible.
    DescendingPrice,
    /// The price sweep, minimizing the total system cost at every probe.
    DescendingPriceWithObjective,
    /// Bisect on one uniform capacity for every edge.
    BinarySearchCapacity,
    /// Grow every capacity stepwise until the system becomes feasible.
    InflateCapacity,
}

impl Strategy {
    pub fn from_name(name: &str) -> Option<Strategy> {
        match name {
            "optimize" => Some(Strategy::Optimize),
            "descending-price" => Some(Strategy::DescendingPrice),
            "descending-price-obj" => Some(Strategy::DescendingPriceWithObjective),
            "binary-search-capacity" => Some(Strategy::BinarySearchCapacity),
            "inflate-capacity" => Some(Strategy::InflateCapacity),
            _ => None,
        }
    }

    pub fn solve(
        self,
        network: &mut Network,
        route_sets: &[Vec<Route>],
        flow_vars: &mut Vec<Vec<Value>>,
        demands: &[Demand],
        context: &mut Context,
        config: &Config,
    ) -> (Option<Model>, bool) {
        match self {
            Strategy::Optimize => optimize(network, route_sets, flow_vars, demands, context, config),
            Strategy::DescendingPrice => {
                descending_price(network, route_sets, flow_vars, demands, context, config, false)
            }
            Strategy::DescendingPriceWithObjective => {
                descending_price(network, route_sets, flow_vars, demands, context, config, true)
            }
            Strategy::BinarySearchCapacity => {
                binary_search_capacity(network, route_sets, flow_vars, demands, context, config)
            }
            Strategy::InflateCapacity => {
                inflate_capacity(network, route_sets, flow_vars, demands, context, config)
            }
        }
    }
}

fn optimize(
    network: &Network,
    route_sets: &[Vec<Route>],
    flow_vars: &[Vec<Value>],
    demands: &[Demand],
    context: &mut Context,
    config: &Config,
) -> (Option<Model>, bool) {
    debug!("solving with the optimize strategy");
    context.push();
    add_constraints(network, route_sets, flow_vars, demands, context, &config.tolerances);
    context.minimize(total_cost(network, route_sets, flow_vars));
    let result = context.check();
    let model = context.model();
    context.pop();
    if result.is_sat() {
        (model, true)
    } else {
        debug!("unable to satisfy the constraints under the objective");
        (None, false)
    }
}

/// Probe a uniform price for every undetermined price from `max` down to
/// `min`; the lowest feasible probe wins and is written back into the
/// network together with the edge flows of its model.
fn descending_price(
    network: &mut Network,
    route_sets: &[Vec<Route>],
    flow_vars: &mut Vec<Vec<Value>>,
    demands: &[Demand],
    context: &mut Context,
    config: &Config,
    with_objective: bool,
) -> (Option<Model>, bool) {
    let sweep = &config.price_sweep;
    debug!("solving with the descending-price strategy");

    // Where every route price of a demand is already concrete, the split is
    // computed up front instead of left to the solver: the new edges do not
    // enable new routes, so the flows need not be variables at all.
    for (i, routes) in route_sets.iter().enumerate() {
        let prices: Option<Vec<f64>> = routes
            .iter()
            .map(|route| route_price(network, route).as_const())
            .collect();
        let Some(prices) = prices else { continue };
        let total: f64 = prices.iter().sum();
        if total == 0.0 {
            continue;
        }
        flow_vars[i] = prices
            .iter()
            .map(|price| Value::Num(price / total * demands[i].d))
            .collect();
        debug!("pre-committed the route split of demand {}", i);
    }

    let mut model = None;
    let mut last_sat_price = None;
    let mut price = sweep.max;
    while price >= sweep.min {
        debug!("probing feasibility at price {}", price);
        let mut probe = network.clone();
        for (_, edge) in probe.edges_mut() {
            if matches!(edge.price, Some(Value::Sym(_))) {
                edge.price = Some(Value::Num(price));
            }
        }
        context.push();
        add_constraints(&probe, route_sets, flow_vars, demands, context, &config.tolerances);
        if with_objective {
            context.minimize(total_cost(&probe, route_sets, flow_vars));
        }
        let result = context.check();
        if result.is_sat() {
            model = context.model();
            last_sat_price = Some(price);
            context.pop();
            price -= sweep.delta;
        } else {
            debug!("constraints unsatisfiable at price {}", price);
            context.pop();
            break;
        }
    }

    if let (Some(model), Some(price)) = (model, last_sat_price) {
        for (_, edge) in network.edges_mut() {
            if matches!(edge.price, Some(Value::Sym(_))) {
                edge.price = Some(Value::Num(price));
            }
            if let Some(Value::Sym(var)) = edge.flow {
                edge.flow = Some(Value::Num(model.decimal(var, 5)));
            }
        }
        info!("final feasible uniform price: {}", price);
        (Some(model), true)
    } else {
        (None, false)
    }
}

/// Bisect on the smallest uniform capacity that makes the system feasible.
/// Reports the outcome of the final probe, whose capacities remain on the
/// network.
fn binary_search_capacity(
    network: &mut Network,
    route_sets: &[Vec<Route>],
    flow_vars: &[Vec<Value>],
    demands: &[Demand],
    context: &mut Context,
    config: &Config,
) -> (Option<Model>, bool) {
    let search = &config.capacity_search;
    debug!("solving with the capacity bisection strategy");
    let (mut lower, mut upper) = (search.min, search.max);
    let mut capacity = lower;
    let mut outcome = (None, false);
    for _ in 0..search.iterations {
        capacity = ((lower + upper) / 2.0).floor();
        for (_, edge) in network.edges_mut() {
            edge.capacity = Some(capacity);
        }
        outcome = optimize(network, route_sets, flow_vars, demands, context, config);
        if outcome.1 {
            upper = capacity;
        } else {
            lower = capacity;
        }
    }
    if outcome.1 {
        info!("feasible uniform capacity: {}", capacity);
    }
    outcome
}

/// Grow every capacity by a fixed step until the system becomes feasible.
fn inflate_capacity(
    network: &mut Network,
    route_sets: &[Vec<Route>],
    flow_vars: &[Vec<Value>],
    demands: &[Demand],
    context: &mut Context,
    config: &Config,
) -> (Option<Model>, bool) {
    let inflation = &config.capacity_inflation;
    debug!("solving with the capacity inflation strategy");
    let mut outcome = (None, false);
    for round in 0..inflation.max_rounds {
        for (_, edge) in network.edges_mut() {
            edge.capacity = Some(edge.capacity.unwrap_or(DEFAULT_CAPACITY) + inflation.delta);
        }
        outcome = optimize(network, route_sets, flow_vars, demands, context, config);
        if outcome.1 {
            info!(
                "increased every capacity by {}",
                inflation.delta * (round + 1) as f64
            );
            break;
        }
    }
    outcome
}
