use itertools::Itertools;
use log::debug;

use model::base_types::NodeName;
use model::config::EnumerationConfig;
use model::network::{Edge, EdgeRef, Network};
use model::Demand;
use smt::Value;

/// One candidate route: the edge sequence from origin to destination.
pub type Route = Vec<EdgeRef>;

// fallback connection for demands nothing else serves
const PERSONAL_COLOR: &str = "personal";
const PERSONAL_CAPACITY: f64 = 500.0;
const PERSONAL_PRICE: f64 = 100.0;
const PERSONAL_K: f64 = 1.0;

/// Candidate routes for every demand.
///
/// Node paths are enumerated up to the hop cutoff and pruned to the
/// shortest ones (a detour never helps feasibility when a direct parallel
/// exists), then expanded across all parallel edges of every hop. A demand
/// whose endpoints exist but are not connected gets a synthetic personal
/// edge and the single route over it; a demand with an endpoint outside the
/// network gets no routes at all. Discovery order is deterministic and the
/// route list is truncated to `max_routes_per_demand`.
pub fn all_possible_routes(
    network: &mut Network,
    demands: &[Demand],
    config: &EnumerationConfig,
) -> Vec<Vec<Route>> {
    let mut route_sets = Vec::with_capacity(demands.len());
    for demand in demands {
        if !network.contains_node(&demand.s) || !network.contains_node(&demand.t) {
            debug!("demand {} has an endpoint outside the network", demand);
            route_sets.push(Vec::new());
            continue;
        }
        let node_paths = shortest_node_paths(network, &demand.s, &demand.t, config.max_hops);
        if node_paths.is_empty() {
            let key = format!("auto_{}_{}", demand.s, demand.t);
            debug!("no path for demand {}, adding personal edge {}", demand, key);
            network.add_edge(
                &demand.s,
                &demand.t,
                &key,
                Edge::new(
                    PERSONAL_COLOR,
                    Some(PERSONAL_CAPACITY),
                    Some(Value::Num(PERSONAL_PRICE)),
                    PERSONAL_K,
                ),
            );
            route_sets.push(vec![vec![EdgeRef::new(&demand.s, &demand.t, &key)]]);
            continue;
        }
        let mut routes: Vec<Route> = Vec::new();
        for path in &node_paths {
            let hop_options: Vec<Vec<EdgeRef>> = path
                .windows(2)
                .map(|hop| {
                    network
                        .parallel_edges(&hop[0], &hop[1])
                        .map(|key| EdgeRef::new(&hop[0], &hop[1], key))
                        .collect()
                })
                .collect();
            routes.extend(hop_options.into_iter().multi_cartesian_product());
        }
        routes.truncate(config.max_routes_per_demand);
        route_sets.push(routes);
    }
    route_sets
}

/// All simple node paths from `s` to `t` within the hop cutoff, pruned to
/// the minimum node-length and deduplicated.
fn shortest_node_paths(
    network: &Network,
    s: &str,
    t: &str,
    max_hops: usize,
) -> Vec<Vec<NodeName>> {
    let mut paths = Vec::new();
    if s == t {
        return paths;
    }
    let mut current = vec![s.to_string()];
    collect_simple_paths(network, t, max_hops, &mut current, &mut paths);
    if let Some(min_length) = paths.iter().map(|path| path.len()).min() {
        paths.retain(|path| path.len() == min_length);
    }
    paths.into_iter().unique().collect()
}

fn collect_simple_paths(
    network: &Network,
    target: &str,
    max_hops: usize,
    current: &mut Vec<NodeName>,
    paths: &mut Vec<Vec<NodeName>>,
) {
    if current.len() - 1 >= max_hops {
        return;
    }
    let last = current.last().unwrap().clone();
    let neighbors: Vec<NodeName> = network.neighbors(&last).cloned().collect();
    for neighbor in neighbors {
        if neighbor == target {
            let mut path = current.clone();
            path.push(neighbor);
            paths.push(path);
        } else if !current.contains(&neighbor) {
            current.push(neighbor);
            collect_simple_paths(network, target, max_hops, current, paths);
            current.pop();
        }
    }
}
