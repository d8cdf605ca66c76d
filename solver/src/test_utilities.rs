use model::network::{Edge, Network};
use model::Demand;
use smt::Value;

pub fn edge(color: &str, capacity: f64, price: f64, k: f64) -> Edge {
    Edge::new(color, Some(capacity), Some(Value::Num(price)), k)
}

/// Two parallel edges between A and C and a single demand between them.
pub fn parallel_instance(
    capacity_red: f64,
    capacity_bus: f64,
    demand: f64,
) -> (Network, Vec<Demand>) {
    let mut network = Network::default();
    network.add_edge("A", "C", "0", edge("red", capacity_red, 5.0, 1.0));
    network.add_edge("A", "C", "1", edge("Bus", capacity_bus, 5.0, 2.0));
    (network, vec![Demand::new("A", "C", demand)])
}
