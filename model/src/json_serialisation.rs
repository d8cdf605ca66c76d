#[cfg(test)]
#[path = "json_serialisation_tests.rs"]
mod json_serialisation_tests;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use smt::Value;
use thiserror::Error;

use crate::network::{Edge, Network};
use crate::Demand;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read the instance: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed instance: {0}")]
    Instance(#[from] serde_json::Error),
    #[error("malformed edge line: {0:?}")]
    EdgeLine(String),
    #[error("no congestion coefficient for color {0:?}")]
    UnknownColor(String),
}

#[derive(Serialize, Deserialize, Debug)]
struct JsonInput {
    #[serde(default)]
    k: BTreeMap<String, f64>,
    networks: Vec<JsonNetwork>,
    #[serde(default)]
    demands: Vec<Demand>,
}

#[derive(Serialize, Deserialize, Debug)]
struct JsonNetwork {
    name: String,
    edge_list: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug)]
struct JsonRoutesExtension {
    edge_list: Vec<String>,
}

/// Attribute mapping of one edge-list line.
#[derive(Serialize, Deserialize, Debug, Default)]
struct EdgeAttributes {
    color: Option<String>,
    capacity: Option<f64>,
    price: Option<f64>,
    k: Option<f64>,
    f_e: Option<f64>,
}

/// Read a `{k, networks, demands}` document into a multigraph and its
/// demand list. The edges of all networks are merged into one multigraph;
/// parallel edges get running keys in file order. Per-edge `k` falls back
/// to the instance's color map.
pub fn load_instance_from_json(input: &JsonValue) -> Result<(Network, Vec<Demand>), LoadError> {
    let input: JsonInput = serde_json::from_value(input.clone())?;
    let mut network = Network::default();
    for json_network in &input.networks {
        for line in &json_network.edge_list {
            add_edge_line(&mut network, line, &input.k)?;
        }
    }
    Ok((network, input.demands))
}

pub fn load_network_from_json(input: &JsonValue) -> Result<Network, LoadError> {
    load_instance_from_json(input).map(|(network, _)| network)
}

/// Read a `{edge_list}` document holding the edges a routes extension adds.
/// Extension lines carry their `k` inline.
pub fn load_routes_extension_from_json(input: &JsonValue) -> Result<Network, LoadError> {
    let input: JsonRoutesExtension = serde_json::from_value(input.clone())?;
    let mut network = Network::default();
    let no_defaults = BTreeMap::new();
    for line in &input.edge_list {
        add_edge_line(&mut network, line, &no_defaults)?;
    }
    Ok(network)
}

/// Serialize the network back to its JSON document. Attribute values that
/// are still symbolic become `null`.
pub fn network_to_json(network: &Network) -> JsonValue {
    let edge_list: Vec<String> = network
        .edges()
        .map(|(reference, edge)| {
            let attributes = EdgeAttributes {
                color: Some(edge.color.clone()),
                capacity: edge.capacity,
                price: edge.price.and_then(|price| price.as_num()),
                k: Some(edge.k),
                f_e: edge.flow.and_then(|flow| flow.as_num()),
            };
            format!(
                "{} {} {}",
                reference.from,
                reference.to,
                serde_json::to_string(&attributes).expect("attribute maps always serialize")
            )
        })
        .collect();
    serde_json::json!({
        "networks": [{ "name": "Combined", "edge_list": edge_list }]
    })
}

fn add_edge_line(
    network: &mut Network,
    line: &str,
    k_defaults: &BTreeMap<String, f64>,
) -> Result<(), LoadError> {
    let mut parts = line.splitn(3, ' ');
    let (u, v, attributes) = match (parts.next(), parts.next(), parts.next()) {
        (Some(u), Some(v), Some(attributes)) => (u, v, attributes),
        _ => return Err(LoadError::EdgeLine(line.to_string())),
    };
    let attributes =
        parse_attributes(attributes).map_err(|_| LoadError::EdgeLine(line.to_string()))?;
    let color = attributes.color.unwrap_or_else(|| "personal".to_string());
    let k = match attributes.k.or_else(|| k_defaults.get(&color).copied()) {
        Some(k) => k,
        None => return Err(LoadError::UnknownColor(color)),
    };
    let key = network.parallel_edges(u, v).count().to_string();
    let mut edge = Edge::new(&color, attributes.capacity, attributes.price.map(Value::Num), k);
    edge.flow = attributes.f_e.map(Value::Num);
    network.add_edge(u, v, &key, edge);
    Ok(())
}

/// Accepts the attribute mapping in JSON form or in the legacy single-quoted
/// form with `None` for missing values.
fn parse_attributes(raw: &str) -> Result<EdgeAttributes, serde_json::Error> {
    let normalized = raw.trim().replace('\'', "\"").replace(": None", ": null");
    serde_json::from_str(&normalized)
}
