use model::network::Network;
use smt::Expr;

use crate::routes::Route;

/// Perceived cost `Σ k·f_e + price` over the route's edges. Folds to a
/// plain number as soon as every operand is one.
pub fn route_cost(network: &Network, route: &Route) -> Expr {
    Expr::sum(
        route
            .iter()
            .filter_map(|reference| network.edge(reference))
            .map(|edge| {
                let flow = edge.flow.map(Expr::from).unwrap_or(Expr::Const(0.0));
                let price = edge.price.map(Expr::from).unwrap_or(Expr::Const(0.0));
                Expr::mul(Expr::Const(edge.k), flow) + price
            }),
    )
}

/// Ticket price `Σ price` over the route's edges, with the same folding.
pub fn route_price(network: &Network, route: &Route) -> Expr {
    Expr::sum(
        route
            .iter()
            .filter_map(|reference| network.edge(reference))
            .map(|edge| edge.price.map(Expr::from).unwrap_or(Expr::Const(0.0))),
    )
}
