use model::base_types::DEFAULT_CAPACITY;
use model::config::ToleranceConfig;
use model::network::Network;
use model::Demand;
use smt::{Cmp, Constraint, Context, Expr, Value};

use crate::expressions::{route_cost, route_price};
use crate::routes::Route;

/// The full constraint family: edge-flow definition, capacity bounds,
/// demand conservation, both Wardrop conditions and non-negative route
/// flows.
pub fn add_constraints(
    network: &Network,
    route_sets: &[Vec<Route>],
    flow_vars: &[Vec<Value>],
    demands: &[Demand],
    context: &mut Context,
    tolerances: &ToleranceConfig,
) {
    add_flow_and_capacity_constraints(network, route_sets, flow_vars, context, tolerances);
    add_wardrop_constraints(network, route_sets, flow_vars, demands, context, tolerances);
    for row in flow_vars {
        for value in row {
            if let Value::Sym(var) = value {
                context.assert(Cmp::ge(*var, 0.0).into());
            }
        }
    }
}

/// Edge-flow definition and capacity bounds. The edge flow is the sum of
/// the route flows over the edge, zero when no route touches it; a sum that
/// folds to a plain number is not asserted, so flows a strategy has fixed
/// up front cannot contradict it. Every flow stays within `[0, capacity]`
/// and undetermined prices are kept above the price floor.
pub fn add_flow_and_capacity_constraints(
    network: &Network,
    route_sets: &[Vec<Route>],
    flow_vars: &[Vec<Value>],
    context: &mut Context,
    tolerances: &ToleranceConfig,
) {
    for (reference, edge) in network.edges() {
        let Some(f_e) = edge.flow else { continue };
        let f_e = Expr::from(f_e);

        let on_edge: Vec<Expr> = route_sets
            .iter()
            .zip(flow_vars)
            .flat_map(|(routes, row)| {
                routes
                    .iter()
                    .zip(row)
                    .filter(|(route, _)| route.iter().any(|r| r.same_edge(&reference)))
                    .map(|(_, value)| Expr::from(*value))
            })
            .collect();
        if on_edge.is_empty() {
            context.assert(Cmp::eq(f_e.clone(), 0.0).into());
        } else {
            let sum = Expr::sum(on_edge);
            if sum.is_symbolic() {
                context.assert(Cmp::eq(f_e.clone(), sum).into());
            }
        }

        context.assert(Cmp::ge(f_e.clone(), 0.0).into());
        context.assert(Cmp::le(f_e, edge.capacity.unwrap_or(DEFAULT_CAPACITY)).into());

        if let Some(Value::Sym(price)) = edge.price {
            context.assert(Cmp::ge(price, tolerances.price_min).into());
        }
    }
}

/// Demand conservation and the Wardrop conditions, per demand whose
/// endpoints exist in the network.
///
/// Demand conservation is skipped when the whole flow row is already
/// numeric: a committed split sums to the demand by construction. Gates
/// over numeric flows are decided inside the context, which asserts the
/// body directly or drops it.
pub fn add_wardrop_constraints(
    network: &Network,
    route_sets: &[Vec<Route>],
    flow_vars: &[Vec<Value>],
    demands: &[Demand],
    context: &mut Context,
    tolerances: &ToleranceConfig,
) {
    for (i, demand) in demands.iter().enumerate() {
        if !network.contains_node(&demand.s) || !network.contains_node(&demand.t) {
            continue;
        }
        let flow_sum = Expr::sum(flow_vars[i].iter().map(|value| Expr::from(*value)));
        if flow_sum.is_symbolic() {
            context.assert(Cmp::eq(flow_sum, demand.d).into());
        }

        let t_i = Expr::Sym(context.real(&format!("T_{}", i)));
        for (j, route) in route_sets[i].iter().enumerate() {
            let f_r = Expr::from(flow_vars[i][j]);
            let cost = route_cost(network, route);
            let price = route_price(network, route);
            // used routes share the minimum perceived cost
            context.assert(Constraint::implies(
                Cmp::ge(f_r.clone(), tolerances.flow),
                Cmp::within(cost, t_i.clone(), tolerances.cost),
            ));
            // unused routes must not undercut it
            context.assert(Constraint::implies(
                Cmp::le(f_r, tolerances.flow),
                vec![Cmp::ge(price, t_i.clone() - Expr::Const(tolerances.cost))],
            ));
        }
    }
}

/// Fallback for instances where the gated Wardrop conditions come out
/// unsatisfiable: keep demand conservation but pin every enumerated route
/// to the equilibrium cost, with no condition on being used.
pub fn add_relaxed_constraints(
    network: &Network,
    route_sets: &[Vec<Route>],
    flow_vars: &[Vec<Value>],
    demands: &[Demand],
    context: &mut Context,
    tolerances: &ToleranceConfig,
) {
    for (i, demand) in demands.iter().enumerate() {
        if !network.contains_node(&demand.s) || !network.contains_node(&demand.t) {
            continue;
        }
        let flow_sum = Expr::sum(flow_vars[i].iter().map(|value| Expr::from(*value)));
        if flow_sum.is_symbolic() {
            context.assert(Cmp::eq(flow_sum, demand.d).into());
        }

        let t_i = Expr::Sym(context.real(&format!("T_{}", i)));
        for route in &route_sets[i] {
            let cost = route_cost(network, route);
            for cmp in Cmp::within(cost, t_i.clone(), tolerances.cost) {
                context.assert(cmp.into());
            }
        }
    }
}
