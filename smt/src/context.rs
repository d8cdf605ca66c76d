use std::collections::BTreeMap;

use good_lp::solvers::microlp::microlp;
use good_lp::{
    constraint, variable, Expression, ProblemVariables, ResolutionError, Solution, SolverModel,
    Variable,
};
use log::{debug, warn};

use crate::constraint::{Cmp, Constraint, Rel};
use crate::expression::{Expr, Var};
use crate::model::Model;

/// Default variable domain. Instance quantities (flows, prices, capacities,
/// perceived costs) stay far below this, and finite domains keep the big-M
/// rows of the gated constraints well-scaled.
const DOMAIN_BOUND: f64 = 1.0e5;

const EPS: f64 = 1.0e-9;

/// Outcome of a [`Context::check`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SatResult {
    Sat,
    Unsat,
}

impl SatResult {
    pub fn is_sat(&self) -> bool {
        matches!(self, SatResult::Sat)
    }
}

#[derive(Default)]
struct Frame {
    constraints: Vec<Constraint>,
    objective: Option<Expr>,
}

/// Assertion context over linear real arithmetic with scoped frames.
///
/// Variables are interned by name: asking for the same name twice yields the
/// same variable, which keeps them addressable across strategy iterations.
/// `check` lowers the asserted system to a mixed-integer program (gated
/// constraints become big-M indicator rows, bilinear objective terms are
/// relaxed over the variables' bounds) and solves it with microlp.
pub struct Context {
    names: BTreeMap<String, Var>,
    var_names: Vec<String>,
    frames: Vec<Frame>,
    last_model: Option<Model>,
}

impl Default for Context {
    fn default() -> Context {
        Context::new()
    }
}

impl Context {
    pub fn new() -> Context {
        Context {
            names: BTreeMap::new(),
            var_names: Vec::new(),
            frames: vec![Frame::default()],
            last_model: None,
        }
    }

    /// The real-valued variable of the given name, created on first use.
    pub fn real(&mut self, name: &str) -> Var {
        if let Some(var) = self.names.get(name) {
            return *var;
        }
        let var = Var(self.var_names.len());
        self.var_names.push(name.to_string());
        self.names.insert(name.to_string(), var);
        var
    }

    pub fn var_name(&self, var: Var) -> &str {
        &self.var_names[var.0]
    }

    /// Open a new assertion frame.
    pub fn push(&mut self) {
        self.frames.push(Frame::default());
    }

    /// Discard the most recent frame with everything asserted in it.
    pub fn pop(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        } else {
            warn!("pop on the base assertion frame ignored");
        }
    }

    pub fn assert(&mut self, constraint: Constraint) {
        self.frames.last_mut().unwrap().constraints.push(constraint);
    }

    /// Install the expression minimized by the next `check` in this frame.
    pub fn minimize(&mut self, objective: Expr) {
        self.frames.last_mut().unwrap().objective = Some(objective);
    }

    /// Model of the last satisfiable `check`, if any.
    pub fn model(&self) -> Option<Model> {
        self.last_model.clone()
    }

    pub fn check(&mut self) -> SatResult {
        self.last_model = None;
        let (plain, gated) = match lower_system(self.frames.iter().flat_map(|f| &f.constraints)) {
            LoweredSystem::Infeasible => return SatResult::Unsat,
            LoweredSystem::Rows { plain, gated } => (plain, gated),
        };
        let bounds = match tighten_bounds(&plain, self.var_names.len()) {
            Some(bounds) => bounds,
            None => return SatResult::Unsat,
        };

        let mut vars = ProblemVariables::new();
        let lp_vars: Vec<Variable> = bounds
            .iter()
            .map(|&(lo, hi)| vars.add(variable().min(lo).max(hi)))
            .collect();

        let mut rows: Vec<good_lp::Constraint> = Vec::new();
        for row in &plain {
            rows.push(constraint!(to_expression(row, &lp_vars) <= 0.0));
        }
        for gate in &gated {
            let delta = vars.add(variable().binary());
            // delta = 0 enforces the negated gate, delta = 1 the body
            let m_gate = row_max(&gate.negated_gate, &bounds).max(0.0) + 1.0;
            rows.push(constraint!(
                to_expression(&gate.negated_gate, &lp_vars) <= m_gate * delta
            ));
            for body_row in &gate.body {
                let m_body = row_max(body_row, &bounds).max(0.0) + 1.0;
                rows.push(constraint!(
                    to_expression(body_row, &lp_vars) <= m_body - m_body * delta
                ));
            }
        }

        let objective = self.frames.iter().rev().find_map(|f| f.objective.clone());
        let objective = match &objective {
            Some(expr) => lower_objective(expr, &bounds, &lp_vars, &mut vars, &mut rows),
            None => Expression::from(0.0),
        };

        debug!(
            "checking {} rows over {} variables ({} gated)",
            rows.len(),
            self.var_names.len(),
            gated.len()
        );

        let mut problem = vars.minimise(objective).using(microlp);
        for row in rows {
            problem = problem.with(row);
        }
        match problem.solve() {
            Ok(solution) => {
                let values = lp_vars.iter().map(|v| solution.value(*v)).collect();
                self.last_model = Some(Model::new(values));
                SatResult::Sat
            }
            Err(ResolutionError::Infeasible) => SatResult::Unsat,
            Err(error) => {
                warn!("backend gave up: {:?}", error);
                SatResult::Unsat
            }
        }
    }
}

/// Linear combination of variables plus a constant, interpreted as `<= 0`
/// when used as a row.
#[derive(Debug, Clone, Default)]
struct LinTerm {
    coeffs: BTreeMap<Var, f64>,
    constant: f64,
}

impl LinTerm {
    fn constant(constant: f64) -> LinTerm {
        LinTerm {
            coeffs: BTreeMap::new(),
            constant,
        }
    }

    fn merge(&mut self, other: &LinTerm, scale: f64) {
        for (var, coeff) in &other.coeffs {
            let entry = self.coeffs.entry(*var).or_insert(0.0);
            *entry += coeff * scale;
            if *entry == 0.0 {
                self.coeffs.remove(var);
            }
        }
        self.constant += other.constant * scale;
    }

    fn negated(&self) -> LinTerm {
        let mut negated = LinTerm::constant(0.0);
        negated.merge(self, -1.0);
        negated
    }

    fn is_constant(&self) -> bool {
        self.coeffs.is_empty()
    }
}

/// Affine view of an expression; `None` when a product of two symbolic
/// operands makes it nonlinear.
fn linearize(expr: &Expr) -> Option<LinTerm> {
    match expr {
        Expr::Const(c) => Some(LinTerm::constant(*c)),
        Expr::Sym(var) => {
            let mut term = LinTerm::constant(0.0);
            term.coeffs.insert(*var, 1.0);
            Some(term)
        }
        Expr::Sum(terms) => {
            let mut sum = LinTerm::constant(0.0);
            for term in terms {
                sum.merge(&linearize(term)?, 1.0);
            }
            Some(sum)
        }
        Expr::Mul(lhs, rhs) => {
            let lhs = linearize(lhs)?;
            let rhs = linearize(rhs)?;
            if lhs.is_constant() {
                let mut scaled = LinTerm::constant(0.0);
                scaled.merge(&rhs, lhs.constant);
                Some(scaled)
            } else if rhs.is_constant() {
                let mut scaled = LinTerm::constant(0.0);
                scaled.merge(&lhs, rhs.constant);
                Some(scaled)
            } else {
                None
            }
        }
    }
}

struct GatedRows {
    /// `<= 0` row holding exactly when the gate does not.
    negated_gate: LinTerm,
    body: Vec<LinTerm>,
}

enum LoweredSystem {
    Infeasible,
    Rows {
        plain: Vec<LinTerm>,
        gated: Vec<GatedRows>,
    },
}

/// Normalized `<= 0` rows of a comparison; `None` when the comparison is
/// nonlinear and has to be skipped.
fn cmp_rows(cmp: &Cmp) -> Option<Vec<LinTerm>> {
    let mut diff = linearize(&cmp.lhs)?;
    diff.merge(&linearize(&cmp.rhs)?, -1.0);
    Some(match cmp.rel {
        Rel::Le => vec![diff],
        Rel::Ge => vec![diff.negated()],
        Rel::Eq => {
            let negated = diff.negated();
            vec![diff, negated]
        }
    })
}

fn lower_system<'a>(constraints: impl Iterator<Item = &'a Constraint>) -> LoweredSystem {
    let mut plain: Vec<LinTerm> = Vec::new();
    let mut gated: Vec<GatedRows> = Vec::new();

    // rows with no variables left are decided right here
    let keep_satisfiable = |rows: Vec<LinTerm>, plain: &mut Vec<LinTerm>| -> bool {
        for row in rows {
            if row.is_constant() {
                if row.constant > EPS {
                    return false;
                }
            } else {
                plain.push(row);
            }
        }
        true
    };

    for constraint in constraints {
        match constraint {
            Constraint::Cmp(cmp) => match cmp_rows(cmp) {
                Some(rows) => {
                    if !keep_satisfiable(rows, &mut plain) {
                        return LoweredSystem::Infeasible;
                    }
                }
                None => warn!("skipping nonlinear assertion"),
            },
            Constraint::Implies { gate, body } => {
                let gate_diff = match (linearize(&gate.lhs), linearize(&gate.rhs)) {
                    (Some(mut lhs), Some(rhs)) => {
                        lhs.merge(&rhs, -1.0);
                        lhs
                    }
                    _ => {
                        warn!("skipping implication with nonlinear gate");
                        continue;
                    }
                };
                let negated_gate = match gate.rel {
                    // gate `diff >= 0` fails iff `diff <= 0`, and vice versa
                    Rel::Ge => gate_diff,
                    Rel::Le => gate_diff.negated(),
                    Rel::Eq => {
                        warn!("skipping implication with equality gate");
                        continue;
                    }
                };
                if negated_gate.is_constant() {
                    // the gate itself is already decided; both relations are
                    // closed, so the boundary counts as holding
                    let gate_holds = negated_gate.constant >= -EPS;
                    if gate_holds {
                        for cmp in body {
                            match cmp_rows(cmp) {
                                Some(rows) => {
                                    if !keep_satisfiable(rows, &mut plain) {
                                        return LoweredSystem::Infeasible;
                                    }
                                }
                                None => warn!("skipping nonlinear assertion"),
                            }
                        }
                    }
                    continue;
                }
                let mut body_rows = Vec::new();
                for cmp in body {
                    match cmp_rows(cmp) {
                        Some(rows) => {
                            for row in rows {
                                if row.is_constant() && row.constant <= EPS {
                                    continue; // holds regardless of the gate
                                }
                                body_rows.push(row);
                            }
                        }
                        None => warn!("skipping nonlinear implication body"),
                    }
                }
                if !body_rows.is_empty() {
                    gated.push(GatedRows {
                        negated_gate,
                        body: body_rows,
                    });
                }
            }
        }
    }
    LoweredSystem::Rows { plain, gated }
}

/// Interval-tighten the default domains with the unconditional rows; two
/// passes propagate sum bounds like `sum of nonnegative flows = d` down to
/// the individual variables. `None` when some domain collapses.
fn tighten_bounds(plain: &[LinTerm], var_count: usize) -> Option<Vec<(f64, f64)>> {
    let mut bounds = vec![(-DOMAIN_BOUND, DOMAIN_BOUND); var_count];
    for _ in 0..2 {
        for row in plain {
            for (var, coeff) in &row.coeffs {
                let rest: f64 = row
                    .coeffs
                    .iter()
                    .filter(|(other, _)| *other != var)
                    .map(|(other, c)| {
                        let (lo, hi) = bounds[other.0];
                        (c * lo).min(c * hi)
                    })
                    .sum::<f64>()
                    + row.constant;
                // coeff * var <= -rest
                let limit = -rest / coeff;
                let (lo, hi) = &mut bounds[var.0];
                if *coeff > 0.0 {
                    *hi = hi.min(limit);
                } else {
                    *lo = lo.max(limit);
                }
                if *lo > *hi + 1.0e-6 {
                    return None;
                }
            }
        }
    }
    Some(bounds)
}

/// Largest value the row can take over the variables' domains.
fn row_max(row: &LinTerm, bounds: &[(f64, f64)]) -> f64 {
    row.constant
        + row
            .coeffs
            .iter()
            .map(|(var, coeff)| {
                let (lo, hi) = bounds[var.0];
                (coeff * lo).max(coeff * hi)
            })
            .sum::<f64>()
}

fn to_expression(row: &LinTerm, lp_vars: &[Variable]) -> Expression {
    let mut expression = Expression::from(row.constant);
    for (var, coeff) in &row.coeffs {
        expression += *coeff * lp_vars[var.0];
    }
    expression
}

/// Objective lowering: affine parts go through unchanged, a product of two
/// affine operands is replaced by a fresh variable constrained to its
/// McCormick envelope over the operands' intervals.
fn lower_objective(
    expr: &Expr,
    bounds: &[(f64, f64)],
    lp_vars: &[Variable],
    vars: &mut ProblemVariables,
    rows: &mut Vec<good_lp::Constraint>,
) -> Expression {
    if let Some(term) = linearize(expr) {
        return to_expression(&term, lp_vars);
    }
    match expr {
        Expr::Sum(terms) => {
            let mut sum = Expression::from(0.0);
            for term in terms {
                sum += lower_objective(term, bounds, lp_vars, vars, rows);
            }
            sum
        }
        Expr::Mul(lhs, rhs) => {
            let (Some(lhs), Some(rhs)) = (linearize(lhs), linearize(rhs)) else {
                warn!("dropping objective term that is not bilinear");
                return Expression::from(0.0);
            };
            mccormick(&lhs, &rhs, bounds, lp_vars, vars, rows)
        }
        // linearize only fails on Sum and Mul
        _ => unreachable!("affine expression failed to linearize"),
    }
}

fn interval(term: &LinTerm, bounds: &[(f64, f64)]) -> (f64, f64) {
    let max = row_max(term, bounds);
    let min = -row_max(&term.negated(), bounds);
    (min, max)
}

fn mccormick(
    lhs: &LinTerm,
    rhs: &LinTerm,
    bounds: &[(f64, f64)],
    lp_vars: &[Variable],
    vars: &mut ProblemVariables,
    rows: &mut Vec<good_lp::Constraint>,
) -> Expression {
    let (a_lo, a_hi) = interval(lhs, bounds);
    let (b_lo, b_hi) = interval(rhs, bounds);
    let u = vars.add(variable().min(a_lo).max(a_hi));
    rows.push(constraint!(to_expression(lhs, lp_vars) - u == 0.0));
    let v = vars.add(variable().min(b_lo).max(b_hi));
    rows.push(constraint!(to_expression(rhs, lp_vars) - v == 0.0));

    let corners = [a_lo * b_lo, a_lo * b_hi, a_hi * b_lo, a_hi * b_hi];
    let w_lo = corners.iter().cloned().fold(f64::INFINITY, f64::min);
    let w_hi = corners.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let w = vars.add(variable().min(w_lo).max(w_hi));
    rows.push(constraint!(w >= a_lo * v + b_lo * u - a_lo * b_lo));
    rows.push(constraint!(w >= a_hi * v + b_hi * u - a_hi * b_hi));
    rows.push(constraint!(w <= a_hi * v + b_lo * u - a_hi * b_lo));
    rows.push(constraint!(w <= a_lo * v + b_hi * u - a_lo * b_hi));
    w.into()
}
