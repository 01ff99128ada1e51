//! WASM bindings for the solver pages
//!
//! Each function takes the text the user typed and returns plain JSON-like
//! objects for the page to render.

use js_sys::Array;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::compiler::{CompileError, Compiler};
use crate::parser::Parser;
use simplexity_solver::{Allocation, GraphicalSolver, SimplexReport, Solver, Tableau};

/// Parse an objective and return it as JSON
#[wasm_bindgen]
pub fn parse_objective(source: &str) -> Result<JsValue, JsValue> {
    let objective = Parser::default().parse_objective(source).map_err(to_js_error)?;
    serde_wasm_bindgen::to_value(&objective).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[derive(Serialize)]
struct SimplexOutput {
    #[serde(flatten)]
    report: SimplexReport,
    steps: Vec<Tableau>,
}

/// Solve with the simplex method: `{x, y, z, slack, steps}`
#[wasm_bindgen]
pub fn solve_simplex(objective: &str, constraints: Array) -> Result<JsValue, JsValue> {
    let constraints = strings(&constraints);
    let compiled = Compiler::new()
        .compile_lp(objective, &constraints)
        .map_err(to_js_error)?;
    let solution = Solver::new()
        .solve(&compiled.lp_problem)
        .map_err(to_js_error)?;

    let output = SimplexOutput {
        report: solution.report(),
        steps: solution.steps,
    };
    serde_wasm_bindgen::to_value(&output).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Solve with the graphical method: `{vertices, optimal: {vertex, value}, ...}`
#[wasm_bindgen]
pub fn solve_graphical(objective: &str, constraints: Array) -> Result<JsValue, JsValue> {
    let constraints = strings(&constraints);
    let compiled = Compiler::new()
        .compile_lp(objective, &constraints)
        .map_err(to_js_error)?;
    let solution = GraphicalSolver::new()
        .solve(&compiled.lp_problem)
        .map_err(to_js_error)?;
    serde_wasm_bindgen::to_value(&solution).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[derive(Serialize)]
#[serde(untagged)]
enum TransportationOutput {
    Solved(Allocation),
    Failed { error: String },
}

/// North-West Corner allocation: `{allocation, totalCost}` or `{error}`.
///
/// `costs` is an array of rows of strings, `supply` and `demand` arrays of strings.
#[wasm_bindgen]
pub fn solve_transportation(costs: JsValue, supply: JsValue, demand: JsValue) -> JsValue {
    let output = match transportation(costs, supply, demand) {
        Ok(allocation) => TransportationOutput::Solved(allocation),
        Err(error) => TransportationOutput::Failed { error },
    };
    serde_wasm_bindgen::to_value(&output).unwrap_or(JsValue::NULL)
}

fn transportation(costs: JsValue, supply: JsValue, demand: JsValue) -> Result<Allocation, String> {
    let costs: Vec<Vec<String>> = serde_wasm_bindgen::from_value(costs).map_err(|e| e.to_string())?;
    let supply: Vec<String> = serde_wasm_bindgen::from_value(supply).map_err(|e| e.to_string())?;
    let demand: Vec<String> = serde_wasm_bindgen::from_value(demand).map_err(|e| e.to_string())?;

    let problem = Compiler::new()
        .compile_transportation(&costs, &supply, &demand)
        .map_err(|e| e.to_string())?;
    problem.north_west_corner().map_err(|e| e.to_string())
}

fn strings(array: &Array) -> Vec<String> {
    array.iter().map(|v| v.as_string().unwrap_or_default()).collect()
}

fn to_js_error(e: impl Into<CompileError>) -> JsValue {
    JsValue::from_str(&e.into().to_string())
}
