use thiserror::Error;

/// Failures reported by the numeric engines
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Supply ({supply}) and demand ({demand}) must be equal")]
    Balance { supply: f64, demand: f64 },
    #[error("Problem is unbounded: no leaving variable for entering variable {variable}")]
    Unbounded { variable: String },
    #[error("Simplex did not reach optimality within {iterations} iterations")]
    NonConvergence { iterations: usize },
    #[error("Feasible region is empty")]
    Infeasible,
}
