use log::debug;
use simplexity_solver::{LpProblem, SolveError, TransportationProblem, check_balance};
use thiserror::Error;

use crate::ast::*;
use crate::parser::{ParseError, Parser};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("Invalid input: {0}")]
    Input(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Solve(#[from] SolveError),
}

/// A parsed linear program ready for solving
#[derive(Debug, Clone)]
pub struct CompiledProblem {
    pub objective: ObjectiveFunction,
    pub constraints: Vec<ConstraintExpr>,
    pub lp_problem: LpProblem,
}

impl CompiledProblem {
    /// Every fragment the parser skipped, across objective and constraints
    pub fn ignored_terms(&self) -> Vec<&str> {
        self.objective
            .expression
            .ignored
            .iter()
            .chain(self.constraints.iter().flat_map(|c| c.lhs.ignored.iter()))
            .map(String::as_str)
            .collect()
    }
}

/// Turns user-entered text into solver problems
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    parser: Parser,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parser(parser: Parser) -> Self {
        Self { parser }
    }

    /// Parse an objective and its `<=` constraints into an [`LpProblem`].
    ///
    /// A constant on a constraint's left side moves to its right side; an
    /// objective constant becomes the objective offset.
    pub fn compile_lp<S: AsRef<str>>(
        &self,
        objective: &str,
        constraints: &[S],
    ) -> Result<CompiledProblem, CompileError> {
        if objective.trim().is_empty() {
            return Err(CompileError::Input("Please enter an objective function".to_string()));
        }
        if let Some(i) = constraints.iter().position(|c| c.as_ref().trim().is_empty()) {
            return Err(CompileError::Input(format!(
                "Please fill in all constraints (constraint {} is empty)",
                i + 1
            )));
        }

        let objective = self.parser.parse_objective(objective)?;
        let constraints = self.parser.parse_constraints(constraints)?;

        let vocabulary = self.parser.vocabulary();
        let mut lp_problem = LpProblem::new(vocabulary.names().to_vec());
        lp_problem.set_objective(objective.expression.to_vector(vocabulary), objective.direction);
        lp_problem.set_objective_offset(objective.expression.constant.unwrap_or(0.0));
        for c in &constraints {
            let rhs = c.rhs - c.lhs.constant.unwrap_or(0.0);
            lp_problem.add_constraint(c.lhs.to_vector(vocabulary), rhs);
        }
        debug!(
            "Compiled LP with {} variables and {} constraints",
            lp_problem.num_variables(),
            lp_problem.num_constraints()
        );

        Ok(CompiledProblem {
            objective,
            constraints,
            lp_problem,
        })
    }

    /// Build a transportation problem from text cells.
    ///
    /// Balance is checked first, counting blank supply and demand cells as
    /// zero; blank cells are rejected afterwards.
    pub fn compile_transportation<S: AsRef<str>>(
        &self,
        costs: &[Vec<S>],
        supply: &[S],
        demand: &[S],
    ) -> Result<TransportationProblem, CompileError> {
        let costs = costs
            .iter()
            .enumerate()
            .map(|(i, row)| {
                row.iter()
                    .enumerate()
                    .map(|(j, cell)| {
                        parse_cell(cell.as_ref(), || format!("cost ({}, {})", i + 1, j + 1))
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        let supply = parse_cells(supply, "supply")?;
        let demand = parse_cells(demand, "demand")?;

        let total_supply: f64 = supply.iter().flatten().sum();
        let total_demand: f64 = demand.iter().flatten().sum();
        check_balance(total_supply, total_demand)?;

        let filled = |cells: Vec<Option<f64>>| cells.into_iter().collect::<Option<Vec<_>>>();
        let (Some(costs), Some(supply), Some(demand)) = (
            costs.into_iter().map(filled).collect::<Option<Vec<_>>>(),
            filled(supply),
            filled(demand),
        ) else {
            return Err(CompileError::Input("All fields must be filled".to_string()));
        };

        Ok(TransportationProblem::new(costs, supply, demand)?)
    }
}

fn parse_cells<S: AsRef<str>>(cells: &[S], label: &str) -> Result<Vec<Option<f64>>, CompileError> {
    cells
        .iter()
        .enumerate()
        .map(|(i, cell)| parse_cell(cell.as_ref(), || format!("{label} {}", i + 1)))
        .collect()
}

/// Blank cells become `None`; anything else must be a number
fn parse_cell(text: &str, name: impl FnOnce() -> String) -> Result<Option<f64>, CompileError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
        .ok_or_else(|| CompileError::Input(format!("{} is not a number: '{text}'", name())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use simplexity_solver::{Direction, GraphicalSolver, Solver, Vertex};

    #[test]
    fn test_compile_lp() {
        let compiled = Compiler::new()
            .compile_lp("Maximize Z = 3x + 2y", &["2x + y <= 10", "x + 2y <= 8"])
            .unwrap();

        let problem = &compiled.lp_problem;
        assert_eq!(problem.variables, vec!["x", "y"]);
        assert_eq!(problem.objective.coefficients, vec![3.0, 2.0]);
        assert_eq!(problem.objective.direction, Direction::Maximize);
        assert_eq!(problem.constraints[0].coefficients, vec![2.0, 1.0]);
        assert_eq!(problem.constraints[1].slack, "s2");
        assert_eq!(problem.constraints[1].rhs, 8.0);
    }

    #[test]
    fn test_scenario_simplex_and_graphical() {
        let compiled = Compiler::new()
            .compile_lp("Maximize Z = 3x + 2y", &["2x + y <= 10", "x + 2y <= 8"])
            .unwrap();

        let simplex = Solver::new().solve(&compiled.lp_problem).unwrap();
        assert!((simplex.value("x").unwrap() - 4.0).abs() < 1e-9);
        assert!((simplex.value("y").unwrap() - 2.0).abs() < 1e-9);
        assert!((simplex.objective_value - 16.0).abs() < 1e-9);

        let graphical = GraphicalSolver::new().solve(&compiled.lp_problem).unwrap();
        assert_eq!(graphical.optimal.vertex, Vertex::new(4.0, 2.0));
        assert!((graphical.optimal.value - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_scenario_unbounded() {
        let compiled = Compiler::new().compile_lp("Maximize Z = x", &["y <= 5"]).unwrap();
        assert!(matches!(
            Solver::new().solve(&compiled.lp_problem),
            Err(SolveError::Unbounded { .. })
        ));
    }

    #[test]
    fn test_constants_are_folded() {
        let compiled = Compiler::new()
            .compile_lp("Maximize Z = x + 1", &["x + 2 <= 10"])
            .unwrap();
        assert_eq!(compiled.lp_problem.constraints[0].rhs, 8.0);
        assert_eq!(compiled.lp_problem.objective.offset, 1.0);

        let solution = Solver::new().solve(&compiled.lp_problem).unwrap();
        assert_eq!(solution.objective_value, 9.0);
    }

    #[test]
    fn test_blank_inputs() {
        let compiler = Compiler::new();
        assert!(matches!(
            compiler.compile_lp("  ", &["x <= 1"]),
            Err(CompileError::Input(_))
        ));
        assert!(matches!(
            compiler.compile_lp("Maximize Z = x", &["x <= 1", ""]),
            Err(CompileError::Input(_))
        ));
    }

    #[test]
    fn test_parse_errors_propagate() {
        let err = Compiler::new().compile_lp("Maximize x", &["x <= 1"]).unwrap_err();
        assert_eq!(err, CompileError::Parse(ParseError::MissingEquals));
    }

    #[test]
    fn test_ignored_terms_reported() {
        let compiled = Compiler::new()
            .compile_lp("Maximize Z = 3x + 2w", &["x + q <= 4"])
            .unwrap();
        assert_eq!(compiled.ignored_terms(), vec!["2w", "q"]);
    }

    #[test]
    fn test_indexed_vocabulary() {
        let compiler = Compiler::with_parser(Parser::new(Vocabulary::indexed(2)));
        let compiled = compiler
            .compile_lp("Maximize Z = 3x1 + 2x2", &["2x1 + x2 <= 10", "x1 + 2x2 <= 8"])
            .unwrap();
        let solution = Solver::new().solve(&compiled.lp_problem).unwrap();
        assert!((solution.value("x1").unwrap() - 4.0).abs() < 1e-9);
        assert!((solution.objective_value - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_compile_transportation() {
        let problem = Compiler::new()
            .compile_transportation(
                &[vec!["4", "6"], vec!["8", "3"]],
                &["20", "30"],
                &["10", "40"],
            )
            .unwrap();
        let allocation = problem.north_west_corner().unwrap();
        assert_eq!(allocation.allocation, vec![vec![10.0, 10.0], vec![0.0, 30.0]]);
        assert_eq!(allocation.total_cost, 190.0);
    }

    #[test]
    fn test_transportation_balance_checked_before_blanks() {
        let err = Compiler::new()
            .compile_transportation(&[vec!["1", ""], vec!["1", "1"]], &["10", "10"], &["5", "5"])
            .unwrap_err();
        assert_eq!(
            err,
            CompileError::Solve(SolveError::Balance {
                supply: 20.0,
                demand: 10.0
            })
        );
        assert_eq!(err.to_string(), "Supply (20) and demand (10) must be equal");
    }

    #[test]
    fn test_transportation_blank_cell() {
        let err = Compiler::new()
            .compile_transportation(&[vec!["1", ""], vec!["1", "1"]], &["10", "10"], &["15", "5"])
            .unwrap_err();
        assert_eq!(err, CompileError::Input("All fields must be filled".to_string()));
    }

    #[test]
    fn test_transportation_non_numeric_cell() {
        let err = Compiler::new()
            .compile_transportation(&[vec!["1", "x"]], &["10"], &["5", "5"])
            .unwrap_err();
        assert_eq!(
            err,
            CompileError::Input("cost (1, 2) is not a number: 'x'".to_string())
        );
    }
}
