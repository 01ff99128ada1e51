use std::collections::BTreeMap;

use log::{debug, info};

use crate::error::SolveError;
use crate::problem::{Direction, LpProblem};
use crate::solution::SimplexSolution;
use crate::tableau::Tableau;

/// Simplex solver for linear programs with `<=` constraints
pub struct Solver {
    /// Maximum pivots before giving up
    max_iterations: usize,
}

impl Default for Solver {
    fn default() -> Self {
        Self { max_iterations: 10 }
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Solve the LP problem with the tableau simplex method.
    ///
    /// Every `<=` constraint gets its own slack variable, so the all-slack
    /// basis is the starting point and no phase 1 is needed. There is no
    /// anti-cycling rule; a degenerate cycle ends in
    /// [`SolveError::NonConvergence`].
    pub fn solve(&self, problem: &LpProblem) -> Result<SimplexSolution, SolveError> {
        validate(problem)?;

        let mut tableau = Tableau::initial(problem);
        let mut steps = Vec::new();
        let mut pivots = 0;

        loop {
            let Some(pivot_col) = tableau.entering_column() else {
                info!("Simplex reached optimality after {pivots} pivots");
                steps.push(tableau);
                return Ok(self.extract_solution(problem, steps));
            };

            if pivots == self.max_iterations {
                info!("Simplex stopped at the {pivots}-pivot limit");
                return Err(SolveError::NonConvergence { iterations: pivots });
            }

            let Some(pivot_row) = tableau.leaving_row(pivot_col) else {
                let variable = tableau.variables[pivot_col].clone();
                info!("Simplex found no leaving row for {variable}: unbounded");
                return Err(SolveError::Unbounded { variable });
            };

            debug!(
                "Pivot {}: {} enters, {} leaves",
                pivots + 1,
                tableau.variables[pivot_col],
                tableau.rows[pivot_row].basic
            );

            let next = tableau.pivot(pivot_row, pivot_col);
            steps.push(std::mem::replace(&mut tableau, next));
            pivots += 1;
        }
    }

    fn extract_solution(&self, problem: &LpProblem, steps: Vec<Tableau>) -> SimplexSolution {
        let (values, objective_value, slack) = match steps.last() {
            Some(tableau) => {
                // Variables without a row of their own are non-basic
                let values = problem
                    .variables
                    .iter()
                    .map(|v| tableau.basic_value(v).unwrap_or(0.0))
                    .collect();

                let slack: BTreeMap<String, f64> = problem
                    .constraints
                    .iter()
                    .map(|c| (c.slack.clone(), tableau.basic_value(&c.slack).unwrap_or(0.0)))
                    .collect();

                let z = match problem.objective.direction {
                    Direction::Maximize => tableau.objective_rhs(),
                    Direction::Minimize => -tableau.objective_rhs(),
                };
                (values, z + problem.objective.offset, slack)
            }
            None => (vec![0.0; problem.num_variables()], problem.objective.offset, BTreeMap::new()),
        };

        SimplexSolution {
            variables: problem.variables.clone(),
            values,
            objective_value,
            slack,
            steps,
        }
    }
}

fn validate(problem: &LpProblem) -> Result<(), SolveError> {
    let n_vars = problem.num_variables();
    if n_vars == 0 {
        return Err(SolveError::Input("problem has no decision variables".to_string()));
    }
    if problem.objective.coefficients.len() != n_vars {
        return Err(SolveError::Input(format!(
            "objective has {} coefficients for {} variables",
            problem.objective.coefficients.len(),
            n_vars
        )));
    }
    for c in &problem.constraints {
        if c.coefficients.len() != n_vars {
            return Err(SolveError::Input(format!(
                "constraint {} has {} coefficients for {} variables",
                c.slack,
                c.coefficients.len(),
                n_vars
            )));
        }
        if !c.rhs.is_finite() || c.coefficients.iter().any(|v| !v.is_finite()) {
            return Err(SolveError::Input(format!(
                "constraint {} has a non-finite value",
                c.slack
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> LpProblem {
        // Maximize: 3x + 2y
        // Subject to:
        //   2x + y <= 10
        //   x + 2y <= 8
        // Optimal: x=4, y=2, obj=16
        let mut problem = LpProblem::xy();
        problem.set_objective(vec![3.0, 2.0], Direction::Maximize);
        problem.add_constraint(vec![2.0, 1.0], 10.0);
        problem.add_constraint(vec![1.0, 2.0], 8.0);
        problem
    }

    #[test]
    fn test_simple_maximization() {
        let solution = Solver::new().solve(&scenario()).unwrap();

        assert!((solution.values[0] - 4.0).abs() < 1e-9, "x = {} (expected 4)", solution.values[0]);
        assert!((solution.values[1] - 2.0).abs() < 1e-9, "y = {} (expected 2)", solution.values[1]);
        assert!(
            (solution.objective_value - 16.0).abs() < 1e-9,
            "obj = {} (expected 16)",
            solution.objective_value
        );
        assert_eq!(solution.iterations(), 2);
        assert_eq!(solution.slack.get("s1"), Some(&0.0));
        assert_eq!(solution.slack.get("s2"), Some(&0.0));
    }

    #[test]
    fn test_optimal_objective_row_nonnegative() {
        let solution = Solver::new().solve(&scenario()).unwrap();
        let last = solution.final_tableau().unwrap();
        let n = last.objective_row.len();
        assert!(last.objective_row[..n - 1].iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn test_steps_start_with_initial_tableau() {
        let problem = scenario();
        let solution = Solver::new().solve(&problem).unwrap();
        assert_eq!(solution.steps[0], Tableau::initial(&problem));
        assert_eq!(solution.steps[1].rows[0].basic, "x");
        assert_eq!(solution.steps[2].rows[1].basic, "y");
    }

    #[test]
    fn test_slack_reported_for_loose_constraint() {
        // Maximize x subject to x <= 3, x + y <= 10
        let mut problem = LpProblem::xy();
        problem.set_objective(vec![1.0, 0.0], Direction::Maximize);
        problem.add_constraint(vec![1.0, 0.0], 3.0);
        problem.add_constraint(vec![1.0, 1.0], 10.0);

        let solution = Solver::new().solve(&problem).unwrap();
        assert_eq!(solution.value("x"), Some(3.0));
        assert_eq!(solution.value("y"), Some(0.0));
        assert_eq!(solution.slack["s1"], 0.0);
        assert_eq!(solution.slack["s2"], 7.0);
        assert_eq!(solution.objective_value, 3.0);
    }

    #[test]
    fn test_unbounded() {
        // Maximize x subject to y <= 5: x can grow forever
        let mut problem = LpProblem::xy();
        problem.set_objective(vec![1.0, 0.0], Direction::Maximize);
        problem.add_constraint(vec![0.0, 1.0], 5.0);

        let err = Solver::new().solve(&problem).unwrap_err();
        assert_eq!(err, SolveError::Unbounded { variable: "x".to_string() });
    }

    #[test]
    fn test_iteration_cap() {
        let err = Solver::new()
            .with_max_iterations(1)
            .solve(&scenario())
            .unwrap_err();
        assert_eq!(err, SolveError::NonConvergence { iterations: 1 });
    }

    /// Klee-Minty cube in four variables: Dantzig's rule visits all
    /// 2^4 vertices, taking 15 pivots to reach Z = 10^6
    fn klee_minty() -> LpProblem {
        let mut problem = LpProblem::new((1..=4).map(|i| format!("x{i}")).collect());
        problem.set_objective(vec![1000.0, 100.0, 10.0, 1.0], Direction::Maximize);
        problem.add_constraint(vec![1.0, 0.0, 0.0, 0.0], 1.0);
        problem.add_constraint(vec![20.0, 1.0, 0.0, 0.0], 100.0);
        problem.add_constraint(vec![200.0, 20.0, 1.0, 0.0], 10_000.0);
        problem.add_constraint(vec![2000.0, 200.0, 20.0, 1.0], 1_000_000.0);
        problem
    }

    #[test]
    fn test_default_cap_is_ten_pivots() {
        let err = Solver::new().solve(&klee_minty()).unwrap_err();
        assert_eq!(err, SolveError::NonConvergence { iterations: 10 });

        let solution = Solver::new()
            .with_max_iterations(15)
            .solve(&klee_minty())
            .unwrap();
        assert_eq!(solution.iterations(), 15);
        assert!((solution.objective_value - 1_000_000.0).abs() < 1e-6);
        assert!((solution.value("x4").unwrap() - 1_000_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_minimization() {
        // Minimize: x - 2y  (i.e. push y up, keep x at 0)
        // Subject to:
        //   x + y <= 4
        let mut problem = LpProblem::xy();
        problem.set_objective(vec![1.0, -2.0], Direction::Minimize);
        problem.add_constraint(vec![1.0, 1.0], 4.0);

        let solution = Solver::new().solve(&problem).unwrap();
        assert_eq!(solution.value("x"), Some(0.0));
        assert_eq!(solution.value("y"), Some(4.0));
        assert_eq!(solution.objective_value, -8.0);
    }

    #[test]
    fn test_minimization_of_positive_costs_stays_at_origin() {
        let mut problem = scenario();
        problem.objective.direction = Direction::Minimize;

        let solution = Solver::new().solve(&problem).unwrap();
        assert_eq!(solution.iterations(), 0);
        assert_eq!(solution.values, vec![0.0, 0.0]);
        assert_eq!(solution.objective_value, 0.0);
        assert_eq!(solution.slack["s1"], 10.0);
    }

    #[test]
    fn test_objective_offset() {
        let mut problem = scenario();
        problem.set_objective_offset(5.0);
        let solution = Solver::new().solve(&problem).unwrap();
        assert!((solution.objective_value - 21.0).abs() < 1e-9);
    }

    #[test]
    fn test_report_shape() {
        let report = Solver::new().solve(&scenario()).unwrap().report();
        assert!((report.values["x"] - 4.0).abs() < 1e-9);
        assert!((report.values["y"] - 2.0).abs() < 1e-9);
        assert!((report.z - 16.0).abs() < 1e-9);
        assert_eq!(report.slack.len(), 2);
    }

    #[test]
    fn test_rejects_mismatched_widths() {
        let mut problem = scenario();
        problem.constraints[0].coefficients.push(1.0);
        assert!(matches!(Solver::new().solve(&problem), Err(SolveError::Input(_))));
    }

    #[test]
    fn test_no_constraints_with_positive_objective_is_unbounded() {
        let mut problem = LpProblem::xy();
        problem.set_objective(vec![1.0, 1.0], Direction::Maximize);
        assert!(matches!(
            Solver::new().solve(&problem),
            Err(SolveError::Unbounded { .. })
        ));
    }
}
