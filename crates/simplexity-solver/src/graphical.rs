use log::{debug, info};

use crate::error::SolveError;
use crate::problem::{Constraint, LpProblem};
use crate::solution::{GraphicalSolution, OptimalVertex, Vertex};

/// Solves two-variable LPs by enumerating the corner points of the
/// feasible region and evaluating the objective at each one
pub struct GraphicalSolver {
    /// Tolerance for parallel lines, feasibility, and duplicate points
    tolerance: f64,
}

impl Default for GraphicalSolver {
    fn default() -> Self {
        Self { tolerance: 1e-4 }
    }
}

impl GraphicalSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn solve(&self, problem: &LpProblem) -> Result<GraphicalSolution, SolveError> {
        let objective = validate(problem)?;

        let vertices = self.corner_points(problem);
        if vertices.is_empty() {
            info!("Graphical method found no feasible vertex");
            return Err(SolveError::Infeasible);
        }

        let direction = problem.objective.direction;
        let mut optimal = OptimalVertex {
            vertex: vertices[0],
            value: problem.objective.evaluate(&vertices[0].coords()),
        };
        for vertex in &vertices[1..] {
            let value = problem.objective.evaluate(&vertex.coords());
            if direction.improves(value, optimal.value) {
                optimal = OptimalVertex {
                    vertex: *vertex,
                    value,
                };
            }
        }
        info!(
            "Graphical optimum at ({}, {}) with value {}",
            optimal.vertex.x, optimal.vertex.y, optimal.value
        );

        Ok(GraphicalSolution {
            vertices,
            optimal,
            objective,
            direction,
        })
    }

    /// Feasible corner candidates in discovery order: pairwise boundary
    /// intersections, then the origin, then each constraint's intercepts.
    pub fn vertices(&self, problem: &LpProblem) -> Result<Vec<Vertex>, SolveError> {
        validate(problem)?;
        Ok(self.corner_points(problem))
    }

    /// Expects a problem that passed `validate`
    fn corner_points(&self, problem: &LpProblem) -> Vec<Vertex> {
        let constraints = &problem.constraints;
        let mut candidates = Vec::new();

        for i in 0..constraints.len() {
            for j in (i + 1)..constraints.len() {
                if let Some(point) = self.intersection(&constraints[i], &constraints[j]) {
                    if point.x >= 0.0 && point.y >= 0.0 && self.is_feasible(problem, &point) {
                        candidates.push(point);
                    }
                }
            }
        }

        if self.is_feasible(problem, &Vertex::ORIGIN) {
            candidates.push(Vertex::ORIGIN);
        }

        for c in constraints {
            let (a, b) = (c.coefficients[0], c.coefficients[1]);
            let x_intercept = Vertex::new(c.rhs / a, 0.0);
            let y_intercept = Vertex::new(0.0, c.rhs / b);
            // A zero coefficient gives an intercept at infinity
            if x_intercept.x.is_finite()
                && x_intercept.x >= 0.0
                && self.is_feasible(problem, &x_intercept)
            {
                candidates.push(x_intercept);
            }
            if y_intercept.y.is_finite()
                && y_intercept.y >= 0.0
                && self.is_feasible(problem, &y_intercept)
            {
                candidates.push(y_intercept);
            }
        }

        let mut unique: Vec<Vertex> = Vec::with_capacity(candidates.len());
        for point in candidates {
            if !unique.iter().any(|p| p.approx_eq(&point, self.tolerance)) {
                unique.push(point);
            }
        }
        debug!("Graphical method kept {} vertices", unique.len());
        unique
    }

    /// Intersection of the boundary lines of two constraints by Cramer's rule
    fn intersection(&self, first: &Constraint, second: &Constraint) -> Option<Vertex> {
        let (a1, b1, c1) = (first.coefficients[0], first.coefficients[1], first.rhs);
        let (a2, b2, c2) = (second.coefficients[0], second.coefficients[1], second.rhs);

        let det = a1 * b2 - a2 * b1;
        if det.abs() < self.tolerance {
            return None; // Parallel or coincident
        }

        Some(Vertex::new((c1 * b2 - c2 * b1) / det, (a1 * c2 - a2 * c1) / det))
    }

    fn is_feasible(&self, problem: &LpProblem, point: &Vertex) -> bool {
        problem.is_feasible(&point.coords(), self.tolerance)
    }
}

fn validate(problem: &LpProblem) -> Result<[f64; 2], SolveError> {
    if problem.num_variables() != 2 {
        return Err(SolveError::Input(format!(
            "graphical method needs exactly 2 variables, got {}",
            problem.num_variables()
        )));
    }
    let objective: [f64; 2] = problem
        .objective
        .coefficients
        .as_slice()
        .try_into()
        .map_err(|_| SolveError::Input("objective must have 2 coefficients".to_string()))?;
    for c in &problem.constraints {
        if c.coefficients.len() != 2 {
            return Err(SolveError::Input(format!(
                "constraint {} must have 2 coefficients",
                c.slack
            )));
        }
    }
    Ok(objective)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::Direction;
    use proptest::prelude::*;

    fn scenario() -> LpProblem {
        let mut problem = LpProblem::xy();
        problem.set_objective(vec![3.0, 2.0], Direction::Maximize);
        problem.add_constraint(vec![2.0, 1.0], 10.0);
        problem.add_constraint(vec![1.0, 2.0], 8.0);
        problem
    }

    #[test]
    fn test_scenario_vertices_and_optimum() {
        let solution = GraphicalSolver::new().solve(&scenario()).unwrap();

        assert_eq!(
            solution.vertices,
            vec![
                Vertex::new(4.0, 2.0),
                Vertex::ORIGIN,
                Vertex::new(5.0, 0.0),
                Vertex::new(0.0, 4.0),
            ]
        );
        assert_eq!(solution.optimal.vertex, Vertex::new(4.0, 2.0));
        assert!((solution.optimal.value - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_minimize_picks_origin() {
        let mut problem = scenario();
        problem.objective.direction = Direction::Minimize;
        let solution = GraphicalSolver::new().solve(&problem).unwrap();
        assert_eq!(solution.optimal.vertex, Vertex::ORIGIN);
        assert_eq!(solution.optimal.value, 0.0);
    }

    #[test]
    fn test_ties_keep_first_vertex() {
        // x + y is 4 at both (4, 0) and (0, 4)
        let mut problem = LpProblem::xy();
        problem.set_objective(vec![1.0, 1.0], Direction::Maximize);
        problem.add_constraint(vec![1.0, 1.0], 4.0);

        let solution = GraphicalSolver::new().solve(&problem).unwrap();
        assert_eq!(
            solution.vertices,
            vec![Vertex::ORIGIN, Vertex::new(4.0, 0.0), Vertex::new(0.0, 4.0)]
        );
        assert_eq!(solution.optimal.vertex, Vertex::new(4.0, 0.0));
    }

    #[test]
    fn test_parallel_lines_contribute_no_intersection() {
        let mut problem = LpProblem::xy();
        problem.set_objective(vec![1.0, 1.0], Direction::Maximize);
        problem.add_constraint(vec![1.0, 1.0], 4.0);
        problem.add_constraint(vec![2.0, 2.0], 10.0);

        let solver = GraphicalSolver::new();
        let vertices = solver.vertices(&problem).unwrap();
        assert_eq!(
            vertices,
            vec![Vertex::ORIGIN, Vertex::new(4.0, 0.0), Vertex::new(0.0, 4.0)]
        );
    }

    #[test]
    fn test_vertices_rejects_single_variable_problem() {
        let mut problem = LpProblem::new(vec!["x".into()]);
        problem.add_constraint(vec![1.0], 4.0);

        let err = GraphicalSolver::new().vertices(&problem).unwrap_err();
        assert!(matches!(err, SolveError::Input(_)));
    }

    #[test]
    fn test_zero_coefficient_skips_infinite_intercept() {
        // y <= 3 never crosses the y = 0 axis
        let mut problem = LpProblem::xy();
        problem.set_objective(vec![0.0, 1.0], Direction::Maximize);
        problem.add_constraint(vec![0.0, 1.0], 3.0);
        problem.add_constraint(vec![1.0, 0.0], 2.0);

        let solution = GraphicalSolver::new().solve(&problem).unwrap();
        assert!(solution.vertices.iter().all(|v| v.x.is_finite() && v.y.is_finite()));
        assert!(solution.vertices.contains(&Vertex::new(2.0, 3.0)));
        assert_eq!(solution.optimal.value, 3.0);
    }

    #[test]
    fn test_infeasible() {
        // x + y <= -1 excludes the whole non-negative quadrant
        let mut problem = LpProblem::xy();
        problem.set_objective(vec![1.0, 1.0], Direction::Maximize);
        problem.add_constraint(vec![1.0, 1.0], -1.0);

        assert_eq!(GraphicalSolver::new().solve(&problem), Err(SolveError::Infeasible));
    }

    #[test]
    fn test_requires_two_variables() {
        let problem = LpProblem::new(vec!["x1".into(), "x2".into(), "x3".into()]);
        assert!(matches!(GraphicalSolver::new().solve(&problem), Err(SolveError::Input(_))));
    }

    #[test]
    fn test_agrees_with_simplex() {
        let problem = scenario();
        let graphical = GraphicalSolver::new().solve(&problem).unwrap();
        let simplex = crate::Solver::new().solve(&problem).unwrap();
        assert!((graphical.optimal.value - simplex.objective_value).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn prop_vertices_are_feasible(
            rows in prop::collection::vec((0.1f64..10.0, 0.1f64..10.0, 1.0f64..50.0), 1..5)
        ) {
            let mut problem = LpProblem::xy();
            problem.set_objective(vec![1.0, 1.0], Direction::Maximize);
            for (a, b, c) in rows {
                problem.add_constraint(vec![a, b], c);
            }

            let solver = GraphicalSolver::new();
            let solution = solver.solve(&problem).unwrap();
            for v in &solution.vertices {
                prop_assert!(v.x >= 0.0 && v.y >= 0.0);
                prop_assert!(problem.is_feasible(&v.coords(), solver.tolerance()));
            }
        }
    }
}
