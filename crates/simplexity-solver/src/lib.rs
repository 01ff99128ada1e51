mod error;
mod graphical;
mod problem;
mod simplex;
mod solution;
mod tableau;
mod transportation;

pub use error::SolveError;
pub use graphical::GraphicalSolver;
pub use problem::{Constraint, Direction, LpProblem, Objective};
pub use simplex::Solver;
pub use solution::{
    Allocation, GraphicalSolution, OptimalVertex, SimplexReport, SimplexSolution, Vertex,
};
pub use tableau::{RHS, Tableau, TableauRow};
pub use transportation::{TransportationProblem, check_balance};
