/// Optimization direction of an objective
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Maximize,
    Minimize,
}

impl Direction {
    /// Whether `candidate` strictly improves on `incumbent` in this direction
    pub fn improves(self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Direction::Maximize => candidate > incumbent,
            Direction::Minimize => candidate < incumbent,
        }
    }
}

/// Represents a linear program with `<=` constraints over non-negative variables
#[derive(Debug, Clone)]
pub struct LpProblem {
    /// Decision variable names
    pub variables: Vec<String>,
    /// Objective function
    pub objective: Objective,
    /// Constraints
    pub constraints: Vec<Constraint>,
}

#[derive(Debug, Clone)]
pub struct Objective {
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Whether to maximize or minimize
    pub direction: Direction,
    /// Constant term added to every reported objective value
    pub offset: f64,
}

impl Objective {
    /// Evaluate the objective at a point (including the offset)
    pub fn evaluate(&self, point: &[f64]) -> f64 {
        dot(&self.coefficients, point) + self.offset
    }
}

#[derive(Debug, Clone)]
pub struct Constraint {
    /// Slack variable owned by this constraint (`s1`, `s2`, ...)
    pub slack: String,
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Right-hand side value
    pub rhs: f64,
}

impl Constraint {
    /// Left-hand side value at a point
    pub fn lhs(&self, point: &[f64]) -> f64 {
        dot(&self.coefficients, point)
    }

    pub fn is_satisfied(&self, point: &[f64], tolerance: f64) -> bool {
        self.lhs(point) <= self.rhs + tolerance
    }
}

impl LpProblem {
    pub fn new(variables: Vec<String>) -> Self {
        let n = variables.len();
        Self {
            variables,
            objective: Objective {
                coefficients: vec![0.0; n],
                direction: Direction::Maximize,
                offset: 0.0,
            },
            constraints: Vec::new(),
        }
    }

    /// Two-variable problem over `x` and `y`
    pub fn xy() -> Self {
        Self::new(vec!["x".to_string(), "y".to_string()])
    }

    pub fn set_objective(&mut self, coefficients: Vec<f64>, direction: Direction) {
        self.objective = Objective {
            coefficients,
            direction,
            offset: 0.0,
        };
    }

    pub fn set_objective_offset(&mut self, offset: f64) {
        self.objective.offset = offset;
    }

    /// Add `coefficients · vars <= rhs`. The slack variable is named by position.
    pub fn add_constraint(&mut self, coefficients: Vec<f64>, rhs: f64) {
        let slack = format!("s{}", self.constraints.len() + 1);
        self.constraints.push(Constraint {
            slack,
            coefficients,
            rhs,
        });
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Whether a point satisfies every constraint within `tolerance`
    pub fn is_feasible(&self, point: &[f64], tolerance: f64) -> bool {
        self.constraints.iter().all(|c| c.is_satisfied(point, tolerance))
    }
}

fn dot(coefficients: &[f64], point: &[f64]) -> f64 {
    coefficients.iter().zip(point).map(|(c, v)| c * v).sum()
}
