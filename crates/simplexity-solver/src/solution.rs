use std::collections::BTreeMap;

use crate::problem::Direction;
use crate::tableau::Tableau;

/// The result of solving an LP problem with the simplex method
#[derive(Debug, Clone)]
pub struct SimplexSolution {
    /// Decision variable names
    pub variables: Vec<String>,
    /// Optimal value for each decision variable
    pub values: Vec<f64>,
    /// Optimal objective value
    pub objective_value: f64,
    /// Value of every slack variable, by name
    pub slack: BTreeMap<String, f64>,
    /// Every tableau visited, starting with the initial one
    pub steps: Vec<Tableau>,
}

impl SimplexSolution {
    pub fn value(&self, variable: &str) -> Option<f64> {
        self.variables
            .iter()
            .position(|v| v == variable)
            .map(|i| self.values[i])
    }

    /// The final (optimal) tableau
    pub fn final_tableau(&self) -> Option<&Tableau> {
        self.steps.last()
    }

    /// Number of pivots performed
    pub fn iterations(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    /// Flat `{x, y, z, slack}` view of the solution
    pub fn report(&self) -> SimplexReport {
        SimplexReport {
            values: self
                .variables
                .iter()
                .cloned()
                .zip(self.values.iter().copied())
                .collect(),
            z: self.objective_value,
            slack: self.slack.clone(),
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SimplexReport {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub values: BTreeMap<String, f64>,
    pub z: f64,
    pub slack: BTreeMap<String, f64>,
}

/// A corner point of the feasible region
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
}

impl Vertex {
    pub const ORIGIN: Vertex = Vertex { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn coords(&self) -> [f64; 2] {
        [self.x, self.y]
    }

    /// Both coordinates within `tolerance` of `other`
    pub fn approx_eq(&self, other: &Vertex, tolerance: f64) -> bool {
        (self.x - other.x).abs() < tolerance && (self.y - other.y).abs() < tolerance
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimalVertex {
    pub vertex: Vertex,
    pub value: f64,
}

/// The result of solving an LP problem with the graphical method
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicalSolution {
    /// Feasible vertices, in discovery order
    pub vertices: Vec<Vertex>,
    pub optimal: OptimalVertex,
    /// Objective coefficients `[a, b]` of `Z = ax + by`
    pub objective: [f64; 2],
    pub direction: Direction,
}

impl GraphicalSolution {
    /// Slope `dy/dx` of the objective's iso-lines, `None` when they are vertical
    pub fn objective_slope(&self) -> Option<f64> {
        let [a, b] = self.objective;
        if b == 0.0 { None } else { Some(-a / b) }
    }
}

/// Initial feasible shipment plan for a transportation problem
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    /// Quantity shipped from each source (row) to each destination (column)
    pub allocation: Vec<Vec<f64>>,
    pub total_cost: f64,
}

impl Allocation {
    pub fn row_sums(&self) -> Vec<f64> {
        self.allocation.iter().map(|row| row.iter().sum()).collect()
    }

    pub fn column_sums(&self) -> Vec<f64> {
        let n = self.allocation.first().map_or(0, Vec::len);
        (0..n)
            .map(|j| self.allocation.iter().map(|row| row[j]).sum())
            .collect()
    }

    /// Cells with a positive quantity, as `(source, destination, quantity)`
    pub fn shipments(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.allocation.iter().enumerate().flat_map(|(i, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, q)| **q > 0.0)
                .map(move |(j, q)| (i, j, *q))
        })
    }
}
