use log::{debug, info};

use crate::error::SolveError;
use crate::solution::Allocation;

/// A transportation problem: ship goods from sources to destinations
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct TransportationProblem {
    /// Unit shipping cost, one row per source and one column per destination
    costs: Vec<Vec<f64>>,
    supply: Vec<f64>,
    demand: Vec<f64>,
}

impl TransportationProblem {
    /// Build a problem, checking that the cost matrix is `supply.len() x demand.len()`
    /// and that every value is finite and non-negative.
    pub fn new(
        costs: Vec<Vec<f64>>,
        supply: Vec<f64>,
        demand: Vec<f64>,
    ) -> Result<Self, SolveError> {
        if supply.is_empty() || demand.is_empty() {
            return Err(SolveError::Input(
                "need at least one source and one destination".to_string(),
            ));
        }
        if costs.len() != supply.len() {
            return Err(SolveError::Input(format!(
                "cost matrix has {} rows for {} sources",
                costs.len(),
                supply.len()
            )));
        }
        for (i, row) in costs.iter().enumerate() {
            if row.len() != demand.len() {
                return Err(SolveError::Input(format!(
                    "cost row {} has {} cells for {} destinations",
                    i + 1,
                    row.len(),
                    demand.len()
                )));
            }
        }

        let cells = costs.iter().flatten().chain(&supply).chain(&demand);
        if let Some(bad) = cells.into_iter().find(|v| !v.is_finite() || **v < 0.0) {
            return Err(SolveError::Input(format!(
                "quantities and costs must be non-negative numbers, got {bad}"
            )));
        }

        Ok(Self { costs, supply, demand })
    }

    pub fn supply(&self) -> &[f64] {
        &self.supply
    }

    pub fn demand(&self) -> &[f64] {
        &self.demand
    }

    pub fn sources(&self) -> usize {
        self.supply.len()
    }

    pub fn destinations(&self) -> usize {
        self.demand.len()
    }

    pub fn total_supply(&self) -> f64 {
        self.supply.iter().sum()
    }

    pub fn total_demand(&self) -> f64 {
        self.demand.iter().sum()
    }

    /// Total supply equals total demand, up to floating point rounding
    pub fn is_balanced(&self) -> bool {
        is_balanced(self.total_supply(), self.total_demand())
    }

    /// Initial feasible allocation by the North-West Corner rule.
    ///
    /// Always fills the top-left remaining cell with as much as both its
    /// source and destination allow. The plan is feasible but not
    /// necessarily cheapest.
    pub fn north_west_corner(&self) -> Result<Allocation, SolveError> {
        check_balance(self.total_supply(), self.total_demand())?;

        let (m, n) = (self.sources(), self.destinations());
        let mut supply = self.supply.clone();
        let mut demand = self.demand.clone();
        let mut allocation = vec![vec![0.0; n]; m];
        let mut total_cost = 0.0;

        let (mut i, mut j) = (0, 0);
        while i < m && j < n {
            let quantity = supply[i].min(demand[j]);
            allocation[i][j] = quantity;
            total_cost += quantity * self.costs[i][j];
            supply[i] -= quantity;
            demand[j] -= quantity;
            debug!("Allocated {quantity} from source {} to destination {}", i + 1, j + 1);

            // Both cursors move when a cell exhausts its row and column together
            if supply[i] == 0.0 {
                i += 1;
            }
            if demand[j] == 0.0 {
                j += 1;
            }
        }

        info!("North-West Corner allocation costs {total_cost}");
        Ok(Allocation {
            allocation,
            total_cost,
        })
    }
}

/// Fail with [`SolveError::Balance`] unless the totals match
pub fn check_balance(total_supply: f64, total_demand: f64) -> Result<(), SolveError> {
    if is_balanced(total_supply, total_demand) {
        Ok(())
    } else {
        Err(SolveError::Balance {
            supply: total_supply,
            demand: total_demand,
        })
    }
}

/// Absorbs summation rounding only: a few ulps of the larger total, and
/// never as much as one unit below 1e15.
fn is_balanced(supply: f64, demand: f64) -> bool {
    let rounding = 4.0 * f64::EPSILON * supply.abs().max(demand.abs());
    (supply - demand).abs() <= rounding.max(1e-9)
}
