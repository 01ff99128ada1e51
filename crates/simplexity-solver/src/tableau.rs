use crate::problem::{Direction, LpProblem};

/// Column label for the right-hand side
pub const RHS: &str = "RHS";

/// A simplex tableau.
///
/// Columns are the decision variables, one slack per constraint, then `RHS`.
/// The last entry of every row (and of the objective row) is its right-hand
/// side. Pivoting never mutates a tableau in place; it returns the next one.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Tableau {
    /// Column labels
    pub variables: Vec<String>,
    /// Constraint rows
    pub rows: Vec<TableauRow>,
    /// Objective row, same width as every constraint row
    pub objective_row: Vec<f64>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct TableauRow {
    /// Label of the basic variable for this row
    pub basic: String,
    pub coefficients: Vec<f64>,
}

impl TableauRow {
    pub fn rhs(&self) -> f64 {
        self.coefficients.last().copied().unwrap_or(0.0)
    }
}

impl Tableau {
    /// Build the starting tableau with every slack variable basic.
    ///
    /// The objective row stores `-c` when maximizing. A minimization is
    /// solved as the maximization of `-Z`, so its row stores `c`.
    pub fn initial(problem: &LpProblem) -> Self {
        let n_vars = problem.num_variables();
        let n_constraints = problem.num_constraints();
        let width = n_vars + n_constraints + 1;

        let mut variables = problem.variables.clone();
        variables.extend(problem.constraints.iter().map(|c| c.slack.clone()));
        variables.push(RHS.to_string());

        let rows = problem
            .constraints
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let mut coefficients = vec![0.0; width];
                for (j, &coef) in c.coefficients.iter().take(n_vars).enumerate() {
                    coefficients[j] = coef;
                }
                coefficients[n_vars + i] = 1.0;
                coefficients[width - 1] = c.rhs;
                TableauRow {
                    basic: c.slack.clone(),
                    coefficients,
                }
            })
            .collect();

        let sign = match problem.objective.direction {
            Direction::Maximize => -1.0,
            Direction::Minimize => 1.0,
        };
        let mut objective_row = vec![0.0; width];
        for (j, &coef) in problem.objective.coefficients.iter().take(n_vars).enumerate() {
            objective_row[j] = sign * coef;
        }

        Self {
            variables,
            rows,
            objective_row,
        }
    }

    pub fn width(&self) -> usize {
        self.variables.len()
    }

    /// Right-hand side of the objective row
    pub fn objective_rhs(&self) -> f64 {
        self.objective_row.last().copied().unwrap_or(0.0)
    }

    /// Entering column by Dantzig's rule: the most negative objective-row
    /// entry, lowest index on ties. `None` means the tableau is optimal.
    pub fn entering_column(&self) -> Option<usize> {
        let n_cols = self.width().saturating_sub(1);

        let mut min_val = 0.0;
        let mut min_col = None;

        for (j, &val) in self.objective_row.iter().take(n_cols).enumerate() {
            if val < min_val {
                min_val = val;
                min_col = Some(j);
            }
        }

        min_col
    }

    /// Leaving row by the minimum ratio test over strictly positive entries
    /// of `col`, lowest row on ties. `None` means the problem is unbounded.
    pub fn leaving_row(&self, col: usize) -> Option<usize> {
        let mut min_ratio = f64::INFINITY;
        let mut min_row = None;

        for (i, row) in self.rows.iter().enumerate() {
            let val = row.coefficients[col];
            if val > 0.0 {
                let ratio = row.rhs() / val;
                if ratio < min_ratio {
                    min_ratio = ratio;
                    min_row = Some(i);
                }
            }
        }

        min_row
    }

    pub fn is_optimal(&self) -> bool {
        self.entering_column().is_none()
    }

    /// Pivot on `(row, col)` and return the resulting tableau
    pub fn pivot(&self, row: usize, col: usize) -> Tableau {
        let mut next = self.clone();

        next.rows[row].basic = self.variables[col].clone();

        // Scale pivot row
        let pivot_val = next.rows[row].coefficients[col];
        for v in next.rows[row].coefficients.iter_mut() {
            *v /= pivot_val;
        }
        let pivot_row = next.rows[row].coefficients.clone();

        // Eliminate column in other rows
        for (i, r) in next.rows.iter_mut().enumerate() {
            if i != row {
                eliminate(&mut r.coefficients, &pivot_row, col);
            }
        }
        eliminate(&mut next.objective_row, &pivot_row, col);

        next
    }

    /// RHS of the row whose basic variable is `name`
    pub fn basic_value(&self, name: &str) -> Option<f64> {
        self.rows.iter().find(|r| r.basic == name).map(TableauRow::rhs)
    }
}

fn eliminate(target: &mut [f64], pivot_row: &[f64], col: usize) {
    let factor = target[col];
    for (t, p) in target.iter_mut().zip(pivot_row) {
        *t -= factor * p;
    }
}
