use std::collections::BTreeMap;
use std::fmt;

pub use simplexity_solver::Direction;

/// Decision variable names a parser recognizes
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    names: Vec<String>,
}

impl Vocabulary {
    /// `x` and `y`
    pub fn xy() -> Self {
        Self {
            names: vec!["x".to_string(), "y".to_string()],
        }
    }

    /// `x1` through `xn`
    pub fn indexed(n: usize) -> Self {
        Self {
            names: (1..=n).map(|i| format!("x{i}")).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::xy()
    }
}

/// A parsed linear expression: coefficients by variable plus an optional constant
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinearExpression {
    pub coefficients: BTreeMap<String, f64>,
    pub constant: Option<f64>,
    /// Source fragments that contributed nothing (lenient parsing only)
    pub ignored: Vec<String>,
}

impl LinearExpression {
    /// Coefficient of `variable`, zero when absent
    pub fn coefficient(&self, variable: &str) -> f64 {
        self.coefficients.get(variable).copied().unwrap_or(0.0)
    }

    /// Coefficients in vocabulary order
    pub fn to_vector(&self, vocabulary: &Vocabulary) -> Vec<f64> {
        vocabulary.names().iter().map(|v| self.coefficient(v)).collect()
    }
}

impl fmt::Display for LinearExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, coef) in &self.coefficients {
            if !first {
                write!(f, " + ")?;
            }
            first = false;
            if *coef == 1.0 {
                write!(f, "{name}")?;
            } else {
                write!(f, "{coef}{name}")?;
            }
        }
        if let Some(constant) = self.constant {
            if !first {
                write!(f, " + ")?;
            }
            first = false;
            write!(f, "{constant}")?;
        }
        if first {
            write!(f, "0")?;
        }
        Ok(())
    }
}

/// `Maximize Z = ...` or `Minimize Z = ...`
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveFunction {
    pub direction: Direction,
    pub expression: LinearExpression,
}

impl fmt::Display for ObjectiveFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = match self.direction {
            Direction::Maximize => "Maximize",
            Direction::Minimize => "Minimize",
        };
        write!(f, "{keyword} Z = {}", self.expression)
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// `<=`, the only relation the engines accept
    Le,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::Le => write!(f, "<="),
        }
    }
}

/// `lhs <= rhs`, turned into `lhs + slack = rhs` by the solvers
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintExpr {
    pub lhs: LinearExpression,
    pub relation: Relation,
    pub rhs: f64,
    /// Slack variable name (`s1`, `s2`, ... by position)
    pub slack: String,
    pub slack_coefficient: f64,
}

impl fmt::Display for ConstraintExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.relation, self.rhs)
    }
}
