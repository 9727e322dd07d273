// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The direction of preference for one criterion.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Impact {
    /// Higher raw values are preferred (`+`).
    Benefit,
    /// Lower raw values are preferred (`-`).
    Cost,
}

impl Impact {
    /// Parses the symbol used in impact specifications. Only `+` and `-` are accepted.
    pub fn from_symbol(s: &str) -> Option<Impact> {
        match s {
            "+" => Some(Impact::Benefit),
            "-" => Some(Impact::Cost),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Impact::Benefit => "+",
            Impact::Cost => "-",
        }
    }
}

impl Display for Impact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A loosely-typed cell, as provided by a tabular source.
///
/// Spreadsheets already distinguish numbers from text, comma-separated files do not.
/// Both are accepted and coerced during validation.
#[derive(PartialEq, Debug, Clone)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    /// The numeric value of this cell, if it has one.
    ///
    /// Text is trimmed and parsed as a float. Empty cells and non-finite values are not numbers.
    pub fn as_number(&self) -> Option<f64> {
        let x = match self {
            Cell::Number(x) => *x,
            Cell::Text(s) => s.trim().parse::<f64>().ok()?,
            Cell::Empty => return None,
        };
        if x.is_finite() {
            Some(x)
        } else {
            None
        }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Number(x) => write!(f, "{}", x),
            Cell::Empty => Ok(()),
        }
    }
}

/// Raw tabular data: a header row and data rows.
///
/// The first column holds the label of each alternative, the other columns are
/// candidate criteria.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// One row of the decision matrix.
#[derive(PartialEq, Debug, Clone)]
pub struct Alternative {
    pub label: String,
    pub values: Vec<f64>,
}

/// Alternatives with their (fully numeric) criteria values.
///
/// Invariant after validation: every alternative has exactly one value per criterion.
#[derive(PartialEq, Debug, Clone)]
pub struct DecisionMatrix {
    pub criteria: Vec<String>,
    pub alternatives: Vec<Alternative>,
}

impl DecisionMatrix {
    pub fn num_criteria(&self) -> usize {
        self.criteria.len()
    }

    pub fn num_alternatives(&self) -> usize {
        self.alternatives.len()
    }
}

/// A validated problem, ready to be evaluated.
#[derive(PartialEq, Debug, Clone)]
pub struct Problem {
    pub matrix: DecisionMatrix,
    pub weights: Vec<f64>,
    pub impacts: Vec<Impact>,
}

// ********* Options **********

/// What to do with empty tokens in the weights and impacts specifications,
/// for example the trailing one in `"1,1,"`.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum EmptyTokens {
    Drop,
    Reject,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct ParseOptions {
    pub empty_tokens: EmptyTokens,
}

impl ParseOptions {
    pub const DEFAULT: ParseOptions = ParseOptions {
        empty_tokens: EmptyTokens::Drop,
    };
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions::DEFAULT
    }
}

/// The policy when an alternative coincides with both the ideal best and the
/// ideal worst solution (`S+ + S- == 0`). This only happens when every criterion
/// is constant across all the alternatives.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum DegenerateRow {
    /// The closeness score of such a row is 0.
    Zero,
    /// The evaluation fails with [TopsisError::DegenerateRow].
    Fail,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct EngineOptions {
    pub degenerate_row: DegenerateRow,
    /// Number of decimal digits kept in the published scores.
    pub score_precision: u32,
}

impl EngineOptions {
    pub const DEFAULT: EngineOptions = EngineOptions {
        degenerate_row: DegenerateRow::Zero,
        score_precision: 6,
    };
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions::DEFAULT
    }
}

// ******** Output data structures *********

/// One evaluated alternative.
#[derive(PartialEq, Debug, Clone)]
pub struct ResultRow {
    pub label: String,
    pub values: Vec<f64>,
    /// Relative closeness, rounded to the configured precision.
    pub score: f64,
    /// 1 is the best alternative. Ranks are distinct.
    pub rank: u32,
}

#[derive(PartialEq, Debug, Clone)]
pub struct Evaluation {
    /// The results in the original row order.
    pub rows: Vec<ResultRow>,
    /// The weights after normalization. They sum to 1.
    pub normalized_weights: Vec<f64>,
    pub ideal_best: Vec<f64>,
    pub ideal_worst: Vec<f64>,
    /// Distances to the ideal best solution, per row.
    pub separation_best: Vec<f64>,
    /// Distances to the ideal worst solution, per row.
    pub separation_worst: Vec<f64>,
    /// Unrounded closeness scores, per row.
    pub closeness: Vec<f64>,
}

impl Evaluation {
    /// The results, best alternative first.
    pub fn ranked(&self) -> Vec<&ResultRow> {
        let mut res: Vec<&ResultRow> = self.rows.iter().collect();
        res.sort_by_key(|r| r.rank);
        res
    }
}

/// Errors that prevent a problem from being validated or evaluated.
///
/// The messages only carry the category and the relevant identifiers. Rendering
/// them for end users is the job of the calling layer.
#[derive(PartialEq, Debug, Clone)]
pub enum TopsisError {
    /// The table does not have the expected shape.
    Schema { message: String },
    /// Some criteria columns are not fully numeric.
    DataType { columns: Vec<String> },
    /// The weights or impacts specification is malformed.
    Format {
        field: &'static str,
        message: String,
        token: Option<String>,
    },
    /// The number of weights or impacts does not match the number of criteria.
    Cardinality {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    /// A criterion column has a zero norm and cannot be normalized.
    DegenerateColumn { column: String },
    /// An alternative is at distance zero from both ideal solutions.
    DegenerateRow { label: String },
    /// The engine was called with inputs that did not go through validation.
    Precondition { message: String },
}

impl Error for TopsisError {}

impl Display for TopsisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TopsisError::Schema { message } => write!(f, "SchemaError: {}", message),
            TopsisError::DataType { columns } => {
                write!(
                    f,
                    "DataTypeError: non-numeric values in criteria columns {:?}",
                    columns
                )
            }
            TopsisError::Format {
                field,
                message,
                token: Some(token),
            } => write!(f, "FormatError: {}: {} (token {:?})", field, message, token),
            TopsisError::Format { field, message, .. } => {
                write!(f, "FormatError: {}: {}", field, message)
            }
            TopsisError::Cardinality {
                field,
                expected,
                actual,
            } => write!(
                f,
                "CardinalityError: {} count ({}) does not match the number of criteria columns ({})",
                field, actual, expected
            ),
            TopsisError::DegenerateColumn { column } => {
                write!(f, "DegenerateColumnError: column {:?} has only zeros", column)
            }
            TopsisError::DegenerateRow { label } => write!(
                f,
                "DegenerateRowError: alternative {:?} coincides with both ideal solutions",
                label
            ),
            TopsisError::Precondition { message } => write!(f, "PreconditionError: {}", message),
        }
    }
}
