use log::debug;

pub use crate::config::*;

/// Validates raw tabular data together with the weights and impacts specifications.
///
/// Uses the default parsing options: empty tokens in the specifications are dropped.
///
/// ```
/// use topsis::{validate, Cell, Impact, RawTable};
///
/// let table = RawTable {
///     headers: vec!["Model".to_string(), "Price".to_string(), "Storage".to_string()],
///     rows: vec![
///         vec![Cell::Text("M1".to_string()), Cell::Text("250".to_string()), Cell::Number(16.0)],
///         vec![Cell::Text("M2".to_string()), Cell::Text("200".to_string()), Cell::Number(32.0)],
///     ],
/// };
/// let problem = validate(&table, "1,2", "-,+")?;
/// assert_eq!(problem.weights, vec![1.0, 2.0]);
/// assert_eq!(problem.impacts, vec![Impact::Cost, Impact::Benefit]);
/// # Ok::<(), topsis::TopsisError>(())
/// ```
pub fn validate(table: &RawTable, weights: &str, impacts: &str) -> Result<Problem, TopsisError> {
    validate_with(table, weights, impacts, &ParseOptions::DEFAULT)
}

/// Validates the inputs of an evaluation. All the checks happen before any numeric work:
/// either a complete problem is returned, or the first category of failure.
///
/// The checks are run in order: shape of the table, numeric criteria, weights syntax,
/// impacts syntax, and finally the counts of weights and impacts.
pub fn validate_with(
    table: &RawTable,
    weights: &str,
    impacts: &str,
    options: &ParseOptions,
) -> Result<Problem, TopsisError> {
    validate_inputs(
        table,
        ListInput::Joined(weights),
        ListInput::Joined(impacts),
        options,
    )
}

/// Weights or impacts, either as a comma-separated specification or already split into
/// entries (for example a list in a configuration file).
///
/// Entries go through the same checks as the tokens of a specification, except for the
/// separator: a single entry is a valid list.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ListInput<'a> {
    Joined(&'a str),
    Entries(&'a [String]),
}

impl<'a> ListInput<'a> {
    fn tokens(&self, field: &'static str) -> Result<Vec<&'a str>, TopsisError> {
        match *self {
            ListInput::Joined(spec) => split_tokens(spec, field),
            ListInput::Entries(entries) => Ok(entries.iter().map(|e| e.as_str()).collect()),
        }
    }
}

/// Same as [validate_with], for weights and impacts given in either form.
pub fn validate_inputs(
    table: &RawTable,
    weights: ListInput,
    impacts: ListInput,
    options: &ParseOptions,
) -> Result<Problem, TopsisError> {
    let matrix = coerce_table(table)?;
    let weights = weights_from_tokens(weights.tokens("weights")?, options)?;
    let impacts = impacts_from_tokens(impacts.tokens("impacts")?, options)?;
    build_problem(matrix, weights, impacts)
}

fn build_problem(
    matrix: DecisionMatrix,
    weights: Vec<f64>,
    impacts: Vec<Impact>,
) -> Result<Problem, TopsisError> {
    check_cardinality("weights", matrix.num_criteria(), weights.len())?;
    check_cardinality("impacts", matrix.num_criteria(), impacts.len())?;
    debug!(
        "validate: {} alternatives, criteria: {:?}, weights: {:?}, impacts: {:?}",
        matrix.num_alternatives(),
        matrix.criteria,
        weights,
        impacts
    );
    Ok(Problem {
        matrix,
        weights,
        impacts,
    })
}

/// Turns a raw table into a decision matrix.
///
/// A column is either entirely numeric or reported: the error lists all the
/// offending columns, in the order of the table.
pub fn coerce_table(table: &RawTable) -> Result<DecisionMatrix, TopsisError> {
    let num_cols = table.headers.len();
    if num_cols < 3 {
        return Err(TopsisError::Schema {
            message: format!(
                "expected at least 3 columns (1 label column and 2 or more criteria columns), found {}",
                num_cols
            ),
        });
    }
    if table.rows.is_empty() {
        return Err(TopsisError::Schema {
            message: "the table has no data rows".to_string(),
        });
    }
    for (idx, row) in table.rows.iter().enumerate() {
        if row.len() != num_cols {
            return Err(TopsisError::Schema {
                message: format!(
                    "row {} has {} cells, expected {}",
                    idx + 1,
                    row.len(),
                    num_cols
                ),
            });
        }
    }

    let criteria: Vec<String> = table.headers[1..].to_vec();
    let bad_columns: Vec<String> = criteria
        .iter()
        .enumerate()
        .filter(|(j, _)| {
            table
                .rows
                .iter()
                .any(|row| row[j + 1].as_number().is_none())
        })
        .map(|(_, name)| name.clone())
        .collect();
    if !bad_columns.is_empty() {
        debug!("coerce_table: non-numeric columns: {:?}", bad_columns);
        return Err(TopsisError::DataType {
            columns: bad_columns,
        });
    }

    let alternatives: Vec<Alternative> = table
        .rows
        .iter()
        .map(|row| Alternative {
            label: row[0].to_string(),
            // Checked above: every criteria cell is a number.
            values: row[1..].iter().filter_map(|c| c.as_number()).collect(),
        })
        .collect();
    Ok(DecisionMatrix {
        criteria,
        alternatives,
    })
}

/// Parses a weights specification such as `"1,1,2"`.
///
/// Every weight must be a finite number strictly greater than zero.
pub fn parse_weights(spec: &str, options: &ParseOptions) -> Result<Vec<f64>, TopsisError> {
    weights_from_tokens(split_tokens(spec, "weights")?, options)
}

fn weights_from_tokens(tokens: Vec<&str>, options: &ParseOptions) -> Result<Vec<f64>, TopsisError> {
    let tokens = filter_tokens(tokens, "weights", options)?;
    let mut res: Vec<f64> = Vec::new();
    for t in tokens {
        let w = match t.parse::<f64>() {
            Ok(w) if w.is_finite() => w,
            _ => {
                return Err(TopsisError::Format {
                    field: "weights",
                    message: "weights must be numeric values separated by commas".to_string(),
                    token: Some(t.to_string()),
                })
            }
        };
        if w <= 0.0 {
            return Err(TopsisError::Format {
                field: "weights",
                message: "weights must be positive numbers".to_string(),
                token: Some(t.to_string()),
            });
        }
        res.push(w);
    }
    Ok(res)
}

/// Parses an impacts specification such as `"+,+,-"`.
pub fn parse_impacts(spec: &str, options: &ParseOptions) -> Result<Vec<Impact>, TopsisError> {
    impacts_from_tokens(split_tokens(spec, "impacts")?, options)
}

fn impacts_from_tokens(
    tokens: Vec<&str>,
    options: &ParseOptions,
) -> Result<Vec<Impact>, TopsisError> {
    let tokens = filter_tokens(tokens, "impacts", options)?;
    tokens
        .iter()
        .map(|t| {
            Impact::from_symbol(t).ok_or_else(|| TopsisError::Format {
                field: "impacts",
                message: "impacts must be either '+' or '-' separated by commas".to_string(),
                token: Some(t.to_string()),
            })
        })
        .collect()
}

fn split_tokens<'a>(spec: &'a str, field: &'static str) -> Result<Vec<&'a str>, TopsisError> {
    if !spec.contains(',') {
        return Err(TopsisError::Format {
            field,
            message: "values must be separated by ',' (comma)".to_string(),
            token: None,
        });
    }
    Ok(spec.split(',').collect())
}

// Trims the tokens and applies the policy for empty ones.
fn filter_tokens<'a>(
    raw: Vec<&'a str>,
    field: &'static str,
    options: &ParseOptions,
) -> Result<Vec<&'a str>, TopsisError> {
    let mut tokens: Vec<&str> = Vec::new();
    for t in raw.into_iter().map(|t| t.trim()) {
        match (t.is_empty(), options.empty_tokens) {
            (false, _) => tokens.push(t),
            (true, EmptyTokens::Drop) => {}
            (true, EmptyTokens::Reject) => {
                return Err(TopsisError::Format {
                    field,
                    message: "empty value in the list".to_string(),
                    token: Some(t.to_string()),
                })
            }
        }
    }
    if tokens.is_empty() {
        return Err(TopsisError::Format {
            field,
            message: "the list cannot be empty".to_string(),
            token: None,
        });
    }
    Ok(tokens)
}

pub(crate) fn check_cardinality(
    field: &'static str,
    expected: usize,
    actual: usize,
) -> Result<(), TopsisError> {
    if expected != actual {
        return Err(TopsisError::Cardinality {
            field,
            expected,
            actual,
        });
    }
    Ok(())
}
