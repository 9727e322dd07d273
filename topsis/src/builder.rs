pub use crate::config::*;

use crate::validate::check_cardinality;

/// A builder for problems whose data is already typed.
///
/// This is the entry point when the alternatives do not come from a table of text
/// cells. The same shape checks as [crate::validate()] are run by [Builder::build].
///
/// ```
/// pub use topsis::builder::Builder;
/// pub use topsis::Impact;
/// # use topsis::TopsisError;
///
/// let mut builder = Builder::new(&["Price".to_string(), "Storage".to_string()])?
///     .weights(&[1.0, 2.0])
///     .impacts(&[Impact::Cost, Impact::Benefit]);
///
/// builder.add_alternative("M1", &[250.0, 16.0])?;
/// builder.add_alternative("M2", &[200.0, 32.0])?;
///
/// let evaluation = builder.build()?.evaluate()?;
/// assert_eq!(evaluation.ranked()[0].label, "M2");
///
/// # Ok::<(), TopsisError>(())
/// ```
pub struct Builder {
    pub(crate) _criteria: Vec<String>,
    pub(crate) _alternatives: Vec<Alternative>,
    pub(crate) _weights: Option<Vec<f64>>,
    pub(crate) _impacts: Option<Vec<Impact>>,
}

impl Builder {
    /// Starts a problem with the given criteria, in column order. At least 2 criteria are required.
    pub fn new(criteria: &[String]) -> Result<Builder, TopsisError> {
        if criteria.len() < 2 {
            return Err(TopsisError::Schema {
                message: format!("expected at least 2 criteria, found {}", criteria.len()),
            });
        }
        Ok(Builder {
            _criteria: criteria.to_vec(),
            _alternatives: Vec::new(),
            _weights: None,
            _impacts: None,
        })
    }

    pub fn weights(self, weights: &[f64]) -> Builder {
        Builder {
            _weights: Some(weights.to_vec()),
            ..self
        }
    }

    pub fn impacts(self, impacts: &[Impact]) -> Builder {
        Builder {
            _impacts: Some(impacts.to_vec()),
            ..self
        }
    }

    /// Adds an alternative. The values must be finite, one per criterion.
    pub fn add_alternative(&mut self, label: &str, values: &[f64]) -> Result<(), TopsisError> {
        if values.len() != self._criteria.len() {
            return Err(TopsisError::Schema {
                message: format!(
                    "alternative {:?} has {} values, expected {}",
                    label,
                    values.len(),
                    self._criteria.len()
                ),
            });
        }
        let bad_columns: Vec<String> = values
            .iter()
            .zip(self._criteria.iter())
            .filter(|(x, _)| !x.is_finite())
            .map(|(_, name)| name.clone())
            .collect();
        if !bad_columns.is_empty() {
            return Err(TopsisError::DataType {
                columns: bad_columns,
            });
        }
        self._alternatives.push(Alternative {
            label: label.to_string(),
            values: values.to_vec(),
        });
        Ok(())
    }

    /// Checks the problem and returns it.
    ///
    /// Missing weights default to equal weights. Missing impacts are an error.
    pub fn build(self) -> Result<Problem, TopsisError> {
        let n = self._criteria.len();
        if self._alternatives.is_empty() {
            return Err(TopsisError::Schema {
                message: "no alternatives".to_string(),
            });
        }
        let weights = self._weights.unwrap_or_else(|| vec![1.0; n]);
        if let Some(w) = weights.iter().find(|w| !(w.is_finite() && **w > 0.0)) {
            return Err(TopsisError::Format {
                field: "weights",
                message: "weights must be positive numbers".to_string(),
                token: Some(w.to_string()),
            });
        }
        let impacts = self._impacts.ok_or_else(|| TopsisError::Format {
            field: "impacts",
            message: "no impacts provided".to_string(),
            token: None,
        })?;
        check_cardinality("weights", n, weights.len())?;
        check_cardinality("impacts", n, impacts.len())?;
        Ok(Problem {
            matrix: DecisionMatrix {
                criteria: self._criteria,
                alternatives: self._alternatives,
            },
            weights,
            impacts,
        })
    }
}
