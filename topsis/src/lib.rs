mod config;
mod validate;

pub mod builder;
pub mod manual;

use log::{debug, info};
use std::cmp::Ordering;

pub use crate::config::*;
pub use crate::validate::{
    coerce_table, parse_impacts, parse_weights, validate, validate_inputs, validate_with, ListInput,
};

/// Evaluates a problem with the default options.
///
/// See [evaluate_with].
pub fn evaluate(
    matrix: &DecisionMatrix,
    weights: &[f64],
    impacts: &[Impact],
) -> Result<Evaluation, TopsisError> {
    evaluate_with(matrix, weights, impacts, &EngineOptions::DEFAULT)
}

impl Problem {
    pub fn evaluate(&self) -> Result<Evaluation, TopsisError> {
        evaluate(&self.matrix, &self.weights, &self.impacts)
    }

    pub fn evaluate_with(&self, options: &EngineOptions) -> Result<Evaluation, TopsisError> {
        evaluate_with(&self.matrix, &self.weights, &self.impacts, options)
    }
}

/// Runs the TOPSIS algorithm.
///
/// Arguments:
/// * `matrix` the alternatives and their criteria values
/// * `weights` one strictly positive weight per criterion. They do not need to sum to 1.
/// * `impacts` one direction of preference per criterion
/// * `options` the policy for degenerate rows and the precision of the scores
///
/// The results are returned in the row order of the matrix. Each call only uses local
/// state and runs in O(rows x criteria) time and memory.
///
/// The inputs are checked again, so that this function can be called without going
/// through [validate()]. Nothing is computed if one of the checks fails.
pub fn evaluate_with(
    matrix: &DecisionMatrix,
    weights: &[f64],
    impacts: &[Impact],
    options: &EngineOptions,
) -> Result<Evaluation, TopsisError> {
    check_preconditions(matrix, weights, impacts)?;
    info!(
        "Evaluating {:?} alternatives over {:?} criteria",
        matrix.num_alternatives(),
        matrix.num_criteria()
    );

    let norms = column_norms(matrix)?;
    debug!("evaluate: column norms: {:?}", norms);

    let normalized_weights = normalize_weights(weights);
    debug!("evaluate: normalized weights: {:?}", normalized_weights);

    // The weighted normalized matrix, row by row.
    let weighted: Vec<Vec<f64>> = matrix
        .alternatives
        .iter()
        .map(|a| {
            a.values
                .iter()
                .enumerate()
                .map(|(j, x)| (x / norms[j]) * normalized_weights[j])
                .collect()
        })
        .collect();

    let (ideal_best, ideal_worst) = ideal_solutions(&weighted, impacts);
    debug!(
        "evaluate: ideal best: {:?} ideal worst: {:?}",
        ideal_best, ideal_worst
    );

    let separation_best: Vec<f64> = weighted.iter().map(|v| distance(v, &ideal_best)).collect();
    let separation_worst: Vec<f64> = weighted
        .iter()
        .map(|v| distance(v, &ideal_worst))
        .collect();

    let mut closeness: Vec<f64> = Vec::with_capacity(weighted.len());
    for (idx, a) in matrix.alternatives.iter().enumerate() {
        let total = separation_best[idx] + separation_worst[idx];
        let score = if total == 0.0 {
            match options.degenerate_row {
                DegenerateRow::Zero => {
                    debug!(
                        "evaluate: alternative {:?} coincides with both ideals, score set to 0",
                        a.label
                    );
                    0.0
                }
                DegenerateRow::Fail => {
                    return Err(TopsisError::DegenerateRow {
                        label: a.label.clone(),
                    })
                }
            }
        } else {
            separation_worst[idx] / total
        };
        closeness.push(score);
    }

    let ranks = dense_ranks(&closeness);
    let rows: Vec<ResultRow> = matrix
        .alternatives
        .iter()
        .zip(closeness.iter())
        .zip(ranks.iter())
        .map(|((a, score), rank)| ResultRow {
            label: a.label.clone(),
            values: a.values.clone(),
            score: round_to(*score, options.score_precision),
            rank: *rank,
        })
        .collect();

    for r in rows.iter().filter(|r| r.rank == 1) {
        info!("Best alternative: {} (score {})", r.label, r.score);
    }

    Ok(Evaluation {
        rows,
        normalized_weights,
        ideal_best,
        ideal_worst,
        separation_best,
        separation_worst,
        closeness,
    })
}

fn check_preconditions(
    matrix: &DecisionMatrix,
    weights: &[f64],
    impacts: &[Impact],
) -> Result<(), TopsisError> {
    let n = matrix.num_criteria();
    if n != weights.len() || n != impacts.len() {
        return Err(TopsisError::Precondition {
            message: format!(
                "{} criteria, {} weights and {} impacts",
                n,
                weights.len(),
                impacts.len()
            ),
        });
    }
    if n == 0 {
        return Err(TopsisError::Precondition {
            message: "no criteria".to_string(),
        });
    }
    if matrix.alternatives.is_empty() {
        return Err(TopsisError::Precondition {
            message: "no alternatives".to_string(),
        });
    }
    if let Some(w) = weights.iter().find(|w| !(w.is_finite() && **w > 0.0)) {
        return Err(TopsisError::Precondition {
            message: format!("weight {} is not a positive number", w),
        });
    }
    for a in matrix.alternatives.iter() {
        if a.values.len() != n {
            return Err(TopsisError::Precondition {
                message: format!(
                    "alternative {:?} has {} values, expected {}",
                    a.label,
                    a.values.len(),
                    n
                ),
            });
        }
        if a.values.iter().any(|x| !x.is_finite()) {
            return Err(TopsisError::Precondition {
                message: format!("alternative {:?} has non-finite values", a.label),
            });
        }
    }
    Ok(())
}

/// The euclidean norm of every criterion column.
///
/// The values are scaled by the largest magnitude of their column before being squared,
/// so that very large or very small columns neither overflow nor underflow.
fn column_norms(matrix: &DecisionMatrix) -> Result<Vec<f64>, TopsisError> {
    let mut norms: Vec<f64> = Vec::with_capacity(matrix.num_criteria());
    for (j, name) in matrix.criteria.iter().enumerate() {
        let max_abs = matrix
            .alternatives
            .iter()
            .map(|a| a.values[j].abs())
            .fold(0.0, f64::max);
        if max_abs == 0.0 {
            return Err(TopsisError::DegenerateColumn {
                column: name.clone(),
            });
        }
        let scaled = matrix
            .alternatives
            .iter()
            .map(|a| {
                let x = a.values[j] / max_abs;
                x * x
            })
            .sum::<f64>()
            .sqrt();
        norms.push(max_abs * scaled);
    }
    Ok(norms)
}

/// Scales the weights so that they sum to 1.
///
/// The weights are first divided by the largest one, which keeps the total finite.
pub fn normalize_weights(weights: &[f64]) -> Vec<f64> {
    let max = weights.iter().cloned().fold(0.0, f64::max);
    if max == 0.0 {
        return weights.to_vec();
    }
    let total: f64 = weights.iter().map(|w| w / max).sum();
    weights.iter().map(|w| (w / max) / total).collect()
}

// Returns (ideal best, ideal worst)
fn ideal_solutions(weighted: &[Vec<f64>], impacts: &[Impact]) -> (Vec<f64>, Vec<f64>) {
    let mut best: Vec<f64> = Vec::with_capacity(impacts.len());
    let mut worst: Vec<f64> = Vec::with_capacity(impacts.len());
    for (j, impact) in impacts.iter().enumerate() {
        let max = weighted
            .iter()
            .map(|v| v[j])
            .fold(f64::NEG_INFINITY, f64::max);
        let min = weighted.iter().map(|v| v[j]).fold(f64::INFINITY, f64::min);
        match impact {
            Impact::Benefit => {
                best.push(max);
                worst.push(min);
            }
            Impact::Cost => {
                best.push(min);
                worst.push(max);
            }
        }
    }
    (best, worst)
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Assigns the ranks 1..=n to the scores, the highest score getting rank 1.
///
/// Ties do not share a rank: among equal scores, the earlier position gets the better rank.
pub fn dense_ranks(scores: &[f64]) -> Vec<u32> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&i, &j| {
        scores[j]
            .partial_cmp(&scores[i])
            .unwrap_or(Ordering::Equal)
            .then(i.cmp(&j))
    });
    let mut ranks: Vec<u32> = vec![0; scores.len()];
    for (pos, idx) in order.iter().enumerate() {
        ranks[*idx] = (pos + 1) as u32;
    }
    ranks
}

/// Rounds half to even, like the usual data frame libraries.
fn round_to(x: f64, digits: u32) -> f64 {
    let scale = 10f64.powi(digits as i32);
    (x * scale).round_ties_even() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn matrix(rows: &[&[f64]]) -> DecisionMatrix {
        let n = rows.first().map(|r| r.len()).unwrap_or(0);
        DecisionMatrix {
            criteria: (1..=n).map(|j| format!("C{}", j)).collect(),
            alternatives: rows
                .iter()
                .enumerate()
                .map(|(idx, r)| Alternative {
                    label: format!("A{}", idx + 1),
                    values: r.to_vec(),
                })
                .collect(),
        }
    }

    fn ranks(e: &Evaluation) -> Vec<u32> {
        e.rows.iter().map(|r| r.rank).collect()
    }

    fn assert_permutation(e: &Evaluation) {
        let mut rs = ranks(e);
        rs.sort();
        let expected: Vec<u32> = (1..=e.rows.len() as u32).collect();
        assert_eq!(rs, expected);
    }

    fn phones() -> DecisionMatrix {
        matrix(&[
            &[250.0, 16.0, 12.0, 5.0],
            &[200.0, 16.0, 8.0, 3.0],
            &[300.0, 32.0, 16.0, 4.0],
            &[275.0, 32.0, 8.0, 4.0],
            &[225.0, 16.0, 16.0, 2.0],
        ])
    }

    const PHONE_IMPACTS: [Impact; 4] = [
        Impact::Cost,
        Impact::Benefit,
        Impact::Benefit,
        Impact::Benefit,
    ];

    #[test]
    fn increasing_rows() {
        init();
        let m = matrix(&[&[1.0, 1.0], &[2.0, 2.0], &[3.0, 3.0]]);
        let e = evaluate(&m, &[1.0, 1.0], &[Impact::Benefit, Impact::Benefit]).unwrap();
        assert_eq!(ranks(&e), vec![3, 2, 1]);
        assert!(e.closeness[0] < e.closeness[1]);
        assert!(e.closeness[1] < e.closeness[2]);
        assert_eq!(e.rows[0].score, 0.0);
        assert_eq!(e.rows[1].score, 0.5);
        assert_eq!(e.rows[2].score, 1.0);
    }

    #[test]
    fn known_scores() {
        init();
        let e = evaluate(&phones(), &[1.0, 1.0, 1.0, 1.0], &PHONE_IMPACTS).unwrap();
        let scores: Vec<f64> = e.rows.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![0.534277, 0.308368, 0.691632, 0.534737, 0.401046]);
        assert_eq!(ranks(&e), vec![3, 5, 1, 2, 4]);
        assert_eq!(e.ranked()[0].label, "A3");
    }

    #[test]
    fn zero_column() {
        init();
        let m = matrix(&[&[1.0, 0.0], &[2.0, 0.0], &[3.0, 0.0]]);
        assert_eq!(
            evaluate(&m, &[1.0, 1.0], &[Impact::Benefit, Impact::Cost]),
            Err(TopsisError::DegenerateColumn {
                column: "C2".to_string()
            })
        );
    }

    #[test]
    fn identical_rows_fallback_to_zero() {
        init();
        let m = matrix(&[&[2.0, 5.0], &[2.0, 5.0], &[2.0, 5.0]]);
        let e = evaluate(&m, &[1.0, 3.0], &[Impact::Benefit, Impact::Cost]).unwrap();
        assert!(e.rows.iter().all(|r| r.score == 0.0));
        assert_eq!(ranks(&e), vec![1, 2, 3]);
    }

    #[test]
    fn identical_rows_fail() {
        init();
        let m = matrix(&[&[2.0, 5.0], &[2.0, 5.0]]);
        let options = EngineOptions {
            degenerate_row: DegenerateRow::Fail,
            ..EngineOptions::DEFAULT
        };
        assert_eq!(
            evaluate_with(&m, &[1.0, 1.0], &[Impact::Benefit, Impact::Cost], &options),
            Err(TopsisError::DegenerateRow {
                label: "A1".to_string()
            })
        );
    }

    #[test]
    fn single_row() {
        init();
        let m = matrix(&[&[4.0, 2.0]]);
        let e = evaluate(&m, &[1.0, 1.0], &[Impact::Benefit, Impact::Benefit]).unwrap();
        assert_eq!(e.rows[0].rank, 1);
        assert_eq!(e.rows[0].score, 0.0);
    }

    #[test]
    fn ties_are_ranked_by_position() {
        init();
        let m = matrix(&[&[1.0, 1.0], &[3.0, 3.0], &[2.0, 2.0], &[3.0, 3.0], &[1.0, 1.0]]);
        let e = evaluate(&m, &[1.0, 1.0], &[Impact::Benefit, Impact::Benefit]).unwrap();
        assert_eq!(ranks(&e), vec![4, 1, 3, 2, 5]);
        assert_eq!(dense_ranks(&[0.5, 0.5, 0.5]), vec![1, 2, 3]);
        assert_eq!(dense_ranks(&[0.1, 0.9, 0.5, 0.9]), vec![4, 1, 3, 2]);
        assert!(dense_ranks(&[]).is_empty());
    }

    #[test]
    fn large_values_keep_their_weight() {
        init();
        let weights = [10.0, 1.0];
        let impacts = [Impact::Benefit, Impact::Benefit];
        let large = matrix(&[&[1e200, 1.0], &[3e200, 2.0], &[2e200, 3.0]]);
        let small = matrix(&[&[1.0, 1.0], &[3.0, 2.0], &[2.0, 3.0]]);
        let e_large = evaluate(&large, &weights, &impacts).unwrap();
        let e_small = evaluate(&small, &weights, &impacts).unwrap();
        assert_eq!(ranks(&e_large), vec![3, 1, 2]);
        assert_eq!(ranks(&e_large), ranks(&e_small));
        for (a, b) in e_large.closeness.iter().zip(e_small.closeness.iter()) {
            assert!((a - b).abs() < 1e-12, "{} != {}", a, b);
        }
    }

    #[test]
    fn tiny_values_are_not_a_zero_column() {
        init();
        let impacts = [Impact::Benefit, Impact::Benefit];
        let tiny = matrix(&[&[1e-200, 1.0], &[3e-200, 2.0]]);
        let e = evaluate(&tiny, &[1.0, 1.0], &impacts).unwrap();
        let reference = matrix(&[&[1.0, 1.0], &[3.0, 2.0]]);
        let reference = evaluate(&reference, &[1.0, 1.0], &impacts).unwrap();
        assert_eq!(ranks(&e), vec![2, 1]);
        for (a, b) in e.closeness.iter().zip(reference.closeness.iter()) {
            assert!((a - b).abs() < 1e-12, "{} != {}", a, b);
        }
    }

    #[test]
    fn huge_weights_are_normalized() {
        init();
        assert_eq!(normalize_weights(&[1e308, 1e308]), vec![0.5, 0.5]);
        let m = matrix(&[&[1.0, 1.0], &[3.0, 2.0]]);
        let impacts = [Impact::Benefit, Impact::Benefit];
        let e = evaluate(&m, &[1e308, 1e308], &impacts).unwrap();
        let reference = evaluate(&m, &[1.0, 1.0], &impacts).unwrap();
        assert_eq!(e.normalized_weights.iter().sum::<f64>(), 1.0);
        assert_eq!(e.closeness, reference.closeness);
        assert_eq!(ranks(&e), vec![2, 1]);
    }

    #[test]
    fn rounding_ties_go_to_even() {
        assert_eq!(round_to(0.25, 1), 0.2);
        assert_eq!(round_to(0.75, 1), 0.8);
        assert_eq!(round_to(2.5, 0), 2.0);
        assert_eq!(round_to(0.5342774, 6), 0.534277);
    }

    #[test]
    fn scores_within_bounds() {
        init();
        let e = evaluate(&phones(), &[0.25, 0.25, 0.3, 0.2], &PHONE_IMPACTS).unwrap();
        for c in e.closeness.iter() {
            assert!(*c >= 0.0 && *c <= 1.0, "score out of bounds: {}", c);
        }
        assert_permutation(&e);
        let total: f64 = e.normalized_weights.iter().sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn weights_are_normalized() {
        let w = normalize_weights(&[1.0, 1.0, 2.0]);
        assert_eq!(w, vec![0.25, 0.25, 0.5]);
        let w = normalize_weights(&[0.3, 0.7, 1.1, 13.0]);
        let total: f64 = w.iter().sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn weight_scaling_is_invariant() {
        init();
        let m = phones();
        let e1 = evaluate(&m, &[1.0, 2.0, 3.0, 4.0], &PHONE_IMPACTS).unwrap();
        let e2 = evaluate(&m, &[2.5, 5.0, 7.5, 10.0], &PHONE_IMPACTS).unwrap();
        assert_eq!(ranks(&e1), ranks(&e2));
        for (a, b) in e1.closeness.iter().zip(e2.closeness.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
        let s1: Vec<f64> = e1.rows.iter().map(|r| r.score).collect();
        let s2: Vec<f64> = e2.rows.iter().map(|r| r.score).collect();
        assert_eq!(s1, s2);
    }

    #[test]
    fn repeated_evaluations_are_identical() {
        init();
        let m = phones();
        let e1 = evaluate(&m, &[1.0, 1.0, 2.0, 1.0], &PHONE_IMPACTS).unwrap();
        let e2 = evaluate(&m, &[1.0, 1.0, 2.0, 1.0], &PHONE_IMPACTS).unwrap();
        assert_eq!(e1, e2);
        let b1: Vec<u64> = e1.closeness.iter().map(|x| x.to_bits()).collect();
        let b2: Vec<u64> = e2.closeness.iter().map(|x| x.to_bits()).collect();
        assert_eq!(b1, b2);
    }

    #[test]
    fn reversing_impact_flips_extremes() {
        init();
        // The first criterion drives the ranking, the second one is constant.
        let m = matrix(&[&[1.0, 4.0], &[5.0, 4.0], &[3.0, 4.0], &[9.0, 4.0]]);
        let benefit = evaluate(&m, &[1.0, 1.0], &[Impact::Benefit, Impact::Benefit]).unwrap();
        let cost = evaluate(&m, &[1.0, 1.0], &[Impact::Cost, Impact::Benefit]).unwrap();
        assert!(benefit.closeness[3] > benefit.closeness[0]);
        assert!(cost.closeness[0] > cost.closeness[3]);
        assert_eq!(benefit.rows[3].rank, 1);
        assert_eq!(cost.rows[0].rank, 1);
        assert_permutation(&benefit);
        assert_permutation(&cost);
    }

    #[test]
    fn ideal_solutions_follow_impacts() {
        init();
        let m = matrix(&[&[3.0, 4.0], &[4.0, 3.0]]);
        let e = evaluate(&m, &[1.0, 1.0], &[Impact::Benefit, Impact::Cost]).unwrap();
        // Both columns have a norm of 5 and a weight of 0.5.
        assert_eq!(e.ideal_best, vec![0.4, 0.3]);
        assert_eq!(e.ideal_worst, vec![0.3, 0.4]);
        assert_eq!(ranks(&e), vec![2, 1]);
    }

    #[test]
    fn preconditions() {
        init();
        let m = matrix(&[&[1.0, 2.0], &[2.0, 1.0]]);
        let imp = [Impact::Benefit, Impact::Benefit];
        assert!(matches!(
            evaluate(&m, &[1.0], &imp),
            Err(TopsisError::Precondition { .. })
        ));
        assert!(matches!(
            evaluate(&m, &[1.0, 1.0], &imp[..1]),
            Err(TopsisError::Precondition { .. })
        ));
        assert!(matches!(
            evaluate(&m, &[1.0, -1.0], &imp),
            Err(TopsisError::Precondition { .. })
        ));
        assert!(matches!(
            evaluate(&m, &[1.0, f64::NAN], &imp),
            Err(TopsisError::Precondition { .. })
        ));
        let ragged = DecisionMatrix {
            criteria: m.criteria.clone(),
            alternatives: vec![Alternative {
                label: "X".to_string(),
                values: vec![1.0],
            }],
        };
        assert!(matches!(
            evaluate(&ragged, &[1.0, 1.0], &imp),
            Err(TopsisError::Precondition { .. })
        ));
        let empty = DecisionMatrix {
            criteria: m.criteria.clone(),
            alternatives: vec![],
        };
        assert!(matches!(
            evaluate(&empty, &[1.0, 1.0], &imp),
            Err(TopsisError::Precondition { .. })
        ));
    }

    #[test]
    fn validated_problem_end_to_end() {
        init();
        let table = RawTable {
            headers: vec!["Fund".to_string(), "P1".to_string(), "P2".to_string()],
            rows: vec![
                vec![
                    Cell::Text("F1".to_string()),
                    Cell::Text("1".to_string()),
                    Cell::Text("1".to_string()),
                ],
                vec![
                    Cell::Text("F2".to_string()),
                    Cell::Text("2".to_string()),
                    Cell::Text("2".to_string()),
                ],
                vec![
                    Cell::Text("F3".to_string()),
                    Cell::Text("3".to_string()),
                    Cell::Text("3".to_string()),
                ],
            ],
        };
        let p = validate(&table, "1,1,", "+,+").unwrap();
        let e = p.evaluate().unwrap();
        assert_eq!(ranks(&e), vec![3, 2, 1]);
        assert_eq!(e.rows[2].label, "F3");
        assert_eq!(e.rows[2].values, vec![3.0, 3.0]);
    }
}
