use topsis::{Evaluation, RawTable};

pub const SCORE_COLUMN: &str = "Topsis Score";
pub const RANK_COLUMN: &str = "Rank";

/// Scores are written the way spreadsheets and data frames print them: whole values keep
/// one decimal.
pub fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{:.1}", score)
    } else {
        format!("{}", score)
    }
}

/// The header and cells of the result table, as text: the original columns followed by
/// the score and the rank.
pub fn result_records(
    table: &RawTable,
    evaluation: &Evaluation,
) -> (Vec<String>, Vec<Vec<String>>) {
    let mut header: Vec<String> = table.headers.clone();
    header.push(SCORE_COLUMN.to_string());
    header.push(RANK_COLUMN.to_string());
    let records: Vec<Vec<String>> = table
        .rows
        .iter()
        .zip(evaluation.rows.iter())
        .map(|(cells, res)| {
            let mut record: Vec<String> = cells.iter().map(|c| c.to_string()).collect();
            record.push(format_score(res.score));
            record.push(res.rank.to_string());
            record
        })
        .collect();
    (header, records)
}

/// A plain-text table with the first `num_rows` rows of the result.
pub fn format_preview(table: &RawTable, evaluation: &Evaluation, num_rows: usize) -> String {
    let (header, records) = result_records(table, evaluation);
    let shown: Vec<&Vec<String>> = records.iter().take(num_rows).collect();
    let widths: Vec<usize> = (0..header.len())
        .map(|j| {
            shown
                .iter()
                .map(|r| r[j].chars().count())
                .chain(std::iter::once(header[j].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();
    let format_line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(c, w)| format!("{:<width$}", c, width = *w))
            .collect::<Vec<String>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };
    let mut lines: Vec<String> = vec![format_line(&header[..])];
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<String>>()
            .join("-+-"),
    );
    for r in shown {
        lines.push(format_line(&r[..]));
    }
    if records.len() > num_rows {
        lines.push(format!("({} more rows)", records.len() - num_rows));
    }
    lines.join("\n")
}
