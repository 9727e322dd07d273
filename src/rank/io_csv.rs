// Primitives for reading and writing CSV files.

use crate::rank::{io_common::result_records, *};

/// Reads a CSV file with a header row.
///
/// Rows of different lengths are accepted here: the shape is checked during validation.
pub fn read_csv_table(path: &str) -> RankResult<RawTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let headers: Vec<String> = rdr
        .headers()
        .context(CsvLineParseSnafu { path, lineno: 1_usize })?
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { path, lineno })?;
        let cells: Vec<Cell> = line.iter().map(text_cell).collect();
        debug!("read_csv_table: lineno: {:?} row: {:?}", lineno, &cells);
        rows.push(cells);
    }
    Ok(RawTable { headers, rows })
}

fn text_cell(s: &str) -> Cell {
    if s.is_empty() {
        Cell::Empty
    } else {
        Cell::Text(s.to_string())
    }
}

/// Renders the result table in CSV format.
pub fn write_csv_result(table: &RawTable, evaluation: &Evaluation) -> RankResult<String> {
    let (header, records) = result_records(table, evaluation);
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    wtr.write_record(&header).context(CsvWriteSnafu {})?;
    for record in records.iter() {
        wtr.write_record(record).context(CsvWriteSnafu {})?;
    }
    let bytes = match wtr.into_inner() {
        Ok(b) => b,
        Err(e) => whatever!("Error flushing the result table: {}", e),
    };
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => whatever!("The result table is not valid UTF-8: {}", e),
    }
}
