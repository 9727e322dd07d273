// Primitives for reading Excel workbooks.

use calamine::{open_workbook, DataType, Range, Reader, Xlsx};

use crate::rank::*;

/// Reads a worksheet whose first row is the header.
///
/// The first worksheet is used unless a name is given.
pub fn read_excel_table(path: &str, worksheet_name: Option<&str>) -> RankResult<RawTable> {
    let wrange = get_range(path, worksheet_name)?;

    let mut iter = wrange.rows();
    let header = iter.next().context(EmptyExcelSnafu { path })?;
    debug!("read_excel_table: header: {:?}", header);
    let headers: Vec<String> = header.iter().map(|c| read_cell(c).to_string()).collect();

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for (idx, row) in iter.enumerate() {
        let cells: Vec<Cell> = row.iter().map(read_cell).collect();
        // Spreadsheets often carry fully empty rows at the end of the data.
        if cells.iter().all(|c| *c == Cell::Empty) {
            debug!("read_excel_table: skipping empty row {:?}", idx + 2);
            continue;
        }
        debug!("read_excel_table: idx: {:?} row: {:?}", idx + 2, &cells);
        rows.push(cells);
    }
    Ok(RawTable { headers, rows })
}

fn get_range(path: &str, worksheet_name: Option<&str>) -> RankResult<Range<DataType>> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange_r = match worksheet_name {
        Some(name) => workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { path, name })?,
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?,
    };
    wrange_r.context(OpeningExcelSnafu { path })
}

fn read_cell(cell: &DataType) -> Cell {
    match cell {
        DataType::Float(f) => Cell::Number(*f),
        DataType::Int(i) => Cell::Number(*i as f64),
        DataType::String(s) if s.is_empty() => Cell::Empty,
        DataType::String(s) => Cell::Text(s.clone()),
        DataType::Bool(b) => Cell::Text(b.to_string()),
        DataType::Empty => Cell::Empty,
        // Dates and cell errors are kept as text, they are not valid criteria values.
        other => Cell::Text(format!("{:?}", other)),
    }
}
