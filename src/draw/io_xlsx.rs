use calamine::{open_workbook, DataType, Range, Reader, Xlsx};

use crate::draw::{io_common::clean_names, *};

/// Reads the drivers from one column of an Excel worksheet.
///
/// The worksheet is the one named in the source, or the first one.
pub fn read_xlsx_roster(path: &str, source: &RosterSource) -> DrawResult<Vec<String>> {
    let wrange = get_range(path, source)?;
    let name_idx = source.name_column_index()?;
    let first_row = source.first_row_index()?;

    // The range only covers the used cells: the indexes are positions in the sheet,
    // not in the range.
    let (start, end) = match (wrange.start(), wrange.end()) {
        (Some(start), Some(end)) => (start, end),
        _ => {
            debug!("read_xlsx_roster: {:?}: empty worksheet", path);
            return Ok(Vec::new());
        }
    };
    let name_col = u32::try_from(name_idx).unwrap_or(u32::MAX);
    let first_abs_row = u32::try_from(first_row - 1)
        .unwrap_or(u32::MAX)
        .max(start.0);

    let mut res: Vec<String> = Vec::new();
    for abs_row in first_abs_row..=end.0 {
        let lineno = abs_row as u64 + 1;
        let cell = wrange.get_value((abs_row, name_col));
        debug!("read_xlsx_roster: {:?} {:?}", lineno, cell);
        let name = match cell {
            Some(DataType::String(s)) => s.clone(),
            Some(DataType::Int(i)) => i.to_string(),
            Some(DataType::Float(f)) => f.to_string(),
            Some(DataType::Empty) | None => continue,
            Some(cell) => {
                return ExcelWrongCellTypeSnafu {
                    lineno,
                    content: format!("{:?}", cell),
                }
                .fail();
            }
        };
        res.push(name);
    }
    Ok(clean_names(res))
}

fn get_range(path: &str, source: &RosterSource) -> DrawResult<Range<DataType>> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange = match &source.excel_worksheet_name {
        Some(name) => workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { name })?,
        None => workbook.worksheet_range_at(0).context(EmptyExcelSnafu {})?,
    };
    wrange.context(OpeningExcelSnafu { path })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_path(name: &str) -> String {
        format!("{}/tests/data/{}", env!("CARGO_MANIFEST_DIR"), name)
    }

    fn source(column: &str, row: &str, worksheet: Option<&str>) -> RosterSource {
        RosterSource::new("xlsx", "roster.xlsx").with_layout(Some(column), Some(row), worksheet)
    }

    #[test]
    fn first_worksheet_with_empty_leading_column() {
        // Column A is empty: the used cells start at B1.
        let names = read_xlsx_roster(&data_path("roster.xlsx"), &source("B", "2", None)).unwrap();
        assert_eq!(names, vec!["Ana", "Bob", "Cleo"]);
    }

    #[test]
    fn columns_are_sheet_positions() {
        let teams = read_xlsx_roster(&data_path("roster.xlsx"), &source("3", "2", None)).unwrap();
        assert_eq!(teams, vec!["Red", "Blue", "Red"]);
        // Nothing in column A.
        let empty = read_xlsx_roster(&data_path("roster.xlsx"), &source("A", "1", None)).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn named_worksheet_with_empty_leading_rows() {
        // The used cells of this sheet start at B3, the header row.
        let names = read_xlsx_roster(
            &data_path("roster.xlsx"),
            &source("B", "4", Some("Reserves")),
        )
        .unwrap();
        assert_eq!(names, vec!["Dan", "Eve"]);
        // Starting above the used cells keeps the header.
        let with_header = read_xlsx_roster(
            &data_path("roster.xlsx"),
            &source("B", "1", Some("Reserves")),
        )
        .unwrap();
        assert_eq!(with_header, vec!["name", "Dan", "Eve"]);
    }

    #[test]
    fn missing_worksheet() {
        let res = read_xlsx_roster(&data_path("roster.xlsx"), &source("B", "2", Some("Finals")));
        assert!(matches!(res, Err(DrawError::MissingWorksheet { .. })));
    }

    #[test]
    fn missing_file() {
        let res = read_xlsx_roster(&data_path("no_such_roster.xlsx"), &source("B", "2", None));
        assert!(matches!(res, Err(DrawError::OpeningExcel { .. })));
    }
}
