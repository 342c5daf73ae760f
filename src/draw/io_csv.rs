// Primitives for reading CSV rosters, as exported by the league spreadsheets.

use std::fs::File;

use crate::draw::{io_common::clean_names, *};

pub fn read_csv_roster(path: &str, source: &RosterSource) -> DrawResult<Vec<String>> {
    let name_idx = source.name_column_index()?;
    let (records, row_offset) = get_records(path, source)?;

    let mut res: Vec<String> = Vec::new();
    for (idx, line_r) in records.enumerate() {
        let lineno = idx + row_offset;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        debug!("read_csv_roster: {:?} {:?}", lineno, line);
        let name = line.get(name_idx).context(CsvLineTooShortSnafu {
            lineno,
            column: name_idx + 1,
        })?;
        res.push(name.to_string());
    }
    Ok(clean_names(res))
}

fn get_records(
    path: &str,
    source: &RosterSource,
) -> DrawResult<(csv::StringRecordsIntoIter<File>, usize)> {
    let first_row = source.first_row_index()?;
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let mut records = rdr.into_records();
    // The index starts at 1 to respect most conventions in the spreadsheet world
    for _ in 1..first_row {
        _ = records.next();
    }
    Ok((records, first_row))
}
