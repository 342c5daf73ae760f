// Plain text inputs: rosters, kart lists and history files.

use crate::draw::*;

/// Reads a roster typed by hand: one driver per line, or several separated by commas.
pub fn read_text_roster(path: &str) -> DrawResult<Vec<String>> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let names: Vec<String> = parse_drivers(&contents)
        .into_iter()
        .map(|d| d.name)
        .collect();
    debug!("read_text_roster: {:?}: {:?}", path, names);
    Ok(names)
}

pub fn read_kart_list(path: &str) -> DrawResult<Vec<String>> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    Ok(parse_karts(&contents).into_iter().map(|k| k.label).collect())
}

/// Reads the history file. A missing file is an empty history.
pub fn read_history(path: &str) -> DrawResult<String> {
    if !Path::new(path).exists() {
        warn!("read_history: {:?} does not exist, starting without history", path);
        return Ok(String::new());
    }
    fs::read_to_string(path).context(OpeningFileSnafu { path })
}

pub fn write_history(path: &str, contents: &str) -> DrawResult<()> {
    info!("write_history: writing {:?}", path);
    fs::write(path, format!("{}\n", contents.trim_end())).context(WritingFileSnafu { path })
}
