use log::{debug, info, warn};

use kart_draw::builder::Builder;
use kart_draw::reel::reel;
use kart_draw::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::Path;

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_text;
mod io_xlsx;

use crate::draw::config_reader::*;
use crate::draw::io_common::resolve_path;

#[derive(Debug, Snafu)]
pub enum DrawError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening Excel file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Worksheet {name} not found"))]
    MissingWorksheet { name: String },
    #[snafu(display("The Excel file has no worksheet"))]
    EmptyExcel {},
    #[snafu(display("Unexpected cell at line {lineno}: {content}"))]
    ExcelWrongCellType { lineno: u64, content: String },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading CSV line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("CSV line {lineno} has no column {column}"))]
    CsvLineTooShort { lineno: usize, column: usize },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Expected a row or column index, found {value}"))]
    ParsingJsonNumber { value: String },
    #[snafu(display("Cannot find the directory of {path}"))]
    MissingParentDir { path: String },
    #[snafu(display("Unknown input type {input_type}"))]
    UnknownInputType { input_type: String },
    #[snafu(display("Cannot run the draw"))]
    Draw { source: DrawErrors },
    #[snafu(display("The draw was cancelled"))]
    Aborted {},
    #[snafu(display("Difference detected between the draw summary and the reference summary"))]
    ReferenceMismatch {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type DrawResult<T> = Result<T, DrawError>;

/// How a confirmed draw is written back into the history file.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum HistoryMode {
    /// Adds one `Name: kart` line per driver at the end of the file. The new lines
    /// replace the previous history of these drivers.
    Append,
    /// Adds the new kart to the karts each driver already used, and rewrites the file.
    Accumulate,
}

/// Everything needed to run one draw, once the config file and the command line
/// have been read.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DrawRequest {
    pub event_name: String,
    pub event_date: Option<String>,
    pub drivers: Vec<String>,
    pub karts: Vec<String>,
    pub history_path: Option<String>,
    pub fallback_mode: FallbackMode,
    pub seed: Option<String>,
    pub record: Option<HistoryMode>,
    pub auto_confirm: bool,
    pub with_reels: bool,
    /// Where the summary goes when the command line does not say.
    pub summary_path: Option<String>,
}

impl Default for DrawRequest {
    fn default() -> DrawRequest {
        DrawRequest {
            event_name: "Kart draw".to_string(),
            event_date: None,
            drivers: Vec::new(),
            karts: Vec::new(),
            history_path: None,
            fallback_mode: FallbackMode::Greedy,
            seed: None,
            record: None,
            auto_confirm: false,
            with_reels: false,
            summary_path: None,
        }
    }
}

impl DrawRequest {
    pub fn rules(&self) -> DrawRules {
        DrawRules {
            fallback_mode: self.fallback_mode,
            seed: self.seed.as_deref().map(seed_from_text),
        }
    }
}

/// Reads the drivers with the given reader: `text`, `csv` or `xlsx`.
pub fn read_roster(path: &str, source: &RosterSource) -> DrawResult<Vec<String>> {
    info!(
        "Attempting to read roster file {:?} ({})",
        path, source.provider
    );
    match source.provider.as_str() {
        "text" => io_text::read_text_roster(path),
        "csv" => io_csv::read_csv_roster(path, source),
        "xlsx" => io_xlsx::read_xlsx_roster(path, source),
        x => UnknownInputTypeSnafu { input_type: x }.fail(),
    }
}

pub fn read_kart_list(path: &str) -> DrawResult<Vec<String>> {
    io_text::read_kart_list(path)
}

/// Builds a request from a config file. Relative paths are resolved against the
/// directory of the config file.
pub fn request_from_config(config_path: &str) -> DrawResult<DrawRequest> {
    let config = read_config(config_path)?;
    info!("config: {:?}", config);
    let root_p = Path::new(config_path)
        .parent()
        .context(MissingParentDirSnafu { path: config_path })?;

    let drivers = match (&config.roster, &config.drivers) {
        (Some(roster), _) => read_roster(&resolve_path(root_p, &roster.file_path), roster)?,
        (None, Some(names)) => names.clone(),
        (None, None) => Vec::new(),
    };

    Ok(DrawRequest {
        event_name: config.output_settings.event_name.clone(),
        event_date: config.output_settings.event_date.clone(),
        drivers,
        karts: config.karts.clone(),
        history_path: config
            .history_file_path
            .as_ref()
            .map(|p| resolve_path(root_p, p)),
        fallback_mode: config.rules.fallback_mode()?,
        seed: config.rules.random_seed.clone(),
        record: config.rules.history_mode()?,
        auto_confirm: false,
        with_reels: false,
        summary_path: config
            .output_settings
            .output_directory
            .as_ref()
            .map(|d| resolve_path(Path::new(&resolve_path(root_p, d)), "summary.json")),
    })
}

/// Asks the question on the terminal. The question goes to the standard error, to keep the
/// standard output for the summary. Anything but `y` or `yes` is a no.
pub fn prompt_confirmation(message: &str) -> bool {
    use std::io::Write;
    eprint!("{} [y/N] ", message);
    if std::io::stderr().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    match std::io::stdin().read_line(&mut answer) {
        Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

fn outcome_to_json(outcome: &DrawOutcome, reels: Option<&[Vec<String>]>) -> JSValue {
    let assignments: Vec<JSValue> = outcome
        .assignment
        .seats()
        .iter()
        .enumerate()
        .map(|(idx, seat)| {
            let mut js = json!({
                "driver": seat.driver.name,
                "kart": seat.kart.label,
                "repeat": seat.repeat,
            });
            if let Some(r) = reels.and_then(|r| r.get(idx)) {
                js["reel"] = json!(r);
            }
            js
        })
        .collect();
    json!({
        "perfect": outcome.perfect,
        "cannotAvoid": outcome.cannot_avoid,
        "repeated": outcome.repeated,
        "assignments": assignments,
    })
}

fn build_summary_js(request: &DrawRequest, outcome: &DrawOutcome, reels: Option<&[Vec<String>]>) -> JSValue {
    let c = OutputConfig {
        event: request.event_name.clone(),
        date: request.event_date.clone(),
        seed: request.seed.clone(),
        fallback_mode: match request.fallback_mode {
            FallbackMode::Greedy => "greedy".to_string(),
            FallbackMode::Maximum => "maximum".to_string(),
        },
    };
    json!({
        "config": c,
        "results": outcome_to_json(outcome, reels) })
}

fn record_history(path: &str, mode: HistoryMode, outcome: &DrawOutcome) -> DrawResult<()> {
    let existing = io_text::read_history(path)?;
    let updated = match mode {
        HistoryMode::Append => append_assignment(&existing, &outcome.assignment),
        HistoryMode::Accumulate => {
            let mut table = parse_history(&existing);
            table.record(&outcome.assignment);
            table.to_history_text()
        }
    };
    io_text::write_history(path, &updated)
}

/// Runs a draw and returns its summary.
///
/// `confirm` is asked whether repeated karts are acceptable when there is no other
/// way. It is not called if the request confirms in advance.
pub fn run_draw(
    request: &DrawRequest,
    confirm: &mut dyn FnMut(&str) -> bool,
) -> DrawResult<JSValue> {
    let history = match &request.history_path {
        Some(p) => io_text::read_history(p)?,
        None => String::new(),
    };
    let rules = request.rules();
    let builder = Builder::new(&rules)
        .and_then(|b| b.drivers(&request.drivers))
        .and_then(|b| b.karts(&request.karts))
        .and_then(|b| b.history(&history))
        .context(DrawSnafu {})?;
    let karts: Vec<Kart> = builder.karts_list().to_vec();
    debug!(
        "run_draw: drivers: {:?} karts: {:?}",
        builder.drivers_list(),
        karts
    );

    let mut rng = rules.rng();
    let outcome = match builder.start(&mut rng).context(DrawSnafu {})? {
        DrawStage::Done(outcome) => outcome,
        DrawStage::NeedsConfirmation(pending) => {
            let message = pending.message();
            warn!("{}", message);
            if request.auto_confirm || confirm(&message) {
                pending.confirm(&mut rng)
            } else {
                pending.abort();
                return AbortedSnafu {}.fail();
            }
        }
    };

    for seat in outcome.assignment.seats() {
        info!(
            "{} -> {}{}",
            seat.driver.name,
            seat.kart.label,
            if seat.repeat { " (repeat)" } else { "" }
        );
    }

    let reels: Option<Vec<Vec<String>>> = if request.with_reels {
        Some(
            outcome
                .assignment
                .seats()
                .iter()
                .map(|s| reel(&karts, &s.kart, &mut rng))
                .collect(),
        )
    } else {
        None
    };

    if let Some(mode) = request.record {
        match &request.history_path {
            Some(p) => record_history(p, mode, &outcome)?,
            None => whatever!("Cannot record the draw: no history file was given"),
        }
    }

    Ok(build_summary_js(request, &outcome, reels.as_deref()))
}

/// Writes the summary to a file, or to the standard output for `stdout`.
pub fn write_summary(summary: &JSValue, out: &str) -> DrawResult<()> {
    let pretty_js = serde_json::to_string_pretty(summary).context(ParsingJsonSnafu {})?;
    if out == "stdout" {
        println!("{}", pretty_js);
        Ok(())
    } else {
        info!("Writing summary to {:?}", out);
        fs::write(out, pretty_js).context(WritingFileSnafu { path: out })
    }
}

/// Compares a summary with a reference summary, and prints the differences.
pub fn check_summary(summary: &JSValue, reference_path: &str) -> DrawResult<()> {
    let summary_ref = read_summary(reference_path)?;
    let pretty_js_stats = serde_json::to_string_pretty(summary).context(ParsingJsonSnafu {})?;
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference summary");
        print_diff(
            pretty_js_summary_ref.as_str(),
            pretty_js_stats.as_ref(),
            "\n",
        );
        return ReferenceMismatchSnafu {}.fail();
    }
    Ok(())
}
