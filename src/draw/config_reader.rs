use crate::draw::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "eventName")]
    pub event_name: String,
    #[serde(rename = "eventDate")]
    pub event_date: Option<String>,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub event: String,
    pub date: Option<String>,
    pub seed: Option<String>,
    #[serde(rename = "fallbackMode")]
    pub fallback_mode: String,
}

/// Where to read the list of drivers from.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RosterSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "nameColumnIndex")]
    _name_column_index: Option<JSValue>,
    #[serde(rename = "firstRowIndex")]
    _first_row_index: Option<JSValue>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

impl RosterSource {
    pub fn new(provider: &str, file_path: &str) -> RosterSource {
        RosterSource {
            provider: provider.to_string(),
            file_path: file_path.to_string(),
            _name_column_index: None,
            _first_row_index: None,
            excel_worksheet_name: None,
        }
    }

    /// Sets where the names are, with the same conventions as the config file.
    pub fn with_layout(
        self,
        name_column: Option<&str>,
        first_row: Option<&str>,
        excel_worksheet_name: Option<&str>,
    ) -> RosterSource {
        RosterSource {
            _name_column_index: name_column.map(|s| JSValue::String(s.to_string())),
            _first_row_index: first_row.map(|s| JSValue::String(s.to_string())),
            excel_worksheet_name: excel_worksheet_name.map(|s| s.to_string()),
            ..self
        }
    }

    /// The column holding the driver names, starting at 0. Defaults to the first column.
    pub fn name_column_index(&self) -> DrawResult<usize> {
        match &self._name_column_index {
            None => Ok(0),
            x => Ok(read_js_int(x)? - 1),
        }
    }

    /// The first row holding a driver, starting at 1. Defaults to the first row.
    pub fn first_row_index(&self) -> DrawResult<usize> {
        match &self._first_row_index {
            None => Ok(1),
            x => read_js_int(x),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct DrawRulesConfig {
    #[serde(rename = "fallbackMode")]
    pub fallback_mode: Option<String>,
    #[serde(rename = "randomSeed")]
    pub random_seed: Option<String>,
    #[serde(rename = "historyMode")]
    pub history_mode: Option<String>,
}

impl DrawRulesConfig {
    pub fn fallback_mode(&self) -> DrawResult<FallbackMode> {
        match self.fallback_mode.as_deref() {
            None => Ok(FallbackMode::Greedy),
            Some(s) => parse_fallback_mode(s),
        }
    }

    pub fn history_mode(&self) -> DrawResult<Option<HistoryMode>> {
        self.history_mode
            .as_deref()
            .map(parse_history_mode)
            .transpose()
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DrawConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    pub roster: Option<RosterSource>,
    /// Drivers listed directly in the config, used when there is no roster file.
    pub drivers: Option<Vec<String>>,
    #[serde(default)]
    pub karts: Vec<String>,
    #[serde(rename = "historyFilePath")]
    pub history_file_path: Option<String>,
    #[serde(default)]
    pub rules: DrawRulesConfig,
}

pub fn parse_fallback_mode(s: &str) -> DrawResult<FallbackMode> {
    match s {
        "greedy" => Ok(FallbackMode::Greedy),
        "maximum" => Ok(FallbackMode::Maximum),
        _ => whatever!("unknown fallback mode: {}", s),
    }
}

pub fn parse_history_mode(s: &str) -> DrawResult<HistoryMode> {
    match s {
        "append" => Ok(HistoryMode::Append),
        "accumulate" => Ok(HistoryMode::Accumulate),
        _ => whatever!("unknown history mode: {}", s),
    }
}

pub fn read_config(path: &str) -> DrawResult<DrawConfig> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let config: DrawConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> DrawResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})
}

// Rows and columns are 1-based: a number, a string holding a number, or Excel
// column letters.
fn read_js_int(x: &Option<JSValue>) -> DrawResult<usize> {
    let res = match x {
        Some(JSValue::Number(n)) => n.as_u64().map(|x| x as usize),
        Some(JSValue::String(s)) if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic()) => {
            s.to_ascii_lowercase().chars().try_fold(0usize, |acc, c| {
                acc.checked_mul(26)?
                    .checked_add((c as usize) - ('a' as usize) + 1)
            })
        }
        Some(JSValue::String(s)) => s.trim().parse::<usize>().ok(),
        _ => None,
    };
    res.filter(|i| *i >= 1).context(ParsingJsonNumberSnafu {
        value: format!("{:?}", x),
    })
}
