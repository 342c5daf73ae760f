use clap::Parser;

/// This is a kart draw program for karting leagues: every driver gets a kart they did not
/// use before, whenever possible.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON file describing the event: drivers, karts, history and rules.
    /// The other options override what this file specifies.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The roster of drivers. Its format is given by --input-type.
    #[clap(short, long, value_parser)]
    pub drivers: Option<String>,

    /// (default text) The type of the roster: text, csv or xlsx.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default 1) For csv and xlsx rosters, the column holding the names: a number starting at 1,
    /// or the letters of a spreadsheet column.
    #[clap(long, value_parser)]
    pub name_column: Option<String>,

    /// (default 1) For csv and xlsx rosters, the first row holding a driver, starting at 1.
    #[clap(long, value_parser)]
    pub first_row: Option<String>,

    /// (default: the first worksheet) When using an Excel file, the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (list of comma-separated values) The labels of the karts available for this draw.
    #[clap(short, long, value_parser)]
    pub karts: Option<String>,

    /// (file path) A file listing the karts, separated by commas or newlines. Cannot be used
    /// together with --karts.
    #[clap(long, value_parser, conflicts_with = "karts")]
    pub karts_file: Option<String>,

    /// (file path) The history file. Each line reads `Name: kart1, kart2` or `Name, kart1, kart2`.
    /// A missing file is an empty history.
    #[clap(long, value_parser)]
    pub history: Option<String>,

    /// (any text) Makes the draw reproducible: the same seed and inputs give the same draw.
    #[clap(long, value_parser)]
    pub seed: Option<String>,

    /// (greedy or maximum, default greedy) How karts are assigned when repeats cannot be avoided.
    #[clap(long, value_parser)]
    pub fallback: Option<String>,

    /// If passed as an argument, repeated karts are accepted without asking.
    #[clap(short, long, takes_value = false)]
    pub yes: bool,

    /// (append or accumulate) If specified, the draw is written back to the history file.
    #[clap(long, value_parser)]
    pub record: Option<String>,

    /// (file path or 'stdout', default stdout) Where the summary of the draw is written in JSON format.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference summary in JSON format. If provided, kartdraw checks that the draw
    /// matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// If passed as an argument, the summary includes the reel revealing each kart.
    #[clap(long, takes_value = false)]
    pub reel: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard error. The standard
    /// output is kept for the summary.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
