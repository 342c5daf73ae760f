mod args;
mod draw;

use clap::Parser;
use log::{debug, info, LevelFilter};
use std::error::Error;

use crate::args::Args;
use crate::draw::config_reader::{parse_fallback_mode, parse_history_mode, RosterSource};
use crate::draw::*;

// Reads the config file (if any), then applies the command line on top of it.
fn build_request(args: &Args) -> DrawResult<DrawRequest> {
    let mut request = match &args.config {
        Some(config_path) => request_from_config(config_path)?,
        None => DrawRequest::default(),
    };

    if let Some(path) = &args.drivers {
        let input_type = args.input_type.clone().unwrap_or_else(|| "text".to_string());
        let source = RosterSource::new(&input_type, path).with_layout(
            args.name_column.as_deref(),
            args.first_row.as_deref(),
            args.excel_worksheet_name.as_deref(),
        );
        request.drivers = read_roster(path, &source)?;
    }
    if let Some(karts) = &args.karts {
        request.karts = kart_draw::parse_karts(karts)
            .into_iter()
            .map(|k| k.label)
            .collect();
    }
    if let Some(path) = &args.karts_file {
        request.karts = read_kart_list(path)?;
    }
    if let Some(path) = &args.history {
        request.history_path = Some(path.clone());
    }
    if let Some(seed) = &args.seed {
        request.seed = Some(seed.clone());
    }
    if let Some(mode) = &args.fallback {
        request.fallback_mode = parse_fallback_mode(mode)?;
    }
    if let Some(mode) = &args.record {
        request.record = Some(parse_history_mode(mode)?);
    }
    request.auto_confirm = args.yes;
    request.with_reels = args.reel;
    debug!("build_request: {:?}", request);
    Ok(request)
}

fn run(args: &Args) -> DrawResult<()> {
    let request = build_request(args)?;
    let mut confirm = prompt_confirmation;
    let summary = run_draw(&request, &mut confirm)?;

    let out = args
        .out
        .clone()
        .or_else(|| request.summary_path.clone())
        .unwrap_or_else(|| "stdout".to_string());
    write_summary(&summary, &out)?;

    if let Some(reference_path) = &args.reference {
        check_summary(&summary, reference_path)?;
        info!("The draw matches the reference {:?}", reference_path);
    }
    Ok(())
}

fn main() {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }
    debug!("args: {:?}", args);

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        let mut source = e.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {}", cause);
            source = cause.source();
        }
        std::process::exit(1);
    }
}
