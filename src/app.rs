use std::path::PathBuf;

use clap::{error::ErrorKind, Parser};
use colored::Colorize;

use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::logging;
use crate::output::{self, RenderSummary, ReportTemplate};
use crate::records;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub no_color: bool,
    pub verbose: u8,
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    let no_color = if args.color {
        false
    } else {
        args.no_color || cfg.no_color.unwrap_or(false)
    };
    let verbose = if args.verbose > 0 {
        args.verbose
    } else {
        cfg.verbose.unwrap_or(0)
    };

    let input = args
        .input
        .or(cfg.input)
        .unwrap_or_else(|| config::DEFAULT_INPUT.to_string());
    let output = args
        .output
        .or(cfg.output)
        .unwrap_or_else(|| config::DEFAULT_OUTPUT.to_string());
    let input = config::expand_tilde(input.trim());
    let output = config::expand_tilde(output.trim());
    validation::validate_paths(&input, &output)?;

    Ok(RunConfig {
        input,
        output,
        no_color,
        verbose,
    })
}

// Only an explicit --config is read, so a bare run always uses the defaults.
fn load_user_config(args: &CliArgs) -> Result<ConfigFile, String> {
    match args.config.as_deref() {
        Some(path) => config::load_config(&config::expand_tilde(path)),
        None => Ok(ConfigFile::default()),
    }
}

/// Loads every record from the input and writes the HTML report.
pub fn run(run: &RunConfig) -> Result<RenderSummary, String> {
    let loaded = records::load_records(&run.input).map_err(|e| e.to_string())?;
    if !loaded.failures.is_empty() {
        tracing::warn!(
            skipped = loaded.failures.len(),
            decoded = loaded.records.len(),
            "some documents could not be decoded"
        );
    }

    let rows = output::build_rows(&loaded.records);
    output::render(&rows, &ReportTemplate::default(), &run.output).map_err(|e| e.to_string())
}

fn completion_line(summary: &RenderSummary) -> String {
    format!(
        ":: Completed :: {} rows written to {} ::",
        summary.rows,
        summary.path.display()
    )
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                let _ = e.print();
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    let cfg = load_user_config(&args)?;
    let run_config = build_run_config(args, cfg)?;

    if run_config.no_color {
        colored::control::set_override(false);
    }
    logging::init_logging(run_config.verbose, run_config.no_color);
    tracing::info!(
        input = %run_config.input.display(),
        output = %run_config.output.display(),
        "starting report"
    );

    let summary = run(&run_config)?;
    println!("{}", completion_line(&summary).green());
    Ok(())
}
