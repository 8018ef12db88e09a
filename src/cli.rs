//! Purpose: Shared command-line front end for the `csv2meta` executables.
//! Exports: `main`, `run`, `RunOutcome`.
//! Role: Parses args, runs the converter under a fixed profile, writes JSON to stdout.
//! Invariants: Stdout is written once, only after the whole table converted successfully.
//! Invariants: Diagnostics go to stderr; exit code is derived from `to_exit_code`.
//! Invariants: Logging goes to stderr and is filtered by `RUST_LOG` (default: warn).
use std::error::Error as StdError;
use std::ffi::OsString;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use clap::{CommandFactory, FromArgMatches, Parser, ValueHint, error::ErrorKind as ClapErrorKind};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::core::convert::{ConvertConfig, DEFAULT_SKIP, convert_path};
use crate::core::error::{Error, ErrorKind, to_exit_code};
use crate::core::profile::Profile;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RunOutcome {
    pub exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

#[derive(Parser, Debug)]
#[command(version, long_about = None)]
struct Cli {
    #[arg(
        long,
        value_name = "N",
        default_value_t = DEFAULT_SKIP as i64,
        allow_negative_numbers = true,
        help = "Header lines to skip (zero or negative skips nothing)"
    )]
    skip: i64,
    #[arg(value_name = "CSV", value_hint = ValueHint::FilePath)]
    csv: PathBuf,
}

/// Entry point used by the binaries; never returns.
pub fn main(profile: Profile, bin_name: &'static str) -> ! {
    let exit_code = match run(profile, bin_name, std::env::args_os()) {
        Ok(outcome) => outcome.exit_code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

pub fn run<I>(profile: Profile, bin_name: &'static str, args: I) -> Result<RunOutcome, Error>
where
    I: IntoIterator<Item = OsString>,
{
    let cli = match parse_cli(profile, bin_name, args) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => {
                err.print().map_err(|io_err| {
                    Error::new(ErrorKind::Io)
                        .with_message("failed to write help")
                        .with_source(io_err)
                })?;
                return Ok(RunOutcome::with_code(0));
            }
            _ => {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(clap_error_summary(&err))
                    .with_hint(format!("Try `{bin_name} --help`.")));
            }
        },
    };

    init_tracing();

    let config = ConvertConfig {
        profile,
        skip: u64::try_from(cli.skip).unwrap_or(0),
    };
    let (records, outcome) = convert_path(&cli.csv, config)
        .map_err(|err| add_shape_hint(err, profile))
        .map_err(add_parse_hint)
        .map_err(add_io_hint)?;
    info!(
        profile = profile.name(),
        rows = outcome.rows_total,
        skipped = outcome.skipped,
        empty_keys = outcome.empty_keys,
        overwritten = outcome.overwritten,
        records = records.len(),
        "converted csv"
    );

    let json = records.to_json_string().map_err(add_internal_hint)?;
    write_stdout(&json)?;
    Ok(RunOutcome::ok())
}

fn parse_cli<I>(profile: Profile, bin_name: &'static str, args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = OsString>,
{
    let command = Cli::command()
        .name(bin_name)
        .bin_name(bin_name)
        .about(format!("csv2meta converter for decompose ({} profile)", profile.name()))
        .mut_arg("csv", |arg| {
            arg.help(format!(
                "CSV to convert, with {} columns (at least): {}",
                profile.width(),
                profile.column_list()
            ))
        });
    let matches = command.try_get_matches_from(args)?;
    Cli::from_arg_matches(&matches)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn write_stdout(json: &str) -> Result<(), Error> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(json.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to write output")
                .with_source(err)
        })
}

fn add_shape_hint(err: Error, profile: Profile) -> Error {
    if err.kind() != ErrorKind::Shape || err.hint().is_some() {
        return err;
    }
    err.with_hint(format!(
        "Every data row needs the columns: {}. Quote fields that contain commas, or raise --skip to pass over header lines.",
        profile.column_list()
    ))
}

fn add_parse_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Parse || err.hint().is_some() {
        return err;
    }
    err.with_hint("Check quoting near this row; input must be UTF-8 encoded CSV.")
}

fn add_io_hint(err: Error) -> Error {
    if err.hint().is_some() {
        return err;
    }
    match err.kind() {
        ErrorKind::NotFound => err.with_hint("Check the csv path."),
        ErrorKind::Permission => err.with_hint("Permission denied. Check the file permissions."),
        ErrorKind::Io => err.with_hint("I/O error. Check the path and filesystem."),
        _ => err,
    }
}

fn add_internal_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Internal || err.hint().is_some() {
        return err;
    }
    err.with_hint(
        "Unexpected internal failure. Retry with RUST_BACKTRACE=1 and share the input if it persists.",
    )
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error) {
    let use_color = io::stderr().is_terminal();
    eprintln!("{}", error_text(err, use_color));
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::NotFound => "not found".to_string(),
        ErrorKind::Permission => "permission denied".to_string(),
        ErrorKind::Shape => "row is too short".to_string(),
        ErrorKind::Parse => "malformed input".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    ));

    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(path) = err.path() {
        lines.push(format!(
            "{} {}",
            colorize_label("path:", use_color, AnsiColor::Yellow),
            path.display()
        ));
    }
    if let Some(row) = err.row() {
        lines.push(format!(
            "{} {row}",
            colorize_label("row:", use_color, AnsiColor::Yellow)
        ));
    }

    if let Some(cause) = StdError::source(err) {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }

    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}
