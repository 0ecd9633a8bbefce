//! The `daffy` command-line front end.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::catalog::builtin_catalog;
use crate::interpreter::{run_instruction, run_program};
use crate::scheduled::Scheduler;

/// A runtime for a minimal dataflow assembly language.
#[derive(Parser, Debug)]
#[command(name = "daffy", version, about)]
pub struct Cli {
    /// Raise the log level to debug. Logs go to standard error.
    #[arg(short, long)]
    verbose: bool,

    /// Run a single instruction instead of a program file.
    #[arg(short, long, value_name = "CMD", conflicts_with = "file")]
    cmd: Option<String>,

    /// A program file to run, one instruction per line.
    #[arg(
        value_name = "FILE",
        required_unless_present = "cmd",
        conflicts_with = "cmd"
    )]
    file: Option<PathBuf>,
}

impl Cli {
    /// Runs the parsed command line to completion and returns the
    /// process exit code: success if every instruction parsed, submitted
    /// and executed cleanly, failure otherwise.
    pub fn run(self) -> ExitCode {
        init_logging(self.verbose);

        let scheduler = Scheduler::new(builtin_catalog());

        let ok = if let Some(cmd) = &self.cmd {
            run_instruction(cmd, &scheduler)
        } else if let Some(path) = &self.file {
            match fs::read_to_string(path) {
                Ok(contents) => run_program(contents.lines(), &scheduler),
                Err(error) => {
                    tracing::error!(path = %path.display(), %error, "failed to open program file");
                    false
                }
            }
        } else {
            // clap's required_unless_present/conflicts_with pairing
            // guarantees exactly one of `cmd`/`file` is set by the time
            // `run` is called.
            unreachable!("neither -c nor a program file was given")
        };

        if ok {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

/// The default log level `-v`/`--verbose` selects, absent an explicit
/// `RUST_LOG` override: `debug` when passed, `warn` otherwise.
fn default_log_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_level(verbose)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_flag_selects_debug_level() {
        assert_eq!(default_log_level(true), "debug");
        assert_eq!(default_log_level(false), "warn");
    }

    #[test]
    fn cmd_and_file_are_mutually_exclusive() {
        let result = Cli::try_parse_from(["daffy", "-c", "$x: value(value=1.0)", "program.daffy"]);
        assert!(result.is_err());
    }

    #[test]
    fn requires_either_cmd_or_file() {
        let result = Cli::try_parse_from(["daffy"]);
        assert!(result.is_err());
    }

    #[test]
    fn accepts_cmd_alone() {
        let cli = Cli::try_parse_from(["daffy", "-c", "$x: value(value=1.0)"]).unwrap();
        assert_eq!(cli.cmd.as_deref(), Some("$x: value(value=1.0)"));
        assert!(cli.file.is_none());
    }

    #[test]
    fn accepts_file_alone() {
        let cli = Cli::try_parse_from(["daffy", "program.daffy"]).unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("program.daffy")));
        assert!(cli.cmd.is_none());
    }
}
