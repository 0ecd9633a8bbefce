use std::process::ExitCode;

use clap::Parser;
use daffy::cli::Cli;

fn main() -> ExitCode {
    Cli::parse().run()
}
