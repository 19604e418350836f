use std::process::ExitCode;

use clap::Parser;

use filterfe::cli::{self, CliArgs};
use filterfe::logger;

fn main() -> ExitCode {
    logger::init();
    let args = CliArgs::parse();
    cli::run(args)
}
