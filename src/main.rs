use clap::Parser;
use ematrend::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
