use clap::Parser;
use marketstage::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
