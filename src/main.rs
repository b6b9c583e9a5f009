use clap::Parser;
use env_logger::Env;

use refpy::cli::{run_cli, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    let exit_code = run_cli(&cli)?;
    std::process::exit(exit_code);
}
