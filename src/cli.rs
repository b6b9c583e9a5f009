//! Command-line surface: two positional file paths, an output
//! verbosity flag, and a `--stats` summary flag.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use crate::error::CheckerError;
use crate::interpreter::run;
use crate::parse::opb::{parse_cnf_formula, parse_opb_formula};

/// Checks a cutting-planes proof against a pseudo-Boolean formula.
#[derive(Debug, Parser)]
#[command(name = "refpy", version, about)]
pub struct Cli {
    /// Formula file (`.opb` or `.cnf`, guessed from the extension).
    pub formula: PathBuf,

    /// Proof file.
    pub proof: PathBuf,

    /// Increase log verbosity; repeat for more (`-v` debug, `-vv` trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Print the number of constraints in the final database.
    #[arg(long)]
    pub stats: bool,
}

/// The process exit codes assigned to each outcome.
pub const EXIT_ACCEPTED: i32 = 0;
pub const EXIT_INVALID_PROOF: i32 = 1;
pub const EXIT_PARSE_ERROR: i32 = 2;

pub fn run_cli(cli: &Cli) -> Result<i32> {
    let formula_text = std::fs::read_to_string(&cli.formula)
        .with_context(|| format!("reading formula file {}", cli.formula.display()))?;
    let proof_text = std::fs::read_to_string(&cli.proof)
        .with_context(|| format!("reading proof file {}", cli.proof.display()))?;

    let formula = if is_cnf(&cli.formula) {
        parse_cnf_formula(&formula_text)
    } else {
        parse_opb_formula(&formula_text)
    };

    let result = formula.and_then(|formula| run(formula, &proof_text));

    match result {
        Ok(stats) => {
            if cli.stats {
                println!(
                    "accepted: {} constraints over {} proof lines",
                    stats.constraints, stats.proof_lines
                );
            } else {
                println!("accepted");
            }
            Ok(EXIT_ACCEPTED)
        }
        Err(err) => {
            eprintln!("{err}");
            Ok(exit_code_for(&err))
        }
    }
}

fn is_cnf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("cnf"))
        .unwrap_or(false)
}

fn exit_code_for(err: &CheckerError) -> i32 {
    if err.is_parse_error() {
        EXIT_PARSE_ERROR
    } else {
        EXIT_INVALID_PROOF
    }
}
