//! Fixture-driven end-to-end tests: every `.opb` (or `.cnf`) file under
//! `tests/fixtures/{correct,incorrect,parsing_failure}` is paired with a
//! `.proof` file of the same stem, and the directory it lives under says
//! what outcome running that pair must produce.

use std::fs;
use std::path::{Path, PathBuf};

use refpy::error::CheckerError;
use refpy::interpreter::run;
use refpy::parse::opb::{parse_cnf_formula, parse_opb_formula};

fn formula_files(dir: &str) -> Vec<PathBuf> {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(dir);
    let mut result = Vec::new();
    for entry in fs::read_dir(&root).unwrap_or_else(|e| panic!("reading {}: {e}", root.display())) {
        let path = entry.unwrap().path();
        match path.extension().and_then(|e| e.to_str()) {
            Some("opb") | Some("cnf") => result.push(path),
            _ => {}
        }
    }
    result.sort();
    result
}

fn run_pair(formula_path: &Path) -> Result<refpy::Stats, CheckerError> {
    let proof_path = formula_path.with_extension("proof");
    let formula_text = fs::read_to_string(formula_path)
        .unwrap_or_else(|e| panic!("reading {}: {e}", formula_path.display()));
    let proof_text = fs::read_to_string(&proof_path)
        .unwrap_or_else(|e| panic!("reading {}: {e}", proof_path.display()));

    let is_cnf = formula_path.extension().and_then(|e| e.to_str()) == Some("cnf");
    let formula = if is_cnf {
        parse_cnf_formula(&formula_text)
    } else {
        parse_opb_formula(&formula_text)
    }?;
    run(formula, &proof_text)
}

#[test]
fn correct_fixtures_are_accepted() {
    for path in formula_files("correct") {
        let result = run_pair(&path);
        assert!(
            result.is_ok(),
            "{} should have been accepted, got {:?}",
            path.display(),
            result.err()
        );
    }
}

#[test]
fn incorrect_fixtures_are_rejected_as_invalid_proofs() {
    for path in formula_files("incorrect") {
        let err = run_pair(&path)
            .err()
            .unwrap_or_else(|| panic!("{} should have been rejected", path.display()));
        assert!(
            err.is_invalid_proof(),
            "{} should fail as InvalidProof, got {err:?}",
            path.display()
        );
    }
}

#[test]
fn parsing_failure_fixtures_report_parse_errors() {
    for path in formula_files("parsing_failure") {
        let err = run_pair(&path)
            .err()
            .unwrap_or_else(|| panic!("{} should have failed to parse", path.display()));
        assert!(
            err.is_parse_error(),
            "{} should fail as a ParseError, got {err:?}",
            path.display()
        );
    }
}
