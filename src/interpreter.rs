//! The proof interpreter: owns the append-only constraint database,
//! resolves antecedents, invokes rules, and tracks whether a goal rule
//! has succeeded.

use log::{debug, trace};

use crate::constraint::Constraint;
use crate::error::CheckerError;
use crate::parse::proof::parse_line;

/// A run's final size, surfaced for the CLI's `--stats` flag.
#[derive(Debug, Clone, Copy)]
pub struct Stats {
    pub constraints: usize,
    pub proof_lines: usize,
}

pub struct Interpreter {
    /// `database[i]` holds the constraint with id `i + 1`; id `0` is
    /// reserved and never looked up.
    database: Vec<Constraint>,
    formula: Option<Vec<Constraint>>,
    goal_reached: bool,
}

impl Interpreter {
    pub fn new(formula: Vec<Constraint>) -> Self {
        Interpreter {
            database: Vec::new(),
            formula: Some(formula),
            goal_reached: false,
        }
    }

    fn get(&self, id: u64) -> Result<&Constraint, CheckerError> {
        if id == 0 {
            return Err(CheckerError::UnknownAntecedent { id });
        }
        self.database
            .get(id as usize - 1)
            .ok_or(CheckerError::UnknownAntecedent { id })
    }

    /// Parses and executes one proof line, appending any constraints it
    /// produces to the database.
    pub fn process_line(&mut self, line: &str, line_no: usize) -> Result<(), CheckerError> {
        let rule = parse_line(line, line_no, &mut self.formula)?;
        let antecedent_ids = rule.antecedent_ids();

        let produced = {
            let mut antecedents = Vec::with_capacity(antecedent_ids.len());
            for id in &antecedent_ids {
                antecedents.push(self.get(*id)?);
            }
            rule.compute(&antecedents)?
        };

        if produced.len() != rule.num_constraints() {
            return Err(CheckerError::Internal(format!(
                "line {line_no}: rule produced {} constraints, declared {}",
                produced.len(),
                rule.num_constraints()
            )));
        }

        for constraint in produced {
            self.database.push(constraint);
            trace!("db[{}] = {}", self.database.len(), self.database.last().unwrap());
        }

        if rule.is_goal() {
            debug!("line {line_no}: goal rule succeeded");
            self.goal_reached = true;
        }

        Ok(())
    }

    pub fn accept(&self) -> Result<(), CheckerError> {
        if self.goal_reached {
            Ok(())
        } else {
            Err(CheckerError::MissingGoal)
        }
    }

    pub fn stats(&self, proof_lines: usize) -> Stats {
        Stats {
            constraints: self.database.len(),
            proof_lines,
        }
    }
}

/// Runs a whole proof against a preloaded formula: every proof line is
/// processed in order, then acceptance requires at least one successful
/// goal rule.
pub fn run(formula: Vec<Constraint>, proof_text: &str) -> Result<Stats, CheckerError> {
    let mut interpreter = Interpreter::new(formula);
    let mut proof_lines = 0;
    for (line_no, line) in proof_text.lines().enumerate() {
        let line_no = line_no + 1;
        if line.trim().is_empty() {
            continue;
        }
        interpreter.process_line(line, line_no)?;
        proof_lines += 1;
    }
    interpreter.accept()?;
    Ok(interpreter.stats(proof_lines))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::opb::parse_opb_formula;

    #[test]
    fn contradiction_from_unit_clauses_is_accepted() {
        let formula = parse_opb_formula("+1 x1 >= 1 ;\n+1 ~x1 >= 1 ;\n").unwrap();
        let proof = "f 2 0\na 1 1 1 2 0\nc 3 0\n";
        let stats = run(formula, proof).unwrap();
        assert_eq!(stats.constraints, 3);
    }

    #[test]
    fn equality_goal_is_accepted() {
        let formula = parse_opb_formula("+1 x1 +1 x2 >= 1 ;\n").unwrap();
        let proof = "f 1 0\ne 1 opb +1 x1 +1 x2 >= 1 ;\n";
        assert!(run(formula, proof).is_ok());
    }

    #[test]
    fn equality_goal_rejects_wrong_degree() {
        let formula = parse_opb_formula("+1 x1 +1 x2 >= 1 ;\n").unwrap();
        let proof = "f 1 0\ne 1 opb +1 x1 +1 x2 >= 2 ;\n";
        let err = run(formula, proof).unwrap_err();
        assert!(matches!(err, CheckerError::EqualityCheckFailed { .. }));
    }

    #[test]
    fn proof_without_a_goal_is_rejected() {
        let formula = parse_opb_formula("+1 x1 >= 0 ;\n").unwrap();
        let proof = "f 1 0\n";
        let err = run(formula, proof).unwrap_err();
        assert!(matches!(err, CheckerError::MissingGoal));
    }

    #[test]
    fn unknown_antecedent_is_a_reference_error() {
        let formula = parse_opb_formula("+1 x1 >= 0 ;\n").unwrap();
        let proof = "f 1 0\nc 5 0\n";
        let err = run(formula, proof).unwrap_err();
        assert!(matches!(err, CheckerError::UnknownAntecedent { id: 5 }));
    }
}
