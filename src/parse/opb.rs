//! OPB and CNF formula/constraint parsing.

use num_bigint::BigInt;
use num_traits::One;

use super::tokenize;
use crate::constraint::{boolean_upper_bound, Constraint, Term};
use crate::error::CheckerError;

/// Parses a whole OPB file: comment lines (leading `*`) and blank lines are
/// skipped; every other line is a constraint, `=` expanding to two.
pub fn parse_opb_formula(text: &str) -> Result<Vec<Constraint>, CheckerError> {
    let mut result = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line_no = line_no + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('*') {
            continue;
        }
        let tokens = tokenize(line);
        result.extend(parse_opb_tokens(&tokens, true, line_no)?);
    }
    Ok(result)
}

/// Parses a whole DIMACS CNF file: `c` comment lines and the `p cnf ...`
/// problem line are skipped; every other line is a clause.
pub fn parse_cnf_formula(text: &str) -> Result<Vec<Constraint>, CheckerError> {
    let mut result = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line_no = line_no + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('c') || trimmed.starts_with('p') {
            continue;
        }
        let tokens = tokenize(line);
        result.push(parse_cnf_tokens(&tokens, line_no)?);
    }
    Ok(result)
}

/// Parses one `opb_constraint` from already-tokenized input, used both for
/// whole formula lines (`allow_eq = true`) and for rule `e`'s inline `opb`
/// argument (`allow_eq = false`).
pub fn parse_opb_tokens(
    tokens: &[(usize, &str)],
    allow_eq: bool,
    line_no: usize,
) -> Result<Vec<Constraint>, CheckerError> {
    let mut terms = Vec::new();
    let mut idx = 0;

    while idx < tokens.len() && tokens[idx].1 != ">=" && tokens[idx].1 != "=" {
        let (coeff_col, coeff_tok) = tokens[idx];
        let coefficient: BigInt = coeff_tok
            .parse()
            .map_err(|_| CheckerError::parse(format!("expected a coefficient, got '{coeff_tok}'"), line_no, coeff_col))?;
        idx += 1;

        let (lit_col, lit_tok) = *tokens.get(idx).ok_or_else(|| {
            CheckerError::parse("expected a literal after coefficient", line_no, coeff_col)
        })?;
        let literal = parse_literal(lit_tok, line_no, lit_col)?;
        idx += 1;

        terms.push(Term::new(coefficient, literal));
    }

    let (rel_col, relation) = *tokens
        .get(idx)
        .ok_or_else(|| CheckerError::parse("expected '>=' or '='", line_no, 1))?;
    idx += 1;
    if relation == "=" && !allow_eq {
        return Err(CheckerError::parse(
            "'=' is not allowed in this context",
            line_no,
            rel_col,
        ));
    }

    let (degree_col, degree_tok) = *tokens
        .get(idx)
        .ok_or_else(|| CheckerError::parse("expected a degree", line_no, rel_col))?;
    let degree: BigInt = degree_tok
        .parse()
        .map_err(|_| CheckerError::parse(format!("expected a degree, got '{degree_tok}'"), line_no, degree_col))?;
    idx += 1;

    let (semi_col, semi_tok) = *tokens
        .get(idx)
        .ok_or_else(|| CheckerError::parse("expected ';'", line_no, degree_col))?;
    if semi_tok != ";" {
        return Err(CheckerError::parse(
            format!("expected ';', got '{semi_tok}'"),
            line_no,
            semi_col,
        ));
    }
    idx += 1;
    if idx != tokens.len() {
        let (trailing_col, trailing_tok) = tokens[idx];
        return Err(CheckerError::parse(
            format!("unexpected trailing token '{trailing_tok}'"),
            line_no,
            trailing_col,
        ));
    }

    let mut result = vec![Constraint::new(
        terms.clone(),
        degree.clone(),
        boolean_upper_bound(),
    )];
    if relation == "=" {
        let negated: Vec<Term> = terms
            .iter()
            .map(|t| Term::new(-t.coefficient.clone(), t.literal))
            .collect();
        result.push(Constraint::new(negated, -degree, boolean_upper_bound()));
    }
    Ok(result)
}

/// Parses one `cnf_clause`: a sequence of signed literals terminated by
/// `0`.
pub fn parse_cnf_tokens(
    tokens: &[(usize, &str)],
    line_no: usize,
) -> Result<Constraint, CheckerError> {
    let mut terms = Vec::new();
    for &(col, tok) in tokens {
        let value: i64 = tok
            .parse()
            .map_err(|_| CheckerError::parse(format!("expected an integer, got '{tok}'"), line_no, col))?;
        if value == 0 {
            return Ok(Constraint::new(terms, BigInt::one(), boolean_upper_bound()));
        }
        terms.push(Term::new(BigInt::one(), value));
    }
    Err(CheckerError::parse(
        "clause is missing its terminating 0",
        line_no,
        tokens.last().map(|t| t.0 + 1).unwrap_or(1),
    ))
}

fn parse_literal(tok: &str, line_no: usize, col: usize) -> Result<i64, CheckerError> {
    let (negated, rest) = match tok.strip_prefix('~') {
        Some(rest) => (true, rest),
        None => (false, tok),
    };
    let rest = rest
        .strip_prefix('x')
        .ok_or_else(|| CheckerError::parse(format!("expected a literal, got '{tok}'"), line_no, col))?;
    let variable: i64 = rest
        .parse()
        .map_err(|_| CheckerError::parse(format!("expected a literal, got '{tok}'"), line_no, col))?;
    if variable <= 0 {
        return Err(CheckerError::parse(
            format!("variable index must be positive, got '{tok}'"),
            line_no,
            col,
        ));
    }
    Ok(if negated { -variable } else { variable })
}
