//! Per-rule-line parsing: dispatches on the leading tag character, then
//! parses the remainder against that rule's own grammar.

use num_bigint::BigInt;

use super::opb::{parse_cnf_tokens, parse_opb_tokens};
use super::tokenize;
use crate::error::CheckerError;
use crate::rules::{RuleLine, Summand};

/// Parses one proof line. `formula` is consumed (taken) the first time a
/// `f` line is encountered; a second `f` line is a parse error, matching
/// the source's "formula can only be loaded once" restriction.
pub fn parse_line(
    line: &str,
    line_no: usize,
    formula: &mut Option<Vec<crate::constraint::Constraint>>,
) -> Result<RuleLine, CheckerError> {
    let mut chars = line.chars();
    let tag = chars
        .next()
        .ok_or_else(|| CheckerError::parse("empty proof line", line_no, 1))?;
    let rest = &line[tag.len_utf8()..];
    let tokens = tokenize(rest);

    match tag {
        'f' => parse_f(&tokens, line_no, formula),
        'l' => parse_l(&tokens, line_no),
        'a' => Ok(RuleLine::LinearCombination {
            summands: parse_pair_sequence(&tokens, line_no)?,
        }),
        'd' => parse_d(&tokens, line_no),
        's' => Ok(RuleLine::Saturation {
            summands: parse_pair_sequence(&tokens, line_no)?,
        }),
        'p' => parse_p(&tokens, line_no),
        'e' => parse_e(&tokens, line_no),
        'c' => parse_c(&tokens, line_no),
        other => Err(CheckerError::parse(
            format!("unknown rule tag '{other}'"),
            line_no,
            1,
        )),
    }
}

fn expect_zero(tokens: &[(usize, &str)], idx: usize, line_no: usize) -> Result<(), CheckerError> {
    match tokens.get(idx) {
        Some((_, "0")) if idx + 1 == tokens.len() => Ok(()),
        Some((col, tok)) => Err(CheckerError::parse(
            format!("expected terminating '0', got '{tok}'"),
            line_no,
            *col,
        )),
        None => Err(CheckerError::parse(
            "expected terminating '0'",
            line_no,
            tokens.last().map(|t| t.0 + 1).unwrap_or(1),
        )),
    }
}

fn parse_u64(tok: (usize, &str), line_no: usize, what: &str) -> Result<u64, CheckerError> {
    tok.1
        .parse()
        .map_err(|_| CheckerError::parse(format!("expected {what}, got '{}'", tok.1), line_no, tok.0))
}

fn parse_bigint(tok: (usize, &str), line_no: usize, what: &str) -> Result<BigInt, CheckerError> {
    tok.1
        .parse()
        .map_err(|_| CheckerError::parse(format!("expected {what}, got '{}'", tok.1), line_no, tok.0))
}

fn parse_f(
    tokens: &[(usize, &str)],
    line_no: usize,
    formula: &mut Option<Vec<crate::constraint::Constraint>>,
) -> Result<RuleLine, CheckerError> {
    let loaded = formula.take().ok_or_else(|| {
        CheckerError::parse("the formula can only be loaded once", line_no, 1)
    })?;

    let (claimed, zero_idx) = match tokens.first() {
        Some((col, tok)) if *tok != "0" => {
            let n = parse_u64((*col, tok), line_no, "a claimed constraint count")?;
            (Some(n), 1)
        }
        _ => (None, 0),
    };
    expect_zero(tokens, zero_idx, line_no)?;

    if let Some(n) = claimed {
        if n as usize != loaded.len() {
            return Err(CheckerError::parse(
                format!(
                    "claimed formula has {n} constraints but the loaded formula has {}",
                    loaded.len()
                ),
                line_no,
                1,
            ));
        }
    }

    Ok(RuleLine::LoadFormula { formula: loaded })
}

fn parse_l(tokens: &[(usize, &str)], line_no: usize) -> Result<RuleLine, CheckerError> {
    let first = tokens
        .first()
        .copied()
        .ok_or_else(|| CheckerError::parse("expected number of literals", line_no, 1))?;
    let num_literals = parse_u64(first, line_no, "a positive number of literals")?;
    if num_literals == 0 {
        return Err(CheckerError::parse(
            "number of literals must be positive",
            line_no,
            first.0,
        ));
    }
    expect_zero(tokens, 1, line_no)?;
    Ok(RuleLine::LoadLiteralAxioms { num_literals })
}

/// Parses the shared `(factor, id)+ 0` grammar used by `a`, `d`, and `s`
/// (`d` additionally prefixes it with the divisor, parsed by the caller).
fn parse_pair_sequence(
    tokens: &[(usize, &str)],
    line_no: usize,
) -> Result<Vec<Summand>, CheckerError> {
    let mut summands = Vec::new();
    let mut idx = 0;
    while idx < tokens.len() && tokens[idx].1 != "0" {
        let factor = parse_bigint(tokens[idx], line_no, "a factor")?;
        idx += 1;
        let id_tok = tokens.get(idx).copied().ok_or_else(|| {
            CheckerError::parse("expected an antecedent id after factor", line_no, tokens[idx - 1].0)
        })?;
        let antecedent_id = parse_u64(id_tok, line_no, "an antecedent id")?;
        if antecedent_id == 0 {
            return Err(CheckerError::parse(
                "antecedent id must be positive",
                line_no,
                id_tok.0,
            ));
        }
        idx += 1;
        summands.push(Summand {
            factor,
            antecedent_id,
        });
    }
    if summands.is_empty() {
        return Err(CheckerError::parse(
            "expected at least one (factor, id) pair",
            line_no,
            1,
        ));
    }
    expect_zero(tokens, idx, line_no)?;
    Ok(summands)
}

fn parse_d(tokens: &[(usize, &str)], line_no: usize) -> Result<RuleLine, CheckerError> {
    let first = tokens
        .first()
        .copied()
        .ok_or_else(|| CheckerError::parse("expected a divisor", line_no, 1))?;
    let divisor = parse_bigint(first, line_no, "a positive divisor")?;
    use num_traits::Zero;
    if divisor <= BigInt::zero() {
        return Err(CheckerError::parse("divisor must be positive", line_no, first.0));
    }
    let summands = parse_pair_sequence(&tokens[1..], line_no)?;
    Ok(RuleLine::Division { divisor, summands })
}

fn parse_p(tokens: &[(usize, &str)], line_no: usize) -> Result<RuleLine, CheckerError> {
    use crate::rpn::{preprocess, RpnToken};

    let mut raw = Vec::new();
    let mut stack_size: i64 = 0;
    let mut tokens = tokens;
    // The trailing '0' terminator is optional for this rule; drop it if present.
    if let Some((_, "0")) = tokens.last() {
        tokens = &tokens[..tokens.len() - 1];
    }

    for &(col, tok) in tokens {
        let token = match tok {
            "+" => RpnToken::Add,
            "*" => RpnToken::Mul,
            "d" => RpnToken::Div,
            "s" => RpnToken::Sat,
            digits => {
                let id = parse_u64((col, digits), line_no, "an id, or one of '+ * d s'")?;
                RpnToken::Int(id)
            }
        };
        stack_size += match token {
            RpnToken::Int(_) => 1,
            RpnToken::Add | RpnToken::Mul | RpnToken::Div => -1,
            RpnToken::Sat => 0,
        };
        if stack_size < 0 {
            return Err(CheckerError::parse(
                "popping from an empty stack in reverse Polish notation",
                line_no,
                col,
            ));
        }
        raw.push(token);
    }

    if stack_size != 1 {
        return Err(CheckerError::parse(
            "non-singleton stack at end of reverse Polish notation sequence",
            line_no,
            1,
        ));
    }

    Ok(RuleLine::Rpn {
        instructions: preprocess(raw),
    })
}

fn parse_e(tokens: &[(usize, &str)], line_no: usize) -> Result<RuleLine, CheckerError> {
    let id_tok = tokens
        .first()
        .copied()
        .ok_or_else(|| CheckerError::parse("expected an antecedent id", line_no, 1))?;
    let antecedent_id = parse_u64(id_tok, line_no, "an antecedent id")?;
    if antecedent_id == 0 {
        return Err(CheckerError::parse(
            "antecedent id must be positive",
            line_no,
            id_tok.0,
        ));
    }

    let kind = tokens
        .get(1)
        .copied()
        .ok_or_else(|| CheckerError::parse("expected 'opb' or 'cnf'", line_no, id_tok.0))?;
    let rest = &tokens[2..];
    let constraints = match kind.1 {
        "opb" => parse_opb_tokens(rest, false, line_no)?,
        "cnf" => vec![parse_cnf_tokens(rest, line_no)?],
        other => {
            return Err(CheckerError::parse(
                format!("expected 'opb' or 'cnf', got '{other}'"),
                line_no,
                kind.0,
            ))
        }
    };

    Ok(RuleLine::ConstraintEquals {
        antecedent_id,
        constraint: constraints.into_iter().next().unwrap(),
    })
}

fn parse_c(tokens: &[(usize, &str)], line_no: usize) -> Result<RuleLine, CheckerError> {
    if tokens.len() != 2 {
        return Err(CheckerError::parse(
            "expected exactly 'id 0'",
            line_no,
            tokens.first().map(|t| t.0).unwrap_or(1),
        ));
    }
    let antecedent_id = parse_u64(tokens[0], line_no, "an antecedent id")?;
    if antecedent_id == 0 {
        return Err(CheckerError::parse(
            "antecedent id must be positive",
            line_no,
            tokens[0].0,
        ));
    }
    if tokens[1].1 != "0" {
        return Err(CheckerError::parse(
            format!("expected terminating '0', got '{}'", tokens[1].1),
            line_no,
            tokens[1].0,
        ));
    }
    Ok(RuleLine::IsContradiction { antecedent_id })
}
