//! Boundary adapters: text in, typed values out. Hand-written
//! recursive-descent tokenizers for the small line-oriented OPB/CNF/proof
//! formats this checker reads.

pub mod opb;
pub mod proof;

/// Splits a line on runs of ASCII whitespace, returning each token paired
/// with its 1-based column (the grammar is ASCII-only, so byte offset and
/// character offset coincide).
pub(crate) fn tokenize(line: &str) -> Vec<(usize, &str)> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;
    for (i, ch) in line.char_indices() {
        if ch.is_ascii_whitespace() {
            if let Some(s) = start.take() {
                tokens.push((s + 1, &line[s..i]));
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        tokens.push((s + 1, &line[s..]));
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_reports_one_based_columns() {
        let toks = tokenize("  +1 x1 >= 1 ;");
        assert_eq!(
            toks,
            vec![(3, "+1"), (6, "x1"), (9, ">="), (12, "1"), (14, ";")]
        );
    }
}
