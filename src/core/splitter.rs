//! Splits a raw module definition into top-level steps.
//!
//! Catalog entries wrap definitions across lines at arbitrary points, so a
//! step is only finished once its parentheses balance again.

use crate::utils::error::{CompletenessError, Result};

/// True when every `)` closes an earlier `(` and nothing is left open.
pub fn is_balanced(text: &str) -> bool {
    let mut depth: usize = 0;
    for ch in text.chars() {
        match ch {
            '(' => depth += 1,
            ')' => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            _ => {}
        }
    }
    depth == 0
}

/// Ordered, parenthesis-balanced steps of `raw_definition`.
///
/// Fragments are whitespace-delimited; an unbalanced fragment keeps absorbing
/// the following ones (joined by a single space) until the buffer balances.
pub fn split(raw_definition: &str) -> Result<Vec<String>> {
    let mut steps = Vec::new();
    let mut buffer = String::new();

    for fragment in raw_definition.split_whitespace() {
        if !buffer.is_empty() {
            buffer.push(' ');
        }
        buffer.push_str(fragment);

        if is_balanced(&buffer) {
            steps.push(std::mem::take(&mut buffer));
        }
    }

    if !buffer.is_empty() {
        return Err(CompletenessError::UnbalancedDefinition { definition: buffer });
    }

    Ok(steps)
}
