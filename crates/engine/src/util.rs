//! Internal helpers for input validation and normalization.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::{EngineError, ResultEngine};

/// Validate a username or password against the credential allow-list:
/// ASCII letters, digits, `_` and `.`, at least one character.
pub(crate) fn validate_credential(value: &str, label: &str) -> ResultEngine<()> {
    if value.is_empty() {
        return Err(EngineError::InvalidFormat(format!(
            "{label}: must not be empty"
        )));
    }
    if !value
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '.')
    {
        return Err(EngineError::InvalidFormat(format!(
            "{label}: only letters, digits, '_' and '.' are allowed"
        )));
    }
    Ok(())
}

/// Collapse internal whitespace and trim, keeping the user's casing.
pub(crate) fn normalize_category_display(input: &str) -> ResultEngine<String> {
    let mut out = String::new();
    for token in input.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(token);
    }
    if out.is_empty() {
        return Err(EngineError::InvalidFormat(
            "category name: must not be empty".to_string(),
        ));
    }
    Ok(out)
}

/// Reduce a category name to its lookup key: NFKD, combining marks stripped,
/// lowercased, runs of non-alphanumeric characters folded to single spaces.
pub(crate) fn normalize_category_key(input: &str) -> ResultEngine<String> {
    let mut out = String::new();
    let mut prev_space = false;
    for ch in input.trim().nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            prev_space = false;
        } else if !out.is_empty() && !prev_space {
            out.push(' ');
            prev_space = true;
        }
    }
    let key = out.trim_end().to_string();
    if key.is_empty() {
        return Err(EngineError::InvalidFormat(
            "category name: must not be empty".to_string(),
        ));
    }
    Ok(key)
}
