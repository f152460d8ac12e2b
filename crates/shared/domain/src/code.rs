//! Sequential human-readable codes (`DIR-004`, `WU-012`, ...).
//!
//! The next code is derived from the codes that already exist; nothing
//! reserves it, so two creations racing each other can receive the same code.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::CODE_NUMBER_WIDTH;

static TRAILING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)$").expect("valid trailing-number regex"));

/// Numeric suffix of a code, if it ends in digits.
pub fn code_number(code: &str) -> Option<u64> {
    TRAILING_NUMBER
        .captures(code.trim())
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Next code for `prefix` given every existing code of the same type.
pub fn next_code<'a, I>(prefix: &str, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let max = existing.into_iter().filter_map(code_number).max().unwrap_or(0);
    format!(
        "{}-{:0width$}",
        prefix,
        max + 1,
        width = CODE_NUMBER_WIDTH
    )
}
