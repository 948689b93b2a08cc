//! Small text helpers shared by the backend services and the terminal UI.

use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;

lazy_static! {
    /// Leading bullet marker: `-`, `•`, `*` or `12.` followed by whitespace.
    pub static ref BULLET_PREFIX_REGEX: Regex = Regex::new(r"^\s*(?:[-\u{2022}*]|\d+\.)\s+").unwrap();
    static ref WHITESPACE_REGEX: Regex = Regex::new(r"\s+").unwrap();
}

/// Returns true when the line starts with a bullet marker.
pub fn is_bullet(line: &str) -> bool {
    BULLET_PREFIX_REGEX.is_match(line)
}

/// Strips a bullet marker and collapses whitespace (tabs and newlines included).
pub fn clean_bullet(text: &str) -> String {
    let flattened = text.replace(['\t', '\r', '\n'], " ");
    let without_marker = BULLET_PREFIX_REGEX.replace(&flattened, "");
    WHITESPACE_REGEX.replace_all(&without_marker, " ").trim().to_string()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Case-insensitive search for `token` that is not glued to other word characters.
///
/// `"CI/CD"` matches in `"built CI/CD pipelines"` but `"SQL"` does not match
/// inside `"PostgreSQL"`.
pub fn has_token(text: &str, token: &str) -> bool {
    let token = token.trim();
    if token.is_empty() || text.is_empty() {
        return false;
    }
    let re = match RegexBuilder::new(&regex::escape(token))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => re,
        Err(_) => return false,
    };

    let mut start = 0;
    while start <= text.len() {
        let Some(m) = re.find_at(text, start) else {
            break;
        };
        let before_ok = text[..m.start()]
            .chars()
            .next_back()
            .map_or(true, |c| !is_word_char(c));
        let after_ok = text[m.end()..]
            .chars()
            .next()
            .map_or(true, |c| !is_word_char(c));
        if before_ok && after_ok {
            return true;
        }
        start = m.start()
            + text[m.start()..]
                .chars()
                .next()
                .map_or(1, |c| c.len_utf8());
    }
    false
}

/// Case-insensitive de-duplication keeping the first spelling and order.
pub fn dedupe_preserve<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for value in values {
        let value = value.as_ref();
        if seen.insert(value.to_lowercase()) {
            out.push(value.to_string());
        }
    }
    out
}

/// Trims, drops empty entries and de-duplicates case-insensitively.
pub fn normalize_list<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    dedupe_preserve(
        values
            .into_iter()
            .map(|v| v.as_ref().trim().to_string())
            .filter(|v| !v.is_empty()),
    )
}
