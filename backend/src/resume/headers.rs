//! Section headings and role header lines shared by the resume parsers.

use once_cell::sync::Lazy;
use regex::Regex;

const MONTH: &str = r"(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Sept|Oct|Nov|Dec)[a-z]*";

/// `May 2021 - Jun 2023`, `Jan 2020 to Present`, en dash accepted.
pub static DATE_RANGE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)({m}\s+\d{{4}})\s*(?:-|\u{{2013}}|to)\s*(Present|Current|{m}\s+\d{{4}})",
        m = MONTH
    ))
    .unwrap()
});

static TRAILING_PARENTHETICAL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\([^)]*\)\s*$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    Summary,
    Skills,
    Experience,
    Education,
}

/// Whole-line, case-insensitive section heading.
pub fn detect_heading(line: &str) -> Option<Heading> {
    match line.trim().to_uppercase().as_str() {
        "PROFESSIONAL SUMMARY" | "SUMMARY" => Some(Heading::Summary),
        "TECHNICAL SKILLS" | "SKILLS" => Some(Heading::Skills),
        "PROFESSIONAL EXPERIENCE" | "EXPERIENCE" | "WORK EXPERIENCE" | "PROFESSIONAL BACKGROUND" => {
            Some(Heading::Experience)
        }
        "EDUCATION" => Some(Heading::Education),
        _ => None,
    }
}

pub fn has_date_range(line: &str) -> bool {
    DATE_RANGE_REGEX.is_match(line)
}

pub fn count_date_ranges(text: &str) -> usize {
    DATE_RANGE_REGEX.find_iter(text).count()
}

pub fn strip_title_parenthetical(title: &str) -> String {
    TRAILING_PARENTHETICAL_REGEX.replace(title, "").trim().to_string()
}

fn trim_header_punct(s: &str) -> &str {
    s.trim_matches(|c: char| c == ' ' || c == '-' || c == '|' || c == ',')
}

/// Splits on the first of ` | `, ` - `, `,` that occurs; returns the first two parts.
pub fn split_pair(text: &str) -> (String, Option<String>) {
    for sep in [" | ", " - ", ","] {
        if text.contains(sep) {
            let parts: Vec<&str> = text
                .split(sep)
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .collect();
            let first = parts.first().map(|p| p.to_string()).unwrap_or_else(|| text.to_string());
            return (first, parts.get(1).map(|p| p.to_string()));
        }
    }
    (text.to_string(), None)
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoleHeader {
    pub company: Option<String>,
    pub title: Option<String>,
    pub location: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

impl RoleHeader {
    pub fn dates(&self) -> Option<String> {
        match (&self.start, &self.end) {
            (Some(start), Some(end)) => Some(format!("{} - {}", start, end)),
            (Some(start), None) => Some(start.clone()),
            _ => None,
        }
    }
}

/// Parses a dated role line. Text before the range is the company, text after
/// is `title | location`; missing parts come from the preceding buffered lines
/// (last line = company, the one before = title).
pub fn parse_role_header(line: &str, buffer: &[String]) -> RoleHeader {
    let mut header = RoleHeader::default();

    if let Some(caps) = DATE_RANGE_REGEX.captures(line) {
        let whole = caps.get(0).map(|m| (m.start(), m.end())).unwrap_or((0, 0));
        header.start = caps.get(1).map(|m| m.as_str().to_string());
        header.end = caps.get(2).map(|m| m.as_str().to_string());

        let pre = trim_header_punct(&line[..whole.0]);
        let pre = pre.strip_suffix('(').map(trim_header_punct).unwrap_or(pre);
        let post = trim_header_punct(&line[whole.1..]);
        let post = post.strip_prefix(')').map(trim_header_punct).unwrap_or(post);

        if !pre.is_empty() {
            header.company = Some(pre.to_string());
        }
        if !post.is_empty() {
            let (title, location) = split_pair(post);
            header.title = Some(strip_title_parenthetical(&title));
            header.location = location;
        }
    }

    if header.company.is_none() {
        header.company = buffer.last().cloned();
    }
    if header.title.is_none() && buffer.len() >= 2 {
        header.title = Some(strip_title_parenthetical(&buffer[buffer.len() - 2]));
    }
    header
}
