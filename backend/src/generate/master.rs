//! Master resume selection and experience header extraction.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};
use shared::text::is_bullet;
use shared::Result;

use crate::ingest::parsing::{normalize, read_text};
use crate::resume::headers::{count_date_ranges, split_pair, strip_title_parenthetical, DATE_RANGE_REGEX};
use crate::retrieval::index::list_resume_files;

static WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// A readable resume file and its normalized text.
#[derive(Debug, Clone)]
pub struct ResumeDocument {
    pub path: PathBuf,
    pub name: String,
    pub text: String,
}

/// Every supported resume under `resumes_dir` with non-empty text, sorted by name.
/// Files that cannot be read are skipped.
pub fn load_resume_documents(resumes_dir: &Path) -> Result<Vec<ResumeDocument>> {
    let mut docs = Vec::new();
    for path in list_resume_files(resumes_dir)? {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        match read_text(&path) {
            Ok(raw) => {
                let text = normalize(&raw);
                if !text.is_empty() {
                    docs.push(ResumeDocument { path, name, text });
                }
            }
            Err(e) => warn!("Skipping unreadable resume {}: {}", name, e),
        }
    }
    Ok(docs)
}

fn bullet_count(text: &str) -> usize {
    text.lines().filter(|l| is_bullet(l.trim())).count()
}

/// Deterministic pick among tied names: SHA-256 of the comma-joined sorted
/// names, first eight bytes as an integer, modulo the count.
fn seeded_index(names: &[&str]) -> usize {
    let mut sorted = names.to_vec();
    sorted.sort_unstable();
    let digest = Sha256::digest(sorted.join(",").as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    (u64::from_be_bytes(head) % names.len() as u64) as usize
}

/// Picks the resume with a `PROFESSIONAL EXPERIENCE` section and the most date
/// ranges plus bullet lines. Ties go to the shortest file name, then to a
/// seeded pick.
pub fn select_master_resume(docs: &[ResumeDocument]) -> Option<&ResumeDocument> {
    let candidates: Vec<(&ResumeDocument, usize)> = docs
        .iter()
        .filter(|d| d.text.to_uppercase().contains("PROFESSIONAL EXPERIENCE"))
        .map(|d| (d, count_date_ranges(&d.text) + bullet_count(&d.text)))
        .collect();

    let max_score = candidates.iter().map(|(_, s)| *s).max()?;
    let top: Vec<&ResumeDocument> = candidates
        .iter()
        .filter(|(_, s)| *s == max_score)
        .map(|(d, _)| *d)
        .collect();

    let min_len = top.iter().map(|d| d.name.chars().count()).min()?;
    let shortest: Vec<&ResumeDocument> = top
        .into_iter()
        .filter(|d| d.name.chars().count() == min_len)
        .collect();

    let chosen = if shortest.len() == 1 {
        shortest[0]
    } else {
        let names: Vec<&str> = shortest.iter().map(|d| d.name.as_str()).collect();
        shortest[seeded_index(&names)]
    };
    debug!("Master resume {} (score {})", chosen.name, max_score);
    Some(chosen)
}

fn find_section(lines: &[&str], headings: &[&str]) -> Option<usize> {
    lines
        .iter()
        .position(|l| headings.iter().any(|h| l.eq_ignore_ascii_case(h)))
}

fn prev_non_bullet<'a>(lines: &[&'a str], idx: usize) -> Option<&'a str> {
    lines[..idx].iter().rev().find(|l| !is_bullet(l)).copied()
}

fn next_non_bullet<'a>(lines: &[&'a str], idx: usize) -> Option<&'a str> {
    lines[idx + 1..].iter().find(|l| !is_bullet(l)).copied()
}

fn header_trim(s: &str) -> &str {
    s.trim_matches(|c: char| c == ' ' || c == '-' || c == '|' || c == ',')
}

/// `Company - Title | Start - End` for each dated role in the experience section.
pub fn extract_experience_headers(text: &str) -> Vec<String> {
    let normalized = normalize(text);
    let lines: Vec<&str> = normalized.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    let Some(start) = find_section(&lines, &["PROFESSIONAL EXPERIENCE", "WORK EXPERIENCE", "EXPERIENCE"]) else {
        return Vec::new();
    };
    let rest = &lines[start + 1..];
    let section = match find_section(rest, &["EDUCATION"]) {
        Some(end) => &rest[..end],
        None => rest,
    };

    let mut headers = Vec::new();
    let mut seen = HashSet::new();

    for (idx, line) in section.iter().enumerate() {
        if is_bullet(line) {
            continue;
        }
        let Some(caps) = DATE_RANGE_REGEX.captures(line) else {
            continue;
        };
        let (Some(whole), Some(from), Some(to)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        let pre = header_trim(&line[..whole.start()]);
        let post = header_trim(&line[whole.end()..]);

        let (company, title) = match (pre.is_empty(), post.is_empty()) {
            (false, false) => (Some(pre.to_string()), Some(post.to_string())),
            (false, true) => {
                let (company, title) = split_pair(pre);
                let title = title.or_else(|| next_non_bullet(section, idx).map(str::to_string));
                (Some(company), title)
            }
            (true, false) => match prev_non_bullet(section, idx) {
                Some(prev) => match split_pair(prev) {
                    (company, Some(title)) => (Some(company), Some(title)),
                    (_, None) => (Some(prev.to_string()), Some(post.to_string())),
                },
                None => (None, None),
            },
            (true, true) => (None, None),
        };
        let (Some(company), Some(title)) = (company, title) else {
            continue;
        };

        let header = format!(
            "{} - {} | {} - {}",
            company,
            strip_title_parenthetical(&title),
            from.as_str(),
            to.as_str()
        )
        .replace(['\u{2013}', '\u{2014}'], "-");
        let header = WHITESPACE_REGEX.replace_all(&header, " ").trim().to_string();
        if seen.insert(header.to_lowercase()) {
            headers.push(header);
        }
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn doc(name: &str, text: &str) -> ResumeDocument {
        ResumeDocument {
            path: PathBuf::from(name),
            name: name.to_string(),
            text: text.to_string(),
        }
    }

    const RICH: &str = "PROFESSIONAL EXPERIENCE\nAcme | Jan 2020 - Present\n- a\n- b\nGlobex | Jan 2018 - Dec 2019\n- c";
    const THIN: &str = "PROFESSIONAL EXPERIENCE\nAcme | Jan 2020 - Present\n- a";

    #[test]
    fn test_highest_score_wins() {
        let docs = vec![doc("a.txt", THIN), doc("longer_name.txt", RICH), doc("skills.txt", "SKILLS\n- SQL")];
        assert_eq!(select_master_resume(&docs).unwrap().name, "longer_name.txt");
    }

    #[test]
    fn test_tie_prefers_shortest_name() {
        let docs = vec![doc("resume_long.txt", RICH), doc("cv.txt", RICH)];
        assert_eq!(select_master_resume(&docs).unwrap().name, "cv.txt");
    }

    #[test]
    fn test_seeded_tie_break_is_stable() {
        let docs = vec![doc("a.txt", RICH), doc("b.txt", RICH), doc("c.txt", RICH)];
        let first = select_master_resume(&docs).unwrap().name.clone();
        let reversed: Vec<ResumeDocument> = docs.iter().rev().cloned().collect();
        let idx = seeded_index(&["a.txt", "b.txt", "c.txt"]);
        assert_eq!(first, docs[idx].name);
        assert_eq!(seeded_index(&["c.txt", "b.txt", "a.txt"]), idx);
        assert!(select_master_resume(&reversed).is_some());
    }

    #[test]
    fn test_no_experience_section_means_no_master() {
        assert!(select_master_resume(&[doc("a.txt", "SUMMARY\nhello")]).is_none());
    }

    #[test]
    fn test_extract_headers_layouts() {
        let text = "SUMMARY\nData person\n\
            PROFESSIONAL EXPERIENCE\n\
            Acme Corp - May 2021 \u{2013} Present - Data Engineer (Contract)\n\
            - Built pipelines\n\
            Globex, Analyst\n\
            Jan 2018 - Apr 2021 | Remote\n\
            - Wrote SQL\n\
            Initech Jun 2016 - Dec 2017\n\
            Backend Developer\n\
            Acme Corp - May 2021 - Present - Data Engineer\n\
            EDUCATION\n\
            State U Sep 2012 - May 2016";
        assert_eq!(
            extract_experience_headers(text),
            vec![
                "Acme Corp - Data Engineer | May 2021 - Present",
                "Globex - Analyst | Jan 2018 - Apr 2021",
                "Initech - Backend Developer | Jun 2016 - Dec 2017",
            ]
        );
        assert!(extract_experience_headers("no sections here").is_empty());
    }

    #[test]
    fn test_load_documents_skips_unsupported() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.txt"), "PROFESSIONAL EXPERIENCE\n").unwrap();
        fs::write(dir.path().join("a.txt"), "  ").unwrap();
        fs::write(dir.path().join("notes.md"), "ignored").unwrap();
        let docs = load_resume_documents(dir.path()).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].name, "b.txt");
    }
}
