//! Job description parsing: LLM extraction with a rule-based fallback.

use std::collections::HashMap;

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use shared::text::normalize_list;
use shared::JdParseResponse;

use crate::llm::client::LlmClient;
use crate::retrieval::index::raw_tokens;

const STOPWORDS: [&str; 22] = [
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "have", "in", "is", "it",
    "of", "on", "or", "that", "the", "to", "with",
];

const DOMAINS: [&str; 9] = [
    "fintech",
    "healthcare",
    "e-commerce",
    "banking",
    "education",
    "retail",
    "saas",
    "security",
    "cloud",
];

const SYSTEM_PROMPT: &str =
    "You are a strict JSON extraction engine. Return ONLY valid JSON matching the schema, no prose.";

static ROLE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b([a-zA-Z ]{2,40})(engineer|developer|architect|analyst|manager|scientist)\b").unwrap()
});
static LIST_SPLIT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,/;]").unwrap());

fn user_prompt(jd_text: &str) -> String {
    format!(
        "Extract a structured JD in this schema:\n\
         {{\n  \"role\": \"string\",\n  \"domain\": \"string | null\",\n  \
         \"seniority\": \"junior | mid | senior | lead | null\",\n  \
         \"must_have_skills\": [\"skill1\"],\n  \"nice_to_have_skills\": [\"skill2\"],\n  \
         \"responsibilities\": [\"resp1\"]\n}}\n\nJOB DESCRIPTION:\n{}",
        jd_text
    )
}

/// Most frequent non-stopword tokens (three chars or more), ties in order of first use.
pub fn extract_keywords(text: &str, limit: usize) -> Vec<String> {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for token in raw_tokens(text) {
        let lower = token.to_lowercase();
        if token.chars().count() < 3 || STOPWORDS.contains(&lower.as_str()) {
            continue;
        }
        let next = counts.len();
        counts.entry(lower).or_insert((0, next)).0 += 1;
    }
    let mut ranked: Vec<(String, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
    ranked.into_iter().take(limit).map(|(w, _)| w).collect()
}

fn split_list(line: &str) -> impl Iterator<Item = String> + '_ {
    LIST_SPLIT_REGEX.split(line).map(str::to_string)
}

/// Rule-based parse used when no LLM is requested or the LLM output is unusable.
pub fn fallback_parse(jd_text: &str) -> JdParseResponse {
    let lower = jd_text.to_lowercase();
    let seniority = if lower.contains("lead") {
        Some("lead")
    } else if lower.contains("senior") {
        Some("senior")
    } else if lower.contains("mid") {
        Some("mid")
    } else if lower.contains("junior") {
        Some("junior")
    } else {
        None
    };

    let role = ROLE_REGEX
        .find(jd_text)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let domain = DOMAINS.iter().find(|d| lower.contains(*d)).map(|d| d.to_string());

    let mut must_have = Vec::new();
    let mut nice_to_have = Vec::new();
    let mut responsibilities = Vec::new();

    for line in jd_text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let lower_line = line.to_lowercase();
        if lower_line.contains("must") || lower_line.contains("required") {
            must_have.extend(split_list(line));
        } else if lower_line.contains("nice to have") || lower_line.contains("preferred") {
            nice_to_have.extend(split_list(line));
        } else if lower_line.contains("responsibil") || lower_line.starts_with("you will") {
            responsibilities.push(line.to_string());
        }
    }

    if must_have.is_empty() {
        must_have = extract_keywords(jd_text, 12);
    }
    if responsibilities.is_empty() {
        responsibilities = jd_text
            .lines()
            .map(str::trim)
            .filter(|l| l.starts_with('-') || l.starts_with('*'))
            .take(8)
            .map(str::to_string)
            .collect();
    }

    normalize_parsed(JdParseResponse {
        role,
        domain,
        seniority: seniority.map(str::to_string),
        must_have_skills: must_have,
        nice_to_have_skills: nice_to_have,
        responsibilities,
    })
}

/// Strips a surrounding markdown fence, if any.
fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();
    if let Some(inner) = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
    {
        return inner.trim();
    }
    trimmed
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn list_field(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default()
}

/// Reads the LLM's JSON answer; `None` when it is not a JSON object.
pub fn parse_llm_output(raw: &str) -> Option<JdParseResponse> {
    let value: Value = serde_json::from_str(extract_json(raw)).ok()?;
    if !value.is_object() {
        return None;
    }
    Some(JdParseResponse {
        role: string_field(&value, "role").unwrap_or_default(),
        domain: string_field(&value, "domain"),
        seniority: string_field(&value, "seniority"),
        must_have_skills: list_field(&value, "must_have_skills"),
        nice_to_have_skills: list_field(&value, "nice_to_have_skills"),
        responsibilities: list_field(&value, "responsibilities"),
    })
}

fn normalize_parsed(mut jd: JdParseResponse) -> JdParseResponse {
    if jd.role.trim().is_empty() {
        jd.role = "unknown".to_string();
    }
    jd.must_have_skills = normalize_list(&jd.must_have_skills);
    jd.nice_to_have_skills = normalize_list(&jd.nice_to_have_skills);
    jd.responsibilities = normalize_list(&jd.responsibilities);
    jd
}

/// Structured JD; the LLM is asked first when given, any failure falls back to rules.
pub async fn parse_jd(jd_text: &str, llm: Option<&dyn LlmClient>) -> JdParseResponse {
    let Some(llm) = llm else {
        return fallback_parse(jd_text);
    };

    match llm.generate(SYSTEM_PROMPT, &user_prompt(jd_text), 600, 0.0).await {
        Ok(raw) => match parse_llm_output(&raw) {
            Some(parsed) => {
                debug!("JD parsed by {}", llm.model());
                normalize_parsed(parsed)
            }
            None => {
                warn!("LLM returned invalid JD JSON; using rule-based parser");
                fallback_parse(jd_text)
            }
        },
        Err(e) => {
            warn!("LLM JD parse failed ({}); using rule-based parser", e);
            fallback_parse(jd_text)
        }
    }
}
