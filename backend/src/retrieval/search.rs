use std::collections::HashMap;

use shared::{JdParseResponse, RetrievedChunk, SupportLevel};

use crate::retrieval::index::{tokenize, LoadedIndex};

pub const DEFAULT_TOP_K: usize = 25;
pub const DEFAULT_PER_QUERY_K: usize = 10;

/// Distinct lower-cased tokens of at least three characters, in order of appearance.
pub fn simple_keywords(text: &str, limit: usize) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for token in crate::retrieval::index::raw_tokens(text) {
        let token = token.to_lowercase();
        if token.chars().count() < 3 || !seen.insert(token.clone()) {
            continue;
        }
        out.push(token);
        if out.len() >= limit {
            break;
        }
    }
    out
}

pub fn keywords_from_structured(jd: Option<&JdParseResponse>) -> Vec<String> {
    let Some(jd) = jd else {
        return Vec::new();
    };
    let mut values: Vec<&str> = Vec::new();
    values.push(&jd.role);
    values.extend(jd.domain.as_deref());
    values.extend(jd.seniority.as_deref());
    values.extend(jd.must_have_skills.iter().map(String::as_str));
    values.extend(jd.nice_to_have_skills.iter().map(String::as_str));
    values.extend(jd.responsibilities.iter().map(String::as_str));
    values
        .into_iter()
        .filter(|v| v.chars().count() >= 3)
        .map(str::to_lowercase)
        .collect()
}

/// Keyword pool used to tag support level; structured JD first, raw text as fallback.
pub fn keyword_pool(jd_text: &str, structured: Option<&JdParseResponse>) -> Vec<String> {
    let pool = keywords_from_structured(structured);
    if pool.is_empty() {
        simple_keywords(jd_text, 20)
    } else {
        pool
    }
}

fn support_level(text: &str, keywords: &[String]) -> SupportLevel {
    let lower = text.to_lowercase();
    if keywords.iter().any(|k| lower.contains(k.as_str())) {
        SupportLevel::Direct
    } else {
        SupportLevel::Derived
    }
}

fn build_queries(jd_text: &str, structured: Option<&JdParseResponse>) -> Vec<String> {
    let mut queries = Vec::new();
    if let Some(jd) = structured {
        if !jd.must_have_skills.is_empty() {
            queries.push(format!("Must have skills: {}", jd.must_have_skills.join(", ")));
        }
        if !jd.responsibilities.is_empty() {
            queries.push(format!("Responsibilities: {}", jd.responsibilities.join("; ")));
        }
        if let Some(domain) = jd.domain.as_deref().filter(|d| !d.is_empty()) {
            queries.push(format!("Domain: {}", domain));
        }
    }
    if queries.is_empty() {
        let keywords = simple_keywords(jd_text, 20);
        if keywords.is_empty() {
            queries.push(jd_text.to_string());
        } else {
            let head = &keywords[..keywords.len().min(8)];
            let tail = if keywords.len() > 8 {
                &keywords[8..keywords.len().min(16)]
            } else {
                &[][..]
            };
            queries.push(format!("Must have skills: {}", head.join(", ")));
            queries.push(format!("Responsibilities: {}", tail.join(", ")));
        }
    }
    queries
}

fn to_chunk(loaded: &LoadedIndex, idx: usize, score: f32) -> Option<RetrievedChunk> {
    let meta = loaded.metas.get(idx)?;
    Some(RetrievedChunk {
        score,
        resume_type: meta.resume_type.clone(),
        source_file: meta.source_file.clone(),
        text: meta.text.clone(),
        support_level: SupportLevel::Derived,
        rewrite_text: None,
    })
}

/// Top-k chunks for a job description, optionally merging several focused queries.
pub fn retrieve_topk(
    jd_text: &str,
    loaded: &LoadedIndex,
    k: usize,
    multi_query: bool,
    structured: Option<&JdParseResponse>,
    per_query_k: usize,
) -> Vec<RetrievedChunk> {
    let pool = keyword_pool(jd_text, structured);

    let mut results: Vec<RetrievedChunk> = if !multi_query {
        loaded
            .index
            .search(jd_text, k)
            .into_iter()
            .filter_map(|(idx, score)| to_chunk(loaded, idx, score))
            .collect()
    } else {
        let mut merged: HashMap<String, RetrievedChunk> = HashMap::new();
        let mut order: Vec<String> = Vec::new();
        for query in build_queries(jd_text, structured) {
            for (idx, score) in loaded.index.search(&query, per_query_k.min(k)) {
                let Some(chunk) = to_chunk(loaded, idx, score) else {
                    continue;
                };
                match merged.get(&chunk.text) {
                    Some(existing) if existing.score >= score => {}
                    Some(_) => {
                        merged.insert(chunk.text.clone(), chunk);
                    }
                    None => {
                        order.push(chunk.text.clone());
                        merged.insert(chunk.text.clone(), chunk);
                    }
                }
            }
        }
        let mut out: Vec<RetrievedChunk> = order
            .into_iter()
            .filter_map(|text| merged.remove(&text))
            .collect();
        out.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        out.truncate(k);
        out
    };

    for chunk in &mut results {
        chunk.support_level = support_level(&chunk.text, &pool);
    }
    results
}

/// Lower-cased JD terms used for bullet ranking (tokens of three or more chars).
pub fn jd_terms(jd_text: &str) -> std::collections::HashSet<String> {
    tokenize(jd_text)
        .into_iter()
        .filter(|t| t.chars().count() >= 3)
        .collect()
}
