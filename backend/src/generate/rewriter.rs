//! Conservative chunk rewrites, near-duplicate removal and skill grading.

use once_cell::sync::Lazy;
use regex::Regex;
use shared::{JdParseResponse, RetrievedChunk, SkillGrades, SupportLevel};

use crate::retrieval::index::{cosine, LexicalIndex};

pub const DEDUPE_THRESHOLD: f32 = 0.9;

fn ci(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){}", pattern)).unwrap()
}

type Substitutions = Vec<(Regex, &'static str)>;

fn finance_terms() -> Substitutions {
    vec![
        (ci(r"\btransactions\b"), "financial transactions"),
        (ci(r"\bpayments\b"), "payment flows"),
        (ci(r"\baccounts\b"), "financial accounts"),
    ]
}

fn commerce_terms() -> Substitutions {
    vec![
        (ci(r"\busers\b"), "customers"),
        (ci(r"\borders\b"), "customer orders"),
        (ci(r"\bcheckout\b"), "checkout experience"),
    ]
}

static DOMAIN_TERMS: Lazy<Vec<(&'static str, Substitutions)>> = Lazy::new(|| {
    vec![
        (
            "healthcare",
            vec![
                (ci(r"\bsystems\b"), "healthcare systems"),
                (ci(r"\bworkflow(s)?\b"), "clinical workflow${1}"),
                (ci(r"\bdata\b"), "healthcare data"),
            ],
        ),
        ("banking", finance_terms()),
        ("fintech", finance_terms()),
        ("retail", commerce_terms()),
        ("e-commerce", commerce_terms()),
        (
            "saas",
            vec![
                (ci(r"\bplatform\b"), "SaaS platform"),
                (ci(r"\btenants\b"), "SaaS tenants"),
                (ci(r"\bsubscriptions\b"), "subscription billing"),
            ],
        ),
    ]
});

const DOMAIN_INDICATORS: [(&str, &[&str]); 6] = [
    ("healthcare", &["health", "clinical", "patient", "hospital", "medical"]),
    ("banking", &["bank", "financial", "transaction", "payment", "account"]),
    ("fintech", &["payment", "wallet", "financial"]),
    ("retail", &["order", "customer", "cart"]),
    ("e-commerce", &["order", "checkout", "cart"]),
    ("saas", &["tenant", "subscription", "platform"]),
];

const COMPANY_TRIGGERS: [(&str, &[&str]); 4] = [
    ("startup", &["mvp", "prototype", "rapid", "iterat", "agile"]),
    ("enterprise", &["stakeholder", "cross-team", "governance", "sla"]),
    ("regulated", &["compliance", "audit", "policy", "risk"]),
    ("bigtech", &["scale", "distributed", "high traffic", "latency"]),
];

static COMPANY_FRAMING: Lazy<Vec<(&'static str, Regex, &'static str)>> = Lazy::new(|| {
    vec![
        ("startup", ci(r"\bagile\b"), "agile (startup)"),
        ("enterprise", ci(r"\bcross-team\b"), "cross-team (enterprise)"),
        ("regulated", ci(r"\bcompliance\b"), "regulated compliance"),
        ("bigtech", ci(r"\bscale\b"), "large-scale"),
    ]
});

fn lookup<'a, T>(table: &'a [(&str, T)], key: &str) -> Option<&'a T> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
}

fn has_domain_evidence(text: &str, domain: &str) -> bool {
    let lowered = text.to_lowercase();
    lookup(&DOMAIN_INDICATORS[..], domain)
        .map(|terms| terms.iter().any(|t| lowered.contains(t)))
        .unwrap_or(false)
}

fn apply_domain_terms(text: &str, domain: &str) -> String {
    let mut updated = text.to_string();
    if let Some(subs) = lookup(DOMAIN_TERMS.as_slice(), domain) {
        for (re, replacement) in subs {
            updated = re.replace_all(&updated, *replacement).into_owned();
        }
    }
    updated
}

fn apply_company_framing(text: &str, company_type: &str) -> String {
    let lowered = text.to_lowercase();
    let triggered = lookup(&COMPANY_TRIGGERS[..], company_type)
        .map(|triggers| triggers.iter().any(|t| lowered.contains(t)))
        .unwrap_or(false);
    if !triggered {
        return text.to_string();
    }
    COMPANY_FRAMING
        .iter()
        .find(|(kind, _, _)| *kind == company_type)
        .map(|(_, re, replacement)| re.replace_all(text, *replacement).into_owned())
        .unwrap_or_else(|| text.to_string())
}

/// Domain terminology only where the chunk already shows the domain; company
/// framing only where a trigger word is present. Changes land in `rewrite_text`.
pub fn rewrite_chunks(
    chunks: Vec<RetrievedChunk>,
    domain: Option<&str>,
    company_type: Option<&str>,
) -> Vec<RetrievedChunk> {
    let domain = domain.map(|d| d.trim().to_lowercase()).filter(|d| !d.is_empty());
    let company_type = company_type.map(|c| c.trim().to_lowercase()).filter(|c| !c.is_empty());
    if domain.is_none() && company_type.is_none() {
        return chunks;
    }

    chunks
        .into_iter()
        .map(|mut chunk| {
            let base = chunk.effective_text().to_string();
            let mut updated = base.clone();
            if let Some(domain) = domain.as_deref() {
                if has_domain_evidence(&base, domain) {
                    updated = apply_domain_terms(&updated, domain);
                }
            }
            if let Some(kind) = company_type.as_deref() {
                updated = apply_company_framing(&updated, kind);
            }
            if updated != base {
                chunk.rewrite_text = Some(updated);
            }
            chunk
        })
        .collect()
}

/// Drops chunks whose lexical vector is within `threshold` cosine of an earlier
/// kept chunk. Returns the kept chunks and the number dropped.
pub fn dedupe_chunks(chunks: Vec<RetrievedChunk>, threshold: f32) -> (Vec<RetrievedChunk>, usize) {
    if chunks.len() < 2 {
        return (chunks, 0);
    }
    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let index = LexicalIndex::fit(&texts);

    let total = chunks.len();
    let mut kept = Vec::new();
    let mut kept_vectors = Vec::new();
    for (chunk, vector) in chunks.into_iter().zip(index.vectors.iter()) {
        if kept_vectors.iter().any(|k| cosine(k, vector) >= threshold) {
            continue;
        }
        kept_vectors.push(vector.clone());
        kept.push(chunk);
    }
    let dropped = total - kept.len();
    (kept, dropped)
}

/// Buckets JD skills by how many retrieved chunks mention them and how many of
/// those hits are direct.
pub fn grade_skills(structured_jd: Option<&JdParseResponse>, chunks: &[RetrievedChunk]) -> SkillGrades {
    let Some(jd) = structured_jd else {
        return SkillGrades::default();
    };
    let required = jd.must_have_skills.clone();
    let important = jd.nice_to_have_skills.clone();
    let candidates: Vec<&String> = required
        .iter()
        .chain(important.iter())
        .filter(|s| !s.trim().is_empty())
        .collect();

    let mut grades = SkillGrades {
        required: required.clone(),
        important: important.clone(),
        ..Default::default()
    };
    if candidates.is_empty() {
        grades.required_missing = required.clone();
        return grades;
    }

    let lowered: Vec<(String, SupportLevel)> = chunks
        .iter()
        .map(|c| (c.text.to_lowercase(), c.support_level))
        .collect();

    for skill in candidates {
        let token = skill.to_lowercase();
        let hits: Vec<SupportLevel> = lowered
            .iter()
            .filter(|(text, _)| text.contains(&token))
            .map(|(_, level)| *level)
            .collect();
        let total = hits.len();
        let direct = hits.iter().filter(|l| **l == SupportLevel::Direct).count();

        if direct >= 2 || (direct == 1 && total >= 2) {
            grades.strong.push(skill.clone());
        } else if direct == 1 || total >= 2 {
            grades.working.push(skill.clone());
        } else if total == 1 {
            grades.exposure.push(skill.clone());
        }

        if required.contains(skill) {
            if direct >= 1 {
                grades.required_direct.push(skill.clone());
            } else if total >= 1 {
                grades.required_derived.push(skill.clone());
            } else {
                grades.required_missing.push(skill.clone());
            }
        }
    }
    grades
}
