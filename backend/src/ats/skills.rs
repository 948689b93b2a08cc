//! Skill vocabulary and job-description skill extraction.

use once_cell::sync::Lazy;
use regex::Regex;
use shared::text::{dedupe_preserve, has_token};

pub const SKILL_DICTIONARY: [&str; 61] = [
    "SQL", "Python", "DBT", "Tableau", "Power BI", "Snowflake", "Fivetran", "Airflow",
    "Databricks", "Spark", "PySpark", "AWS", "Azure", "GCP", "Git", "Docker", "Kubernetes",
    "ETL", "ELT", "Data Warehouse", "Data Modeling", "Dimensional Modeling",
    "Star Schema", "Snowflake Schema", "Data Governance", "Data Quality", "Data Validation",
    "Analytics", "Dashboarding", "Looker", "Redshift", "BigQuery", "PostgreSQL", "MySQL",
    "SQL Server", "Oracle", "NoSQL", "Kafka", "API", "REST", "CI/CD", "Linux",
    "Monitoring", "Data Pipelines", "DBA", "Data Engineering", "Analytics Engineering",
    "Machine Learning", "NLP", "Jupyter", "Terraform", "Jira", "Agile", "Scrum",
    "Unit Testing", "Data Lake", "Delta Lake", "MLflow", "SSIS", "SSRS", "SSAS",
];

/// Alternate spellings keyed by lower-cased skill.
const SYNONYMS: [(&str, &[&str]); 13] = [
    ("dbt", &["data build tool", "data build tools"]),
    ("power bi", &["powerbi"]),
    ("data modeling", &["data model", "relational modeling"]),
    ("dimensional modeling", &["star schema", "snowflake schema", "dimensional model"]),
    ("data warehouse", &["data warehousing", "cloud data warehouse"]),
    ("etl", &["extract transform load"]),
    ("elt", &["extract load transform"]),
    ("sql", &["structured query language"]),
    ("airflow", &["apache airflow"]),
    ("spark", &["apache spark"]),
    ("kubernetes", &["k8s"]),
    ("ci/cd", &["cicd", "ci cd"]),
    ("rest", &["rest api", "restful"]),
];

/// Industrial/OT keywords that cap the score when the resume cannot back them.
pub const MUST_HAVE_DOMAINS: [&str; 18] = [
    "mqtt", "opc ua", "opc-ua", "opcua", "modbus", "bacnet", "scada", "mes", "historian", "pi",
    "osisoft", "ignition", "plc", "iiot", "ot", "influxdb", "timescaledb", "opc",
];

const SECTION_REQUIRED: [&str; 5] = ["required", "requirements", "must have", "must-have", "qualifications"];
const SECTION_PREFERRED: [&str; 4] = ["preferred", "nice to have", "nice-to-have", "preferred qualifications"];
const SECTION_RESPONSIBILITIES: [&str; 2] = ["responsibilities", "responsibility"];

static CAPITALISED_TOKEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z][A-Za-z0-9+.#-]{2,}\b").unwrap());

pub fn synonyms_for(skill: &str) -> &'static [&'static str] {
    let key = skill.trim().to_lowercase();
    SYNONYMS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
        .unwrap_or(&[])
}

pub fn matches_synonym(skill: &str, text: &str) -> bool {
    synonyms_for(skill).iter().any(|variant| has_token(text, variant))
}

/// Dictionary skills mentioned in `text`, directly or through a synonym.
pub fn find_skills_in_text(text: &str) -> Vec<String> {
    let mut found: Vec<String> = SKILL_DICTIONARY
        .iter()
        .filter(|skill| has_token(text, skill) || matches_synonym(skill, text))
        .map(|s| s.to_string())
        .collect();

    for m in CAPITALISED_TOKEN_REGEX.find_iter(text) {
        let token = m.as_str();
        if SKILL_DICTIONARY.iter().any(|s| s.eq_ignore_ascii_case(token)) {
            found.push(token.to_string());
        }
    }
    dedupe_preserve(found)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Required,
    Preferred,
}

/// Required and preferred skills, capped at `top_n` in total (required first).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JdSkills {
    pub required: Vec<String>,
    pub preferred: Vec<String>,
}

pub fn extract_skills_from_jd(jd_text: &str, top_n: usize) -> JdSkills {
    let mut required = Vec::new();
    let mut preferred = Vec::new();
    let mut current = Section::Required;

    for line in jd_text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let lower = line.to_lowercase();
        if SECTION_REQUIRED.iter().any(|k| lower.contains(k)) {
            current = Section::Required;
        } else if SECTION_PREFERRED.iter().any(|k| lower.contains(k)) {
            current = Section::Preferred;
        } else if SECTION_RESPONSIBILITIES.iter().any(|k| lower.contains(k)) {
            current = Section::Required;
        }

        let found = find_skills_in_text(line);
        match current {
            Section::Preferred => preferred.extend(found),
            Section::Required => required.extend(found),
        }
    }

    let mut required = dedupe_preserve(required);
    let mut preferred: Vec<String> = dedupe_preserve(preferred)
        .into_iter()
        .filter(|s| !required.contains(s))
        .collect();

    if required.is_empty() && preferred.is_empty() {
        required = find_skills_in_text(jd_text);
    }

    if top_n > 0 {
        if required.len() >= top_n {
            required.truncate(top_n);
            preferred.clear();
        } else {
            preferred.truncate(top_n - required.len());
        }
    }

    JdSkills { required, preferred }
}

/// Domain must-have keywords appearing anywhere in the JD (substring match).
pub fn must_have_gates(jd_text: &str) -> Vec<String> {
    let lower = jd_text.to_lowercase();
    dedupe_preserve(MUST_HAVE_DOMAINS.iter().filter(|kw| lower.contains(*kw)))
}
