use serde::{Deserialize, Serialize};

/// Structured view of a job description.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct JdParseResponse {
    #[serde(default = "unknown_role")]
    pub role: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub seniority: Option<String>,
    #[serde(default)]
    pub must_have_skills: Vec<String>,
    #[serde(default)]
    pub nice_to_have_skills: Vec<String>,
    #[serde(default)]
    pub responsibilities: Vec<String>,
}

fn unknown_role() -> String {
    "unknown".to_string()
}
