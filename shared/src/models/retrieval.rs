use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SupportLevel {
    /// A job-description keyword appears verbatim in the chunk
    Direct,
    Derived,
}

/// One indexed resume fragment returned by a search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievedChunk {
    pub score: f32,
    pub resume_type: String,
    pub source_file: String,
    pub text: String,
    pub support_level: SupportLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewrite_text: Option<String>,
}

impl RetrievedChunk {
    /// Rewritten text when a rewrite happened, else the original.
    pub fn effective_text(&self) -> &str {
        self.rewrite_text.as_deref().unwrap_or(&self.text)
    }
}

/// Skills bucketed by how well the retrieved chunks back them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SkillGrades {
    pub required: Vec<String>,
    pub important: Vec<String>,
    pub optional: Vec<String>,
    pub strong: Vec<String>,
    pub working: Vec<String>,
    pub exposure: Vec<String>,
    pub required_direct: Vec<String>,
    pub required_derived: Vec<String>,
    pub required_missing: Vec<String>,
}
