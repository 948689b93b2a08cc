use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dto::common::VersionPaths;
use crate::models::jd::JdParseResponse;
use crate::models::retrieval::{RetrievedChunk, SkillGrades};

fn default_top_k() -> usize {
    25
}

fn default_bullets_per_role() -> usize {
    15
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GenerateRequest {
    #[validate(length(min = 1, message = "jd_text is required"))]
    pub jd_text: String,
    #[serde(default = "default_top_k")]
    #[validate(range(min = 1, max = 200, message = "top_k must be between 1 and 200"))]
    pub top_k: usize,
    #[serde(default)]
    pub multi_query: bool,
    #[serde(default)]
    pub parse_with_claude: bool,
    #[serde(default)]
    pub audit: bool,
    #[serde(default)]
    pub domain_rewrite: bool,
    #[serde(default)]
    pub target_company_type: Option<String>,
    #[serde(default = "default_bullets_per_role")]
    #[validate(range(min = 1, max = 50, message = "bullets_per_role must be between 1 and 50"))]
    pub bullets_per_role: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GenerationAudit {
    pub required_direct: Vec<String>,
    pub required_derived: Vec<String>,
    pub required_missing: Vec<String>,
    pub dropped_duplicates: usize,
    #[serde(default)]
    pub master_resume: Option<String>,
    #[serde(default)]
    pub experience_headers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub resume_id: String,
    pub version: String,
    pub resume_text: String,
    pub retrieved: Vec<RetrievedChunk>,
    pub structured_jd: JdParseResponse,
    pub skill_grades: SkillGrades,
    #[serde(default)]
    pub audit: Option<GenerationAudit>,
    pub paths: VersionPaths,
}
