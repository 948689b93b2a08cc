use serde::{Deserialize, Serialize};
use validator::Validate;

fn default_top_n_skills() -> usize {
    25
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AtsScoreRequest {
    #[validate(length(min = 1, message = "jd_text is required"))]
    pub jd_text: String,
    #[serde(default)]
    pub resume_id: Option<String>,
    #[serde(default)]
    pub resume_text: Option<String>,
    #[serde(default = "default_top_n_skills")]
    pub top_n_skills: usize,
    #[serde(default = "default_true")]
    pub strict_mode: bool,
}
