use serde::{Deserialize, Serialize};
use validator::Validate;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct JdParseRequest {
    #[validate(length(min = 1, message = "jd_text is required"))]
    pub jd_text: String,
    /// Ask the configured LLM first; the rule-based parser is always the fallback
    #[serde(default = "default_true")]
    pub use_llm: bool,
}
