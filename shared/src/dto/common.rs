use serde::{Deserialize, Serialize};

/// Error body returned by the backend (`ApiError` on the server side).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(default)]
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
}

/// File locations of one stored resume version.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct VersionPaths {
    pub resume_json: String,
    #[serde(default)]
    pub resume_docx: Option<String>,
}
