use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExportDocxRequest {
    #[validate(length(min = 1, message = "resume_id is required"))]
    pub resume_id: String,
    #[validate(length(min = 1, message = "company_name is required"))]
    pub company_name: String,
    #[validate(length(min = 1, message = "position_name is required"))]
    pub position_name: String,
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub jd_text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportPaths {
    pub resume_docx: String,
    #[serde(default)]
    pub job_description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportDocxResponse {
    pub resume_id: String,
    pub version: String,
    pub folder: String,
    pub paths: ExportPaths,
}
