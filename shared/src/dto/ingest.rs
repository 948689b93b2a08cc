use serde::{Deserialize, Serialize};
use validator::Validate;

/// A resume file sent inline; the content is standard base64.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UploadFile {
    #[validate(length(min = 1, message = "filename is required"))]
    pub filename: String,
    pub content_base64: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UploadResumesRequest {
    #[serde(default)]
    pub files: Vec<UploadFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestResponse {
    pub indexed_chunks: usize,
    pub saved_files: Vec<String>,
}
