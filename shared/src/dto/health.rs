use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthDto {
    pub status: String,
    pub index_ready: bool,
    pub resumes_dir: String,
    pub index_dir: String,
    pub model: String,
    #[serde(default)]
    pub timestamp: u64,
    #[serde(default)]
    pub version: String,
}
