use serde::{Deserialize, Serialize};

use crate::dto::common::VersionPaths;
use crate::models::resume::ResumeState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeStateResponse {
    pub resume_id: String,
    pub version: String,
    pub state: ResumeState,
}

/// Picks a role either by id or by company + dates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RoleSelector {
    #[serde(default)]
    pub role_id: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub dates: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulletEditRequest {
    pub role_selector: RoleSelector,
    pub bullet_index: i64,
    pub new_bullet: String,
    #[serde(default)]
    pub export_docx: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdatedRole {
    pub role_id: String,
    pub company: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub dates: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulletEditResponse {
    pub resume_id: String,
    pub version: String,
    pub updated_role: UpdatedRole,
    pub updated_bullet_index: usize,
    pub paths: VersionPaths,
}
