use serde::{Deserialize, Serialize};

use crate::dto::common::VersionPaths;
use crate::models::overrides::{OverridesRequest, SkillLevel};
use crate::models::patch::{BlockedSuggestion, PatchOperation, TruthMode};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverridesResponse {
    pub resume_id: String,
    pub overrides_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestPatchesRequest {
    pub jd_text: String,
    #[serde(default = "default_true")]
    pub strict_mode: bool,
    #[serde(default = "default_true")]
    pub apply_overrides: bool,
    #[serde(default)]
    pub truth_mode: TruthMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestPatchesResponse {
    pub suggested_patches: Vec<PatchOperation>,
    pub blocked: Vec<BlockedSuggestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyPatchesRequest {
    pub patches: Vec<PatchOperation>,
    #[serde(default)]
    pub export_docx: bool,
    #[serde(default)]
    pub truth_mode: TruthMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyPatchesResponse {
    pub resume_id: String,
    pub version: String,
    pub paths: VersionPaths,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockedPlanRequest {
    pub jd_text: String,
    #[serde(default)]
    pub truth_mode: TruthMode,
    #[serde(default)]
    pub top_n: Option<usize>,
    #[serde(default = "default_true")]
    pub strict_mode: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockedPlanResponse {
    pub blocked: Vec<BlockedSuggestion>,
}

/// One confirmed skill coming back from the blocked-plan review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverrideFromBlockedItem {
    pub skill: String,
    #[serde(default)]
    pub level: SkillLevel,
    pub role_id: String,
    pub proof_bullet: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverridesFromBlockedRequest {
    pub items: Vec<OverrideFromBlockedItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverridesFromBlockedResponse {
    pub resume_id: String,
    pub overrides_path: String,
    pub overrides: OverridesRequest,
}
