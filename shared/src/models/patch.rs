use serde::{Deserialize, Serialize};

use crate::models::overrides::OverridesRequest;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PatchSection {
    #[default]
    Experience,
    TechnicalSkills,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PatchAction {
    #[default]
    Insert,
    Replace,
}

/// How aggressively unverified skills are kept out of the resume.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TruthMode {
    Off,
    #[default]
    Balanced,
    Strict,
}

impl TruthMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TruthMode::Off => "off",
            TruthMode::Balanced => "balanced",
            TruthMode::Strict => "strict",
        }
    }
}

impl std::fmt::Display for TruthMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TruthMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "off" => Ok(TruthMode::Off),
            "balanced" => Ok(TruthMode::Balanced),
            "strict" => Ok(TruthMode::Strict),
            other => Err(format!("Unknown truth mode: {}", other)),
        }
    }
}

/// A single edit against a resume state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PatchOperation {
    #[serde(default)]
    pub role_id: Option<String>,
    #[serde(default)]
    pub section: PatchSection,
    #[serde(default)]
    pub action: PatchAction,
    #[serde(default)]
    pub bullet_index: Option<i64>,
    #[serde(default)]
    pub after_index: Option<i64>,
    pub new_bullet: String,
    #[serde(default)]
    pub skill: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    AddOverride,
    DowngradeToExposure,
}

/// A suggestion the truth guardrails refused, with a remediation hint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlockedSuggestion {
    pub skill: String,
    pub reason: String,
    pub recommended_action: RecommendedAction,
    #[serde(default)]
    pub suggested_role_ids: Vec<String>,
    #[serde(default)]
    pub example_override_payload: Option<OverridesRequest>,
}
