use serde::{Deserialize, Serialize};
use validator::Validate;

/// How strongly the candidate vouches for an override skill.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SkillLevel {
    HandsOn,
    #[default]
    WorkedWith,
}

/// A skill the candidate confirms having, with proof bullets for target roles.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct OverrideSkill {
    #[validate(length(min = 1, message = "skill is required"))]
    pub skill: String,
    #[serde(default)]
    pub level: SkillLevel,
    #[serde(default)]
    pub target_roles: Vec<String>,
    #[serde(default)]
    pub proof_bullets: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq, Default)]
pub struct OverridesRequest {
    #[serde(default)]
    #[validate]
    pub skills: Vec<OverrideSkill>,
}

impl OverridesRequest {
    /// Case-insensitive lookup by skill name.
    pub fn find(&self, skill: &str) -> Option<&OverrideSkill> {
        let key = skill.trim().to_lowercase();
        self.skills.iter().find(|e| e.skill.trim().to_lowercase() == key)
    }

    pub fn find_mut(&mut self, skill: &str) -> Option<&mut OverrideSkill> {
        let key = skill.trim().to_lowercase();
        self.skills
            .iter_mut()
            .find(|e| e.skill.trim().to_lowercase() == key)
    }

    /// Lower-cased skill names covered by overrides.
    pub fn skill_keys(&self) -> std::collections::HashSet<String> {
        self.skills
            .iter()
            .map(|e| e.skill.trim().to_lowercase())
            .collect()
    }
}
