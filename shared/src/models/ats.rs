use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceSection {
    Summary,
    TechnicalSkills,
    Experience,
}

impl EvidenceSection {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceSection::Summary => "summary",
            EvidenceSection::TechnicalSkills => "technical_skills",
            EvidenceSection::Experience => "experience",
        }
    }
}

/// Where in the resume a skill was found.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillEvidence {
    pub section: EvidenceSection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bullet_index: Option<usize>,
    pub snippet: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CoverageStatus {
    Direct,
    Partial,
    Missing,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillCoverage {
    pub skill: String,
    pub status: CoverageStatus,
    #[serde(default)]
    pub evidence: Vec<SkillEvidence>,
    #[serde(default)]
    pub direct_from_resume: bool,
}

/// ATS-style report for one resume against one job description.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AtsScoreResponse {
    pub ats_score: i64,
    pub keyword_score: i64,
    pub role_score: i64,
    #[serde(default)]
    pub capped_reason: Option<String>,
    #[serde(default)]
    pub missing_must_have: Option<Vec<String>>,
    #[serde(default)]
    pub required: Vec<SkillCoverage>,
    #[serde(default)]
    pub preferred: Vec<SkillCoverage>,
    #[serde(default)]
    pub missing_required: Vec<String>,
    #[serde(default)]
    pub missing_preferred: Vec<String>,
}

impl SkillEvidence {
    /// `section:role_id/bullet_index`, the compact form shown in tables.
    pub fn short_ref(&self) -> String {
        format!(
            "{}:{}/{}",
            self.section.as_str(),
            self.role_id.as_deref().unwrap_or(""),
            self.bullet_index.map(|i| i.to_string()).unwrap_or_default()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_short_ref() {
        let ev = SkillEvidence {
            section: EvidenceSection::Experience,
            role_id: Some("role_2".to_string()),
            bullet_index: Some(3),
            snippet: "x".to_string(),
        };
        assert_eq!(ev.short_ref(), "experience:role_2/3");

        let ev = SkillEvidence {
            section: EvidenceSection::Summary,
            role_id: None,
            bullet_index: None,
            snippet: "x".to_string(),
        };
        assert_eq!(ev.short_ref(), "summary:/");
    }
}
