pub mod models {
    pub mod ats;
    pub mod jd;
    pub mod overrides;
    pub mod patch;
    pub mod resume;
    pub mod retrieval;
}

pub mod dto {
    pub mod ats;
    pub mod common;
    pub mod export;
    pub mod generate;
    pub mod health;
    pub mod ingest;
    pub mod jd;
    pub mod patches;
    pub mod resume;
}

pub mod error;
pub mod text;

// Re-export commonly used items
pub use error::{SharedError, Result};

// Re-export models
pub use models::{
    ats::{AtsScoreResponse, CoverageStatus, EvidenceSection, SkillCoverage, SkillEvidence},
    jd::JdParseResponse,
    overrides::{OverrideSkill, OverridesRequest, SkillLevel},
    patch::{BlockedSuggestion, PatchAction, PatchOperation, PatchSection, RecommendedAction, TruthMode},
    resume::{ResumeSections, ResumeState, Role},
    retrieval::{RetrievedChunk, SkillGrades, SupportLevel},
};

// Re-export DTOs
pub use dto::{
    ats::AtsScoreRequest,
    common::{ErrorResponse, VersionPaths},
    export::{ExportDocxRequest, ExportDocxResponse, ExportPaths},
    generate::{GenerateRequest, GenerateResponse, GenerationAudit},
    health::HealthDto,
    ingest::{IngestResponse, UploadFile, UploadResumesRequest},
    jd::JdParseRequest,
    patches::{
        ApplyPatchesRequest, ApplyPatchesResponse, BlockedPlanRequest, BlockedPlanResponse,
        OverrideFromBlockedItem, OverridesFromBlockedRequest, OverridesFromBlockedResponse,
        OverridesResponse, SuggestPatchesRequest, SuggestPatchesResponse,
    },
    resume::{BulletEditRequest, BulletEditResponse, ResumeStateResponse, RoleSelector, UpdatedRole},
};

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_generate_request_defaults() {
        let req: GenerateRequest = serde_json::from_str(r#"{"jd_text": "Data engineer"}"#).unwrap();
        assert_eq!(req.top_k, 25);
        assert_eq!(req.bullets_per_role, 15);
        assert!(!req.multi_query);
        assert!(req.target_company_type.is_none());
    }

    #[test]
    fn test_ats_request_defaults() {
        let req: AtsScoreRequest = serde_json::from_str(r#"{"jd_text": "SQL"}"#).unwrap();
        assert_eq!(req.top_n_skills, 25);
        assert!(req.strict_mode);
        assert!(req.resume_id.is_none());
    }

    #[test]
    fn test_suggest_request_defaults() {
        let req: SuggestPatchesRequest = serde_json::from_str(r#"{"jd_text": "SQL"}"#).unwrap();
        assert!(req.strict_mode);
        assert!(req.apply_overrides);
        assert_eq!(req.truth_mode, TruthMode::Balanced);
    }

    #[test]
    fn test_resume_state_round_trips_through_json() {
        let state = ResumeState {
            sections: ResumeSections {
                professional_summary: "Summary".to_string(),
                technical_skills: vec!["SQL".to_string()],
                experience: vec![Role {
                    role_id: "role_1".to_string(),
                    company: "Acme".to_string(),
                    bullets: vec!["Did things".to_string()],
                    ..Default::default()
                }],
                education: vec![],
            },
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["sections"]["experience"][0]["role_id"], "role_1");
        let back: ResumeState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }
}
