use shared::{ResumeState, Role, SkillCoverage};

/// `Company (dates) - title | location`, dropping the empty parts.
pub fn role_label(role: &Role) -> String {
    role.label()
}

/// `(label, role_id)` for every role, in resume order.
pub fn role_options(state: &ResumeState) -> Vec<(String, String)> {
    state
        .sections
        .experience
        .iter()
        .map(|role| (role_label(role), role.role_id.clone()))
        .collect()
}

/// Plain-text preview of a state; empty when nothing is loaded.
pub fn extract_resume_text(state: Option<&ResumeState>) -> String {
    state.map(ResumeState::to_text).unwrap_or_default()
}

/// Evidence locations joined for one table cell.
pub fn evidence_summary(coverage: &SkillCoverage) -> String {
    coverage
        .evidence
        .iter()
        .map(|e| e.short_ref())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shared::{CoverageStatus, EvidenceSection, ResumeSections, SkillEvidence};

    fn state() -> ResumeState {
        ResumeState {
            sections: ResumeSections {
                professional_summary: "Engineer with 10 years".to_string(),
                experience: vec![
                    Role {
                        role_id: "role_1".to_string(),
                        company: "Acme".to_string(),
                        title: Some("Data Engineer".to_string()),
                        dates: Some("2020 - Present".to_string()),
                        bullets: vec!["Built pipelines".to_string()],
                        ..Default::default()
                    },
                    Role {
                        role_id: "role_2".to_string(),
                        ..Default::default()
                    },
                ],
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_role_options() {
        assert_eq!(
            role_options(&state()),
            vec![
                ("Acme (2020 - Present) - Data Engineer".to_string(), "role_1".to_string()),
                ("Unknown Company".to_string(), "role_2".to_string()),
            ]
        );
    }

    #[test]
    fn test_extract_resume_text() {
        assert_eq!(extract_resume_text(None), "");
        let text = extract_resume_text(Some(&state()));
        assert!(text.starts_with("PROFESSIONAL SUMMARY\nEngineer with 10 years"));
        assert!(text.contains("- Built pipelines"));
    }

    #[test]
    fn test_evidence_summary() {
        let coverage = SkillCoverage {
            skill: "SQL".to_string(),
            status: CoverageStatus::Direct,
            evidence: vec![
                SkillEvidence {
                    section: EvidenceSection::Experience,
                    role_id: Some("role_1".to_string()),
                    bullet_index: Some(0),
                    snippet: "SQL".to_string(),
                },
                SkillEvidence {
                    section: EvidenceSection::TechnicalSkills,
                    role_id: None,
                    bullet_index: None,
                    snippet: "SQL".to_string(),
                },
            ],
            direct_from_resume: true,
        };
        assert_eq!(evidence_summary(&coverage), "experience:role_1/0, technical_skills:/");
    }
}
