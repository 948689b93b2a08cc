//! Experience inventory across all uploaded resumes.

use shared::text::{clean_bullet, dedupe_preserve, is_bullet};
use shared::{ResumeSections, ResumeState, Role};

use crate::generate::master::ResumeDocument;
use crate::resume::state_parser::parse_resume_text_to_state;

pub const UNKNOWN_COMPANY: &str = "Unknown";
pub const UNKNOWN_TITLE: &str = "Unknown Role";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExperienceInventory {
    pub education: Vec<String>,
    pub roles: Vec<Role>,
}

impl ExperienceInventory {
    /// Base state with empty summary and skills; role ids renumbered in order.
    pub fn into_state(self) -> ResumeState {
        let experience = self
            .roles
            .into_iter()
            .enumerate()
            .map(|(i, role)| Role {
                role_id: format!("role_{}", i + 1),
                ..role
            })
            .collect();
        ResumeState {
            sections: ResumeSections {
                experience,
                education: self.education,
                ..Default::default()
            },
        }
    }
}

/// Roles that carry bullets from every resume, plus the education lines of the
/// first resume that has any. Without a single role, every bullet line across
/// the resumes goes into one `Unknown` role.
pub fn extract_experience_inventory(docs: &[ResumeDocument]) -> ExperienceInventory {
    let mut roles: Vec<Role> = Vec::new();
    let mut education: Vec<String> = Vec::new();

    for doc in docs {
        let sections = parse_resume_text_to_state(&doc.text).sections;
        roles.extend(
            sections
                .experience
                .into_iter()
                .filter(|r| !r.bullets.is_empty())
                .map(|r| Role {
                    title: r.title.clone().or_else(|| Some(UNKNOWN_TITLE.to_string())),
                    ..r
                }),
        );
        if education.is_empty() && !sections.education.is_empty() {
            education = sections.education;
        }
    }

    if roles.is_empty() {
        let bullets = dedupe_preserve(
            docs.iter()
                .flat_map(|d| d.text.lines())
                .filter(|l| is_bullet(l))
                .map(clean_bullet),
        );
        roles.push(Role {
            company: UNKNOWN_COMPANY.to_string(),
            title: Some(UNKNOWN_TITLE.to_string()),
            bullets,
            ..Default::default()
        });
    }

    ExperienceInventory { education, roles }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn doc(name: &str, text: &str) -> ResumeDocument {
        ResumeDocument {
            path: PathBuf::from(name),
            name: name.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_inventory_collects_roles_with_bullets() {
        let docs = vec![
            doc(
                "a.txt",
                "EXPERIENCE\nAcme | Jan 2020 - Present | Engineer\n- Built APIs\nEmpty Co | Jan 2019 - Dec 2019\nEDUCATION\nBSc",
            ),
            doc("b.txt", "EXPERIENCE\nGlobex | Jan 2015 - Dec 2018\n- Wrote SQL\nEDUCATION\nMSc"),
        ];
        let inventory = extract_experience_inventory(&docs);
        assert_eq!(inventory.education, vec!["BSc"]);
        assert_eq!(inventory.roles.len(), 2);
        assert_eq!(inventory.roles[1].title.as_deref(), Some(UNKNOWN_TITLE));

        let state = inventory.into_state();
        let ids: Vec<&str> = state.sections.experience.iter().map(|r| r.role_id.as_str()).collect();
        assert_eq!(ids, vec!["role_1", "role_2"]);
        assert_eq!(state.sections.experience[1].company, "Globex");
    }

    #[test]
    fn test_fallback_role_gathers_all_bullets() {
        let docs = vec![
            doc("a.txt", "Summary line\n- Led migrations\n* Led migrations"),
            doc("b.txt", "\u{2022} Tuned queries"),
        ];
        let inventory = extract_experience_inventory(&docs);
        assert_eq!(inventory.roles.len(), 1);
        assert_eq!(inventory.roles[0].company, UNKNOWN_COMPANY);
        assert_eq!(inventory.roles[0].bullets, vec!["Led migrations", "Tuned queries"]);
        assert!(inventory.education.is_empty());
    }
}
