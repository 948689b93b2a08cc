use serde::{Deserialize, Serialize};

/// One position in the experience section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Role {
    /// Stable identifier inside one resume (`role_1`, `role_2`, ...)
    pub role_id: String,
    pub company: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub dates: Option<String>,
    #[serde(default)]
    pub bullets: Vec<String>,
}

impl Role {
    /// Human label: `Company (dates) - Title | Location`.
    pub fn label(&self) -> String {
        let company = if self.company.trim().is_empty() {
            "Unknown Company"
        } else {
            self.company.as_str()
        };
        let header = match self.dates.as_deref().filter(|d| !d.is_empty()) {
            Some(dates) => format!("{} ({})", company, dates),
            None => company.to_string(),
        };
        let line2 = [self.title.as_deref(), self.location.as_deref()]
            .into_iter()
            .flatten()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" | ");
        if line2.is_empty() {
            header
        } else {
            format!("{} - {}", header, line2)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ResumeSections {
    #[serde(default)]
    pub professional_summary: String,
    #[serde(default)]
    pub technical_skills: Vec<String>,
    #[serde(default)]
    pub experience: Vec<Role>,
    #[serde(default)]
    pub education: Vec<String>,
}

/// The editable, versioned representation of a generated resume.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ResumeState {
    pub sections: ResumeSections,
}

impl ResumeState {
    pub fn find_role(&self, role_id: &str) -> Option<&Role> {
        self.sections.experience.iter().find(|r| r.role_id == role_id)
    }

    pub fn find_role_mut(&mut self, role_id: &str) -> Option<&mut Role> {
        self.sections.experience.iter_mut().find(|r| r.role_id == role_id)
    }

    pub fn has_role(&self, role_id: &str) -> bool {
        self.find_role(role_id).is_some()
    }

    /// Non-empty summary lines.
    pub fn summary_lines(&self) -> Vec<&str> {
        self.sections
            .professional_summary
            .lines()
            .filter(|l| !l.trim().is_empty())
            .collect()
    }

    /// Plain-text rendering used for previews and exports.
    pub fn to_text(&self) -> String {
        let sections = &self.sections;
        let mut lines: Vec<String> = Vec::new();

        if !sections.professional_summary.is_empty() {
            lines.push("PROFESSIONAL SUMMARY".to_string());
            lines.push(sections.professional_summary.clone());
            lines.push(String::new());
        }

        if !sections.technical_skills.is_empty() {
            lines.push("TECHNICAL SKILLS".to_string());
            lines.extend(sections.technical_skills.iter().cloned());
            lines.push(String::new());
        }

        if !sections.experience.is_empty() {
            lines.push("PROFESSIONAL EXPERIENCE".to_string());
            for role in &sections.experience {
                lines.push(role.label());
                lines.extend(role.bullets.iter().map(|b| format!("- {}", b)));
                lines.push(String::new());
            }
        }

        if !sections.education.is_empty() {
            lines.push("EDUCATION".to_string());
            lines.extend(sections.education.iter().cloned());
        }

        lines
            .join("\n")
            .trim()
            .chars()
            .filter(|c| !matches!(c, '~' | '\u{223C}' | '\u{02DC}' | '\u{FF5E}'))
            .collect()
    }
}
