//! Plain resume text to an editable `ResumeState`.

use shared::text::{clean_bullet, dedupe_preserve, is_bullet};
use shared::{ResumeSections, ResumeState, Role};

use crate::resume::headers::{detect_heading, has_date_range, parse_role_header, Heading};

fn role_from_header(index: usize, line: &str, buffer: &[String]) -> Role {
    let header = parse_role_header(line, buffer);
    Role {
        role_id: format!("role_{}", index),
        company: header.company.clone().unwrap_or_else(|| "Unknown".to_string()),
        title: header.title.clone(),
        location: header.location.clone(),
        dates: header.dates(),
        bullets: Vec::new(),
    }
}

/// Splits resume text into summary, skills, roles and education.
///
/// Lines before the first heading belong to the summary. Inside the experience
/// section a line with a month-year range opens a new role; plain lines before
/// it are kept as header context (company/title), lines after it become bullets.
pub fn parse_resume_text_to_state(text: &str) -> ResumeState {
    let mut summary: Vec<String> = Vec::new();
    let mut skills: Vec<String> = Vec::new();
    let mut education: Vec<String> = Vec::new();
    let mut roles: Vec<Role> = Vec::new();

    let mut section = Heading::Summary;
    let mut current: Option<Role> = None;
    let mut header_buffer: Vec<String> = Vec::new();

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(heading) = detect_heading(line) {
            if let Some(mut role) = current.take() {
                role.bullets.extend(header_buffer.drain(..).map(|l| clean_bullet(&l)));
                roles.push(role);
            }
            header_buffer.clear();
            section = heading;
            continue;
        }

        match section {
            Heading::Summary => summary.push(line.to_string()),
            Heading::Skills => skills.push(clean_bullet(line)),
            Heading::Education => education.push(clean_bullet(line)),
            Heading::Experience => {
                if !is_bullet(line) && has_date_range(line) {
                    if let Some(role) = current.take() {
                        roles.push(role);
                    }
                    current = Some(role_from_header(roles.len() + 1, line, &header_buffer));
                    header_buffer.clear();
                    continue;
                }
                if !is_bullet(line) {
                    header_buffer.push(line.to_string());
                    continue;
                }
                if let Some(role) = current.as_mut() {
                    // plain lines followed by a bullet were not a header after all
                    role.bullets.extend(header_buffer.drain(..).map(|l| clean_bullet(&l)));
                    role.bullets.push(clean_bullet(line));
                }
            }
        }
    }
    if let Some(mut role) = current.take() {
        role.bullets.extend(header_buffer.drain(..).map(|l| clean_bullet(&l)));
        roles.push(role);
    }

    ResumeState {
        sections: ResumeSections {
            professional_summary: summary.join("\n"),
            technical_skills: skills.into_iter().filter(|s| !s.is_empty()).collect(),
            experience: roles,
            education: dedupe_preserve(education.into_iter().filter(|e| !e.is_empty())),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RESUME: &str = "Jane Doe\n\
        jane@example.com\n\
        PROFESSIONAL SUMMARY\n\
        Data engineer with 8 years of experience.\n\
        TECHNICAL SKILLS\n\
        - Languages: Python, SQL\n\
        Cloud: AWS, Snowflake\n\
        PROFESSIONAL EXPERIENCE\n\
        Acme Corp | May 2021 - Present | Senior Data Engineer | Austin, TX\n\
        - Built Airflow pipelines for 40 sources\n\
        - Cut warehouse cost by 30%\n\
        Globex\n\
        Jan 2018 - Apr 2021\n\
        \u{2022} Migrated reports to Tableau\n\
        Education\n\
        BSc Computer Science\n";

    #[test]
    fn test_parse_sections() {
        let state = parse_resume_text_to_state(RESUME);
        let s = &state.sections;
        assert_eq!(
            s.professional_summary,
            "Jane Doe\njane@example.com\nData engineer with 8 years of experience."
        );
        assert_eq!(s.technical_skills, vec!["Languages: Python, SQL", "Cloud: AWS, Snowflake"]);
        assert_eq!(s.education, vec!["BSc Computer Science"]);
        assert_eq!(s.experience.len(), 2);

        let acme = &s.experience[0];
        assert_eq!(acme.role_id, "role_1");
        assert_eq!(acme.company, "Acme Corp");
        assert_eq!(acme.title.as_deref(), Some("Senior Data Engineer"));
        assert_eq!(acme.location.as_deref(), Some("Austin, TX"));
        assert_eq!(acme.dates.as_deref(), Some("May 2021 - Present"));
        assert_eq!(acme.bullets, vec!["Built Airflow pipelines for 40 sources", "Cut warehouse cost by 30%"]);

        let globex = &s.experience[1];
        assert_eq!(globex.role_id, "role_2");
        assert_eq!(globex.company, "Globex");
        assert_eq!(globex.title, None);
        assert_eq!(globex.bullets, vec!["Migrated reports to Tableau"]);
    }

    #[test]
    fn test_round_trip_through_text() {
        let state = parse_resume_text_to_state(RESUME);
        let again = parse_resume_text_to_state(&state.to_text());
        assert_eq!(again.sections.experience, state.sections.experience);
        assert_eq!(again.sections.technical_skills, state.sections.technical_skills);
        assert_eq!(again.sections.education, state.sections.education);
    }

    #[test]
    fn test_no_headings_is_all_summary() {
        let state = parse_resume_text_to_state("Line one\nLine two");
        assert_eq!(state.sections.professional_summary, "Line one\nLine two");
        assert!(state.sections.experience.is_empty());
    }
}
