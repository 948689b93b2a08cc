//! DOCX rendering of a resume state on top of a template package.

use std::fs::File;
use std::io::{Cursor, Read, Write};
use std::path::Path;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use shared::{ResumeState, Result, SharedError};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const DOCUMENT_PART: &str = "word/document.xml";
pub const TEMPLATE_MISSING: &str =
    "DOCX template not found. Put template at storage/resumes/template/template.docx";

static FOLDER_UNSAFE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]+").unwrap());

const DOCUMENT_HEAD: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#;
const DOCUMENT_TAIL: &str = "<w:sectPr/></w:body></w:document>";

/// Escapes markup and drops characters XML 1.0 does not allow.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if c < '\u{20}' || c == '\u{FFFE}' || c == '\u{FFFF}' => {}
            _ => out.push(c),
        }
    }
    out
}

fn paragraph(text: &str, bold: bool) -> String {
    let props = if bold { "<w:rPr><w:b/></w:rPr>" } else { "" };
    format!(
        r#"<w:p><w:r>{}<w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        props,
        escape_xml(text)
    )
}

/// `word/document.xml` for the state: section headings in bold, role labels
/// in bold, bullets prefixed with `- `.
pub fn render_document_xml(state: &ResumeState) -> String {
    let sections = &state.sections;
    let mut body = String::new();

    let summary = state.summary_lines();
    if !summary.is_empty() {
        body.push_str(&paragraph("PROFESSIONAL SUMMARY", true));
        for line in summary {
            body.push_str(&paragraph(line.trim(), false));
        }
    }
    if !sections.technical_skills.is_empty() {
        body.push_str(&paragraph("TECHNICAL SKILLS", true));
        for line in &sections.technical_skills {
            body.push_str(&paragraph(line, false));
        }
    }
    if !sections.experience.is_empty() {
        body.push_str(&paragraph("PROFESSIONAL EXPERIENCE", true));
        for role in &sections.experience {
            body.push_str(&paragraph(&role.label(), true));
            for bullet in &role.bullets {
                body.push_str(&paragraph(&format!("- {}", bullet), false));
            }
        }
    }
    if !sections.education.is_empty() {
        body.push_str(&paragraph("EDUCATION", true));
        for line in &sections.education {
            body.push_str(&paragraph(line, false));
        }
    }

    format!("{}{}{}", DOCUMENT_HEAD, body, DOCUMENT_TAIL)
}

fn zip_error(e: zip::result::ZipError) -> SharedError {
    SharedError::Internal(format!("DOCX packaging failed: {}", e))
}

/// Copies every part of `template` except the document body, which is
/// regenerated from `state`, into a new package at `out`.
pub fn export_docx_from_state(state: &ResumeState, template: &Path, out: &Path) -> Result<()> {
    if !template.exists() {
        return Err(SharedError::BadRequest(TEMPLATE_MISSING.to_string()));
    }
    let bytes = std::fs::read(template)?;
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| SharedError::BadRequest(format!("Invalid DOCX template: {}", e)))?;

    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = ZipWriter::new(File::create(out)?);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(zip_error)?;
        let name = entry.name().to_string();
        if name == DOCUMENT_PART {
            continue;
        }
        if entry.is_dir() {
            writer.add_directory(name, options).map_err(zip_error)?;
            continue;
        }
        let mut content = Vec::new();
        entry.read_to_end(&mut content)?;
        writer.start_file(name, options).map_err(zip_error)?;
        writer.write_all(&content)?;
    }

    writer.start_file(DOCUMENT_PART, options).map_err(zip_error)?;
    writer.write_all(render_document_xml(state).as_bytes())?;
    writer.finish().map_err(zip_error)?;

    debug!("Wrote DOCX {}", out.display());
    Ok(())
}

/// `Company_Position[_JobId]` with unsafe characters collapsed to `_` and
/// leading or trailing dots removed from each part.
pub fn export_folder_name(company: &str, position: &str, job_id: Option<&str>) -> String {
    let mut parts = vec![company, position];
    parts.extend(job_id.map(str::trim).filter(|j| !j.is_empty()));
    let name = parts
        .into_iter()
        .map(|p| {
            FOLDER_UNSAFE_REGEX
                .replace_all(p.trim(), "_")
                .trim_matches(|c: char| c == '_' || c == '.')
                .to_string()
        })
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    if name.is_empty() {
        "resume".to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::parsing::extract_text;
    use pretty_assertions::assert_eq;
    use shared::{ResumeSections, Role};
    use tempfile::TempDir;

    fn write_template(path: &Path) {
        let mut writer = ZipWriter::new(File::create(path).unwrap());
        let options = FileOptions::default();
        writer.start_file("[Content_Types].xml", options).unwrap();
        writer.write_all(b"<Types/>").unwrap();
        writer.start_file(DOCUMENT_PART, options).unwrap();
        writer.write_all(b"<old/>").unwrap();
        writer.finish().unwrap();
    }

    fn state() -> ResumeState {
        ResumeState {
            sections: ResumeSections {
                professional_summary: "Data engineer & analyst".to_string(),
                technical_skills: vec!["SQL, Python".to_string()],
                experience: vec![Role {
                    role_id: "role_1".to_string(),
                    company: "Acme".to_string(),
                    title: Some("Engineer".to_string()),
                    dates: Some("Jan 2020 - Present".to_string()),
                    bullets: vec!["Built <fast> pipelines".to_string()],
                    ..Default::default()
                }],
                education: vec!["BSc".to_string()],
            },
        }
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml(r#"a<b>&"c'"#), "a&lt;b&gt;&amp;&quot;c&apos;");
    }

    #[test]
    fn test_escape_xml_drops_control_characters() {
        assert_eq!(escape_xml("Led\u{0}team\u{7} of 5\tengineers\u{FFFF}"), "Ledteam of 5\tengineers");
        assert_eq!(escape_xml("line\r\nnext"), "line\r\nnext");
    }

    #[test]
    fn test_export_replaces_document_and_keeps_other_parts() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("template.docx");
        write_template(&template);
        let out = dir.path().join("out").join("resume.docx");

        export_docx_from_state(&state(), &template, &out).unwrap();

        let bytes = std::fs::read(&out).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes.clone())).unwrap();
        assert!(archive.by_name("[Content_Types].xml").is_ok());

        let text = extract_text("resume.docx", &bytes).unwrap();
        assert_eq!(
            text.lines().collect::<Vec<_>>(),
            vec![
                "PROFESSIONAL SUMMARY",
                "Data engineer & analyst",
                "TECHNICAL SKILLS",
                "SQL, Python",
                "PROFESSIONAL EXPERIENCE",
                "Acme (Jan 2020 - Present) - Engineer",
                "- Built <fast> pipelines",
                "EDUCATION",
                "BSc",
            ]
        );
    }

    #[test]
    fn test_missing_template_is_bad_request() {
        let dir = TempDir::new().unwrap();
        let err = export_docx_from_state(&state(), &dir.path().join("nope.docx"), &dir.path().join("o.docx"))
            .unwrap_err();
        assert_eq!(err, SharedError::BadRequest(TEMPLATE_MISSING.to_string()));
    }

    #[test]
    fn test_export_folder_name() {
        assert_eq!(export_folder_name("Acme Corp", "Data Engineer", None), "Acme_Corp_Data_Engineer");
        assert_eq!(export_folder_name(" Acme/Corp ", "Sr. Eng", Some(" 42 ")), "Acme_Corp_Sr._Eng_42");
        assert_eq!(export_folder_name("../x", "y", Some("")), "x_y");
        assert_eq!(export_folder_name("..", "/", None), "resume");
    }
}
