//! Text extraction and chunking for uploaded resumes.

use std::io::{Cursor, Read};
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use shared::{text::is_bullet, Result, SharedError};

pub const SUPPORTED: [&str; 3] = [".pdf", ".docx", ".txt"];
pub const DEFAULT_MAX_CHARS: usize = 900;
const MIN_CHUNK_CHARS: usize = 25;

const WORD_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

static INLINE_SPACE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());
static BLANK_RUN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Lower-cased `.ext` of a file name, empty when there is none.
pub fn suffix_of(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

pub fn is_supported(filename: &str) -> bool {
    SUPPORTED.contains(&suffix_of(filename).as_str())
}

pub fn read_text(path: &Path) -> Result<String> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let bytes = std::fs::read(path)?;
    extract_text(&name, &bytes)
}

/// Extracts plain text from file content, dispatching on the file name suffix.
pub fn extract_text(filename: &str, bytes: &[u8]) -> Result<String> {
    match suffix_of(filename).as_str() {
        ".txt" => Ok(String::from_utf8_lossy(bytes).to_string()),
        ".docx" => docx_text(bytes),
        ".pdf" => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| SharedError::BadRequest(format!("Could not read PDF {}: {}", filename, e))),
        other => Err(SharedError::BadRequest(format!("Unsupported file type: {}", other))),
    }
}

/// Body paragraphs of `word/document.xml`, one per line.
fn docx_text(bytes: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| SharedError::BadRequest(format!("Invalid DOCX archive: {}", e)))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| SharedError::BadRequest(format!("DOCX has no document part: {}", e)))?
        .read_to_string(&mut xml)?;

    let doc = roxmltree::Document::parse(&xml)
        .map_err(|e| SharedError::BadRequest(format!("Invalid DOCX XML: {}", e)))?;

    let body = doc
        .descendants()
        .find(|n| n.has_tag_name((WORD_NS, "body")));
    let Some(body) = body else {
        return Ok(String::new());
    };

    let paragraphs: Vec<String> = body
        .children()
        .filter(|n| n.has_tag_name((WORD_NS, "p")))
        .map(paragraph_text)
        .collect();
    Ok(paragraphs.join("\n"))
}

fn paragraph_text(paragraph: roxmltree::Node) -> String {
    let mut out = String::new();
    for node in paragraph.descendants() {
        if node.has_tag_name((WORD_NS, "t")) {
            out.push_str(node.text().unwrap_or(""));
        } else if node.has_tag_name((WORD_NS, "tab")) {
            out.push('\t');
        } else if node.has_tag_name((WORD_NS, "br")) {
            out.push('\n');
        }
    }
    out
}

pub fn normalize(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = INLINE_SPACE_REGEX.replace_all(&text, " ");
    let text = BLANK_RUN_REGEX.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Bullet lines become their own chunk; other lines are packed into
/// paragraphs of at most `max_chars`. Short chunks are dropped.
pub fn chunk_resume(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut buf = String::new();

    fn flush(buf: &mut String, chunks: &mut Vec<String>) {
        let trimmed = buf.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }
        buf.clear();
    }

    for line in text.split('\n').map(str::trim).filter(|l| !l.is_empty()) {
        if is_bullet(line) {
            flush(&mut buf, &mut chunks);
            chunks.push(line.to_string());
        } else {
            if buf.chars().count() + line.chars().count() + 1 > max_chars {
                flush(&mut buf, &mut chunks);
            }
            if buf.is_empty() {
                buf.push_str(line);
            } else {
                buf.push(' ');
                buf.push_str(line);
            }
        }
    }
    flush(&mut buf, &mut chunks);

    chunks
        .into_iter()
        .filter(|c| c.chars().count() >= MIN_CHUNK_CHARS)
        .collect()
}

pub fn infer_resume_type(filename: &str) -> &'static str {
    let name = filename.to_lowercase();
    if name.contains("python") {
        "python_fullstack"
    } else if name.contains("java") {
        "java_fullstack"
    } else if name.contains("dotnet") || name.contains(".net") {
        "dotnet_fullstack"
    } else if name.contains("devops") {
        "devops"
    } else if name.contains("data") {
        "data_engineer"
    } else if name.contains("ml") || name.contains("ai") {
        "ai_ml"
    } else {
        "general"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use test_case::test_case;

    pub(crate) fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>", p))
            .collect();
        let xml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><w:document xmlns:w=\"{}\"><w:body>{}</w:body></w:document>",
            WORD_NS, body
        );
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut cursor);
            zip.start_file("word/document.xml", zip::write::FileOptions::default())
                .unwrap();
            zip.write_all(xml.as_bytes()).unwrap();
            zip.finish().unwrap();
        }
        cursor.into_inner()
    }

    #[test_case("resume.TXT", ".txt")]
    #[test_case("a.b.docx", ".docx")]
    #[test_case("noext", "")]
    fn test_suffix_of(name: &str, expected: &str) {
        assert_eq!(suffix_of(name), expected);
    }

    #[test]
    fn test_unsupported_suffix() {
        let err = extract_text("resume.rtf", b"x").unwrap_err();
        assert_eq!(err.detail(), "Unsupported file type: .rtf");
        assert!(!is_supported("resume.rtf"));
        assert!(is_supported("Resume.PDF"));
    }

    #[test]
    fn test_txt_is_lossy_utf8() {
        let text = extract_text("a.txt", b"hello \xff world").unwrap();
        assert!(text.starts_with("hello "));
        assert!(text.ends_with(" world"));
    }

    #[test]
    fn test_docx_paragraphs_joined_by_newline() {
        let bytes = docx_bytes(&["PROFESSIONAL SUMMARY", "Builds pipelines"]);
        let text = extract_text("cv.docx", &bytes).unwrap();
        assert_eq!(text, "PROFESSIONAL SUMMARY\nBuilds pipelines");
    }

    #[test]
    fn test_invalid_docx_is_bad_request() {
        let err = extract_text("cv.docx", b"not a zip").unwrap_err();
        assert!(matches!(err, SharedError::BadRequest(_)));
    }

    #[test]
    fn test_normalize() {
        let raw = "  Line\t\tone  \r\n\r\n\r\n\r\nLine   two\r";
        assert_eq!(normalize(raw), "Line one \n\nLine two");
    }

    #[test]
    fn test_chunk_resume_splits_bullets_and_paragraphs() {
        let text = "Senior engineer with a decade of platform work\n\
                    - Built streaming ingestion on Kafka and Spark\n\
                    • Led migration of reporting to Snowflake\n\
                    short\n\
                    1. Automated CI/CD pipelines with GitHub Actions";
        let chunks = chunk_resume(text, DEFAULT_MAX_CHARS);
        assert_eq!(
            chunks,
            vec![
                "Senior engineer with a decade of platform work",
                "- Built streaming ingestion on Kafka and Spark",
                "• Led migration of reporting to Snowflake",
                "1. Automated CI/CD pipelines with GitHub Actions",
            ]
        );
    }

    #[test]
    fn test_chunk_resume_flushes_before_max_chars() {
        let line = "x".repeat(30);
        let text = format!("{}\n{}\n{}", line, line, line);
        let chunks = chunk_resume(&text, 64);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 61);
        assert_eq!(chunks[1], line);
    }

    #[test_case("python_resume.pdf", "python_fullstack")]
    #[test_case("Java-Dev.docx", "java_fullstack")]
    #[test_case("dotnet.txt", "dotnet_fullstack")]
    #[test_case("devops_cv.txt", "devops")]
    #[test_case("data_engineer.txt", "data_engineer")]
    #[test_case("ml_research.txt", "ai_ml")]
    #[test_case("resume.txt", "general")]
    fn test_infer_resume_type(name: &str, expected: &str) {
        assert_eq!(infer_resume_type(name), expected);
    }
}
