//! Upload handling: decode, validate and store resume files.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use log::info;
use shared::{Result, SharedError, UploadFile};

use crate::ingest::parsing::is_supported;

/// A validated upload ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedUpload {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// The final path component of a client-supplied file name.
pub fn safe_file_name(filename: &str) -> Option<String> {
    let normalized = filename.replace('\\', "/");
    let name = normalized.rsplit('/').next().unwrap_or("").trim();
    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name.to_string())
    }
}

/// Checks every file before anything is written.
pub fn decode_uploads(files: &[UploadFile]) -> Result<Vec<DecodedUpload>> {
    if files.is_empty() {
        return Err(SharedError::BadRequest("No files uploaded.".to_string()));
    }
    files
        .iter()
        .map(|file| {
            let name = safe_file_name(&file.filename)
                .filter(|n| is_supported(n))
                .ok_or_else(|| SharedError::BadRequest(format!("Unsupported file type: {}", file.filename)))?;
            let bytes = STANDARD
                .decode(file.content_base64.trim())
                .map_err(|e| SharedError::BadRequest(format!("Invalid base64 content for {}: {}", file.filename, e)))?;
            Ok(DecodedUpload { name, bytes })
        })
        .collect()
}

/// Writes uploads into `resumes_dir`, replacing files with the same name.
pub async fn save_uploads(resumes_dir: &Path, uploads: &[DecodedUpload]) -> Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(resumes_dir).await?;
    let mut saved = Vec::with_capacity(uploads.len());
    for upload in uploads {
        let dest = resumes_dir.join(&upload.name);
        tokio::fs::write(&dest, &upload.bytes).await?;
        saved.push(dest);
    }
    info!("Saved {} resume files to {}", saved.len(), resumes_dir.display());
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;
    use test_case::test_case;

    fn upload(name: &str, content: &[u8]) -> UploadFile {
        UploadFile {
            filename: name.to_string(),
            content_base64: STANDARD.encode(content),
        }
    }

    #[test_case("resume.txt", Some("resume.txt"))]
    #[test_case("../../etc/cv.pdf", Some("cv.pdf"))]
    #[test_case("C:\\Users\\me\\cv.docx", Some("cv.docx"))]
    #[test_case("dir/", None)]
    #[test_case("..", None)]
    fn test_safe_file_name(input: &str, expected: Option<&str>) {
        assert_eq!(safe_file_name(input).as_deref(), expected);
    }

    #[test]
    fn test_decode_rejects_empty_and_unsupported() {
        assert_eq!(
            decode_uploads(&[]).unwrap_err(),
            SharedError::BadRequest("No files uploaded.".to_string())
        );
        assert_eq!(
            decode_uploads(&[upload("notes.md", b"x")]).unwrap_err(),
            SharedError::BadRequest("Unsupported file type: notes.md".to_string())
        );
    }

    #[test]
    fn test_decode_rejects_bad_base64() {
        let bad = UploadFile {
            filename: "a.txt".to_string(),
            content_base64: "!!not base64!!".to_string(),
        };
        let err = decode_uploads(&[bad]).unwrap_err();
        assert!(matches!(err, SharedError::BadRequest(m) if m.starts_with("Invalid base64 content for a.txt")));
    }

    #[tokio::test]
    async fn test_save_uploads_writes_by_name() {
        let dir = TempDir::new().unwrap();
        let decoded = decode_uploads(&[upload("../cv.txt", b"hello")]).unwrap();
        let saved = save_uploads(dir.path(), &decoded).await.unwrap();
        assert_eq!(saved, vec![dir.path().join("cv.txt")]);
        assert_eq!(std::fs::read_to_string(&saved[0]).unwrap(), "hello");
    }
}
