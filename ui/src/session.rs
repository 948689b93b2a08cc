//! Values carried between invocations, kept in the working directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use shared::{PatchOperation, TruthMode};

pub const SESSION_FILE: &str = ".resume_ui_session.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Session {
    #[serde(default)]
    pub resume_id: Option<String>,
    #[serde(default)]
    pub jd_path: Option<PathBuf>,
    #[serde(default)]
    pub truth_mode: TruthMode,
    #[serde(default)]
    pub suggested_patches: Vec<PatchOperation>,
}

impl Session {
    /// Stored session, or an empty one when the file is missing or unreadable.
    pub fn load(path: &Path) -> Self {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(_) => return Self::default(),
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("Ignoring unreadable session file {}: {}", path.display(), e);
            Self::default()
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(path, raw).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Starts over on a new resume; suggestions belong to the old one.
    pub fn set_resume(&mut self, resume_id: &str) {
        if self.resume_id.as_deref() != Some(resume_id) {
            self.suggested_patches.clear();
        }
        self.resume_id = Some(resume_id.to_string());
    }

    /// Explicit id, else the remembered one.
    pub fn resume_id(&self, explicit: Option<&str>) -> Result<String> {
        explicit
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .or(self.resume_id.as_deref())
            .map(str::to_string)
            .context("resume_id required")
    }

    /// JD text from the explicit path (remembered for later), else from the
    /// remembered path.
    pub fn jd_text(&mut self, explicit: Option<&Path>) -> Result<String> {
        if let Some(path) = explicit {
            self.jd_path = Some(path.to_path_buf());
        }
        let path = self.jd_path.as_deref().context("JD text is required (pass --jd <file>)")?;
        let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        if text.trim().is_empty() {
            anyhow::bail!("JD text is required");
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip_and_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SESSION_FILE);
        assert_eq!(Session::load(&path), Session::default());

        let mut session = Session::default();
        session.set_resume("abc");
        session.truth_mode = TruthMode::Strict;
        session.save(&path).unwrap();
        assert_eq!(Session::load(&path), session);

        fs::write(&path, "not json").unwrap();
        assert_eq!(Session::load(&path), Session::default());
    }

    #[test]
    fn test_resume_id_precedence() {
        let mut session = Session::default();
        assert!(session.resume_id(None).is_err());
        session.set_resume("stored");
        assert_eq!(session.resume_id(Some(" given ")).unwrap(), "given");
        assert_eq!(session.resume_id(Some("  ")).unwrap(), "stored");
    }

    #[test]
    fn test_new_resume_clears_suggestions() {
        let mut session = Session::default();
        session.set_resume("a");
        session.suggested_patches.push(PatchOperation::default());
        session.set_resume("a");
        assert_eq!(session.suggested_patches.len(), 1);
        session.set_resume("b");
        assert!(session.suggested_patches.is_empty());
    }

    #[test]
    fn test_jd_text_is_remembered() {
        let dir = TempDir::new().unwrap();
        let jd = dir.path().join("jd.txt");
        fs::write(&jd, "Data engineer, SQL").unwrap();

        let mut session = Session::default();
        assert!(session.jd_text(None).is_err());
        assert_eq!(session.jd_text(Some(&jd)).unwrap(), "Data engineer, SQL");
        assert_eq!(session.jd_text(None).unwrap(), "Data engineer, SQL");

        fs::write(&jd, "  \n").unwrap();
        assert_eq!(session.jd_text(None).unwrap_err().to_string(), "JD text is required");
    }
}
