use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shared::{OverridesRequest, ResumeState, Result, SharedError, VersionPaths};
use tokio::fs;
use tokio::sync::Mutex;
use uuid::Uuid;

const META_FILE: &str = "meta.json";
const STATE_FILE: &str = "resume.json";
pub const DOCX_FILE: &str = "resume.docx";
const OVERRIDES_FILE: &str = "overrides.json";

pub const RESUME_NOT_FOUND: &str = "resume_id not found";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VersionEntry {
    pub version: String,
    pub created_at: String,
    pub resume_json: String,
    #[serde(default)]
    pub resume_docx: Option<String>,
}

impl VersionEntry {
    pub fn paths(&self) -> VersionPaths {
        VersionPaths {
            resume_json: self.resume_json.clone(),
            resume_docx: self.resume_docx.clone(),
        }
    }
}

/// `<root>/<resume_id>/meta.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResumeMeta {
    pub resume_id: String,
    pub created_at: String,
    pub latest_version: String,
    #[serde(default)]
    pub versions: Vec<VersionEntry>,
}

impl ResumeMeta {
    pub fn latest(&self) -> Option<&VersionEntry> {
        self.versions.iter().find(|v| v.version == self.latest_version)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ResumeRepository: Send + Sync {
    async fn create_resume(&self, state: &ResumeState) -> Result<ResumeMeta>;
    async fn load_resume_state(&self, resume_id: &str, version: Option<String>) -> Result<(ResumeState, String)>;
    async fn load_latest_state(&self, resume_id: &str) -> Result<(ResumeState, String)> {
        self.load_resume_state(resume_id, None).await
    }
    async fn append_resume_version(&self, resume_id: &str, state: &ResumeState) -> Result<ResumeMeta>;
    async fn update_version_docx_path(&self, resume_id: &str, version: &str, docx_path: &Path) -> Result<ResumeMeta>;
    async fn resume_exists(&self, resume_id: &str) -> bool;
    async fn save_overrides(&self, resume_id: &str, overrides: &OverridesRequest) -> Result<PathBuf>;
    async fn load_overrides(&self, resume_id: &str) -> Result<Option<OverridesRequest>>;
    fn version_dir(&self, resume_id: &str, version: &str) -> PathBuf;
}

/// Versioned resume store on the local filesystem. Clones share the
/// per-resume write locks.
#[derive(Clone, Debug)]
pub struct ResumeRepositoryImpl {
    pub root: PathBuf,
    write_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

pub fn display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn version_name(n: usize) -> String {
    format!("v{}", n)
}

/// Stored files are written by this process; a parse failure is server-side.
fn parse_stored<T: DeserializeOwned>(path: &Path, raw: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|e| SharedError::Internal(format!("Corrupt {}: {}", display_path(path), e)))
}

impl ResumeRepositoryImpl {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_locks: Arc::new(DashMap::new()),
        }
    }

    /// Serializes read-modify-write cycles on one resume's meta.json.
    fn write_lock(&self, resume_id: &str) -> Arc<Mutex<()>> {
        Arc::clone(&self.write_locks.entry(resume_id.trim().to_string()).or_default())
    }

    /// Rejects ids that could escape the store root.
    fn resume_dir(&self, resume_id: &str) -> Result<PathBuf> {
        let id = resume_id.trim();
        if id.is_empty() || id.contains(['/', '\\']) || id.contains("..") {
            return Err(SharedError::NotFound(RESUME_NOT_FOUND.to_string()));
        }
        Ok(self.root.join(id))
    }

    async fn read_meta(&self, resume_id: &str) -> Result<ResumeMeta> {
        let path = self.resume_dir(resume_id)?.join(META_FILE);
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SharedError::NotFound(RESUME_NOT_FOUND.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        parse_stored(&path, &raw)
    }

    async fn write_meta(&self, meta: &ResumeMeta) -> Result<()> {
        let path = self.resume_dir(&meta.resume_id)?.join(META_FILE);
        fs::write(&path, serde_json::to_string_pretty(meta)?).await?;
        Ok(())
    }

    async fn write_version(&self, resume_id: &str, version: &str, state: &ResumeState) -> Result<VersionEntry> {
        let dir = self.version_dir(resume_id, version);
        fs::create_dir_all(&dir).await?;
        let json_path = dir.join(STATE_FILE);
        fs::write(&json_path, serde_json::to_string_pretty(state)?).await?;
        debug!("Wrote resume state {}", json_path.display());
        Ok(VersionEntry {
            version: version.to_string(),
            created_at: Utc::now().to_rfc3339(),
            resume_json: display_path(&json_path),
            resume_docx: None,
        })
    }
}

#[async_trait::async_trait]
impl ResumeRepository for ResumeRepositoryImpl {
    async fn create_resume(&self, state: &ResumeState) -> Result<ResumeMeta> {
        let resume_id = Uuid::new_v4().simple().to_string();
        fs::create_dir_all(self.resume_dir(&resume_id)?).await?;

        let version = version_name(1);
        let entry = self.write_version(&resume_id, &version, state).await?;
        let meta = ResumeMeta {
            resume_id: resume_id.clone(),
            created_at: entry.created_at.clone(),
            latest_version: version,
            versions: vec![entry],
        };
        self.write_meta(&meta).await?;
        info!("Created resume {}", resume_id);
        Ok(meta)
    }

    async fn load_resume_state(&self, resume_id: &str, version: Option<String>) -> Result<(ResumeState, String)> {
        let meta = self.read_meta(resume_id).await?;
        let version = version.unwrap_or(meta.latest_version);
        let path = self.version_dir(resume_id, &version).join(STATE_FILE);
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SharedError::NotFound(format!("version {} not found", version)))
            }
            Err(e) => return Err(e.into()),
        };
        Ok((parse_stored(&path, &raw)?, version))
    }

    async fn append_resume_version(&self, resume_id: &str, state: &ResumeState) -> Result<ResumeMeta> {
        let lock = self.write_lock(resume_id);
        let _guard = lock.lock().await;
        let mut meta = self.read_meta(resume_id).await?;
        let version = version_name(meta.versions.len() + 1);
        let entry = self.write_version(resume_id, &version, state).await?;
        meta.versions.push(entry);
        meta.latest_version = version;
        self.write_meta(&meta).await?;
        info!("Resume {} now at {}", resume_id, meta.latest_version);
        Ok(meta)
    }

    async fn update_version_docx_path(&self, resume_id: &str, version: &str, docx_path: &Path) -> Result<ResumeMeta> {
        let lock = self.write_lock(resume_id);
        let _guard = lock.lock().await;
        let mut meta = self.read_meta(resume_id).await?;
        let entry = meta
            .versions
            .iter_mut()
            .find(|v| v.version == version)
            .ok_or_else(|| SharedError::NotFound(format!("version {} not found", version)))?;
        entry.resume_docx = Some(display_path(docx_path));
        self.write_meta(&meta).await?;
        Ok(meta)
    }

    async fn resume_exists(&self, resume_id: &str) -> bool {
        match self.resume_dir(resume_id) {
            Ok(dir) => fs::try_exists(dir.join(META_FILE)).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    async fn save_overrides(&self, resume_id: &str, overrides: &OverridesRequest) -> Result<PathBuf> {
        let path = self.resume_dir(resume_id)?.join(OVERRIDES_FILE);
        let lock = self.write_lock(resume_id);
        let _guard = lock.lock().await;
        fs::write(&path, serde_json::to_string_pretty(overrides)?).await?;
        info!("Saved {} overrides for {}", overrides.skills.len(), resume_id);
        Ok(path)
    }

    async fn load_overrides(&self, resume_id: &str) -> Result<Option<OverridesRequest>> {
        let path = self.resume_dir(resume_id)?.join(OVERRIDES_FILE);
        match fs::read_to_string(&path).await {
            Ok(raw) => Ok(Some(parse_stored(&path, &raw)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn version_dir(&self, resume_id: &str, version: &str) -> PathBuf {
        self.root.join(resume_id.trim()).join(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shared::{OverrideSkill, ResumeSections, SkillLevel};
    use tempfile::TempDir;

    fn state(summary: &str) -> ResumeState {
        ResumeState {
            sections: ResumeSections {
                professional_summary: summary.to_string(),
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn test_create_and_append_versions() {
        let dir = TempDir::new().unwrap();
        let repo = ResumeRepositoryImpl::new(dir.path());

        let meta = repo.create_resume(&state("first")).await.unwrap();
        assert_eq!(meta.latest_version, "v1");
        assert!(repo.resume_exists(&meta.resume_id).await);

        let meta = repo.append_resume_version(&meta.resume_id, &state("second")).await.unwrap();
        assert_eq!(meta.latest_version, "v2");
        assert_eq!(meta.versions.len(), 2);

        let (latest, version) = repo.load_latest_state(&meta.resume_id).await.unwrap();
        assert_eq!(version, "v2");
        assert_eq!(latest.sections.professional_summary, "second");

        let (first, _) = repo.load_resume_state(&meta.resume_id, Some("v1".to_string())).await.unwrap();
        assert_eq!(first.sections.professional_summary, "first");
    }

    #[tokio::test]
    async fn test_missing_resume_is_not_found() {
        let dir = TempDir::new().unwrap();
        let repo = ResumeRepositoryImpl::new(dir.path());
        let err = repo.load_latest_state("nope").await.unwrap_err();
        assert_eq!(err, SharedError::NotFound(RESUME_NOT_FOUND.to_string()));
        assert!(!repo.resume_exists("../etc").await);
        assert!(repo.append_resume_version("nope", &state("x")).await.is_err());
    }

    #[tokio::test]
    async fn test_docx_path_is_recorded() {
        let dir = TempDir::new().unwrap();
        let repo = ResumeRepositoryImpl::new(dir.path());
        let meta = repo.create_resume(&state("s")).await.unwrap();
        let docx = repo.version_dir(&meta.resume_id, "v1").join(DOCX_FILE);

        let meta = repo.update_version_docx_path(&meta.resume_id, "v1", &docx).await.unwrap();
        assert_eq!(meta.latest().unwrap().resume_docx, Some(display_path(&docx)));
        assert!(repo.update_version_docx_path(&meta.resume_id, "v9", &docx).await.is_err());
    }

    #[tokio::test]
    async fn test_overrides_round_trip() {
        let dir = TempDir::new().unwrap();
        let repo = ResumeRepositoryImpl::new(dir.path());
        let meta = repo.create_resume(&state("s")).await.unwrap();
        assert_eq!(repo.load_overrides(&meta.resume_id).await.unwrap(), None);

        let overrides = OverridesRequest {
            skills: vec![OverrideSkill {
                skill: "dbt".to_string(),
                level: SkillLevel::HandsOn,
                target_roles: vec!["role_1".to_string()],
                proof_bullets: vec!["Built dbt models for finance marts".to_string()],
            }],
        };
        let path = repo.save_overrides(&meta.resume_id, &overrides).await.unwrap();
        assert!(path.ends_with("overrides.json"));
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\n  \"skills\""));
        assert_eq!(repo.load_overrides(&meta.resume_id).await.unwrap(), Some(overrides));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_keep_every_version() {
        let dir = TempDir::new().unwrap();
        let repo = ResumeRepositoryImpl::new(dir.path());
        let meta = repo.create_resume(&state("base")).await.unwrap();

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let repo = repo.clone();
                let resume_id = meta.resume_id.clone();
                tokio::spawn(async move { repo.append_resume_version(&resume_id, &state(&format!("edit {}", i))).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let (_, latest) = repo.load_latest_state(&meta.resume_id).await.unwrap();
        assert_eq!(latest, "v17");
        let raw = std::fs::read_to_string(dir.path().join(&meta.resume_id).join(META_FILE)).unwrap();
        let stored: ResumeMeta = serde_json::from_str(&raw).unwrap();
        let versions: Vec<String> = stored.versions.iter().map(|v| v.version.clone()).collect();
        let expected: Vec<String> = (1..=17).map(version_name).collect();
        assert_eq!(versions, expected);
    }

    #[tokio::test]
    async fn test_corrupt_stored_files_are_internal_errors() {
        let dir = TempDir::new().unwrap();
        let repo = ResumeRepositoryImpl::new(dir.path());
        let meta = repo.create_resume(&state("s")).await.unwrap();

        let state_path = repo.version_dir(&meta.resume_id, "v1").join(STATE_FILE);
        std::fs::write(&state_path, "{not json").unwrap();
        let err = repo.load_latest_state(&meta.resume_id).await.unwrap_err();
        assert!(matches!(err, SharedError::Internal(ref m) if m.starts_with("Corrupt ")), "{:?}", err);

        std::fs::write(dir.path().join(&meta.resume_id).join(META_FILE), "[]").unwrap();
        let err = repo.load_latest_state(&meta.resume_id).await.unwrap_err();
        assert!(matches!(err, SharedError::Internal(_)), "{:?}", err);
    }
}
