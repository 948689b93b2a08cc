use std::path::PathBuf;

use log::info;
use shared::text::clean_bullet;
use shared::{
    ApplyPatchesRequest, ApplyPatchesResponse, AtsScoreRequest, AtsScoreResponse, BlockedPlanRequest,
    BlockedPlanResponse, BulletEditRequest, BulletEditResponse, OverrideSkill, OverridesFromBlockedRequest,
    OverridesFromBlockedResponse, OverridesRequest, OverridesResponse, ResumeState, ResumeStateResponse,
    Role, RoleSelector, SharedError, SuggestPatchesRequest, SuggestPatchesResponse, UpdatedRole, VersionPaths,
};

use crate::ats::scoring::score_resume_against_jd;
use crate::error::{run_blocking, ApiError};
use crate::export::docx::export_docx_from_state;
use crate::resume::guardrails::{apply_truth_guardrails, plan_suggestions, validate_patches_truth_mode};
use crate::resume::patches::apply_patches_to_state;
use crate::resume::repository::{display_path, ResumeMeta, ResumeRepository, DOCX_FILE, RESUME_NOT_FOUND};
use crate::resume::state_parser::parse_resume_text_to_state;

pub const DEFAULT_TOP_N_SKILLS: usize = 25;
pub const MIN_BULLET_CHARS: usize = 10;
pub const MAX_BULLET_CHARS: usize = 300;
pub const MIN_PROOF_CHARS: usize = 5;
pub const MAX_PROOF_BULLETS: usize = 3;

type ApiResult<T> = std::result::Result<T, ApiError>;

#[async_trait::async_trait]
pub trait ResumeUseCase: Send + Sync {
    async fn get_resume(&self, resume_id: &str) -> ApiResult<ResumeStateResponse>;
    async fn edit_bullet(&self, resume_id: &str, request: BulletEditRequest) -> ApiResult<BulletEditResponse>;
    async fn ats_score(&self, request: AtsScoreRequest) -> ApiResult<AtsScoreResponse>;
    async fn save_overrides(&self, resume_id: &str, overrides: OverridesRequest) -> ApiResult<OverridesResponse>;
    async fn suggest_patches(&self, resume_id: &str, request: SuggestPatchesRequest)
        -> ApiResult<SuggestPatchesResponse>;
    async fn apply_patches(&self, resume_id: &str, request: ApplyPatchesRequest) -> ApiResult<ApplyPatchesResponse>;
    async fn blocked_plan(&self, resume_id: &str, request: BlockedPlanRequest) -> ApiResult<BlockedPlanResponse>;
    async fn overrides_from_blocked(
        &self,
        resume_id: &str,
        request: OverridesFromBlockedRequest,
    ) -> ApiResult<OverridesFromBlockedResponse>;
}

pub struct ResumeUseCaseImpl<R: ResumeRepository> {
    pub repo: R,
    pub docx_template: PathBuf,
}

/// Index of the role picked by id, or by case-insensitive company + dates.
pub fn select_role_index(roles: &[Role], selector: &RoleSelector) -> ApiResult<usize> {
    let role_id = selector.role_id.as_deref().unwrap_or("").trim();
    let company = selector.company.as_deref().unwrap_or("").trim().to_lowercase();
    let dates = selector.dates.as_deref().unwrap_or("").trim().to_lowercase();

    if !role_id.is_empty() {
        return roles
            .iter()
            .position(|r| r.role_id == role_id)
            .ok_or_else(|| ApiError::not_found("role_id not found"));
    }
    if company.is_empty() || dates.is_empty() {
        return Err(ApiError::validation_error("Provide role_id or company + dates"));
    }

    let matches: Vec<usize> = roles
        .iter()
        .enumerate()
        .filter(|(_, r)| {
            r.company.trim().to_lowercase() == company
                && r.dates.as_deref().unwrap_or("").trim().to_lowercase() == dates
        })
        .map(|(i, _)| i)
        .collect();

    match matches.as_slice() {
        [] => Err(ApiError::not_found("role not found for company + dates")),
        [only] => Ok(*only),
        many => {
            let role_ids: Vec<&str> = many.iter().map(|i| roles[*i].role_id.as_str()).collect();
            Err(ApiError::conflict("multiple roles matched").with_detail(serde_json::json!({
                "message": "multiple roles matched",
                "role_ids": role_ids,
            })))
        }
    }
}

/// Cleaned bullet when its length is within the edit limits.
pub fn valid_edit_bullet(text: &str) -> Option<String> {
    let cleaned = clean_bullet(text);
    let len = cleaned.chars().count();
    (MIN_BULLET_CHARS..=MAX_BULLET_CHARS).contains(&len).then_some(cleaned)
}

/// Folds confirmed blocked items into `overrides`, matching skills
/// case-insensitively and keeping at most [`MAX_PROOF_BULLETS`] per skill.
pub fn merge_blocked_items(
    overrides: &mut OverridesRequest,
    state: &ResumeState,
    request: &OverridesFromBlockedRequest,
) -> shared::Result<()> {
    for item in &request.items {
        if !state.has_role(&item.role_id) {
            return Err(SharedError::Validation(format!("role_id not found: {}", item.role_id)));
        }
        let cleaned = clean_bullet(&item.proof_bullet);
        if cleaned.chars().count() < MIN_PROOF_CHARS {
            return Err(SharedError::Validation(
                "proof_bullet is too short after sanitization".to_string(),
            ));
        }

        match overrides.find_mut(&item.skill) {
            Some(entry) => {
                entry.level = item.level;
                if !entry.target_roles.contains(&item.role_id) {
                    entry.target_roles.push(item.role_id.clone());
                }
                if !entry.proof_bullets.contains(&cleaned) {
                    entry.proof_bullets.push(cleaned);
                }
                entry.proof_bullets.truncate(MAX_PROOF_BULLETS);
            }
            None => overrides.skills.push(OverrideSkill {
                skill: item.skill.clone(),
                level: item.level,
                target_roles: vec![item.role_id.clone()],
                proof_bullets: vec![cleaned],
            }),
        }
    }
    Ok(())
}

fn latest_paths(meta: &ResumeMeta) -> ApiResult<VersionPaths> {
    meta.latest()
        .map(|v| v.paths())
        .ok_or_else(|| ApiError::internal_error("latest version missing from meta"))
}

impl<R: ResumeRepository> ResumeUseCaseImpl<R> {
    async fn load_state(&self, resume_id: &str) -> ApiResult<(ResumeState, String)> {
        Ok(self.repo.load_latest_state(resume_id).await?)
    }

    /// Stores `state` as a new version, with a DOCX beside it when asked.
    async fn save_version(&self, resume_id: &str, state: &ResumeState, export_docx: bool) -> ApiResult<ResumeMeta> {
        let meta = self.repo.append_resume_version(resume_id, state).await?;
        if !export_docx {
            return Ok(meta);
        }
        let version = meta.latest_version.clone();
        let out = self.repo.version_dir(resume_id, &version).join(DOCX_FILE);
        let (snapshot, template, target) = (state.clone(), self.docx_template.clone(), out.clone());
        run_blocking(move || export_docx_from_state(&snapshot, &template, &target)).await?;
        Ok(self.repo.update_version_docx_path(resume_id, &version, &out).await?)
    }
}

#[async_trait::async_trait]
impl<R: ResumeRepository> ResumeUseCase for ResumeUseCaseImpl<R> {
    async fn get_resume(&self, resume_id: &str) -> ApiResult<ResumeStateResponse> {
        let (state, version) = self.load_state(resume_id).await?;
        Ok(ResumeStateResponse {
            resume_id: resume_id.to_string(),
            version,
            state,
        })
    }

    async fn edit_bullet(&self, resume_id: &str, request: BulletEditRequest) -> ApiResult<BulletEditResponse> {
        let (mut state, _) = self.load_state(resume_id).await?;
        let role_idx = select_role_index(&state.sections.experience, &request.role_selector)?;

        let role = &mut state.sections.experience[role_idx];
        let bullet_idx = usize::try_from(request.bullet_index)
            .ok()
            .filter(|i| *i < role.bullets.len())
            .ok_or_else(|| ApiError::validation_error("bullet_index out of range"))?;
        let cleaned =
            valid_edit_bullet(&request.new_bullet).ok_or_else(|| ApiError::validation_error("new_bullet is invalid"))?;
        role.bullets[bullet_idx] = cleaned;

        let updated_role = UpdatedRole {
            role_id: role.role_id.clone(),
            company: role.company.clone(),
            title: role.title.clone(),
            dates: role.dates.clone(),
        };

        let meta = self.save_version(resume_id, &state, request.export_docx).await?;
        info!("Edited bullet {} of {} in {}", bullet_idx, updated_role.role_id, resume_id);
        Ok(BulletEditResponse {
            resume_id: resume_id.to_string(),
            paths: latest_paths(&meta)?,
            version: meta.latest_version,
            updated_role,
            updated_bullet_index: bullet_idx,
        })
    }

    async fn ats_score(&self, request: AtsScoreRequest) -> ApiResult<AtsScoreResponse> {
        let resume_id = request.resume_id.as_deref().map(str::trim).filter(|id| !id.is_empty());
        let resume_text = request.resume_text.as_deref().filter(|t| !t.trim().is_empty());

        let state = match (resume_id, resume_text) {
            (Some(id), _) => self.load_state(id).await?.0,
            (None, Some(text)) => parse_resume_text_to_state(text),
            (None, None) => return Err(ApiError::validation_error("resume_id or resume_text is required")),
        };
        Ok(score_resume_against_jd(
            &request.jd_text,
            &state,
            request.top_n_skills,
            request.strict_mode,
        ))
    }

    async fn save_overrides(&self, resume_id: &str, overrides: OverridesRequest) -> ApiResult<OverridesResponse> {
        if !self.repo.resume_exists(resume_id).await {
            return Err(ApiError::not_found(RESUME_NOT_FOUND));
        }
        let path = self.repo.save_overrides(resume_id, &overrides).await?;
        Ok(OverridesResponse {
            resume_id: resume_id.to_string(),
            overrides_path: display_path(&path),
        })
    }

    async fn suggest_patches(
        &self,
        resume_id: &str,
        request: SuggestPatchesRequest,
    ) -> ApiResult<SuggestPatchesResponse> {
        let (state, _) = self.load_state(resume_id).await?;
        let ats = score_resume_against_jd(&request.jd_text, &state, DEFAULT_TOP_N_SKILLS, request.strict_mode);
        let overrides = if request.apply_overrides {
            self.repo.load_overrides(resume_id).await?
        } else {
            None
        };

        let plan = plan_suggestions(&state, &ats, overrides.as_ref());
        let (suggested_patches, blocked) = apply_truth_guardrails(
            plan,
            &ats,
            overrides.as_ref(),
            request.truth_mode,
            &state,
            Some(&request.jd_text),
        );
        Ok(SuggestPatchesResponse {
            suggested_patches,
            blocked,
        })
    }

    async fn apply_patches(&self, resume_id: &str, request: ApplyPatchesRequest) -> ApiResult<ApplyPatchesResponse> {
        let (mut state, _) = self.load_state(resume_id).await?;
        let overrides = self.repo.load_overrides(resume_id).await?;

        validate_patches_truth_mode(&request.patches, &state, overrides.as_ref(), request.truth_mode)?;
        apply_patches_to_state(&mut state, &request.patches)?;

        let meta = self.save_version(resume_id, &state, request.export_docx).await?;
        info!("Applied {} patches to {} ({})", request.patches.len(), resume_id, meta.latest_version);
        Ok(ApplyPatchesResponse {
            resume_id: resume_id.to_string(),
            paths: latest_paths(&meta)?,
            version: meta.latest_version,
        })
    }

    async fn blocked_plan(&self, resume_id: &str, request: BlockedPlanRequest) -> ApiResult<BlockedPlanResponse> {
        let (state, _) = self.load_state(resume_id).await?;
        let ats = score_resume_against_jd(&request.jd_text, &state, DEFAULT_TOP_N_SKILLS, request.strict_mode);
        let overrides = self.repo.load_overrides(resume_id).await?;

        let plan = plan_suggestions(&state, &ats, overrides.as_ref());
        let (_, mut blocked) = apply_truth_guardrails(
            plan,
            &ats,
            overrides.as_ref(),
            request.truth_mode,
            &state,
            Some(&request.jd_text),
        );
        if let Some(top_n) = request.top_n.filter(|n| *n > 0) {
            blocked.truncate(top_n);
        }
        Ok(BlockedPlanResponse { blocked })
    }

    async fn overrides_from_blocked(
        &self,
        resume_id: &str,
        request: OverridesFromBlockedRequest,
    ) -> ApiResult<OverridesFromBlockedResponse> {
        let (state, _) = self.load_state(resume_id).await?;
        let mut overrides = self.repo.load_overrides(resume_id).await?.unwrap_or_default();
        merge_blocked_items(&mut overrides, &state, &request)?;

        let path = self.repo.save_overrides(resume_id, &overrides).await?;
        Ok(OverridesFromBlockedResponse {
            resume_id: resume_id.to_string(),
            overrides_path: display_path(&path),
            overrides,
        })
    }
}
