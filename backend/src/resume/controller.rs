use actix_web::{get, patch, post, web, HttpResponse};
use log::{info, warn};
use shared::{
    ApplyPatchesRequest, BlockedPlanRequest, BulletEditRequest, OverridesFromBlockedRequest, OverridesRequest,
    SuggestPatchesRequest,
};
use validator::Validate;

use crate::config::Config;
use crate::error::ApiError;
use crate::resume::repository::{ResumeRepository, ResumeRepositoryImpl};
use crate::resume::usecase::{ResumeUseCase, ResumeUseCaseImpl};

fn usecase<R>(repo: &web::Data<R>, config: &web::Data<Config>) -> ResumeUseCaseImpl<R>
where
    R: ResumeRepository + Clone + 'static,
{
    ResumeUseCaseImpl {
        repo: repo.get_ref().clone(),
        docx_template: config.storage.docx_template_path.clone(),
    }
}

pub async fn get_resume_handler_impl<R>(
    path: web::Path<String>,
    repo: web::Data<R>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError>
where
    R: ResumeRepository + Clone + 'static,
{
    let resume_id = path.into_inner();
    let response = usecase(&repo, &config).get_resume(&resume_id).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[get("/resumes/{resume_id}")]
pub async fn get_resume_handler(
    path: web::Path<String>,
    repo: web::Data<ResumeRepositoryImpl>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    get_resume_handler_impl::<ResumeRepositoryImpl>(path, repo, config).await
}

pub async fn edit_bullet_handler_impl<R>(
    path: web::Path<String>,
    payload: web::Json<BulletEditRequest>,
    repo: web::Data<R>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError>
where
    R: ResumeRepository + Clone + 'static,
{
    let resume_id = path.into_inner();
    match usecase(&repo, &config).edit_bullet(&resume_id, payload.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(response)),
        Err(e) => {
            warn!("Bullet edit on {} failed: {}", resume_id, e);
            Err(e)
        }
    }
}

#[patch("/resumes/{resume_id}/bullet")]
pub async fn edit_bullet_handler(
    path: web::Path<String>,
    payload: web::Json<BulletEditRequest>,
    repo: web::Data<ResumeRepositoryImpl>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    edit_bullet_handler_impl::<ResumeRepositoryImpl>(path, payload, repo, config).await
}

pub async fn save_overrides_handler_impl<R>(
    path: web::Path<String>,
    payload: web::Json<OverridesRequest>,
    repo: web::Data<R>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError>
where
    R: ResumeRepository + Clone + 'static,
{
    payload.validate()?;
    let resume_id = path.into_inner();
    let response = usecase(&repo, &config)
        .save_overrides(&resume_id, payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/resumes/{resume_id}/overrides")]
pub async fn save_overrides_handler(
    path: web::Path<String>,
    payload: web::Json<OverridesRequest>,
    repo: web::Data<ResumeRepositoryImpl>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    save_overrides_handler_impl::<ResumeRepositoryImpl>(path, payload, repo, config).await
}

pub async fn suggest_patches_handler_impl<R>(
    path: web::Path<String>,
    payload: web::Json<SuggestPatchesRequest>,
    repo: web::Data<R>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError>
where
    R: ResumeRepository + Clone + 'static,
{
    let resume_id = path.into_inner();
    let response = usecase(&repo, &config)
        .suggest_patches(&resume_id, payload.into_inner())
        .await?;
    info!(
        "Suggested {} patches for {} ({} blocked)",
        response.suggested_patches.len(),
        resume_id,
        response.blocked.len()
    );
    Ok(HttpResponse::Ok().json(response))
}

#[post("/resumes/{resume_id}/suggest-patches")]
pub async fn suggest_patches_handler(
    path: web::Path<String>,
    payload: web::Json<SuggestPatchesRequest>,
    repo: web::Data<ResumeRepositoryImpl>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    suggest_patches_handler_impl::<ResumeRepositoryImpl>(path, payload, repo, config).await
}

pub async fn apply_patches_handler_impl<R>(
    path: web::Path<String>,
    payload: web::Json<ApplyPatchesRequest>,
    repo: web::Data<R>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError>
where
    R: ResumeRepository + Clone + 'static,
{
    let resume_id = path.into_inner();
    let response = usecase(&repo, &config)
        .apply_patches(&resume_id, payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/resumes/{resume_id}/apply-patches")]
pub async fn apply_patches_handler(
    path: web::Path<String>,
    payload: web::Json<ApplyPatchesRequest>,
    repo: web::Data<ResumeRepositoryImpl>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    apply_patches_handler_impl::<ResumeRepositoryImpl>(path, payload, repo, config).await
}

pub async fn blocked_plan_handler_impl<R>(
    path: web::Path<String>,
    payload: web::Json<BlockedPlanRequest>,
    repo: web::Data<R>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError>
where
    R: ResumeRepository + Clone + 'static,
{
    let resume_id = path.into_inner();
    let response = usecase(&repo, &config)
        .blocked_plan(&resume_id, payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/resumes/{resume_id}/blocked-plan")]
pub async fn blocked_plan_handler(
    path: web::Path<String>,
    payload: web::Json<BlockedPlanRequest>,
    repo: web::Data<ResumeRepositoryImpl>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    blocked_plan_handler_impl::<ResumeRepositoryImpl>(path, payload, repo, config).await
}

pub async fn overrides_from_blocked_handler_impl<R>(
    path: web::Path<String>,
    payload: web::Json<OverridesFromBlockedRequest>,
    repo: web::Data<R>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError>
where
    R: ResumeRepository + Clone + 'static,
{
    let resume_id = path.into_inner();
    let response = usecase(&repo, &config)
        .overrides_from_blocked(&resume_id, payload.into_inner())
        .await?;
    info!("Overrides for {} now cover {} skills", resume_id, response.overrides.skills.len());
    Ok(HttpResponse::Ok().json(response))
}

#[post("/resumes/{resume_id}/overrides/from-blocked")]
pub async fn overrides_from_blocked_handler(
    path: web::Path<String>,
    payload: web::Json<OverridesFromBlockedRequest>,
    repo: web::Data<ResumeRepositoryImpl>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    overrides_from_blocked_handler_impl::<ResumeRepositoryImpl>(path, payload, repo, config).await
}
