use actix_web::{post, web, HttpResponse};
use log::debug;
use shared::AtsScoreRequest;
use validator::Validate;

use crate::config::Config;
use crate::error::ApiError;
use crate::resume::repository::{ResumeRepository, ResumeRepositoryImpl};
use crate::resume::usecase::{ResumeUseCase, ResumeUseCaseImpl};

pub async fn ats_score_handler_impl<R>(
    payload: web::Json<AtsScoreRequest>,
    repo: web::Data<R>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError>
where
    R: ResumeRepository + Clone + 'static,
{
    payload.validate()?;
    let usecase = ResumeUseCaseImpl {
        repo: repo.get_ref().clone(),
        docx_template: config.storage.docx_template_path.clone(),
    };
    let report = usecase.ats_score(payload.into_inner()).await?;
    debug!(
        "ATS score {} (keyword {}, role {})",
        report.ats_score, report.keyword_score, report.role_score
    );
    Ok(HttpResponse::Ok().json(report))
}

#[post("/ats-score")]
pub async fn ats_score_handler(
    payload: web::Json<AtsScoreRequest>,
    repo: web::Data<ResumeRepositoryImpl>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    ats_score_handler_impl::<ResumeRepositoryImpl>(payload, repo, config).await
}
