use actix_web::{post, web, HttpResponse};
use log::info;
use shared::{ExportDocxRequest, ExportDocxResponse, ExportPaths};
use validator::Validate;

use crate::config::Config;
use crate::error::{run_blocking, ApiError};
use crate::export::docx::{export_docx_from_state, export_folder_name};
use crate::resume::repository::{display_path, ResumeRepository, ResumeRepositoryImpl, DOCX_FILE};

pub const JOB_DESCRIPTION_FILE: &str = "job_description.txt";

pub async fn export_docx_handler_impl<R>(
    payload: web::Json<ExportDocxRequest>,
    repo: web::Data<R>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError>
where
    R: ResumeRepository + Clone + 'static,
{
    payload.validate()?;
    let request = payload.into_inner();
    let (state, version) = repo.load_latest_state(&request.resume_id).await?;

    let folder = config.storage.exports_dir.join(export_folder_name(
        &request.company_name,
        &request.position_name,
        request.job_id.as_deref(),
    ));
    let docx_path = folder.join(DOCX_FILE);
    let template = config.storage.docx_template_path.clone();
    let target = docx_path.clone();
    run_blocking(move || export_docx_from_state(&state, &template, &target)).await?;

    let job_description = match request.jd_text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        Some(jd) => {
            let path = folder.join(JOB_DESCRIPTION_FILE);
            tokio::fs::write(&path, jd).await?;
            Some(display_path(&path))
        }
        None => None,
    };

    info!("Exported {} {} to {}", request.resume_id, version, folder.display());
    Ok(HttpResponse::Ok().json(ExportDocxResponse {
        resume_id: request.resume_id,
        version,
        folder: display_path(&folder),
        paths: ExportPaths {
            resume_docx: display_path(&docx_path),
            job_description,
        },
    }))
}

#[post("/export-docx")]
pub async fn export_docx_handler(
    payload: web::Json<ExportDocxRequest>,
    repo: web::Data<ResumeRepositoryImpl>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    export_docx_handler_impl::<ResumeRepositoryImpl>(payload, repo, config).await
}
