use actix_web::{post, web, HttpResponse};
use log::{error, info};
use shared::GenerateRequest;

use crate::config::Config;
use crate::error::ApiError;
use crate::generate::usecase::{GenerateUseCase, GenerateUseCaseImpl};
use crate::llm::client::LlmHandle;
use crate::resume::repository::{ResumeRepository, ResumeRepositoryImpl};

pub async fn generate_handler_impl<R>(
    payload: web::Json<GenerateRequest>,
    repo: web::Data<R>,
    config: web::Data<Config>,
    llm: web::Data<LlmHandle>,
) -> Result<HttpResponse, ApiError>
where
    R: ResumeRepository + Clone + 'static,
{
    let usecase = GenerateUseCaseImpl {
        repo: repo.get_ref().clone(),
        storage: config.storage.clone(),
        llm: llm.client.clone(),
    };
    match usecase.generate(payload.into_inner()).await {
        Ok(response) => {
            info!("Generated {} {} ({} chunks)", response.resume_id, response.version, response.retrieved.len());
            Ok(HttpResponse::Ok().json(response))
        }
        Err(e) => {
            error!("Generation failed: {}", e);
            Err(e.into())
        }
    }
}

#[post("/generate")]
pub async fn generate_handler(
    payload: web::Json<GenerateRequest>,
    repo: web::Data<ResumeRepositoryImpl>,
    config: web::Data<Config>,
    llm: web::Data<LlmHandle>,
) -> Result<HttpResponse, ApiError> {
    generate_handler_impl::<ResumeRepositoryImpl>(payload, repo, config, llm).await
}
