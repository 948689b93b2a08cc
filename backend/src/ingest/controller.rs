use actix_web::{post, web, HttpResponse};
use log::error;
use shared::{IngestResponse, UploadResumesRequest};

use crate::config::Config;
use crate::error::{run_blocking, ApiError};
use crate::ingest::service::{decode_uploads, save_uploads};
use crate::retrieval::index::build_and_save_index;

/// Rebuilds the lexical index off the async workers.
async fn rebuild_index(config: &Config) -> Result<IngestResponse, ApiError> {
    let resumes_dir = config.storage.resumes_dir.clone();
    let index_dir = config.storage.index_dir.clone();
    match run_blocking(move || build_and_save_index(&resumes_dir, &index_dir)).await {
        Ok((indexed_chunks, saved_files)) => Ok(IngestResponse {
            indexed_chunks,
            saved_files,
        }),
        Err(e) => {
            error!("Index build failed: {}", e);
            Err(ApiError::internal_error(e.detail()))
        }
    }
}

#[post("/upload-resumes")]
pub async fn upload_resumes_handler(
    payload: web::Json<UploadResumesRequest>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    let uploads = decode_uploads(&payload.files)?;
    save_uploads(&config.storage.resumes_dir, &uploads).await?;
    let response = rebuild_index(&config).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/reindex")]
pub async fn reindex_handler(config: web::Data<Config>) -> Result<HttpResponse, ApiError> {
    let response = rebuild_index(&config).await?;
    Ok(HttpResponse::Ok().json(response))
}
