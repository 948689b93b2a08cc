use actix_web::{get, HttpResponse, Responder};
use utoipa::OpenApi;

use crate::error::ApiError;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::health::health_check,
    ),
    components(schemas(
        crate::health::HealthResponse,
        ApiError,
    )),
    tags(
        (name = "health", description = "Service and index status"),
        (name = "ingest", description = "Resume upload and indexing"),
        (name = "generate", description = "JD parsing and resume generation"),
        (name = "resumes", description = "Versioned resume editing, overrides and patches"),
        (name = "ats", description = "ATS-style scoring"),
    ),
    info(
        title = "Resume RAG API",
        description = "Ingest resumes, parse job descriptions, generate tailored resumes and score them ATS-style.\n\nEdits are stored as numbered versions under `generated_resumes/<resume_id>/`.",
        version = "0.3.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://127.0.0.1:8000", description = "Default local backend"),
    )
)]
pub struct ApiDoc;

#[get("/api-docs/openapi.json")]
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}
