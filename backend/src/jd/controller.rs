use actix_web::{post, web, HttpResponse};
use shared::JdParseRequest;
use validator::Validate;

use crate::error::ApiError;
use crate::jd::parser::parse_jd;
use crate::llm::client::LlmHandle;

#[post("/parse-jd")]
pub async fn parse_jd_handler(
    payload: web::Json<JdParseRequest>,
    llm: web::Data<LlmHandle>,
) -> Result<HttpResponse, ApiError> {
    payload.validate()?;
    let client = if payload.use_llm { llm.get() } else { None };
    let parsed = parse_jd(&payload.jd_text, client).await;
    Ok(HttpResponse::Ok().json(parsed))
}
