use actix_web::{get, web, HttpResponse, Responder};
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::Config;
use crate::resume::repository::display_path;
use crate::retrieval::index::index_exists;

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub index_ready: bool,
    pub resumes_dir: String,
    pub index_dir: String,
    pub model: String,
    pub timestamp: u64,
    pub version: &'static str,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is up; reports index readiness", body = HealthResponse)
    )
)]
#[get("/health")]
pub async fn health_check(config: web::Data<Config>) -> impl Responder {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();

    let response = HealthResponse {
        status: "ok".to_string(),
        index_ready: index_exists(&config.storage.index_dir),
        resumes_dir: display_path(&config.storage.resumes_dir),
        index_dir: display_path(&config.storage.index_dir),
        model: config.llm.active_model().to_string(),
        timestamp,
        version: env!("CARGO_PKG_VERSION"),
    };

    HttpResponse::Ok().json(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use tempfile::TempDir;

    #[actix_web::test]
    async fn test_health_check() {
        let dir = TempDir::new().unwrap();
        let config = Config::for_storage(dir.path());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(config))
                .service(health_check),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["index_ready"], false);
        assert_eq!(body["model"], "claude-opus-4-5");
        assert!(body["resumes_dir"].as_str().unwrap().ends_with("resumes"));
        assert!(body["timestamp"].as_u64().unwrap() > 0);
    }
}
