use actix_web::web;

/// Registers every endpoint. Callers provide `web::Data` for `Config`,
/// `ResumeRepositoryImpl` and `LlmHandle`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    log::debug!("Registering API routes");
    cfg.service(crate::health::health_check)
        .service(crate::openapi::openapi_json)
        .service(crate::ingest::controller::upload_resumes_handler)
        .service(crate::ingest::controller::reindex_handler)
        .service(crate::jd::controller::parse_jd_handler)
        .service(crate::generate::controller::generate_handler)
        .service(crate::export::controller::export_docx_handler)
        .service(crate::ats::controller::ats_score_handler)
        .service(crate::resume::controller::get_resume_handler)
        .service(crate::resume::controller::edit_bullet_handler)
        .service(crate::resume::controller::save_overrides_handler)
        .service(crate::resume::controller::suggest_patches_handler)
        .service(crate::resume::controller::apply_patches_handler)
        .service(crate::resume::controller::blocked_plan_handler)
        .service(crate::resume::controller::overrides_from_blocked_handler);
}
