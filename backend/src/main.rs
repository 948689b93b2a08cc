use actix_web::{web, App, HttpServer};
use backend::llm::LlmHandle;
use backend::resume::ResumeRepositoryImpl;
use log::{error, info, warn};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = match backend::config::Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
        }
    };

    let llm = LlmHandle::from_config(&config.llm);
    match llm.model() {
        Some(model) => info!("LLM client ready: {}", model),
        None => warn!("LLM client disabled; JD parsing uses rules only"),
    }

    let bind = (config.server.host.clone(), config.server.port);
    let workers = config.server.workers;
    let repo = web::Data::new(ResumeRepositoryImpl::new(config.storage.generated_resumes_dir.clone()));
    let llm = web::Data::new(llm);
    let config = web::Data::new(config);

    info!("Starting server on {}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .wrap(backend::middleware::Logger)
            .wrap(backend::middleware::cors_middleware())
            // uploads carry base64 file content
            .app_data(web::JsonConfig::default().limit(32 * 1024 * 1024))
            .app_data(config.clone())
            .app_data(repo.clone())
            .app_data(llm.clone())
            .configure(backend::routes::configure_routes)
    })
    .workers(workers)
    .bind(bind)?
    .run()
    .await
}
