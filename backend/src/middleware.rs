use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::HttpMessage;
use futures_util::future::{ready, LocalBoxFuture, Ready};
use log::{error, info, warn};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};
use std::time::Instant;
use uuid::Uuid;

static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Correlation id stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

/// Counter-based ids under test, UUID v4 otherwise.
pub fn generate_request_id() -> String {
    let is_test = cfg!(test)
        || std::env::var("RUST_ENV")
            .unwrap_or_default()
            .eq_ignore_ascii_case("test");

    if is_test {
        format!("test-{}", REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed))
    } else {
        Uuid::new_v4().to_string()
    }
}

fn log_request(request_id: &str, method: &str, uri: &str, status_code: u16, millis: u128, peer: &str) {
    let line = format!(
        "request_id={} {} {} {} {}ms {}",
        request_id, method, uri, status_code, millis, peer
    );
    if status_code >= 500 {
        error!("{}", line);
    } else if status_code >= 400 {
        warn!("{}", line);
    } else {
        info!("{}", line);
    }
}

pub struct Logger;

impl<S, B> Transform<S, ServiceRequest> for Logger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = LoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(LoggerMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct LoggerMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for LoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let svc = self.service.clone();
        let start_time = Instant::now();
        let method = req.method().to_string();
        let uri = req.uri().to_string();
        let peer = req
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let request_id = generate_request_id();
        req.extensions_mut().insert(RequestId(request_id.clone()));

        Box::pin(async move {
            let mut res = svc.call(req).await?;

            if let Ok(header_value) = HeaderValue::try_from(request_id.as_str()) {
                res.headers_mut()
                    .insert(HeaderName::from_static("x-request-id"), header_value);
            }

            log_request(
                &request_id,
                &method,
                &uri,
                res.status().as_u16(),
                start_time.elapsed().as_millis(),
                &peer,
            );
            Ok(res)
        })
    }
}

/// Local UI origins plus anything listed in `CORS_ALLOWED_ORIGINS` (comma separated).
pub fn cors_middleware() -> actix_cors::Cors {
    let mut cors = actix_cors::Cors::default()
        .allowed_origin("http://localhost:8501")
        .allowed_origin("http://127.0.0.1:8501")
        .allowed_methods(vec!["GET", "POST", "PATCH", "OPTIONS"])
        .allowed_headers(vec![
            actix_web::http::header::ACCEPT,
            actix_web::http::header::CONTENT_TYPE,
        ])
        .max_age(3600);

    if let Ok(extra) = std::env::var("CORS_ALLOWED_ORIGINS") {
        for origin in extra.split(',').map(str::trim).filter(|o| !o.is_empty()) {
            cors = cors.allowed_origin(origin);
        }
    }
    cors
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test as atest, web, App, HttpResponse};

    #[test]
    fn test_request_ids_are_unique_under_test() {
        let a = generate_request_id();
        let b = generate_request_id();
        assert!(a.starts_with("test-"));
        assert_ne!(a, b);
    }

    #[actix_web::test]
    async fn test_logger_sets_request_id_header() {
        let app = atest::init_service(
            App::new()
                .wrap(Logger)
                .route("/ping", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let req = atest::TestRequest::get().uri("/ping").to_request();
        let resp = atest::call_service(&app, req).await;
        assert!(resp.status().is_success());
        let header = resp.headers().get("x-request-id").unwrap();
        assert!(header.to_str().unwrap().starts_with("test-"));
    }

    #[actix_web::test]
    async fn test_request_id_visible_to_handlers() {
        let app = atest::init_service(App::new().wrap(Logger).route(
            "/id",
            web::get().to(|req: actix_web::HttpRequest| async move {
                let id = req.extensions().get::<RequestId>().cloned();
                HttpResponse::Ok().body(id.map(|r| r.0).unwrap_or_default())
            }),
        ))
        .await;

        let req = atest::TestRequest::get().uri("/id").to_request();
        let body = atest::call_and_read_body(&app, req).await;
        assert!(String::from_utf8_lossy(&body).starts_with("test-"));
    }
}
