use std::time::Duration;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";
pub const BACKEND_URL_ENV: &str = "BACKEND_URL";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Backend URL from the `--backend-url` field, then the environment value,
/// then the local default. Trailing slashes are dropped.
pub fn resolve_backend_url(field: Option<&str>, env_value: Option<&str>) -> String {
    let chosen = non_blank(field)
        .or_else(|| non_blank(env_value))
        .unwrap_or(DEFAULT_BACKEND_URL);
    chosen.trim_end_matches('/').to_string()
}

/// [`resolve_backend_url`] against the process environment.
pub fn backend_url(field: Option<&str>) -> String {
    let env_value = std::env::var(BACKEND_URL_ENV).ok();
    resolve_backend_url(field, env_value.as_deref())
}
