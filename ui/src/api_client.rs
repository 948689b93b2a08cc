use log::debug;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::REQUEST_TIMEOUT;

/// Outcome of one backend call. Transport failures carry no status.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub status: Option<u16>,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn failure(status: Option<u16>, error: impl Into<String>) -> Self {
        Self {
            ok: false,
            status,
            data: None,
            error: Some(error.into()),
        }
    }

    /// The payload, or the error message as an `anyhow` error.
    pub fn into_result(self) -> anyhow::Result<T> {
        match (self.ok, self.data) {
            (true, Some(data)) => Ok(data),
            _ => {
                let error = self.error.unwrap_or_else(|| "empty response".to_string());
                match self.status {
                    Some(status) => anyhow::bail!("HTTP {}: {}", status, error),
                    None => anyhow::bail!("{}", error),
                }
            }
        }
    }
}

impl ApiResponse<Value> {
    /// Classifies a received response. Non-2xx keeps the body text as the error.
    pub fn from_parts(status: u16, body: &str) -> Self {
        if !(200..300).contains(&status) {
            let error = if body.trim().is_empty() {
                format!("request failed with status {}", status)
            } else {
                body.trim().to_string()
            };
            return Self::failure(Some(status), error);
        }
        let data = serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()));
        Self {
            ok: true,
            status: Some(status),
            data: Some(data),
            error: None,
        }
    }

    /// Deserializes a successful payload into `T`.
    pub fn typed<T: DeserializeOwned>(self) -> ApiResponse<T> {
        let ApiResponse { ok, status, data, error } = self;
        match data.filter(|_| ok) {
            Some(value) => match serde_json::from_value(value) {
                Ok(data) => ApiResponse {
                    ok: true,
                    status,
                    data: Some(data),
                    error: None,
                },
                Err(e) => ApiResponse::failure(status, format!("unexpected response shape: {}", e)),
            },
            None => ApiResponse {
                ok: false,
                status,
                data: None,
                error,
            },
        }
    }
}

/// Thin JSON client for the resume backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    pub base_url: String,
    http: Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn request<B: Serialize + ?Sized>(&self, method: Method, path: &str, body: Option<&B>) -> ApiResponse<Value> {
        let url = self.url(path);
        debug!("{} {}", method, url);
        let mut builder = self.http.request(method, &url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => return ApiResponse::failure(None, e.to_string()),
        };
        let status = response.status().as_u16();
        match response.text().await {
            Ok(body) => ApiResponse::from_parts(status, &body),
            Err(e) => ApiResponse::failure(Some(status), e.to_string()),
        }
    }

    pub async fn get(&self, path: &str) -> ApiResponse<Value> {
        self.request::<Value>(Method::GET, path, None).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResponse<Value> {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResponse<Value> {
        self.request(Method::PATCH, path, Some(body)).await
    }

    pub async fn get_as<T: DeserializeOwned>(&self, path: &str) -> ApiResponse<T> {
        self.get(path).await.typed()
    }

    pub async fn post_as<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResponse<T> {
        self.post(path, body).await.typed()
    }

    pub async fn patch_as<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResponse<T> {
        self.patch(path, body).await.typed()
    }
}
