use std::env;
use std::path::{Path, PathBuf};
use dotenv::dotenv;
use serde::Deserialize;
use log::{info, warn};

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_CLAUDE_MODEL: &str = "claude-opus-4-5";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "prod" | "production" => Ok(Environment::Production),
            _ => Err(format!("Unknown environment: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub enum LlmProvider {
    Anthropic,
    OpenAi,
}

impl LlmProvider {
    /// Maps loose provider names (`gpt`, `gpt-5-mini`, ...) onto a provider.
    pub fn normalize(value: Option<&str>) -> Self {
        match value.unwrap_or("anthropic").trim().to_lowercase().as_str() {
            "openai" | "gpt" | "gpt-5" | "gpt-5-mini" => LlmProvider::OpenAi,
            _ => LlmProvider::Anthropic,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::Anthropic => "anthropic",
            LlmProvider::OpenAi => "openai",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub environment: Environment,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub base_dir: PathBuf,
    pub storage_dir: PathBuf,
    pub resumes_dir: PathBuf,
    pub index_dir: PathBuf,
    pub generated_resumes_dir: PathBuf,
    pub exports_dir: PathBuf,
    pub docx_template_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub anthropic_api_key: String,
    pub claude_model: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_base_url: String,
    pub timeout_seconds: u64,
}

impl LlmConfig {
    /// Model name used by the selected provider.
    pub fn active_model(&self) -> &str {
        match self.provider {
            LlmProvider::Anthropic => &self.claude_model,
            LlmProvider::OpenAi => &self.openai_model,
        }
    }

    pub fn active_api_key(&self) -> &str {
        match self.provider {
            LlmProvider::Anthropic => &self.anthropic_api_key,
            LlmProvider::OpenAi => &self.openai_api_key,
        }
    }
}

impl StorageConfig {
    /// Standard layout under one storage root.
    pub fn under(base_dir: &Path, storage_dir: &Path) -> Self {
        let resumes_dir = storage_dir.join("resumes");
        Self {
            base_dir: base_dir.to_path_buf(),
            storage_dir: storage_dir.to_path_buf(),
            index_dir: storage_dir.join("index"),
            generated_resumes_dir: storage_dir.join("generated_resumes"),
            exports_dir: storage_dir.join("exports"),
            docx_template_path: resumes_dir.join("template").join("template.docx"),
            resumes_dir,
        }
    }

    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.resumes_dir)?;
        std::fs::create_dir_all(&self.index_dir)?;
        std::fs::create_dir_all(&self.generated_resumes_dir)?;
        std::fs::create_dir_all(&self.exports_dir)?;
        Ok(())
    }
}

/// Adds a scheme when missing and falls back to the public endpoint.
pub fn normalize_openai_base_url(raw: Option<&str>) -> String {
    let cleaned = raw.unwrap_or("").trim().trim_end_matches('/');
    if cleaned.is_empty() {
        return DEFAULT_OPENAI_BASE_URL.to_string();
    }
    if cleaned.starts_with("http://") || cleaned.starts_with("https://") {
        cleaned.to_string()
    } else {
        format!("https://{}", cleaned)
    }
}

impl Config {
    pub fn parse_backend_url(url: &str) -> (String, u16) {
        // BACKEND_URL looks like "http://127.0.0.1:8000"
        if let Ok(parsed_url) = url::Url::parse(url) {
            let host = parsed_url.host_str().unwrap_or("127.0.0.1").to_string();
            let port = parsed_url.port_or_known_default().unwrap_or(8000);
            (host, port)
        } else {
            ("127.0.0.1".to_string(), 8000)
        }
    }

    fn load_env_files() {
        if let Ok(env_file_path) = env::var("ENV_FILE_PATH") {
            if !env_file_path.is_empty() {
                info!("Loading environment from ENV_FILE_PATH: {}", env_file_path);
                dotenv::from_filename(&env_file_path).ok();
                return;
            }
        }
        dotenv().ok();
        let environment_hint = env::var("RUST_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .parse()
            .unwrap_or(Environment::Development);
        let env_file = format!(".env.{:?}", environment_hint).to_lowercase();
        if env_file != ".env.development" {
            let _ = dotenv::from_filename(&env_file);
        }
    }

    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        Self::load_env_files();

        let environment = env::var("RUST_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .parse()
            .unwrap_or(Environment::Development);

        info!("Loading configuration for environment: {:?}", environment);

        let config = Config {
            environment: environment.clone(),
            server: Self::load_server_config(&environment),
            storage: Self::load_storage_config(),
            llm: Self::load_llm_config(),
        };

        config.validate()?;
        config.storage.ensure_dirs()?;
        config.log_configuration();

        Ok(config)
    }

    fn load_server_config(env: &Environment) -> ServerConfig {
        let backend_url = env::var("BACKEND_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        let (host, port) = Self::parse_backend_url(&backend_url);
        let default_workers = match env {
            Environment::Production => 8,
            Environment::Development | Environment::Test => 1,
        };

        ServerConfig {
            // SERVER_HOST / SERVER_PORT take precedence over BACKEND_URL parts
            host: env::var("SERVER_HOST").unwrap_or(host),
            port: env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(port),
            workers: env::var("BACKEND_WORKERS")
                .ok()
                .and_then(|w| w.parse().ok())
                .unwrap_or(default_workers),
        }
    }

    fn load_storage_config() -> StorageConfig {
        let base_dir = env::var("RESUME_BASE_DIR")
            .map(PathBuf::from)
            .or_else(|_| env::current_dir())
            .unwrap_or_else(|_| PathBuf::from("."));
        let storage_dir = env::var("STORAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| base_dir.join("storage"));

        let mut storage = StorageConfig::under(&base_dir, &storage_dir);
        if let Ok(template) = env::var("DOCX_TEMPLATE_PATH") {
            storage.docx_template_path = PathBuf::from(template);
        }
        storage
    }

    fn load_llm_config() -> LlmConfig {
        LlmConfig {
            provider: LlmProvider::normalize(env::var("LLM_PROVIDER").ok().as_deref()),
            anthropic_api_key: env::var("ANTHROPIC_API_KEY").unwrap_or_default(),
            claude_model: env::var("CLAUDE_MODEL").unwrap_or_else(|_| DEFAULT_CLAUDE_MODEL.to_string()),
            openai_api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.to_string()),
            openai_base_url: normalize_openai_base_url(env::var("OPENAI_BASE_URL").ok().as_deref()),
            timeout_seconds: env::var("LLM_TIMEOUT_SECS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(120),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.server.port == 0 {
            return Err("Server port cannot be 0".into());
        }
        if self.server.workers == 0 {
            return Err("Backend workers cannot be 0".into());
        }
        if self.environment == Environment::Production && self.llm.active_api_key().is_empty() {
            return Err(format!(
                "An API key for LLM provider '{}' must be set in production",
                self.llm.provider.as_str()
            )
            .into());
        }
        Ok(())
    }

    fn log_configuration(&self) {
        info!("Configuration loaded successfully");
        info!("Environment: {:?}", self.environment);
        info!("Server: {}:{} (workers: {})", self.server.host, self.server.port, self.server.workers);
        info!("Storage: {}", self.storage.storage_dir.display());
        info!("LLM: {} / {}", self.llm.provider.as_str(), self.llm.active_model());

        if self.llm.active_api_key().is_empty() {
            warn!("No API key for {} - JD parsing will use the rule-based fallback", self.llm.provider.as_str());
        }
        if !self.storage.docx_template_path.exists() {
            warn!("DOCX template not found at {}", self.storage.docx_template_path.display());
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Configuration rooted at `storage_dir`, used by tests and tooling.
    pub fn for_storage(storage_dir: &Path) -> Self {
        Config {
            environment: Environment::Test,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8000,
                workers: 1,
            },
            storage: StorageConfig::under(storage_dir, storage_dir),
            llm: LlmConfig {
                provider: LlmProvider::Anthropic,
                anthropic_api_key: String::new(),
                claude_model: DEFAULT_CLAUDE_MODEL.to_string(),
                openai_api_key: String::new(),
                openai_model: DEFAULT_OPENAI_MODEL.to_string(),
                openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
                timeout_seconds: 5,
            },
        }
    }
}
