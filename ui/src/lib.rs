pub mod api_client;
pub mod cli;
pub mod commands;
pub mod config;
pub mod session;
pub mod utils;

pub use api_client::{ApiClient, ApiResponse};
pub use session::{Session, SESSION_FILE};
