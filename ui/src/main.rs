use std::path::Path;

use clap::Parser;
use log::{debug, error};
use ui::cli::Cli;
use ui::{commands, config, ApiClient, Session, SESSION_FILE};

#[tokio::main]
async fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let cli = Cli::parse();
    let client = ApiClient::new(config::backend_url(cli.backend_url.as_deref()));
    debug!("Using backend {}", client.base_url);

    let session_path = Path::new(SESSION_FILE);
    let mut session = Session::load(session_path);

    let outcome = commands::run(&client, &mut session, cli.command).await;
    if let Err(e) = session.save(session_path) {
        error!("{:#}", e);
    }
    if let Err(e) = outcome {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
