use std::sync::Arc;

use domain::gateway::reclique;
use domain::identity::UnmappedIdentity;
use domain::user_authorizer::AuditLogAuthorizer;
use log::{error, info};
use service::{config::Config, logging::Logger};

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to initialize logger: {e}");
        std::process::exit(1);
    }

    info!(
        "Starting Reclique login server [{}] against {}",
        config.runtime_env(),
        config.reclique_base_url()
    );

    let client = match reclique::new_client(&config) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to configure Reclique OAuth client: {e}");
            std::process::exit(1);
        }
    };

    let app_state = match web::AppState::new(
        config,
        client,
        Arc::new(AuditLogAuthorizer),
        Arc::new(UnmappedIdentity),
    ) {
        Ok(app_state) => app_state,
        Err(e) => {
            error!("Invalid Virtual Y redirect targets: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = web::init_server(app_state).await {
        error!("Server failed: {e}");
        std::process::exit(1);
    }
}
