//! Wedding RSVP Daemon
//!
//! ## Usage
//!
//! ```bash
//! # Serve the API (admin password required outside dev mode)
//! ADMIN_PASSWORD=... wedding-rsvp --data-dir /srv/rsvp
//!
//! # Local development with the built-in admin password
//! wedding-rsvp --dev-mode
//!
//! # Offline maintenance against the same data directory
//! wedding-rsvp --data-dir /srv/rsvp guests add "John Smith"
//! wedding-rsvp --data-dir /srv/rsvp rsvps list
//! ```

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use wedding_rsvp::{cli, Args, Config, FileStore, HttpServer, RsvpService, ServiceConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("wedding_rsvp={}", args.log_level).parse()?),
        )
        .init();

    let config = Config::from_args(&args)?;
    if let Err(e) = config.validate(args.dev_mode) {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }
    let Some(admin_password) = config.admin_password(args.dev_mode) else {
        anyhow::bail!("no admin password configured");
    };
    if args.dev_mode && config.admin_password.is_none() {
        warn!("DEV MODE: using the built-in admin password; do not expose this instance");
    }

    let store = Arc::new(FileStore::new(&config.data_dir).await?);
    let service_config = ServiceConfig::new(&admin_password)
        .with_policy(config.admission.clone())
        .with_documents(&config.ledger_file, &config.guest_list_file);
    let service = Arc::new(RsvpService::new(service_config, store));

    if let Some(command) = args.command {
        match cli::execute(&service, &admin_password, command).await {
            Ok(output) => {
                println!("{}", output);
                return Ok(());
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }

    info!(
        data_dir = %config.data_dir.display(),
        listen = %config.listen,
        trust_proxy = config.trust_proxy,
        "Starting wedding-rsvp"
    );
    if tokio::fs::metadata(config.guest_list_path()).await.is_err() {
        info!("No guest list found; anyone may RSVP");
    }

    let http_server = Arc::new(
        HttpServer::new(service, config.listen)
            .with_trust_proxy(config.trust_proxy)
            .with_max_body_bytes(config.max_body_bytes),
    );

    info!("HTTP API available at http://{}", config.listen);
    info!("Endpoints:");
    info!("  GET    /api/health              - Health check");
    info!("  POST   /api/rsvp                - Submit an RSVP");
    info!("  GET    /api/admin               - List RSVPs (admin)");
    info!("  DELETE /api/admin/rsvp/{{id}}     - Delete an RSVP (admin)");
    info!("  GET    /api/admin/guests        - List guests (admin)");
    info!("  POST   /api/admin/guests        - Add a guest (admin)");
    info!("  DELETE /api/admin/guests/{{name}} - Remove a guest (admin)");
    info!("Press Ctrl+C to stop.");

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutting down...");
    };

    tokio::select! {
        result = http_server.run() => {
            if let Err(e) = result {
                error!(error = %e, "HTTP server error");
                return Err(e.into());
            }
        }
        _ = shutdown => {}
    }

    Ok(())
}
