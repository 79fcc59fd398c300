//! Kinde Auth Router - Main entry point
//!
//! Serves /register, /login and /kinde_callback for a site that delegates
//! authentication to Kinde.

use anyhow::Context;
use kinde_auth_router::config::ServerConfig;
use kinde_auth_router::{auth_router, ClientSetup};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const BANNER: &str = r#"
╔══════════════════════════════════════════════════════════════╗
║                      Kinde Auth Router                       ║
║           register / login / callback routes for axum        ║
╚══════════════════════════════════════════════════════════════╝
"#;

fn setup_logging(config: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}", config.log_level())));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() {
    let config = ServerConfig::parse_args();

    setup_logging(&config);

    if let Err(e) = run(config).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let setup = ClientSetup::new();
    setup
        .initialize_client(config.setup.clone())
        .context("Configuration error")?;

    if !config.no_banner && !config.silent {
        eprintln!("{}", BANNER);
        info!("Issuer: {}", config.setup.issuer_base_url);
        info!("Client ID: {}", config.setup.client_id);
        info!("Redirect URL: {}", config.setup.redirect_url);
        info!("Site URL: {}", config.setup.site_url);
        eprintln!();
    }

    let app = auth_router(setup.context()?);
    let listener = tokio::net::TcpListener::bind(&config.listen)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen))?;

    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Received Ctrl+C, shutting down gracefully...");
        })
        .await?;

    info!("Server stopped");
    Ok(())
}
