use anyhow::Context;
use clap::Parser;
use zoo_sanctuary::config::LogFormat;
use zoo_sanctuary::utils::{logger, validation::Validate};
use zoo_sanctuary::{build_router, AppState, CliArgs, Mailer, SanctuaryConfig, SqliteStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let mut config = SanctuaryConfig::load_or_default(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;
    args.apply_overrides(&mut config);

    match config.logging.format {
        LogFormat::Compact => logger::init_cli_logger(args.verbose, &config.logging.level),
        LogFormat::Json => logger::init_json_logger(&config.logging.level),
    }

    tracing::info!("Starting zoo-sanctuary");
    if args.verbose {
        tracing::debug!("Effective config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        return Err(e.into());
    }

    let store = SqliteStore::open(&config.database.path)
        .with_context(|| format!("failed to open database {}", config.database.path))?;
    let mailer = Mailer::from_config(&config.email)?;
    let state = AppState::new(store, mailer, config.email.dispatch_timeout());

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
