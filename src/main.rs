use anyhow::Context;
use shop_auth::{
    AppState, InMemoryUserRepository, ShopConfig,
    cli::{Cli, Commands, parse_subject},
    utils::toml_config::LogFormat,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(config: &ShopConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    match config.server.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse_args();

    let config = ShopConfig::load(&cli.config)
        .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            init_tracing(&config);
            serve(config).await
        }
        Commands::IssueToken { subject } => {
            let state = AppState::from_config(config, Arc::new(InMemoryUserRepository::new()))?;
            let token = state.auth.issue_token(&parse_subject(&subject))?;
            println!("{}", token);
            Ok(())
        }
        Commands::Config { validate } => {
            if validate {
                println!("Configuration {:?} is valid", cli.config);
            } else {
                println!("{}", toml::to_string_pretty(&config)?);
            }
            Ok(())
        }
    }
}

async fn serve(config: ShopConfig) -> anyhow::Result<()> {
    let addr = config.bind_address();
    let state = AppState::from_config(config, Arc::new(InMemoryUserRepository::new()))?;
    let app = shop_auth::app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("shop-auth listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shop-auth stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
