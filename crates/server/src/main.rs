//! Chat-bot Server Entry Point

use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use zailo_bot_agent::{Catalog, DialogueEngine, EngineConfig};
use zailo_bot_config::{load_catalog, load_settings, Settings, StoreProfile};
use zailo_bot_persistence::{DocumentStore, HttpClientGateway, HttpGatewayConfig};
use zailo_bot_server::{create_router, init_metrics, AppState};
use zailo_bot_transport::{BridgeConfig, WhatsAppBridge};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Priority: env vars > config/{env}.yaml > config/default.yaml > defaults
    let env = std::env::var("ZAILO_BOT_ENV").ok();
    let config = match load_settings(env.as_deref()) {
        Ok(settings) => {
            // Tracing not yet initialized
            eprintln!(
                "Loaded configuration from files (env: {})",
                env.as_deref().unwrap_or("default")
            );
            settings
        },
        Err(e) => {
            eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
            Settings::default()
        },
    };

    init_tracing(&config);

    tracing::info!("Starting chat-bot server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        environment = ?config.environment,
        config_path = env.as_deref().unwrap_or("default"),
        "Configuration loaded"
    );

    if config.environment.is_production() && !config.server.cors_enabled {
        tracing::warn!("CORS is disabled in production");
    }

    if config.observability.metrics_enabled && init_metrics().is_some() {
        tracing::info!("Initialized Prometheus metrics at /metrics");
    }

    let store = match StoreProfile::load(&config.bot.store_profile_path) {
        Ok(store) => {
            tracing::info!(
                store = %store.store_name,
                assistant = %store.assistant_name,
                sales_contacts = store.sales_contacts.len(),
                "Loaded store profile"
            );
            store
        },
        Err(e) => {
            tracing::error!(
                path = %config.bot.store_profile_path,
                error = %e,
                "Failed to load store profile"
            );
            std::process::exit(1);
        },
    };

    let vehicles = match load_catalog(&config.bot.catalog_path) {
        Ok(vehicles) => vehicles,
        Err(e) => {
            tracing::warn!(
                path = %config.bot.catalog_path,
                error = %e,
                "Failed to load vehicle catalog, starting with an empty stock"
            );
            Vec::new()
        },
    };
    let catalog = Catalog::new(vehicles);
    tracing::info!(vehicles = catalog.len(), "Vehicle catalog ready");

    let gateway = HttpClientGateway::new(HttpGatewayConfig {
        base_url: config.gateway.base_url.clone(),
        timeout: config.gateway.timeout(),
        api_key: config.gateway.api_key.clone(),
    })?;
    let transport = WhatsAppBridge::new(BridgeConfig {
        base_url: config.transport.bridge_url.clone(),
        timeout: config.transport.timeout(),
    })?;

    let engine = DialogueEngine::new(
        Arc::new(store),
        Arc::new(catalog),
        Arc::new(gateway),
        Arc::new(transport),
        DocumentStore::new(&config.bot.documents_dir),
        EngineConfig {
            pacing: config.bot.pacing(),
            chat_suffix: config.bot.chat_suffix.clone(),
        },
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let state = AppState::new(Arc::new(engine), config);
    let app = create_router(state);

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

fn init_tracing(config: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &config.observability.log_level;
        format!(
            "zailo_bot={level},zailo_bot_server={level},zailo_bot_agent={level},\
             zailo_bot_persistence={level},zailo_bot_transport={level},tower_http=debug"
        )
        .into()
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);
    let fmt_layer = if config.observability.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };
    subscriber.with(fmt_layer).init();
}
