use std::sync::Arc;

use kotoba_review::config::Config;
use kotoba_review::db::DatabaseProxy;
use kotoba_review::state::AppState;
use kotoba_review::{create_app, logging, seed};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _log_guard = logging::init_tracing(&config.log_level);

    let proxy = match DatabaseProxy::connect(&config.database_path).await {
        Ok(proxy) => Arc::new(proxy),
        Err(err) => {
            tracing::error!(error = %err, path = %config.database_path.display(), "failed to open review store");
            std::process::exit(1);
        }
    };

    if config.seed_content {
        if let Err(err) = seed::seed_content(&proxy).await {
            tracing::warn!(error = %err, "failed to seed starter content");
        }
    }
    if config.maintenance_token.is_none() {
        tracing::warn!("MAINTENANCE_TOKEN not set, maintenance endpoints are disabled");
    }

    let state = AppState::from_config(Arc::clone(&proxy), &config);
    let app = create_app(state);

    let addr = config.bind_addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, %addr, "bind listener failed");
            std::process::exit(1);
        }
    };
    tracing::info!(%addr, "review engine listening");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server error");
    }

    proxy.close().await;
    tracing::info!("graceful shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
