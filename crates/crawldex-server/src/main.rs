mod api;
mod middleware;

use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    middleware::{ApiKeys, RequestBudget},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = crawldex_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let keys = ApiKeys::from_env(&config.env)?;
    let state = AppState {
        store: crawldex_catalog::ResultStore::new(config.results_dir.clone()),
        page_size: config.page_size,
    };
    let app = build_app(
        state,
        keys.clone(),
        RequestBudget::per_minute(config.rate_limit_per_minute),
    );

    tracing::info!(
        bind_addr = %config.bind_addr,
        results_dir = %config.results_dir.display(),
        env = %config.env,
        api_keys_required = !keys.is_open(),
        "starting result catalog server"
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %error, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!(error = %error, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
