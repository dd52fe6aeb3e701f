mod cluster;
mod command;
mod config;
mod error;
mod handlers;
mod pipeline;
mod state;
#[cfg(test)]
mod testing;

use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cluster::HadoopCluster;
use crate::command::TokioCommandRunner;
use crate::config::OrchestratorConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("orchestrator=debug,tower_http=info")),
        )
        .init();

    let config = OrchestratorConfig::from_env();
    info!(
        "cluster: contenedor={} jar={} staging={} timeout_job={:?}",
        config.container,
        config.streaming_jar,
        config.local_staging_dir.display(),
        config.job_timeout
    );

    let cluster = HadoopCluster::new(TokioCommandRunner, config.clone());
    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(Arc::new(cluster), config);

    // router HTTP
    let app = handlers::build_router(state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("no se pudo escuchar en {}", bind_addr))?;
    info!("orquestador escuchando en {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
