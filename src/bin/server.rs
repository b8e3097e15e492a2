use anyhow::Context;
use clap::Parser;
use collect_arena_server::config::ServerConfig;
use collect_arena_server::error::ServerError;
use collect_arena_server::http::{build_router, resolve_static_dir};
use collect_arena_server::state::{start_spawn_loop, ServerState};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_filter.as_str())),
        )
        .init();

    config.validate()?;

    let state = ServerState::from_config(&config).into_shared();
    start_spawn_loop(state.clone(), config.spawn_interval());

    let static_dir = resolve_static_dir(config.static_dir.as_deref());
    if let Some(dir) = static_dir.as_deref() {
        info!(dir = %dir.display(), "serving static pages");
    }
    let app = build_router(state, static_dir.as_deref());

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: bind_addr.clone(),
            source,
        })?;
    info!(
        addr = %bind_addr,
        spawn_interval_ms = config.spawn_interval_ms,
        clamp = config.clamp_to_play_area,
        "server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)
        .context("serving realtime endpoint")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
