use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tracing_subscriber::{FmtSubscriber, EnvFilter};

use crate::error::Context;

mod error;
mod path;
mod net;
mod template;
mod sec;
mod state;
mod storage;
mod project;
mod routing;
mod config;

fn main() -> ExitCode {
    if let Err(err) = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init() {
        eprintln!("failed to initialize global tracing subscriber: {err}");
        return ExitCode::FAILURE;
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("clientdesk-worker")
        .build() {
        Ok(rt) => rt,
        Err(err) => {
            tracing::error!("failed to start tokio runtime. {err}");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(kind = err.kind().as_str(), "{err}");
            ExitCode::FAILURE
        }
    }
}

/// Builds the project once and serves it on every configured listener.
///
/// All sockets are bound before serving starts so a bad address stops the
/// process instead of leaving it half up.
async fn run() -> error::Result<()> {
    let config = config::Config::from_args(config::CliArgs::parse())?;
    let state = Arc::new(state::Shared::from_config(&config)?);

    {
        let backend = state.project().storage().backend();

        tracing::info!(
            mode = state.project().mode().as_str(),
            storage = backend.name(),
            origin = backend.origin(),
            "project ready"
        );
    }

    let router = routing::routes(&state);
    let mut bound = Vec::with_capacity(config.settings.listeners.len());

    for (name, listener) in &config.settings.listeners {
        let socket = std::net::TcpListener::bind(listener.addr)
            .context(format!("listener \"{name}\" failed to bind to {}", listener.addr))?;

        tracing::info!("listener \"{name}\" accepting on {}", socket.local_addr()?);

        bound.push((name.clone(), socket));
    }

    let mut servers: FuturesUnordered<_> = bound.into_iter()
        .map(|(name, socket)| {
            let app = router.clone().into_make_service();

            async move {
                (name, axum_server::from_tcp(socket).serve(app).await)
            }
        })
        .collect();

    while let Some((name, result)) = servers.next().await {
        match result {
            Ok(()) => tracing::info!("listener \"{name}\" stopped"),
            Err(err) => tracing::error!("listener \"{name}\" failed: {err}"),
        }
    }

    Ok(())
}
