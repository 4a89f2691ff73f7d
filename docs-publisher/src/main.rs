use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use docs_publisher::api;
use docs_publisher::config::Config;
use docs_publisher::domain::EntityIdentity;
use docs_publisher::utils::cli::{Args, Command, EntityArgs};
use docs_publisher::utils::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = Config::from_args(&args)?;
    let state = Arc::new(AppState::new(config).await);

    match args.command {
        Command::Serve { host, port } => {
            // The check only reports; requests are served while it runs.
            let _check = state.publisher.spawn_bucket_check();

            let app = api::create_router(state);
            let listener = tokio::net::TcpListener::bind(format!("{host}:{port}"))
                .await
                .with_context(|| format!("failed to bind {host}:{port}"))?;
            tracing::info!("listening on {}", listener.local_addr()?);

            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
        Command::Publish { entity, directory } => {
            let entity = entity_from_args(entity)?;
            state.publisher.spawn_bucket_check().await??;
            let outcome = state.publisher.publish(&entity, &directory).await?;
            println!(
                "published {} file(s) to {}",
                outcome.uploaded.len(),
                outcome.prefix
            );
        }
        Command::Status { entity } => {
            let entity = entity_from_args(entity)?;
            state.publisher.spawn_bucket_check().await??;
            let generated = state.publisher.has_docs_been_generated(&entity).await;
            println!("{entity}: generated={generated}");
            if generated {
                match state.publisher.fetch_metadata(&entity).await {
                    Ok(metadata) => println!("{metadata}"),
                    Err(e) => tracing::warn!("{}", e),
                }
            }
        }
    }
    Ok(())
}

fn entity_from_args(args: EntityArgs) -> Result<EntityIdentity, docs_publisher::error::AppError> {
    EntityIdentity::new(args.namespace, args.kind, args.name)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutting down...");
}
