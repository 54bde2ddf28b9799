//! Application lifecycle: connect, register, init, seed, start, serve, stop.

use std::sync::Arc;

use anyhow::Context;
use bookstore_db::DocumentStore;
use bookstore_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules;

/// Registry holding every catalog module over `store`
pub fn build_registry(store: Arc<dyn DocumentStore>) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, store);
    registry
}

/// Run the API until interrupted
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let store = bookstore_db::connect(&settings.database)
        .await
        .context("failed to open the document store")?;
    let registry = build_registry(store);
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_modules(&ctx).await?;

    if settings.database.seed {
        registry.seed_modules().await?;
    }

    registry.start_modules(&ctx).await?;

    tracing::info!(
        modules = registry.module_count(),
        "bookstore bootstrap complete"
    );

    let served = bookstore_http::start_server(&registry, &settings, shutdown_signal()).await;

    registry.stop_modules().await?;
    served
}

/// Populate empty collections and exit
pub async fn seed(settings: Settings) -> anyhow::Result<()> {
    let store = bookstore_db::connect(&settings.database)
        .await
        .context("failed to open the document store")?;
    let registry = build_registry(store);
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_modules(&ctx).await?;
    registry.seed_modules().await?;

    tracing::info!("seeding complete");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received"),
        Err(err) => tracing::error!(error = %err, "failed to listen for shutdown signal"),
    }
}
