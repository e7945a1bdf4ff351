//! Docshelf - desktop document dashboard
//!
//! Lists the JSON document records kept in a file store, newest first.

mod app;
mod core;
mod ui;

use std::sync::Arc;

use anyhow::Context;
use app::{DocshelfApp, StoreSource};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::core::config::AppConfig;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("Starting Docshelf...");

    let config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!("Using default config: {:#}", e);
        AppConfig::default()
    });

    let source = if std::env::args().any(|arg| arg == "--demo") {
        StoreSource::Custom {
            label: "demo (in memory)".to_string(),
            store: Arc::new(crate::core::demo::seeded_store()),
        }
    } else {
        let root = config.store_root();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create store root: {}", root.display()))?;
        StoreSource::Local(root)
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.ui.window_width, config.ui.window_height])
            .with_min_inner_size([640.0, 480.0])
            .with_title("Docshelf"),
        ..Default::default()
    };

    eframe::run_native(
        "Docshelf",
        native_options,
        Box::new(|cc| Ok(Box::new(DocshelfApp::new(cc, runtime, config, source)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
