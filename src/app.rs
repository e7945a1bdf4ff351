//! Main application state and UI coordination

use std::path::PathBuf;
use std::sync::Arc;

use tokio::runtime::Runtime;

use crate::core::config::AppConfig;
use crate::core::file_store::{FileStore, LocalFileStore};
use crate::core::loader::DocumentListLoader;
use crate::ui::{documents::DocumentsPage, route::Route};

/// Where documents are read from
pub enum StoreSource {
    /// Directory on disk
    Local(PathBuf),
    /// Caller-provided store, e.g. the demo data
    Custom {
        label: String,
        store: Arc<dyn FileStore>,
    },
}

/// Main application state
pub struct DocshelfApp {
    /// Runtime driving background loads
    runtime: Runtime,
    /// Application configuration
    config: AppConfig,
    /// Store the documents page reads from
    store: Arc<dyn FileStore>,
    /// Short description of the store for the status bar
    store_label: String,
    /// Mounted documents page; dropping it cancels its load
    page: Option<DocumentsPage>,
    /// Last navigation request
    last_route: Option<Route>,
}

impl DocshelfApp {
    /// Create a new application instance
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        runtime: Runtime,
        config: AppConfig,
        source: StoreSource,
    ) -> Self {
        Self::configure_style(&cc.egui_ctx, &config);

        let (store, store_label) = match source {
            StoreSource::Local(root) => Self::local_store(root),
            StoreSource::Custom { label, store } => (store, label),
        };

        let mut app = Self {
            runtime,
            config,
            store,
            store_label,
            page: None,
            last_route: None,
        };
        app.mount_page(&cc.egui_ctx);
        app
    }

    fn configure_style(ctx: &egui::Context, config: &AppConfig) {
        if config.ui.theme == "light" {
            ctx.set_visuals(egui::Visuals::light());
        } else {
            ctx.set_visuals(egui::Visuals::dark());
        }
    }

    fn local_store(root: PathBuf) -> (Arc<dyn FileStore>, String) {
        let store = LocalFileStore::new(root);
        let label = store.root().display().to_string();
        (Arc::new(store), label)
    }

    /// Mount a fresh documents page, dropping any previous one
    fn mount_page(&mut self, ctx: &egui::Context) {
        self.page = None;

        let loader = DocumentListLoader::new(self.store.clone())
            .with_dir(self.config.documents_dir.clone())
            .with_extension(self.config.record_extension.clone());

        self.page = Some(DocumentsPage::mount(
            loader,
            self.runtime.handle().clone(),
            ctx.clone(),
            self.config.recent_limit,
        ));
    }

    /// Switch to a store rooted at another directory
    pub fn open_store(&mut self, ctx: &egui::Context, root: PathBuf) {
        tracing::info!("Opening store at {}", root.display());
        self.config.store_root = Some(root.clone());
        if let Err(e) = self.config.save() {
            tracing::warn!("Failed to save config: {:#}", e);
        }

        (self.store, self.store_label) = Self::local_store(root);
        self.last_route = None;
        self.mount_page(ctx);
    }

    fn navigate(&mut self, route: Route) {
        tracing::info!("Navigate to {}", route);
        self.last_route = Some(route);
    }

    /// Render the top menu bar
    fn render_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Store...").clicked() {
                        if let Some(path) = rfd::FileDialog::new().pick_folder() {
                            self.open_store(ctx, path);
                        }
                        ui.close();
                    }
                    if ui.button("Reload").clicked() {
                        self.mount_page(ctx);
                        ui.close();
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });
    }

    /// Render the status bar
    fn render_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.weak(format!("Store: {}", self.store_label));
                if let Some(route) = &self.last_route {
                    ui.separator();
                    ui.weak(format!("Opened {}", route));
                }
            });
        });
    }
}

impl eframe::App for DocshelfApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.key_pressed(egui::Key::F5)) {
            self.mount_page(ctx);
        }

        self.render_menu_bar(ctx);
        self.render_status_bar(ctx);

        let mut route = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(page) = self.page.as_mut() {
                route = page.show(ui);
            }
        });

        if let Some(route) = route {
            self.navigate(route);
        }
    }
}
