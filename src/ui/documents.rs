//! Documents page: recent documents, templates, quick actions and the full list

use tokio::runtime::Handle;

use super::route::Route;
use crate::core::document::DocumentSummary;
use crate::core::loader::{DocumentListLoader, DocumentListing, LoadError, LOAD_FAILED_MESSAGE};
use crate::core::task::{LoadTask, TaskStatus};

const IMPORT_NOTICE: &str = "Document import functionality will be available soon.";

/// State of the documents page for one mount
pub struct DocumentsPage {
    loader: DocumentListLoader,
    runtime: Handle,
    ctx: egui::Context,
    recent_limit: usize,
    /// Loaded summaries, newest first
    pub documents: Vec<DocumentSummary>,
    /// Whether a load is in flight
    pub is_loading: bool,
    /// Message replacing the list when the load failed
    pub error: Option<String>,
    task: Option<LoadTask<Result<DocumentListing, LoadError>>>,
    notice: Option<&'static str>,
}

impl DocumentsPage {
    /// Mount the page and start loading documents
    pub fn mount(
        loader: DocumentListLoader,
        runtime: Handle,
        ctx: egui::Context,
        recent_limit: usize,
    ) -> Self {
        let mut page = Self {
            loader,
            runtime,
            ctx,
            recent_limit,
            documents: Vec::new(),
            is_loading: false,
            error: None,
            task: None,
            notice: None,
        };
        page.start_load();
        page
    }

    fn start_load(&mut self) {
        tracing::info!("Loading documents from {}", self.loader.dir());
        let loader = self.loader.clone();
        let ctx = self.ctx.clone();
        self.is_loading = true;
        self.task = Some(LoadTask::spawn(
            &self.runtime,
            async move { loader.load().await },
            move || ctx.request_repaint(),
        ));
    }

    /// Throw away the current state and load again
    pub fn retry(&mut self) {
        self.task = None;
        self.documents.clear();
        self.error = None;
        self.start_load();
    }

    /// Apply the load result once it has arrived
    pub fn poll(&mut self) {
        let Some(task) = self.task.as_mut() else {
            return;
        };
        let status = task.poll();
        if matches!(status, TaskStatus::Pending) {
            return;
        }
        self.task = None;
        self.is_loading = false;

        match status {
            TaskStatus::Done(Ok(listing)) => {
                self.documents = listing.documents;
                self.error = None;
            }
            TaskStatus::Done(Err(e)) => {
                tracing::error!("Failed to load documents: {}", e);
                self.documents.clear();
                self.error = Some(e.user_message().to_string());
            }
            TaskStatus::Failed | TaskStatus::Pending => {
                self.documents.clear();
                self.error = Some(LOAD_FAILED_MESSAGE.to_string());
            }
        }
    }

    /// Most recently updated documents
    pub fn recent(&self) -> &[DocumentSummary] {
        let end = self.recent_limit.min(self.documents.len());
        &self.documents[..end]
    }

    /// Show the page. Returns the route the user picked, if any.
    pub fn show(&mut self, ui: &mut egui::Ui) -> Option<Route> {
        self.poll();

        let mut route = None;

        ui.horizontal(|ui| {
            ui.heading("Documents");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Create Document").clicked() {
                    route = Some(Route::CreateDocument);
                }
            });
        });
        ui.add_space(12.0);

        if self.show_error(ui) {
            self.retry();
        }

        if self.is_loading {
            ui.vertical_centered(|ui| {
                ui.add_space(24.0);
                ui.spinner();
                ui.label("Loading documents...");
            });
            return route;
        }

        egui::ScrollArea::vertical()
            .id_salt("documents_scroll")
            .show(ui, |ui| {
                ui.columns(3, |columns| {
                    if let Some(r) = self.show_recent(&mut columns[0]) {
                        route = Some(r);
                    }
                    if let Some(r) = Self::show_templates(&mut columns[1]) {
                        route = Some(r);
                    }
                    if let Some(r) = self.show_quick_actions(&mut columns[2]) {
                        route = Some(r);
                    }
                });

                ui.add_space(24.0);
                ui.heading("All Documents");
                ui.add_space(8.0);
                if let Some(r) = self.show_all(ui) {
                    route = Some(r);
                }
            });

        self.show_notice(ui.ctx());

        route
    }

    /// Error banner; returns true when Retry was clicked
    fn show_error(&self, ui: &mut egui::Ui) -> bool {
        let Some(error) = &self.error else {
            return false;
        };

        let mut retry = false;
        let color = ui.visuals().error_fg_color;
        egui::Frame::new()
            .fill(color.gamma_multiply(0.1))
            .inner_margin(egui::Margin::same(12))
            .corner_radius(egui::CornerRadius::same(4))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.colored_label(color, error);
                    if ui.small_button("Retry").clicked() {
                        retry = true;
                    }
                });
            });
        ui.add_space(12.0);
        retry
    }

    fn show_recent(&self, ui: &mut egui::Ui) -> Option<Route> {
        let mut route = None;
        ui.group(|ui| {
            ui.strong("Recent Documents");
            ui.weak("Recently edited documents");
            ui.add_space(6.0);
            for doc in self.recent() {
                let label = format!("{}\n{}", doc.title, doc.updated_date());
                if ui.add(egui::Button::new(label).frame(false)).clicked() {
                    route = Some(Route::ViewDocument(doc.id.clone()));
                }
            }
        });
        route
    }

    fn show_templates(ui: &mut egui::Ui) -> Option<Route> {
        let mut route = None;
        ui.group(|ui| {
            ui.strong("Templates");
            ui.weak("Start from pre-made document templates");
            ui.add_space(6.0);
            if ui.button("Browse Templates").clicked() {
                route = Some(Route::Templates);
            }
        });
        route
    }

    fn show_quick_actions(&mut self, ui: &mut egui::Ui) -> Option<Route> {
        let mut route = None;
        ui.group(|ui| {
            ui.strong("Quick Actions");
            ui.weak("Common document actions");
            ui.add_space(6.0);
            if ui.button("Import Document").clicked() {
                self.notice = Some(IMPORT_NOTICE);
            }
            if ui.button("Create New").clicked() {
                route = Some(Route::CreateDocument);
            }
        });
        route
    }

    fn show_all(&self, ui: &mut egui::Ui) -> Option<Route> {
        let mut route = None;
        egui::Grid::new("all_documents")
            .num_columns(3)
            .spacing([12.0, 12.0])
            .show(ui, |ui| {
                for (i, doc) in self.documents.iter().enumerate() {
                    let card = ui.group(|ui| {
                        ui.set_min_width(220.0);
                        ui.strong(&doc.title);
                        ui.weak(format!("{} \u{00B7} {}", doc.doc_type, doc.updated_date()));
                    });
                    if card
                        .response
                        .interact(egui::Sense::click())
                        .on_hover_cursor(egui::CursorIcon::PointingHand)
                        .clicked()
                    {
                        route = Some(Route::ViewDocument(doc.id.clone()));
                    }
                    if i % 3 == 2 {
                        ui.end_row();
                    }
                }
            });
        route
    }

    fn show_notice(&mut self, ctx: &egui::Context) {
        let Some(message) = self.notice else {
            return;
        };

        egui::Window::new("Import Document")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(message);
                if ui.button("OK").clicked() {
                    self.notice = None;
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::core::file_store::{FileStore, MemoryFileStore, StoreError};

    /// Store whose every call panics
    struct BrokenStore;

    #[async_trait]
    impl FileStore for BrokenStore {
        async fn mkdir(&self, _path: &str) -> Result<(), StoreError> {
            panic!("mkdir is broken")
        }

        async fn readdir(&self, _path: &str) -> Result<Vec<String>, StoreError> {
            panic!("readdir is broken")
        }

        async fn read(&self, _path: &str) -> Result<String, StoreError> {
            panic!("read is broken")
        }
    }

    fn record(id: &str, updated_at: &str) -> String {
        format!(r#"{{"id":"{id}","type":"letter","updatedAt":"{updated_at}"}}"#)
    }

    fn mount(store: MemoryFileStore, recent_limit: usize) -> DocumentsPage {
        DocumentsPage::mount(
            DocumentListLoader::new(Arc::new(store)),
            Handle::current(),
            egui::Context::default(),
            recent_limit,
        )
    }

    async fn settle(page: &mut DocumentsPage) {
        for _ in 0..200 {
            page.poll();
            if !page.is_loading {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("load did not finish");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_mount_loads_documents() {
        let store = MemoryFileStore::new()
            .with_file("/documents/a.json", record("A", "2024-01-01"))
            .with_file("/documents/b.json", record("B", "2024-03-01"));

        let mut page = mount(store, 5);
        assert!(page.is_loading);

        settle(&mut page).await;
        assert_eq!(page.error, None);
        let ids: Vec<_> = page.documents.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["B", "A"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_recent_is_capped() {
        let mut store = MemoryFileStore::new();
        for day in 1..=7 {
            store = store.with_file(
                &format!("/documents/{day}.json"),
                record(&day.to_string(), &format!("2024-01-0{day}")),
            );
        }

        let mut page = mount(store, 5);
        settle(&mut page).await;

        assert_eq!(page.documents.len(), 7);
        let recent: Vec<_> = page.recent().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(recent, vec!["7", "6", "5", "4", "3"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_fatal_error_shows_message_and_no_list() {
        let store = MemoryFileStore::new()
            .with_file("/documents/a.json", record("A", "2024-01-01"))
            .failing_mkdir("disk full");

        let mut page = mount(store, 5);
        settle(&mut page).await;

        assert!(page.documents.is_empty());
        assert_eq!(
            page.error.as_deref(),
            Some("Failed to initialize documents directory. Please try again later.")
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_retry_after_store_comes_back() {
        let store = Arc::new(
            MemoryFileStore::new().with_file("/documents/a.json", record("A", "2024-01-01")),
        );
        store.set_available(false);

        let mut page = DocumentsPage::mount(
            DocumentListLoader::new(store.clone()),
            Handle::current(),
            egui::Context::default(),
            5,
        );
        settle(&mut page).await;
        assert_eq!(
            page.error.as_deref(),
            Some("File system service is not available")
        );

        store.set_available(true);
        page.retry();
        assert!(page.is_loading);
        assert_eq!(page.error, None);

        settle(&mut page).await;
        assert_eq!(page.error, None);
        assert_eq!(page.documents.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_panicking_store_shows_error_with_retry() {
        let mut page = DocumentsPage::mount(
            DocumentListLoader::new(Arc::new(BrokenStore)),
            Handle::current(),
            egui::Context::default(),
            5,
        );
        settle(&mut page).await;

        assert!(!page.is_loading);
        assert!(page.documents.is_empty());
        assert_eq!(
            page.error.as_deref(),
            Some("Failed to load documents. Please try again later.")
        );
    }
}
