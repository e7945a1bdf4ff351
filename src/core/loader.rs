//! Loads the document list from a file store

use std::sync::Arc;

use futures::future::join_all;
use thiserror::Error;

use super::document::{DecodeError, DocumentSummary};
use super::file_store::{join_path, FileStore, StoreError};

/// Directory holding the document records
pub const DEFAULT_DOCUMENTS_DIR: &str = "/documents";

/// Extension of a document record file
pub const DEFAULT_RECORD_EXTENSION: &str = "json";

/// Message shown when the list could not be loaded
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load documents. Please try again later.";

/// Failure that abandons a whole load
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file system service is not available: {0}")]
    ServiceUnavailable(#[source] StoreError),

    #[error("failed to initialize documents directory: {0}")]
    DirectoryInit(#[source] StoreError),

    #[error("failed to list documents: {0}")]
    Listing(#[source] StoreError),
}

impl LoadError {
    /// Message shown to the user in place of the list
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::ServiceUnavailable(_) => "File system service is not available",
            Self::DirectoryInit(_) => {
                "Failed to initialize documents directory. Please try again later."
            }
            Self::Listing(_) => LOAD_FAILED_MESSAGE,
        }
    }
}

/// Why one entry was left out of the list
#[derive(Debug, Error)]
enum EntryError {
    #[error(transparent)]
    Read(#[from] StoreError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Result of a successful load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentListing {
    /// Summaries, newest update first
    pub documents: Vec<DocumentSummary>,
    /// Record files that could not be read or decoded
    pub skipped: usize,
}

/// Reads every document record in a directory of a file store
#[derive(Clone)]
pub struct DocumentListLoader {
    store: Arc<dyn FileStore>,
    dir: String,
    extension: String,
}

impl DocumentListLoader {
    /// Create a loader for the default documents directory
    pub fn new(store: Arc<dyn FileStore>) -> Self {
        Self {
            store,
            dir: DEFAULT_DOCUMENTS_DIR.to_string(),
            extension: DEFAULT_RECORD_EXTENSION.to_string(),
        }
    }

    /// Read records from another directory
    pub fn with_dir(mut self, dir: impl Into<String>) -> Self {
        self.dir = dir.into();
        self
    }

    /// Accept record files with another extension
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    /// Directory the loader reads
    pub fn dir(&self) -> &str {
        &self.dir
    }

    /// Load all readable records, newest first
    pub async fn load(&self) -> Result<DocumentListing, LoadError> {
        self.ensure_dir().await?;

        let names = self.store.readdir(&self.dir).await.map_err(|e| match e {
            StoreError::Unavailable(_) => LoadError::ServiceUnavailable(e),
            _ => LoadError::Listing(e),
        })?;

        let suffix = format!(".{}", self.extension);
        let candidates: Vec<String> = names
            .into_iter()
            .filter(|name| name.ends_with(&suffix))
            .collect();

        let results = join_all(candidates.iter().map(|name| self.load_entry(name))).await;

        let total = results.len();
        let mut documents: Vec<DocumentSummary> = results.into_iter().flatten().collect();
        let skipped = total - documents.len();

        // Stable, so equal timestamps keep listing order
        documents.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        if skipped > 0 {
            tracing::warn!(
                "Skipped {} of {} document records in {}",
                skipped,
                total,
                self.dir
            );
        }
        tracing::info!("Loaded {} documents from {}", documents.len(), self.dir);

        Ok(DocumentListing { documents, skipped })
    }

    async fn ensure_dir(&self) -> Result<(), LoadError> {
        match self.store.mkdir(&self.dir).await {
            Ok(()) => {
                tracing::info!("Created documents directory {}", self.dir);
                Ok(())
            }
            Err(StoreError::AlreadyExists(_)) => Ok(()),
            Err(e @ StoreError::Unavailable(_)) => Err(LoadError::ServiceUnavailable(e)),
            Err(e) => {
                tracing::error!("Failed to initialize documents directory: {}", e);
                Err(LoadError::DirectoryInit(e))
            }
        }
    }

    /// Fetch and decode one record; failures are logged and yield `None`
    async fn load_entry(&self, name: &str) -> Option<DocumentSummary> {
        let path = join_path(&self.dir, name);
        match self.fetch_entry(&path).await {
            Ok(summary) => Some(summary),
            Err(e) => {
                tracing::warn!("Failed to load document {}: {}", name, e);
                None
            }
        }
    }

    async fn fetch_entry(&self, path: &str) -> Result<DocumentSummary, EntryError> {
        let content = self.store.read(path).await?;
        Ok(DocumentSummary::from_json(&content)?)
    }
}
