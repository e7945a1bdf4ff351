//! File store capability and its backends

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use walkdir::WalkDir;

/// Errors reported by a file store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("file store unavailable: {0}")]
    Unavailable(String),

    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    fn from_io(path: &str, source: std::io::Error) -> Self {
        match source.kind() {
            ErrorKind::AlreadyExists => Self::AlreadyExists(path.to_string()),
            ErrorKind::NotFound => Self::NotFound(path.to_string()),
            _ => Self::Io {
                path: path.to_string(),
                source,
            },
        }
    }
}

/// Directory and file access used by the document list.
///
/// Paths are `/`-separated and absolute within the store, e.g.
/// `/documents/abc.json`.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Create a directory whose parent already exists. Reports
    /// [`StoreError::AlreadyExists`] if it is there.
    async fn mkdir(&self, path: &str) -> Result<(), StoreError>;

    /// Names of the files directly inside a directory
    async fn readdir(&self, path: &str) -> Result<Vec<String>, StoreError>;

    /// Content of a file as text
    async fn read(&self, path: &str) -> Result<String, StoreError>;
}

/// Join a store directory and an entry name
pub fn join_path(dir: &str, name: &str) -> String {
    format!("{}/{}", dir.trim_end_matches('/'), name)
}

/// File store backed by a directory on the local disk
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    /// Create a store rooted at a directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the store
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a store path below the root. Parent and root components are
    /// dropped so a path can never leave the store.
    fn resolve(&self, path: &str) -> PathBuf {
        let mut resolved = self.root.clone();
        for component in Path::new(path).components() {
            if let Component::Normal(part) = component {
                resolved.push(part);
            }
        }
        resolved
    }

    async fn ensure_available(&self) -> Result<(), StoreError> {
        match tokio::fs::metadata(&self.root).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            _ => Err(StoreError::Unavailable(self.root.display().to_string())),
        }
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn mkdir(&self, path: &str) -> Result<(), StoreError> {
        self.ensure_available().await?;
        tokio::fs::create_dir(self.resolve(path))
            .await
            .map_err(|e| StoreError::from_io(path, e))
    }

    async fn readdir(&self, path: &str) -> Result<Vec<String>, StoreError> {
        self.ensure_available().await?;
        let dir = self.resolve(path);
        let meta = tokio::fs::metadata(&dir)
            .await
            .map_err(|e| StoreError::from_io(path, e))?;
        if !meta.is_dir() {
            return Err(StoreError::NotFound(path.to_string()));
        }

        let store_path = path.to_string();
        tokio::task::spawn_blocking(move || {
            let mut names = Vec::new();
            for entry in WalkDir::new(&dir)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
            {
                let entry = entry.map_err(|e| StoreError::from_io(&store_path, e.into()))?;
                if entry.file_type().is_file() {
                    names.push(entry.file_name().to_string_lossy().to_string());
                }
            }
            Ok::<_, StoreError>(names)
        })
        .await
        .map_err(|e| StoreError::Io {
            path: path.to_string(),
            source: std::io::Error::other(e),
        })?
    }

    async fn read(&self, path: &str) -> Result<String, StoreError> {
        self.ensure_available().await?;
        tokio::fs::read_to_string(self.resolve(path))
            .await
            .map_err(|e| StoreError::from_io(path, e))
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    dirs: BTreeSet<String>,
    files: BTreeMap<String, String>,
}

/// In-process file store. Used for demo data and for exercising failure
/// paths that are hard to produce on a real disk.
#[derive(Debug)]
pub struct MemoryFileStore {
    state: RwLock<MemoryState>,
    available: AtomicBool,
    mkdir_failure: Option<String>,
    readdir_failure: Option<String>,
    readdir_unavailable: bool,
    read_failures: HashSet<String>,
}

impl Default for MemoryFileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFileStore {
    /// Create an empty store containing only the root directory
    pub fn new() -> Self {
        let mut state = MemoryState::default();
        state.dirs.insert("/".to_string());
        Self {
            state: RwLock::new(state),
            available: AtomicBool::new(true),
            mkdir_failure: None,
            readdir_failure: None,
            readdir_unavailable: false,
            read_failures: HashSet::new(),
        }
    }

    /// Add a file, creating its parent directories
    pub fn with_file(mut self, path: &str, content: impl Into<String>) -> Self {
        let state = self.state.get_mut();
        let mut parent = String::new();
        let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
        if let Some((_, dirs)) = parts.split_last() {
            for dir in dirs {
                parent.push('/');
                parent.push_str(dir);
                state.dirs.insert(parent.clone());
            }
        }
        state.files.insert(normalize(path), content.into());
        self
    }

    /// Add an empty directory
    pub fn with_dir(mut self, path: &str) -> Self {
        self.state.get_mut().dirs.insert(normalize(path));
        self
    }

    /// Make every `mkdir` fail with an I/O error
    #[cfg(test)]
    pub fn failing_mkdir(mut self, message: impl Into<String>) -> Self {
        self.mkdir_failure = Some(message.into());
        self
    }

    /// Make every `readdir` fail with an I/O error
    #[cfg(test)]
    pub fn failing_readdir(mut self, message: impl Into<String>) -> Self {
        self.readdir_failure = Some(message.into());
        self
    }

    /// Make `readdir` report the store as unavailable while `mkdir` works
    #[cfg(test)]
    pub fn unavailable_readdir(mut self) -> Self {
        self.readdir_unavailable = true;
        self
    }

    /// Make reads of one file fail
    #[cfg(test)]
    pub fn failing_read(mut self, path: &str) -> Self {
        self.read_failures.insert(normalize(path));
        self
    }

    /// Switch the whole store on or off
    #[cfg(test)]
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store is offline".to_string()))
        }
    }
}

fn normalize(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    format!("/{trimmed}")
}

fn parent_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(idx) => &path[..idx],
        None => "/",
    }
}

fn simulated_failure(path: &str, message: &str) -> StoreError {
    StoreError::Io {
        path: path.to_string(),
        source: std::io::Error::other(message.to_string()),
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn mkdir(&self, path: &str) -> Result<(), StoreError> {
        self.check_available()?;
        if let Some(message) = &self.mkdir_failure {
            return Err(simulated_failure(path, message));
        }

        let path = normalize(path);
        let mut state = self.state.write().await;
        if state.dirs.contains(&path) || state.files.contains_key(&path) {
            return Err(StoreError::AlreadyExists(path));
        }
        if !state.dirs.contains(parent_of(&path)) {
            return Err(StoreError::NotFound(parent_of(&path).to_string()));
        }
        state.dirs.insert(path);
        Ok(())
    }

    async fn readdir(&self, path: &str) -> Result<Vec<String>, StoreError> {
        self.check_available()?;
        if self.readdir_unavailable {
            return Err(StoreError::Unavailable("listing service is offline".to_string()));
        }
        if let Some(message) = &self.readdir_failure {
            return Err(simulated_failure(path, message));
        }

        let path = normalize(path);
        let state = self.state.read().await;
        if !state.dirs.contains(&path) {
            return Err(StoreError::NotFound(path));
        }
        Ok(state
            .files
            .keys()
            .filter(|file| parent_of(file) == path)
            .map(|file| file[file.rfind('/').map_or(0, |i| i + 1)..].to_string())
            .collect())
    }

    async fn read(&self, path: &str) -> Result<String, StoreError> {
        self.check_available()?;
        let path = normalize(path);
        if self.read_failures.contains(&path) {
            return Err(simulated_failure(&path, "read failed"));
        }

        let state = self.state.read().await;
        state
            .files
            .get(&path)
            .cloned()
            .ok_or(StoreError::NotFound(path))
    }
}
