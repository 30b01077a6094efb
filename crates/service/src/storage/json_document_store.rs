use std::{
    io::ErrorKind,
    marker::PhantomData,
    path::{Path, PathBuf},
};
use tokio::{fs, sync::RwLock};
use tracing::debug;

use crate::errors::ServiceError;

/// Generic JSON file-backed document store.
///
/// Holds no copy of the document: every call re-reads the file, and every
/// mutation rewrites it in full. Within one process, mutation cycles are
/// serialized by a write guard held from load to persist, while reads share a
/// read guard. Other processes writing the same file are not coordinated with.
///
/// Writes go straight to the target file, so a crash mid-write can leave a
/// truncated document behind; the next load then reports `CorruptDocument`.
pub struct JsonDocumentStore<D> {
    file_path: PathBuf,
    gate: RwLock<()>,
    _doc: PhantomData<fn() -> D>,
}

impl<D> JsonDocumentStore<D>
where
    D: serde::Serialize + serde::de::DeserializeOwned + Default,
{
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { file_path: path.into(), gate: RwLock::new(()), _doc: PhantomData }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Write an empty document if the file does not exist yet.
    /// Returns whether a file was created; an existing file is left untouched.
    pub async fn bootstrap(&self) -> Result<bool, ServiceError> {
        let _guard = self.gate.write().await;
        let exists = fs::try_exists(&self.file_path)
            .await
            .map_err(|e| ServiceError::storage(&self.file_path, e))?;
        if exists {
            return Ok(false);
        }
        if let Some(parent) = self.file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ServiceError::storage(parent, e))?;
        }
        self.write(&D::default()).await?;
        Ok(true)
    }

    /// Read and decode the whole document.
    pub async fn load(&self) -> Result<D, ServiceError> {
        let _guard = self.gate.read().await;
        self.read().await
    }

    /// Serialize and overwrite the whole document.
    pub async fn save(&self, doc: &D) -> Result<(), ServiceError> {
        let _guard = self.gate.write().await;
        self.write(doc).await
    }

    /// Load the document and derive a value from it without persisting.
    pub async fn view<T, F>(&self, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&D) -> Result<T, ServiceError>,
    {
        let doc = self.load().await?;
        f(&doc)
    }

    /// Run one load → mutate → persist cycle under the write guard.
    ///
    /// The document is persisted whenever `f` returns `Ok`, even if it changed
    /// nothing. An `Err` from `f` aborts the cycle without writing.
    pub async fn update<T, F>(&self, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&mut D) -> Result<T, ServiceError>,
    {
        let _guard = self.gate.write().await;
        let mut doc = self.read().await?;
        let out = f(&mut doc)?;
        self.write(&doc).await?;
        Ok(out)
    }

    async fn read(&self) -> Result<D, ServiceError> {
        let bytes = fs::read(&self.file_path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => ServiceError::storage(&self.file_path, "document does not exist"),
            _ => ServiceError::storage(&self.file_path, e),
        })?;
        serde_json::from_slice(&bytes).map_err(|e| ServiceError::corrupt(&self.file_path, e))
    }

    async fn write(&self, doc: &D) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(doc).map_err(|e| ServiceError::corrupt(&self.file_path, e))?;
        fs::write(&self.file_path, &data)
            .await
            .map_err(|e| ServiceError::storage(&self.file_path, e))?;
        debug!(path = %self.file_path.display(), bytes = data.len(), "document persisted");
        Ok(())
    }
}
