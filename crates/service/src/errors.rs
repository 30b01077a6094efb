use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    /// The backing file could not be read or written.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
    /// The backing file was read but is not a valid document.
    #[error("corrupt document: {0}")]
    CorruptDocument(String),
    #[error("id is required")]
    MissingIdentifier,
    #[error("grade {0} not found")]
    RecordNotFound(u64),
    #[error("no grades match {0}")]
    NoMatchingRecords(String),
}

impl ServiceError {
    pub fn storage(path: &std::path::Path, err: impl std::fmt::Display) -> Self {
        Self::StorageUnavailable(format!("{}: {}", path.display(), err))
    }

    pub fn corrupt(path: &std::path::Path, err: impl std::fmt::Display) -> Self {
        Self::CorruptDocument(format!("{}: {}", path.display(), err))
    }
}
