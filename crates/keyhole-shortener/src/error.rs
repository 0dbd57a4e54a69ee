use keyhole_core::StorageError;
use keyhole_generator::GenerationError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShortenerError>;

#[derive(Debug, Clone, Error)]
pub enum ShortenerError {
    #[error("short key not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    Generation(GenerationError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<GenerationError> for ShortenerError {
    fn from(value: GenerationError) -> Self {
        match value {
            GenerationError::Storage(source) => Self::Storage(source),
            other => Self::Generation(other),
        }
    }
}
