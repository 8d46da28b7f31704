use thiserror::Error;

use utkik_storage::StorageError;

/// Errors surfaced by the capture controller.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("capture worker panicked")]
    WorkerPanicked,
}
