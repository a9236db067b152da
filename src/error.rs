use thiserror::Error;

/// Errors that can occur while extracting recipes from books
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Chapter markup could not be decoded or holds no element content
    #[error("Malformed markup in chapter {chapter}: {reason}")]
    MalformedMarkup { chapter: String, reason: String },

    /// The book container could not be opened at all
    #[error("Book {book} unavailable: {reason}")]
    BookUnavailable { book: String, reason: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Builder configuration error
    #[error("Builder error: {0}")]
    Builder(String),

    /// The storage collaborator rejected a batch
    #[error("Storage error: {0}")]
    Storage(String),

    /// Failed to render diagnostics
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A batch worker panicked or was cancelled
    #[error("Worker error: {0}")]
    Worker(String),
}
