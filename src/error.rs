//! Error types for the database core.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// No embedding credential found in the environment.
    #[error("missing embedding credential: set the {0} environment variable")]
    MissingCredential(String),

    /// Directory has files but no `config.json`, or the config file is unparseable.
    #[error("'{0}' contains files but no valid config.json")]
    CorruptOrForeignDirectory(PathBuf),

    /// Parallel sequence lengths differ (e.g. ids vs. docs in `add_documents`).
    #[error("length mismatch: {ids} ids but {docs} docs")]
    LengthMismatch {
        /// Number of ids supplied.
        ids: usize,
        /// Number of docs supplied.
        docs: usize,
    },

    /// A caller-supplied document id was not a valid integer.
    #[error("invalid document id: {0}")]
    IdTypeError(String),

    /// The payload-to-text projection did not return a string.
    #[error("docs2text projection did not return a string: {0}")]
    ProjectionTypeError(String),

    /// A document id was not found.
    #[error("document {0} not found")]
    NotFound(i64),

    /// A vector did not have the expected length.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected length in bytes or elements, depending on context.
        expected: usize,
        /// Actual length encountered.
        actual: usize,
    },

    /// Search was attempted before any document was added.
    #[error("search on empty index")]
    EmptyIndex,

    /// The embedding oracle returned an error or a malformed response.
    #[error("embedding oracle failure: {0}")]
    OracleFailure(String),

    /// Underlying storage or file I/O failure.
    #[error("storage failure: {0}")]
    StorageFailure(#[from] std::io::Error),

    /// The caller cooperatively cancelled an in-flight operation.
    #[error("operation cancelled")]
    Cancelled,
}
