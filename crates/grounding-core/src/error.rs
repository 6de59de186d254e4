//! Error types for the grounding retrieval engine.

use thiserror::Error;

/// Result type alias using RetrievalError.
pub type Result<T> = std::result::Result<T, RetrievalError>;

/// Errors that can occur during retrieval.
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// Lexical index call failed.
    #[error("Lexical search error: {message}")]
    LexicalSearch { message: String },

    /// Vector index call failed.
    #[error("Vector search error: {message}")]
    VectorSearch { message: String },

    /// Embedding generation failed.
    #[error("Embedding error: {message}")]
    Embedding { message: String },

    /// Chunk store call failed.
    #[error("Chunk store error: {message}")]
    Store { message: String },

    /// Invalid argument provided.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The originating request was cancelled.
    #[error("Request cancelled")]
    Cancelled,

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error (unexpected).
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl RetrievalError {
    /// Create a lexical search error.
    pub fn lexical_search(message: impl Into<String>) -> Self {
        Self::LexicalSearch {
            message: message.into(),
        }
    }

    /// Create a vector search error.
    pub fn vector_search(message: impl Into<String>) -> Self {
        Self::VectorSearch {
            message: message.into(),
        }
    }

    /// Create an embedding error.
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding {
            message: message.into(),
        }
    }

    /// Create a chunk store error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
