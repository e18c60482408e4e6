use thiserror::Error;

/// Top-level error type for the crop advisor.
///
/// Subsystem crates define their own error types and convert from
/// `AgroError` so that the `?` operator works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AgroError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing credential: {name} is not set")]
    MissingCredential { name: String },

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for AgroError {
    fn from(err: toml::de::Error) -> Self {
        AgroError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for AgroError {
    fn from(err: toml::ser::Error) -> Self {
        AgroError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for AgroError {
    fn from(err: serde_json::Error) -> Self {
        AgroError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for crop advisor operations.
pub type Result<T> = std::result::Result<T, AgroError>;
