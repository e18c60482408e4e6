//! Shared types, configuration, credentials and the static knowledge base.

pub mod config;
pub mod error;
pub mod knowledge;
pub mod secrets;
pub mod types;

pub use config::AgroConfig;
pub use error::{AgroError, Result};
pub use knowledge::KnowledgeBase;
pub use secrets::ApiKey;
pub use types::{Crop, CropSelection, KnowledgeEntry};
