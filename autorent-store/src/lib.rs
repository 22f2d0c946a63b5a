pub mod app_config;
pub mod json_store;
pub mod seed;

pub use json_store::{Document, JsonStore};

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("cannot initialize store at {}: {source}", .path.display())]
    Init {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("store document {} is not valid JSON: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("store file not found: {}", .0.display())]
    Missing(PathBuf),
    #[error("store is running in memory only")]
    Volatile,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
