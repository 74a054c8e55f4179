use std::path::PathBuf;
use std::sync::Arc;

use crate::cookies::{CookieStoreHandle, InMemoryCookieStore, JsonCookieStore};
use crate::errors::StoreError;

/// Where cookie jars are kept.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CookieStoreBackend {
    /// Nothing survives the process
    #[default]
    InMemory,
    /// A single JSON file holding every jar
    Json(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieStoreConfig {
    pub backend: CookieStoreBackend,
    /// Write indented JSON (JSON backend only).
    pub pretty_json: bool,
}

impl Default for CookieStoreConfig {
    fn default() -> Self {
        Self {
            backend: CookieStoreBackend::InMemory,
            pretty_json: true,
        }
    }
}

impl CookieStoreConfig {
    pub fn json(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: CookieStoreBackend::Json(path.into()),
            ..Self::default()
        }
    }

    /// Opens the configured store.
    pub fn open(&self) -> Result<CookieStoreHandle, StoreError> {
        let store: CookieStoreHandle = match &self.backend {
            CookieStoreBackend::InMemory => Arc::new(InMemoryCookieStore::new()),
            CookieStoreBackend::Json(path) => {
                JsonCookieStore::with_options(path.clone(), self.pretty_json)?
            }
        };
        Ok(store)
    }
}
