//! JSON-backed cookie store.
//!
//! `JsonCookieStore` persists **all** jars in a single JSON file on disk. Jars
//! it hands out are [`PersistentCookieJar`]s, so every mutation triggers a
//! snapshot write back to this store.
//!
//! ### Design
//! - One file for all jars (`CookieStoreFile { jars: HashMap<JarId, Vec<Cookie>> }`).
//! - In-memory cache: `jars: RwLock<HashMap<JarId, CookieJarHandle>>` for quick reuse.
//! - The store keeps a weak self handle (`store_self`) so the persistent jars
//!   can call back into [`CookieStore::persist_jar`] without keeping the store
//!   alive.
//!
//! ### I/O characteristics & caveats
//! - `persist_jar` and `remove_jar` **read then rewrite** the entire file.
//!   Writes are serialized by an internal mutex but are not atomic on disk.
//! - A file that does not parse is reported as [`StoreError::Json`]; it is
//!   never silently replaced.
//!
//! ### Example
//! ```ignore
//! let store = JsonCookieStore::new("cookies.json".into())?;
//! let jar = store.jar_for(JarId::new())?;
//! ```
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock, Weak};

use serde::{Deserialize, Serialize};

use crate::cookies::cookie::Cookie;
use crate::cookies::cookie_jar::{CookieJar, CookieJarHandle, DefaultCookieJar};
use crate::cookies::persistent_cookie_jar::PersistentCookieJar;
use crate::cookies::store::{CookieStore, CookieStoreHandle, JarId};
use crate::errors::StoreError;

/// On-disk representation of all jars.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CookieStoreFile {
    jars: HashMap<JarId, Vec<Cookie>>,
}

/// A JSON-based cookie store that persists cookies across sessions.
pub struct JsonCookieStore {
    /// Path to the JSON file where cookies are stored.
    path: PathBuf,

    /// Write indented JSON.
    pretty: bool,

    /// Jars handed out so far
    jars: RwLock<HashMap<JarId, CookieJarHandle>>,

    /// Serializes read-modify-write cycles on the file.
    file_lock: Mutex<()>,

    /// Self handle, so `PersistentCookieJar` can call back into this store.
    store_self: Weak<JsonCookieStore>,
}

impl JsonCookieStore {
    /// Creates (or opens) a JSON cookie store at `path`, writing indented JSON.
    ///
    /// If the file does not exist, an empty structure is written to disk.
    pub fn new(path: PathBuf) -> Result<Arc<Self>, StoreError> {
        Self::with_options(path, true)
    }

    pub fn with_options(path: PathBuf, pretty: bool) -> Result<Arc<Self>, StoreError> {
        if !path.exists() {
            log::debug!("Creating cookie store file {}", path.display());
            fs::write(&path, serde_json::to_vec(&CookieStoreFile::default())?)?;
        }

        Ok(Arc::new_cyclic(|store_self| Self {
            path,
            pretty,
            jars: RwLock::new(HashMap::new()),
            file_lock: Mutex::new(()),
            store_self: store_self.clone(),
        }))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and deserializes the full cookie store file.
    fn load_file(&self) -> Result<CookieStoreFile, StoreError> {
        let contents = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Serializes and writes the full cookie store file.
    fn save_file(&self, store_file: &CookieStoreFile) -> Result<(), StoreError> {
        let contents = if self.pretty {
            serde_json::to_string_pretty(store_file)?
        } else {
            serde_json::to_string(store_file)?
        };
        fs::write(&self.path, contents)?;
        Ok(())
    }

    /// Runs `f` on the file contents and writes the result back.
    fn update_file(&self, f: impl FnOnce(&mut CookieStoreFile)) -> Result<(), StoreError> {
        let _guard = self.file_lock.lock().map_err(|_| StoreError::Poisoned)?;
        let mut store_file = self.load_file()?;
        f(&mut store_file);
        self.save_file(&store_file)
    }
}

impl CookieStore for JsonCookieStore {
    /// Returns the cookie jar handle for `jar_id`, creating it if needed.
    ///
    /// A jar not yet cached is loaded from disk (or starts empty) and wrapped
    /// in a [`PersistentCookieJar`] bound to this store.
    fn jar_for(&self, jar_id: JarId) -> Result<CookieJarHandle, StoreError> {
        {
            // Fast path: already in memory
            let jars = self.jars.read().map_err(|_| StoreError::Poisoned)?;
            if let Some(jar) = jars.get(&jar_id) {
                return Ok(jar.clone());
            }
        }

        let mut file = self.load_file()?;
        let inner = file
            .jars
            .remove(&jar_id)
            .map(DefaultCookieJar::from)
            .unwrap_or_default();
        log::debug!("Loaded {} cookie(s) for jar {}", inner.len(), jar_id);

        let store: CookieStoreHandle = self.store_self.upgrade().ok_or(StoreError::Closed)?;
        let persistent: CookieJarHandle =
            Arc::new(RwLock::new(PersistentCookieJar::new(jar_id, inner, &store)));

        // Another caller may have raced us here; keep whichever jar came first
        let mut jars = self.jars.write().map_err(|_| StoreError::Poisoned)?;
        Ok(jars.entry(jar_id).or_insert(persistent).clone())
    }

    fn persist_jar(&self, jar_id: JarId, cookies: &[Cookie]) -> Result<(), StoreError> {
        if !self.jars.read().map_err(|_| StoreError::Poisoned)?.contains_key(&jar_id) {
            // Removed (or never handed out); don't resurrect it in the file
            log::debug!("Not persisting detached jar {}", jar_id);
            return Ok(());
        }

        log::trace!("Persisting {} cookie(s) for jar {}", cookies.len(), jar_id);
        self.update_file(|file| {
            file.jars.insert(jar_id, cookies.to_vec());
        })
    }

    fn remove_jar(&self, jar_id: JarId) -> Result<(), StoreError> {
        self.jars.write().map_err(|_| StoreError::Poisoned)?.remove(&jar_id);
        self.update_file(|file| {
            file.jars.remove(&jar_id);
        })
    }

    fn persist_all(&self) -> Result<(), StoreError> {
        // Snapshot first so no jar lock is held while waiting for the file lock
        let snapshots = {
            let jars = self.jars.read().map_err(|_| StoreError::Poisoned)?;
            let mut snapshots = Vec::with_capacity(jars.len());
            for (jar_id, jar) in jars.iter() {
                let jar = jar.read().map_err(|_| StoreError::Poisoned)?;
                snapshots.push((*jar_id, jar.cookies()));
            }
            snapshots
        };

        self.update_file(|file| file.jars.extend(snapshots))
    }
}
