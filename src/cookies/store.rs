//! Cookie store infrastructure.
//!
//! A **cookie store** provisions cookie jars and keeps them across process
//! lifetimes. Each jar is addressed by a [`JarId`], typically one per agent or
//! login session.
//!
//! This module exports two implementations:
//! - [`InMemoryCookieStore`]: hands out plain [`DefaultCookieJar`]s and forgets
//!   them on drop (tests, private sessions).
//! - [`JsonCookieStore`]: one JSON file for all jars. Jars it returns are
//!   [`PersistentCookieJar`](crate::cookies::PersistentCookieJar)s that write
//!   themselves back after every mutation.
//!
//! ## Design notes
//! - `CookieStore::jar_for(id)` returns the *same logical jar instance* for an
//!   id for the lifetime of the store, so every handle observes one state.
//! - Stores are `Send + Sync` and synchronize internally.
//!
//! ## Example
//! ```rust,no_run
//! use gosub_cookie_jar::cookies::{CookieStore, JarId, JsonCookieStore, RequestContext};
//! use time::OffsetDateTime;
//!
//! let store = JsonCookieStore::new("cookies.json".into()).unwrap();
//! let jar = store.jar_for(JarId::new()).unwrap();
//!
//! let ctx = RequestContext::new("https", "example.com", "/");
//! let now = OffsetDateTime::now_utc();
//! jar.write().unwrap().set_cookie(&ctx, "SID=31d4d96e407aad42", now).unwrap();
//! ```
mod in_memory;
mod json;

use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cookies::cookie::Cookie;
use crate::cookies::cookie_jar::CookieJarHandle;
use crate::errors::StoreError;

pub use in_memory::InMemoryCookieStore;
pub use json::JsonCookieStore;

/// A handle to a cookie store.
///
/// Store implementations synchronize internally since callers only hold
/// `&self`.
pub type CookieStoreHandle = Arc<dyn CookieStore + Send + Sync>;

/// Identifies one jar inside a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JarId(Uuid);

impl JarId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JarId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for JarId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl FromStr for JarId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Display for JarId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A cookie **store** mints cookie **jars** and (optionally) persists them.
pub trait CookieStore: Send + Sync {
    /// Returns (or creates and returns) the cookie jar handle for `jar_id`.
    ///
    /// Must return the same logical jar for the same id across calls. A store
    /// may create the jar lazily on first request.
    fn jar_for(&self, jar_id: JarId) -> Result<CookieJarHandle, StoreError>;

    /// Writes the given cookie list as the state of `jar_id`.
    ///
    /// Only jars this store currently hands out are written; for any other
    /// id this is a no-op.
    fn persist_jar(&self, jar_id: JarId, cookies: &[Cookie]) -> Result<(), StoreError>;

    /// Removes all data for `jar_id`. Idempotent.
    ///
    /// A later [`CookieStore::jar_for`] call returns a fresh, empty jar. Handles
    /// obtained before the removal are detached: they keep working in memory
    /// but no longer write to the store, until `jar_for` hands out the id again.
    fn remove_jar(&self, jar_id: JarId) -> Result<(), StoreError>;

    /// Persists every jar this store has handed out.
    fn persist_all(&self) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jar_id_round_trips_through_string() {
        let id = JarId::new();
        let parsed: JarId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<JarId>().is_err());
    }

    #[test]
    fn jar_ids_are_unique() {
        assert_ne!(JarId::new(), JarId::new());
    }
}
