use std::sync::{Arc, Weak};

use time::OffsetDateTime;

use crate::cookies::cookie::Cookie;
use crate::cookies::cookie_jar::{CookieJar, DefaultCookieJar};
use crate::cookies::parser::RequestContext;
use crate::cookies::store::{CookieStore, CookieStoreHandle, JarId};
use crate::errors::{JarError, StoreError};

/// A `CookieJar` decorator that persists changes after each mutation.
///
/// Reads are served from the wrapped in-memory jar. Writes go to the wrapped
/// jar first and are then pushed to the store; a store failure is returned to
/// the caller while the in-memory state keeps the change.
pub struct PersistentCookieJar {
    /// Id of this jar inside the store.
    jar_id: JarId,
    /// Inner cookie jar that holds the actual cookie state.
    inner: DefaultCookieJar,
    /// The store responsible for persistence. Weak, since the store caches us.
    store: Weak<dyn CookieStore + Send + Sync>,
}

impl PersistentCookieJar {
    /// Wraps `inner` so that its state is written to `store` after each mutation.
    pub fn new(jar_id: JarId, inner: DefaultCookieJar, store: &CookieStoreHandle) -> Self {
        Self {
            jar_id,
            inner,
            store: Arc::downgrade(store),
        }
    }

    pub fn jar_id(&self) -> JarId {
        self.jar_id
    }

    /// Snapshots the inner jar and persists it to the backing store.
    fn persist(&self) -> Result<(), StoreError> {
        let store = self.store.upgrade().ok_or(StoreError::Closed)?;
        store.persist_jar(self.jar_id, &self.inner.cookies())
    }
}

impl CookieJar for PersistentCookieJar {
    /// Stores the cookie, then persists the updated state.
    fn set_cookie(
        &mut self,
        ctx: &RequestContext,
        raw: &str,
        now: OffsetDateTime,
    ) -> Result<(), JarError> {
        self.inner.set_cookie(ctx, raw, now)?;
        self.persist()?;
        Ok(())
    }

    /// Renders the header, persisting only when the sweep dropped cookies.
    fn cookie(&mut self, now: OffsetDateTime) -> Result<String, JarError> {
        let before = self.inner.len();
        let header = self.inner.cookie(now)?;
        if self.inner.len() != before {
            self.persist()?;
        }
        Ok(header)
    }

    fn cookies(&self) -> Vec<Cookie> {
        self.inner.cookies()
    }

    fn remove_cookie(&mut self, name: &str, domain: &str, path: &str) -> Result<(), JarError> {
        self.inner.remove_cookie(name, domain, path)?;
        self.persist()?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), JarError> {
        self.inner.clear()?;
        self.persist()?;
        Ok(())
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}
