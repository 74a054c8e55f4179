use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::cookies::cookie::Cookie;
use crate::cookies::cookie_jar::{CookieJarHandle, DefaultCookieJar};
use crate::cookies::store::{CookieStore, JarId};
use crate::errors::StoreError;

/// Store that keeps jars in memory only. Nothing survives the process.
#[derive(Default)]
pub struct InMemoryCookieStore {
    /// Cookie jars per id
    jars: RwLock<HashMap<JarId, CookieJarHandle>>,
}

impl InMemoryCookieStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CookieStore for InMemoryCookieStore {
    fn jar_for(&self, jar_id: JarId) -> Result<CookieJarHandle, StoreError> {
        let mut jars = self.jars.write().map_err(|_| StoreError::Poisoned)?;
        let handle = match jars.entry(jar_id) {
            Entry::Occupied(o) => o.get().clone(),
            Entry::Vacant(v) => v.insert(DefaultCookieJar::new().into()).clone(),
        };
        Ok(handle)
    }

    fn persist_jar(&self, _jar_id: JarId, _cookies: &[Cookie]) -> Result<(), StoreError> {
        Ok(())
    }

    fn remove_jar(&self, jar_id: JarId) -> Result<(), StoreError> {
        self.jars.write().map_err(|_| StoreError::Poisoned)?.remove(&jar_id);
        Ok(())
    }

    fn persist_all(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookies::RequestContext;
    use std::sync::Arc;
    use time::OffsetDateTime;

    #[test]
    fn same_jar_returns_same_handle() {
        let store = InMemoryCookieStore::new();
        let id = JarId::new();

        let a = store.jar_for(id).unwrap();
        let b = store.jar_for(id).unwrap();

        // Same Arc target
        assert!(Arc::ptr_eq(&a, &b));

        // A cookie written through one handle is visible through the other
        let now = OffsetDateTime::now_utc();
        let ctx = RequestContext::new("https", "example.com", "/");
        a.write().unwrap().set_cookie(&ctx, "SID=1", now).unwrap();
        assert_eq!(b.write().unwrap().cookie(now).unwrap(), "SID=1");
    }

    #[test]
    fn different_ids_get_different_handles() {
        let store = InMemoryCookieStore::new();

        let a = store.jar_for(JarId::new()).unwrap();
        let b = store.jar_for(JarId::new()).unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn remove_jar_drops_only_that_jar() {
        let store = InMemoryCookieStore::new();
        let id1 = JarId::new();
        let id2 = JarId::new();

        let a = store.jar_for(id1).unwrap();
        let b = store.jar_for(id2).unwrap();

        store.remove_jar(id1).unwrap();
        store.remove_jar(id1).unwrap();

        // id1 gets a fresh jar now, id2 keeps its own
        assert!(!Arc::ptr_eq(&a, &store.jar_for(id1).unwrap()));
        assert!(Arc::ptr_eq(&b, &store.jar_for(id2).unwrap()));
    }
}
