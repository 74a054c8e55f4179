//! Cookie jar abstraction and the in-memory implementation.
//!
//! A **cookie jar** holds the cookies of one agent (a client or a session). The
//! caller hands it every `Set-Cookie` header it receives and asks it for the
//! `Cookie` header of each outgoing request.
//!
//! This module defines the [`CookieJar`] trait and [`DefaultCookieJar`], an
//! ordered in-memory list with these rules:
//!
//! - at most one cookie per `(name, domain, path)` slot;
//! - a new cookie for an occupied slot replaces the old one, keeps its creation
//!   time and moves to the end of the list;
//! - a cookie that is already expired when set deletes its slot instead;
//! - rendering first drops every expired cookie.
//!
//! Rejected `Set-Cookie` strings are ignored without an error.
//!
//! ## Notes & limitations
//! - The jar is **not** internally synchronized. Share it through a
//!   [`CookieJarHandle`]; both [`CookieJar::set_cookie`] and
//!   [`CookieJar::cookie`] mutate, so both need the write lock.
//! - The rendered header is not filtered by request URL: every live cookie of
//!   the jar is sent.
use std::sync::{Arc, RwLock};

use http::header::{HeaderMap, HeaderValue, SET_COOKIE};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use url::Url;

use crate::cookies::cookie::Cookie;
use crate::cookies::parser::{parse, RequestContext};
use crate::errors::{InvalidCookie, JarError};

/// A handle to a cookie jar.
///
/// Reference-counted and write-locked around every call.
///
/// ### Example
/// ```ignore
/// let jar: CookieJarHandle = DefaultCookieJar::new().into();
/// let header = jar.write().unwrap().cookie(now)?;
/// ```
pub type CookieJarHandle = Arc<RwLock<dyn CookieJar + Send + Sync>>;

/// A cookie jar keeps the cookies for one single agent.
pub trait CookieJar: Send + Sync {
    /// Parses `raw` for the request `ctx` and stores the result.
    ///
    /// An invalid `raw` string leaves the jar untouched and is not an error.
    /// Errors only come from the jar's backing storage.
    fn set_cookie(
        &mut self,
        ctx: &RequestContext,
        raw: &str,
        now: OffsetDateTime,
    ) -> Result<(), JarError>;

    /// Drops expired cookies and renders the rest as a `Cookie` header value.
    ///
    /// Returns an empty string when nothing is left.
    fn cookie(&mut self, now: OffsetDateTime) -> Result<String, JarError>;

    /// Returns the stored cookies, oldest first. Expired ones may be included
    /// until the next [`CookieJar::cookie`] call.
    fn cookies(&self) -> Vec<Cookie>;

    /// Removes the cookie occupying the `(name, domain, path)` slot, if any.
    fn remove_cookie(&mut self, name: &str, domain: &str, path: &str) -> Result<(), JarError>;

    /// Removes all cookies from the jar.
    fn clear(&mut self) -> Result<(), JarError>;

    fn len(&self) -> usize {
        self.cookies().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stores every `Set-Cookie` header of a response to `url`.
    fn store_response_cookies(
        &mut self,
        url: &Url,
        headers: &HeaderMap,
        now: OffsetDateTime,
    ) -> Result<(), JarError> {
        let ctx = RequestContext::from(url);
        for header in headers.get_all(SET_COOKIE) {
            match header.to_str() {
                Ok(raw) => self.set_cookie(&ctx, raw, now)?,
                Err(_) => {
                    log::debug!("Skipping non-visible-ASCII Set-Cookie header from {}", ctx.host)
                }
            }
        }
        Ok(())
    }

    /// Returns the `Cookie` request header, or `None` when the jar is empty.
    fn request_header(&mut self, now: OffsetDateTime) -> Result<Option<HeaderValue>, JarError> {
        let header = self.cookie(now)?;
        if header.is_empty() {
            return Ok(None);
        }
        Ok(Some(HeaderValue::from_str(&header)?))
    }
}

/// Default cookie jar, in memory only.
///
/// Cookies are kept in the order they were last set; that order is the order
/// of the rendered header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefaultCookieJar {
    entries: Vec<Cookie>,
}

impl DefaultCookieJar {
    /// Creates an empty in-memory cookie jar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an already parsed cookie.
    pub fn insert(&mut self, cookie: Cookie, now: OffsetDateTime) {
        let replacement = match self.entries.iter().position(|c| c.matches(&cookie)) {
            Some(idx) => self.entries.remove(idx).replace(cookie),
            None => cookie,
        };

        if replacement.expired(now) {
            log::trace!(
                "Dropping expired cookie {} for {:?}",
                replacement.name(),
                replacement.domain()
            );
            return;
        }

        self.entries.push(replacement);
    }

    /// A non-HTTP API may not overwrite an HttpOnly cookie (RFC 6265 §5.3 step 11).
    fn check_overwrite(
        &self,
        ctx: &RequestContext,
        cookie: Cookie,
    ) -> Result<Cookie, InvalidCookie> {
        let protected = self.entries.iter().any(|c| c.matches(&cookie) && c.http_only());
        if protected && !ctx.is_http() {
            return Err(InvalidCookie::HttpOnlyFromNonHttpApi);
        }
        Ok(cookie)
    }

    /// Drops every cookie expired at `now`.
    pub fn sweep(&mut self, now: OffsetDateTime) {
        let before = self.entries.len();
        self.entries.retain(|c| !c.expired(now));
        let swept = before - self.entries.len();
        if swept > 0 {
            log::trace!("Swept {} expired cookie(s)", swept);
        }
    }

    /// Renders the stored cookies without sweeping.
    pub fn render(&self) -> String {
        self.entries.iter().map(Cookie::to_string).collect::<Vec<_>>().join("; ")
    }
}

impl From<Vec<Cookie>> for DefaultCookieJar {
    fn from(entries: Vec<Cookie>) -> Self {
        // Restored lists may come from anywhere; keep the last cookie of each slot.
        let mut jar = Self::new();
        for cookie in entries {
            jar.entries.retain(|c| !c.matches(&cookie));
            jar.entries.push(cookie);
        }
        jar
    }
}

impl From<DefaultCookieJar> for CookieJarHandle {
    fn from(jar: DefaultCookieJar) -> Self {
        Arc::new(RwLock::new(jar))
    }
}

impl CookieJar for DefaultCookieJar {
    fn set_cookie(
        &mut self,
        ctx: &RequestContext,
        raw: &str,
        now: OffsetDateTime,
    ) -> Result<(), JarError> {
        match parse(ctx, raw, now).and_then(|cookie| self.check_overwrite(ctx, cookie)) {
            Ok(cookie) => self.insert(cookie, now),
            Err(err) => log::debug!("Ignoring Set-Cookie from {}: {}", ctx.host, err),
        }
        Ok(())
    }

    fn cookie(&mut self, now: OffsetDateTime) -> Result<String, JarError> {
        self.sweep(now);
        Ok(self.render())
    }

    fn cookies(&self) -> Vec<Cookie> {
        self.entries.clone()
    }

    fn remove_cookie(&mut self, name: &str, domain: &str, path: &str) -> Result<(), JarError> {
        self.entries.retain(|c| {
            !(c.name() == name && c.domain() == Some(domain) && c.path() == Some(path))
        });
        Ok(())
    }

    fn clear(&mut self) -> Result<(), JarError> {
        self.entries.clear();
        Ok(())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
