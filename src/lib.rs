//! Client-side HTTP cookie handling.
//!
//! [`cookies::parse`] validates one `Set-Cookie` header value against the
//! request it answers. A [`cookies::CookieJar`] keeps the resulting cookies
//! for one agent, replaces and expires them, and renders the `Cookie` header
//! for the next request. Time is always passed in by the caller.
//!
//! ```
//! use gosub_cookie_jar::cookies::{CookieJar, DefaultCookieJar, RequestContext};
//! use time::OffsetDateTime;
//!
//! let now = OffsetDateTime::now_utc();
//! let ctx = RequestContext::new("https", "example.com", "/");
//!
//! let mut jar = DefaultCookieJar::new();
//! jar.set_cookie(&ctx, "SID=31d4d96e407aad42; Path=/; Secure; HttpOnly", now).unwrap();
//! jar.set_cookie(&ctx, "lang=en-US; Path=/; Domain=example.com", now).unwrap();
//!
//! assert_eq!(jar.cookie(now).unwrap(), "SID=31d4d96e407aad42; lang=en-US");
//! ```

pub mod config;
pub mod cookies;
pub mod errors;

pub use config::{CookieStoreBackend, CookieStoreConfig};
pub use errors::{InvalidCookie, JarError, StoreError};
