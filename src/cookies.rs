//! Cookies: [`parse`], [`Cookie`], [`CookieJar`], [`CookieStore`] and backends.

mod cookie;
mod cookie_jar;
mod parser;
mod persistent_cookie_jar;
mod store;

pub use cookie::parse_http_date;
pub use cookie::Attributes;
pub use cookie::Cookie;

pub use parser::default_path;
pub use parser::parse;
pub use parser::RequestContext;

pub use cookie_jar::CookieJar;
pub use cookie_jar::CookieJarHandle;
pub use cookie_jar::DefaultCookieJar;
pub use persistent_cookie_jar::PersistentCookieJar;

pub use store::CookieStore;
pub use store::CookieStoreHandle;
pub use store::InMemoryCookieStore;
pub use store::JarId;
pub use store::JsonCookieStore;
