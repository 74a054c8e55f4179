/// Reasons a `Set-Cookie` string is ignored.
///
/// Produced only by the parser. A jar treats every variant as "this header was
/// never seen" and leaves its state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum InvalidCookie {
    #[error("incomplete name-value pair")]
    IncompleteNameValuePair,

    #[error("name string is empty")]
    EmptyName,

    #[error("domain attribute is empty")]
    EmptyDomain,

    #[error("domain does not match request host")]
    DomainMismatch,

    #[error("HttpOnly cookie set from a non-HTTP API")]
    HttpOnlyFromNonHttpApi,
}

/// Failures of a cookie store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cookie store lock is poisoned")]
    Poisoned,

    #[error("Cookie store has been dropped")]
    Closed,
}

/// Failures surfaced by a [`CookieJar`](crate::cookies::CookieJar).
///
/// Rejected `Set-Cookie` strings are never reported here.
#[derive(Debug, thiserror::Error)]
pub enum JarError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] http::header::InvalidHeaderValue),
}
