//! The [`Cookie`] value object.
//!
//! A cookie is created once (by the parser, by [`Cookie::replace`], or when
//! restored from a store) and never mutated afterwards. Two relations are
//! defined over it and they are deliberately different:
//!
//! - **structural equality** (`==`, `Hash`) compares name, value and
//!   attributes, ignoring the creation time;
//! - **slot identity** ([`Cookie::matches`]) compares name, domain and path
//!   only, and is what a jar uses to decide that a new cookie supersedes an
//!   old one.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{Duration, OffsetDateTime, PrimitiveDateTime};

/// Attribute map of a cookie: lowercase attribute name to optional value.
///
/// Flags such as `secure` and `httponly` are stored with a `None` value.
pub type Attributes = BTreeMap<String, Option<String>>;

/// A parsed and validated cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name (case-sensitive, never empty).
    name: String,

    /// Raw cookie value, possibly empty.
    value: String,

    /// Canonical attributes. Contains `domain` and `path` for parsed cookies.
    attributes: Attributes,

    /// Moment the slot was first filled. Survives [`Cookie::replace`].
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

impl Cookie {
    /// Creates a cookie from already canonical parts.
    ///
    /// No validation happens here; use [`parse`](crate::cookies::parse) for
    /// untrusted `Set-Cookie` text.
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        attributes: Attributes,
        created_at: OffsetDateTime,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            attributes,
            created_at,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    /// Returns the value of attribute `key`.
    ///
    /// The outer `Option` tells whether the attribute is present, the inner one
    /// whether it carries a value.
    pub fn attribute(&self, key: &str) -> Option<Option<&str>> {
        self.attributes.get(key).map(|v| v.as_deref())
    }

    pub fn domain(&self) -> Option<&str> {
        self.attribute("domain").flatten()
    }

    pub fn path(&self) -> Option<&str> {
        self.attribute("path").flatten()
    }

    pub fn secure(&self) -> bool {
        self.attributes.contains_key("secure")
    }

    pub fn http_only(&self) -> bool {
        self.attributes.contains_key("httponly")
    }

    /// Returns `true` when the cookie is expired at `now`.
    ///
    /// A numeric `Max-Age` wins over `Expires`. A `Max-Age` that is not an
    /// integer is ignored, and so is an `Expires` that is not an HTTP-date.
    /// Without either attribute the cookie never expires.
    pub fn expired(&self, now: OffsetDateTime) -> bool {
        if let Some(max_age) = self.max_age() {
            return match max_age {
                MaxAge::Seconds(secs) if secs <= 0 => true,
                MaxAge::Seconds(secs) => {
                    match self.created_at.checked_add(Duration::seconds(secs)) {
                        Some(expiry) => expiry < now,
                        None => false,
                    }
                }
                MaxAge::Forever => false,
                MaxAge::Never => true,
            };
        }

        match self.expires_at() {
            Some(expiry) => expiry < now,
            None => false,
        }
    }

    /// Slot identity: same name, domain and path.
    pub fn matches(&self, other: &Cookie) -> bool {
        self.name == other.name && self.domain() == other.domain() && self.path() == other.path()
    }

    /// Returns `newer` carrying this cookie's creation time.
    pub fn replace(&self, newer: Cookie) -> Cookie {
        Cookie {
            created_at: self.created_at,
            ..newer
        }
    }

    fn max_age(&self) -> Option<MaxAge> {
        let raw = self.attribute("max-age").flatten()?;
        let digits = raw.strip_prefix('-').unwrap_or(raw);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        Some(match raw.parse::<i64>() {
            Ok(secs) => MaxAge::Seconds(secs),
            // Only overflow is left at this point
            Err(_) if raw.starts_with('-') => MaxAge::Never,
            Err(_) => MaxAge::Forever,
        })
    }

    fn expires_at(&self) -> Option<OffsetDateTime> {
        let raw = self.attribute("expires").flatten()?;
        parse_http_date(raw)
    }
}

/// Numeric `Max-Age`, saturated when it does not fit an `i64`.
enum MaxAge {
    Seconds(i64),
    Forever,
    Never,
}

/// Parses an HTTP-date (IMF-fixdate, RFC 850 or asctime).
///
/// Dates before 1970 are accepted in the IMF-fixdate and asctime forms, so
/// `Expires=Mon, 01 Jan 0001 00:00:00 GMT` deletes a cookie as intended.
pub fn parse_http_date(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(date) = httpdate::parse_http_date(raw) {
        return Some(OffsetDateTime::from(date));
    }

    // httpdate stops at the unix epoch. The day name is skipped, as in RFC 6265 §5.1.1.
    let imf_fixdate = format_description!(
        "[ignore count:3], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
    );
    let asctime = format_description!(
        "[ignore count:3] [month repr:short] [day padding:space] [hour]:[minute]:[second] [year]"
    );
    match PrimitiveDateTime::parse(raw, &imf_fixdate)
        .or_else(|_| PrimitiveDateTime::parse(raw, &asctime))
    {
        Ok(date) => Some(date.assume_utc()),
        Err(_) => {
            log::trace!("Ignoring unparseable cookie date {:?}", raw);
            None
        }
    }
}

impl PartialEq for Cookie {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.value == other.value && self.attributes == other.attributes
    }
}

impl Eq for Cookie {}

impl Hash for Cookie {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.value.hash(state);
        self.attributes.hash(state);
    }
}

/// Renders the `name=value` pair used in a `Cookie` request header.
impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}
