//! `Set-Cookie` parsing and validation.
//!
//! [`parse`] turns the raw text of one `Set-Cookie` header into a [`Cookie`]
//! whose `domain` and `path` attributes are always resolved. It is a pure
//! function: the request it answers and the current time are passed in.
//!
//! Domain scoping is an exact host match. A `Domain` attribute naming a parent
//! domain of the request host is rejected, not widened.

use time::OffsetDateTime;
use url::Url;

use crate::cookies::cookie::{Attributes, Cookie};
use crate::errors::InvalidCookie;

/// The parts of a request URI the parser needs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestContext {
    /// URI scheme, e.g. `"http"`, `"https"`, `"ftp"`.
    pub scheme: String,
    /// Lowercase request host.
    pub host: String,
    /// Request path, possibly empty.
    pub path: String,
}

impl RequestContext {
    pub fn new(
        scheme: impl Into<String>,
        host: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
            path: path.into(),
        }
    }

    /// Returns `true` for the schemes that count as an HTTP API.
    pub fn is_http(&self) -> bool {
        self.scheme.eq_ignore_ascii_case("http") || self.scheme.eq_ignore_ascii_case("https")
    }
}

impl From<&Url> for RequestContext {
    fn from(url: &Url) -> Self {
        Self {
            scheme: url.scheme().to_string(),
            host: url.host_str().unwrap_or_default().to_string(),
            path: url.path().to_string(),
        }
    }
}

/// Parses `raw` as received in response to the request described by `ctx`.
pub fn parse(
    ctx: &RequestContext,
    raw: &str,
    now: OffsetDateTime,
) -> Result<Cookie, InvalidCookie> {
    let mut segments = raw.split("; ");

    let name_value = segments.next().unwrap_or_default();
    let (name, value) = name_value
        .split_once('=')
        .ok_or(InvalidCookie::IncompleteNameValuePair)?;
    let (name, value) = (name.trim(), value.trim());
    if name.is_empty() {
        return Err(InvalidCookie::EmptyName);
    }

    // Last occurrence of an attribute wins
    let mut attributes = Attributes::new();
    for segment in segments {
        let (key, value) = match segment.split_once('=') {
            Some((key, value)) => (key, Some(value.trim().to_string())),
            None => (segment, None),
        };
        attributes.insert(key.trim().to_lowercase(), value);
    }

    let domain = resolve_domain(ctx, attributes.get("domain"))?;
    attributes.insert("domain".to_string(), Some(domain));

    let path = match attributes.get("path") {
        Some(Some(path)) if path.starts_with('/') => path.clone(),
        _ => default_path(&ctx.path).to_string(),
    };
    attributes.insert("path".to_string(), Some(path));

    if attributes.contains_key("httponly") && !ctx.is_http() {
        return Err(InvalidCookie::HttpOnlyFromNonHttpApi);
    }

    Ok(Cookie::new(name, value, attributes, now))
}

fn resolve_domain(
    ctx: &RequestContext,
    attribute: Option<&Option<String>>,
) -> Result<String, InvalidCookie> {
    let domain = match attribute {
        Some(raw) => {
            let raw = raw.as_deref().unwrap_or_default();
            let domain = raw.strip_prefix('.').unwrap_or(raw).to_lowercase();
            if domain.is_empty() {
                return Err(InvalidCookie::EmptyDomain);
            }
            domain
        }
        None => ctx.host.clone(),
    };

    if domain != ctx.host {
        return Err(InvalidCookie::DomainMismatch);
    }

    Ok(domain)
}

/// Default cookie path for a request path (RFC 6265 §5.1.4).
pub fn default_path(request_path: &str) -> &str {
    if !request_path.starts_with('/') {
        return "/";
    }

    match request_path.rfind('/') {
        Some(0) | None => "/",
        Some(idx) => &request_path[..idx],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2024-03-01 12:00:00 UTC);

    fn ctx() -> RequestContext {
        RequestContext::new("http", "example.com", "/")
    }

    fn attr<'a>(cookie: &'a Cookie, key: &str) -> Option<Option<&'a str>> {
        cookie.attribute(key)
    }

    #[test]
    fn parses_a_set_cookie_header_value() {
        let cookie = parse(&ctx(), "SID=31d4d96e407aad42; Path=/; Secure; HttpOnly", NOW).unwrap();
        assert_eq!(cookie.name(), "SID");
        assert_eq!(cookie.value(), "31d4d96e407aad42");
        assert_eq!(cookie.created_at(), NOW);
        assert_eq!(attr(&cookie, "path"), Some(Some("/")));
        assert_eq!(attr(&cookie, "domain"), Some(Some("example.com")));
        assert_eq!(attr(&cookie, "secure"), Some(None));
        assert_eq!(attr(&cookie, "httponly"), Some(None));
        assert_eq!(cookie.attributes().len(), 4);
    }

    #[test]
    fn rejects_missing_equals_sign() {
        assert_eq!(
            parse(&ctx(), "SID31d4d96e407aad42; Path=/; Secure; HttpOnly", NOW),
            Err(InvalidCookie::IncompleteNameValuePair)
        );
        assert_eq!(parse(&ctx(), "", NOW), Err(InvalidCookie::IncompleteNameValuePair));
    }

    #[test]
    fn rejects_empty_name() {
        assert_eq!(parse(&ctx(), "=31d4d96e407aad42", NOW), Err(InvalidCookie::EmptyName));
        assert_eq!(parse(&ctx(), " \t= bar", NOW), Err(InvalidCookie::EmptyName));
    }

    #[test]
    fn trims_name_and_value() {
        let cookie = parse(&ctx(), " SID\t=\t31d4d96e407aad42 ", NOW).unwrap();
        assert_eq!(cookie.name(), "SID");
        assert_eq!(cookie.value(), "31d4d96e407aad42");
    }

    #[test]
    fn value_may_be_empty_and_contain_equals() {
        let empty = parse(&ctx(), "SID=", NOW).unwrap();
        assert_eq!(empty.value(), "");

        let padded = parse(&ctx(), "token=abc==", NOW).unwrap();
        assert_eq!(padded.value(), "abc==");
    }

    #[test]
    fn trims_and_lowercases_attributes() {
        let cookie = parse(&ctx(), "SID=31d4d96e407aad42; Path\t= /\t; Secure\t", NOW).unwrap();
        assert_eq!(attr(&cookie, "path"), Some(Some("/")));
        assert_eq!(attr(&cookie, "secure"), Some(None));
        assert!(cookie.secure());
    }

    #[test]
    fn last_attribute_wins() {
        let cookie = parse(&ctx(), "lang=en; Max-Age=10; max-age=20; MAX-AGE=30", NOW).unwrap();
        assert_eq!(attr(&cookie, "max-age"), Some(Some("30")));
    }

    #[test]
    fn domain_defaults_to_request_host() {
        let cookie = parse(&ctx(), "lang=en-US", NOW).unwrap();
        assert_eq!(cookie.domain(), Some("example.com"));
    }

    #[test]
    fn domain_is_canonicalized() {
        let cookie = parse(&ctx(), "lang=en-US; Domain=.Example.COM", NOW).unwrap();
        assert_eq!(cookie.domain(), Some("example.com"));
    }

    #[test]
    fn rejects_empty_domain() {
        assert_eq!(parse(&ctx(), "lang=en-US; Domain=", NOW), Err(InvalidCookie::EmptyDomain));
        assert_eq!(parse(&ctx(), "lang=en-US; Domain=.", NOW), Err(InvalidCookie::EmptyDomain));
        assert_eq!(parse(&ctx(), "lang=en-US; Domain", NOW), Err(InvalidCookie::EmptyDomain));
    }

    #[test]
    fn rejects_foreign_and_parent_domains() {
        assert_eq!(
            parse(&ctx(), "lang=en-US; Domain=example.org", NOW),
            Err(InvalidCookie::DomainMismatch)
        );

        let sub = RequestContext::new("https", "www.example.com", "/");
        assert_eq!(
            parse(&sub, "lang=en-US; Domain=example.com", NOW),
            Err(InvalidCookie::DomainMismatch)
        );
    }

    #[test]
    fn path_defaults_from_request_path() {
        let docs = RequestContext::new("http", "example.com", "/docs/web/index.html");
        assert_eq!(parse(&docs, "a=b", NOW).unwrap().path(), Some("/docs/web"));
        assert_eq!(parse(&docs, "a=b; Path=", NOW).unwrap().path(), Some("/docs/web"));
        assert_eq!(parse(&docs, "a=b; Path=relative", NOW).unwrap().path(), Some("/docs/web"));
        assert_eq!(parse(&docs, "a=b; Path", NOW).unwrap().path(), Some("/docs/web"));
        assert_eq!(parse(&docs, "a=b; Path=/x", NOW).unwrap().path(), Some("/x"));
    }

    #[test]
    fn default_path_table() {
        assert_eq!(default_path("/foo/bar/baz/"), "/foo/bar/baz");
        assert_eq!(default_path("/foo/bar/baz"), "/foo/bar");
        assert_eq!(default_path("/foo/"), "/foo");
        assert_eq!(default_path("/foo"), "/");
        assert_eq!(default_path("/"), "/");
        assert_eq!(default_path(""), "/");
        assert_eq!(default_path("foo"), "/");
    }

    #[test]
    fn http_only_requires_http_scheme() {
        let ftp = RequestContext::new("ftp", "example.com", "/");
        assert_eq!(
            parse(&ftp, "lang=en-GB; HttpOnly", NOW),
            Err(InvalidCookie::HttpOnlyFromNonHttpApi)
        );
        assert!(parse(&ftp, "lang=en-GB", NOW).is_ok());

        let upper = RequestContext::new("HTTPS", "example.com", "/");
        assert!(parse(&upper, "lang=en-GB; HttpOnly", NOW).is_ok());
    }

    #[test]
    fn domain_is_checked_before_http_only() {
        let ftp = RequestContext::new("ftp", "example.com", "/");
        assert_eq!(
            parse(&ftp, "lang=en-GB; HttpOnly; Domain=example.org", NOW),
            Err(InvalidCookie::DomainMismatch)
        );
    }

    #[test]
    fn context_from_url() {
        let url = Url::parse("https://Example.com/docs/index.html?q=1").unwrap();
        let ctx = RequestContext::from(&url);
        assert_eq!(ctx, RequestContext::new("https", "example.com", "/docs/index.html"));
        assert!(ctx.is_http());
    }
}
