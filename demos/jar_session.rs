//! Walks one agent through a short cookie exchange.
//!
//! ```text
//! RUST_LOG=debug cargo run --example jar_session [cookies.json]
//! ```
//!
//! With a path argument the jar is kept in that JSON file and survives reruns.
use gosub_cookie_jar::cookies::{CookieJar, JarId};
use gosub_cookie_jar::CookieStoreConfig;
use http::header::{HeaderMap, HeaderValue, COOKIE, SET_COOKIE};
use time::{Duration, OffsetDateTime};
use url::Url;

fn response(set_cookies: &[&'static str]) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for &raw in set_cookies {
        headers.append(SET_COOKIE, HeaderValue::from_static(raw));
    }
    headers
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => CookieStoreConfig::json(path),
        None => CookieStoreConfig::default(),
    };
    let store = config.open()?;

    // A fixed id so a JSON-backed jar is found again on the next run
    let jar_id: JarId = "6f1c2d4e-8a3b-4c5d-9e7f-0a1b2c3d4e5f".parse()?;
    let jar = store.jar_for(jar_id)?;
    let mut jar = jar.write().map_err(|_| anyhow::anyhow!("cookie jar lock poisoned"))?;

    let now = OffsetDateTime::now_utc();
    let login = Url::parse("https://example.com/account/login")?;

    jar.store_response_cookies(
        &login,
        &response(&[
            "SID=31d4d96e407aad42; Path=/; Secure; HttpOnly",
            "lang=en-US; Path=/; Domain=example.com",
            "banner=seen; Max-Age=30",
            "tracker=1; Domain=ads.example.net",
        ]),
        now,
    )?;

    let mut request = HeaderMap::new();
    if let Some(value) = jar.request_header(now)? {
        request.insert(COOKIE, value);
    }
    println!("after login:      {:?}", request.get(COOKIE));

    let lang_swap = response(&["lang=en-GB; Path=/; Domain=example.com"]);
    jar.store_response_cookies(&login, &lang_swap, now)?;
    println!("after lang swap:  {}", jar.cookie(now)?);

    let later = now + Duration::minutes(5);
    println!("five minutes on:  {}", jar.cookie(later)?);

    let logout = response(&["SID=; Path=/; Expires=Thu, 01 Jan 1970 00:00:01 GMT"]);
    jar.store_response_cookies(&login, &logout, later)?;
    println!("after logout:     {}", jar.cookie(later)?);

    for cookie in jar.cookies() {
        println!("  {} (created {})", cookie, cookie.created_at());
    }

    // persist_all takes every jar's lock
    drop(jar);
    store.persist_all()?;
    Ok(())
}
