//! One-shot status notifications carried in a cookie, read and cleared by
//! the next page render.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

const FLASH_COOKIE: &str = "flash";

pub fn set(jar: CookieJar, message: &str) -> CookieJar {
    let cookie = Cookie::build((FLASH_COOKIE, message.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

/// Takes the pending message, if any, and returns a jar with it cleared.
pub fn take(jar: CookieJar) -> (CookieJar, Option<String>) {
    match jar.get(FLASH_COOKIE).map(|c| c.value().to_string()) {
        Some(message) => {
            let removal = Cookie::build((FLASH_COOKIE, ""))
                .path("/")
                .max_age(time::Duration::ZERO)
                .build();
            (jar.add(removal), Some(message))
        }
        None => (jar, None),
    }
}
