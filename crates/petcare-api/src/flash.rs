//! One-shot user-facing messages carried across a redirect in a cookie.
//! The cookie holds base64-encoded JSON so non-ASCII text survives.

use axum::response::Redirect;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

pub const FLASH_COOKIE: &str = "petcare_flash";

pub const LOGIN_REQUIRED: &str = "로그인이 필요한 서비스입니다.";
pub const PROFILE_REQUIRED: &str = "서비스 이용을 위해 프로필을 완성해주세요.";

/// Messages currently queued in the jar.
pub fn peek(jar: &CookieJar) -> Vec<String> {
    jar.get(FLASH_COOKIE)
        .and_then(|c| URL_SAFE_NO_PAD.decode(c.value()).ok())
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_default()
}

pub fn push(jar: CookieJar, message: impl Into<String>) -> CookieJar {
    let mut messages = peek(&jar);
    messages.push(message.into());

    let encoded = match serde_json::to_vec(&messages) {
        Ok(json) => URL_SAFE_NO_PAD.encode(json),
        Err(e) => {
            tracing::error!("Failed to encode flash messages: {e}");
            return jar;
        }
    };

    jar.add(
        Cookie::build((FLASH_COOKIE, encoded))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build(),
    )
}

/// Drains the queue. The returned jar clears the cookie when sent.
pub fn take(jar: CookieJar) -> (CookieJar, Vec<String>) {
    let messages = peek(&jar);
    if jar.get(FLASH_COOKIE).is_none() {
        return (jar, messages);
    }
    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), messages)
}

/// Queue `message` and redirect to `to` (303).
pub fn redirect(jar: CookieJar, message: impl Into<String>, to: &str) -> (CookieJar, Redirect) {
    (push(jar, message), Redirect::to(to))
}
