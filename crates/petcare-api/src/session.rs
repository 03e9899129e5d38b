use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

pub const SESSION_COOKIE: &str = "petcare_session";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Login id of the session owner.
    pub sub: String,
    pub exp: usize,
}

pub fn create_token(
    secret: &str,
    login_id: &str,
    days: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: login_id.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(days)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn verify_token(secret: &str, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// Session cookie whose max-age matches the token lifetime.
pub fn session_cookie(token: String, days: i64) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(days))
        .build()
}

pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

/// Login id carried by a valid session cookie. Expired or tampered
/// tokens count as no session.
pub fn session_login_id(jar: &CookieJar, secret: &str) -> Option<String> {
    let token = jar.get(SESSION_COOKIE)?;
    match verify_token(secret, token.value()) {
        Ok(claims) => Some(claims.sub),
        Err(e) => {
            tracing::debug!("Ignoring invalid session token: {e}");
            None
        }
    }
}
