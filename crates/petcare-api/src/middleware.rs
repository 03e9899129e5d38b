use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use petcare_types::models::User;

use crate::error::AppError;
use crate::flash;
use crate::session;
use crate::state::AppState;

/// Who the request cookie says is calling.
pub enum Session {
    Anonymous,
    /// Valid token for an account that no longer exists.
    Stale,
    Active(User),
}

pub fn resolve_session(jar: &CookieJar, state: &AppState) -> Result<Session, AppError> {
    let Some(login_id) = session::session_login_id(jar, &state.config.session_secret) else {
        return Ok(Session::Anonymous);
    };

    match state.db.get_user(&login_id)? {
        Some(row) => Ok(Session::Active(row.into_user())),
        None => {
            tracing::warn!(%login_id, "Dropping session for unknown user");
            Ok(Session::Stale)
        }
    }
}

/// Optional caller identity, for pages open to everyone.
pub struct MaybeUser {
    pub user: Option<User>,
    /// The session cookie should be cleared on the way out.
    pub stale: bool,
}

impl MaybeUser {
    /// Splits off the user, queueing removal of a stale session cookie.
    pub fn settle(self, jar: CookieJar) -> (CookieJar, Option<User>) {
        if self.stale {
            (jar.remove(session::removal_cookie()), self.user)
        } else {
            (jar, self.user)
        }
    }
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(match resolve_session(&jar, state)? {
            Session::Active(user) => MaybeUser { user: Some(user), stale: false },
            Session::Stale => MaybeUser { user: None, stale: true },
            Session::Anonymous => MaybeUser { user: None, stale: false },
        })
    }
}

/// Logged-in caller. Anonymous requests are redirected to `/login`.
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        match resolve_session(&jar, state).map_err(IntoResponse::into_response)? {
            Session::Active(user) => Ok(CurrentUser(user)),
            Session::Stale => {
                let jar = jar.remove(session::removal_cookie());
                Err(flash::redirect(jar, flash::LOGIN_REQUIRED, "/login").into_response())
            }
            Session::Anonymous => {
                Err(flash::redirect(jar, flash::LOGIN_REQUIRED, "/login").into_response())
            }
        }
    }
}

/// Logged-in caller whose pet profile is filled in. Otherwise the caller is
/// sent to `/profile/edit`.
pub struct ProfiledUser(pub User);

impl FromRequestParts<AppState> for ProfiledUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.profile.is_complete() {
            let jar = CookieJar::from_headers(&parts.headers);
            return Err(
                flash::redirect(jar, flash::PROFILE_REQUIRED, "/profile/edit").into_response()
            );
        }
        Ok(ProfiledUser(user))
    }
}
