use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use petcare_types::api::{PageView, StaticPage};
use petcare_types::models::User;
use serde::Serialize;

use crate::middleware::{MaybeUser, ProfiledUser};

/// Page view with pending flash messages drained into it.
pub fn render<T: Serialize>(
    jar: CookieJar,
    user: Option<User>,
    page: T,
) -> (CookieJar, Json<PageView<T>>) {
    let (jar, flash) = crate::flash::take(jar);
    (jar, Json(PageView { flash, user, page }))
}

pub async fn index(jar: CookieJar, viewer: MaybeUser) -> (CookieJar, Json<PageView<StaticPage>>) {
    let (jar, user) = viewer.settle(jar);
    render(jar, user, StaticPage { page: "index" })
}

pub async fn services(
    jar: CookieJar,
    ProfiledUser(user): ProfiledUser,
) -> (CookieJar, Json<PageView<StaticPage>>) {
    render(jar, Some(user), StaticPage { page: "services" })
}

pub async fn health_consult(
    jar: CookieJar,
    ProfiledUser(user): ProfiledUser,
) -> (CookieJar, Json<PageView<StaticPage>>) {
    render(jar, Some(user), StaticPage { page: "health_consult" })
}

pub async fn emergency(
    jar: CookieJar,
    ProfiledUser(user): ProfiledUser,
) -> (CookieJar, Json<PageView<StaticPage>>) {
    render(jar, Some(user), StaticPage { page: "emergency" })
}

pub async fn nutrition(
    jar: CookieJar,
    ProfiledUser(user): ProfiledUser,
) -> (CookieJar, Json<PageView<StaticPage>>) {
    render(jar, Some(user), StaticPage { page: "nutrition" })
}
