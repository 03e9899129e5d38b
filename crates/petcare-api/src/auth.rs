use axum::Json;
use axum::extract::{Form, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use tracing::{info, warn};

use petcare_db::models::UserInsert;
use petcare_types::api::{
    DuplicateCheckForm, DuplicateCheckResponse, FindIdForm, FindIdPage, FindPasswordForm,
    FindPasswordPage, LoginForm, RegisterForm, StaticPage,
};

use crate::error::AppError;
use crate::flash;
use crate::middleware::MaybeUser;
use crate::pages::render;
use crate::password::{hash_password, temporary_password, verify_password};
use crate::session;
use crate::state::AppState;

const MIN_PASSWORD_CHARS: usize = 8;

const LOGIN_OK: &str = "로그인되었습니다.";
const LOGIN_FAILED: &str = "아이디 또는 비밀번호가 올바르지 않습니다.";
const LOGIN_ID_EXISTS: &str = "이미 존재하는 아이디입니다.";
const NICKNAME_EXISTS: &str = "이미 존재하는 닉네임입니다.";
const PASSWORD_MISMATCH: &str = "비밀번호가 일치하지 않습니다.";
const PASSWORD_TOO_SHORT: &str = "비밀번호는 8자 이상이어야 합니다.";
const REGISTERED: &str = "회원가입이 완료되었습니다. 프로필을 설정해주세요.";
const LOGGED_OUT: &str = "로그아웃되었습니다.";
const LOGIN_ID_IN_USE: &str = "이미 사용 중인 아이디입니다.";
const NICKNAME_IN_USE: &str = "이미 사용 중인 닉네임입니다.";
const NO_ID_FOR_NICKNAME: &str = "해당 닉네임으로 등록된 아이디가 없습니다.";
const NO_MATCHING_ACCOUNT: &str = "입력하신 정보와 일치하는 계정이 없습니다.";

fn start_session(
    jar: CookieJar,
    state: &AppState,
    login_id: &str,
    days: i64,
) -> Result<CookieJar, AppError> {
    let token = session::create_token(&state.config.session_secret, login_id, days)?;
    Ok(jar.add(session::session_cookie(token, days)))
}

pub async fn login_page(jar: CookieJar, viewer: MaybeUser) -> impl IntoResponse {
    let (jar, user) = viewer.settle(jar);
    render(jar, user, StaticPage { page: "login" })
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    let verified = match state.db.get_user(&form.user_id)? {
        Some(row) => verify_password(&row.password, &form.password)?,
        None => false,
    };

    if !verified {
        warn!(login_id = %form.user_id, "Login failed");
        return Ok(flash::redirect(jar, LOGIN_FAILED, "/login"));
    }

    let days = if form.remember.is_some() {
        state.config.remember_days
    } else {
        state.config.session_days
    };
    let jar = start_session(jar, &state, &form.user_id, days)?;
    info!(login_id = %form.user_id, days, "User logged in");

    Ok(flash::redirect(jar, LOGIN_OK, "/"))
}

pub async fn register_page(jar: CookieJar, viewer: MaybeUser) -> impl IntoResponse {
    let (jar, user) = viewer.settle(jar);
    render(jar, user, StaticPage { page: "register" })
}

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    if state.db.login_id_exists(&form.user_id)? {
        return Ok(flash::redirect(jar, LOGIN_ID_EXISTS, "/register"));
    }
    if state.db.nickname_exists(&form.nickname)? {
        return Ok(flash::redirect(jar, NICKNAME_EXISTS, "/register"));
    }
    if form.password != form.password_confirm {
        return Ok(flash::redirect(jar, PASSWORD_MISMATCH, "/register"));
    }
    if form.password.chars().count() < MIN_PASSWORD_CHARS {
        return Ok(flash::redirect(jar, PASSWORD_TOO_SHORT, "/register"));
    }

    let password_hash = hash_password(&form.password)?;

    // The insert re-checks both keys, a concurrent signup may have won
    match state
        .db
        .create_user(&form.user_id, &password_hash, &form.nickname, Utc::now())?
    {
        UserInsert::Created => {}
        UserInsert::LoginIdTaken => return Ok(flash::redirect(jar, LOGIN_ID_EXISTS, "/register")),
        UserInsert::NicknameTaken => return Ok(flash::redirect(jar, NICKNAME_EXISTS, "/register")),
    }

    info!(login_id = %form.user_id, nickname = %form.nickname, "User registered");

    let jar = start_session(jar, &state, &form.user_id, state.config.session_days)?;
    Ok(flash::redirect(jar, REGISTERED, "/profile/edit"))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    let jar = jar.remove(session::removal_cookie());
    flash::redirect(jar, LOGGED_OUT, "/")
}

pub async fn check_duplicate(
    State(state): State<AppState>,
    Form(form): Form<DuplicateCheckForm>,
) -> Result<Json<DuplicateCheckResponse>, AppError> {
    let user_id = form.user_id.filter(|v| !v.is_empty());
    let nickname = form.nickname.filter(|v| !v.is_empty());

    let taken = if let Some(user_id) = user_id {
        state.db.login_id_exists(&user_id)?.then_some(LOGIN_ID_IN_USE)
    } else if let Some(nickname) = nickname {
        state.db.nickname_exists(&nickname)?.then_some(NICKNAME_IN_USE)
    } else {
        None
    };

    Ok(Json(DuplicateCheckResponse {
        exists: taken.is_some(),
        message: taken.map(str::to_string),
    }))
}

pub async fn find_id_page(jar: CookieJar, viewer: MaybeUser) -> impl IntoResponse {
    let (jar, user) = viewer.settle(jar);
    render(jar, user, FindIdPage { found_users: Vec::new() })
}

pub async fn find_id(
    State(state): State<AppState>,
    jar: CookieJar,
    viewer: MaybeUser,
    Form(form): Form<FindIdForm>,
) -> Result<Response, AppError> {
    let (mut jar, user) = viewer.settle(jar);
    let found_users = state.db.find_login_ids_by_nickname(&form.nickname)?;
    if found_users.is_empty() {
        jar = flash::push(jar, NO_ID_FOR_NICKNAME);
    }
    Ok(render(jar, user, FindIdPage { found_users }).into_response())
}

pub async fn find_password_page(jar: CookieJar, viewer: MaybeUser) -> impl IntoResponse {
    let (jar, user) = viewer.settle(jar);
    render(jar, user, FindPasswordPage { temp_password: None })
}

pub async fn find_password(
    State(state): State<AppState>,
    jar: CookieJar,
    viewer: MaybeUser,
    Form(form): Form<FindPasswordForm>,
) -> Result<Response, AppError> {
    let (jar, user) = viewer.settle(jar);

    let matches = state
        .db
        .get_user(&form.user_id)?
        .is_some_and(|row| row.nickname == form.nickname);
    if !matches {
        let jar = flash::push(jar, NO_MATCHING_ACCOUNT);
        return Ok(render(jar, user, FindPasswordPage { temp_password: None }).into_response());
    }

    let temp_password = temporary_password();
    state
        .db
        .update_password(&form.user_id, &hash_password(&temp_password)?)?;
    info!(login_id = %form.user_id, "Issued temporary password");

    Ok(render(
        jar,
        user,
        FindPasswordPage {
            temp_password: Some(temp_password),
        },
    )
    .into_response())
}
