pub mod auth;
pub mod board;
pub mod chat;
pub mod config;
pub mod error;
pub mod flash;
pub mod llm;
pub mod middleware;
pub mod pages;
pub mod password;
pub mod profile;
pub mod session;
pub mod state;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::services::ServeDir;

use crate::state::AppState;

/// Largest accepted request body (avatar uploads).
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    let uploads = ServeDir::new(&state.config.upload_dir);

    Router::new()
        .route("/", get(pages::index))
        // Accounts
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", get(auth::logout))
        .route("/check_duplicate", post(auth::check_duplicate))
        .route("/find_id", get(auth::find_id_page).post(auth::find_id))
        .route(
            "/find_password",
            get(auth::find_password_page).post(auth::find_password),
        )
        // Consultation
        .route("/chat", post(chat::chat))
        .route("/services", get(pages::services))
        .route("/health_consult", get(pages::health_consult))
        .route("/emergency", get(pages::emergency))
        .route("/nutrition", get(pages::nutrition))
        // Board
        .route("/board", get(board::board))
        .route("/board/{page}", get(board::board_page))
        .route("/write", get(board::write_page).post(board::write_post))
        .route("/post/{post_id}", get(board::view_post))
        .route("/post/{post_id}/comment", post(board::add_comment))
        .route("/post/{post_id}/delete", post(board::delete_post))
        .route(
            "/post/{post_id}/comment/{comment_id}/delete",
            post(board::delete_comment),
        )
        // Profile
        .route("/profile", get(profile::profile))
        .route(
            "/profile/edit",
            get(profile::edit_page).post(profile::edit_profile),
        )
        .nest_service("/static/uploads", uploads)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
