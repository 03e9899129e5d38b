use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Form, Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use tracing::{info, warn};

use petcare_db::models::DeleteOutcome;
use petcare_guard::{Rejection, SubmissionKind};
use petcare_types::api::{BoardPage, CommentForm, PostPage, StaticPage, WritePostForm};

use crate::error::AppError;
use crate::flash;
use crate::middleware::CurrentUser;
use crate::pages::render;
use crate::state::AppState;

const PROFANITY: &str = "부적절한 단어가 포함되어 있습니다.";
const SPAM_POST: &str = "도배성 게시글은 작성할 수 없습니다.";
const SPAM_COMMENT: &str = "도배성 댓글은 작성할 수 없습니다.";
const POST_DELETED: &str = "게시글이 삭제되었습니다.";
const COMMENT_DELETED: &str = "댓글이 삭제되었습니다.";
const NOT_ALLOWED: &str = "삭제 권한이 없습니다.";

/// User-facing text for a guard rejection.
pub fn rejection_message(kind: SubmissionKind, rejection: &Rejection) -> String {
    match (kind, rejection) {
        (
            SubmissionKind::Post,
            Rejection::RateLimited {
                window_secs,
                max_count,
            },
        ) => format!("게시글은 {window_secs}초 동안 {max_count}개만 작성할 수 있습니다."),
        (
            SubmissionKind::Comment,
            Rejection::RateLimited {
                window_secs,
                max_count,
            },
        ) => format!("댓글은 {window_secs}초 동안 {max_count}개만 작성할 수 있습니다."),
        (_, Rejection::Profanity) => PROFANITY.to_string(),
        (SubmissionKind::Post, Rejection::SpamPattern) => SPAM_POST.to_string(),
        (SubmissionKind::Comment, Rejection::SpamPattern) => SPAM_COMMENT.to_string(),
    }
}

/// Number of pages needed for `total` posts; zero posts means zero pages.
pub fn total_pages(total: i64, per_page: i64) -> u32 {
    ((total + per_page - 1) / per_page).max(0) as u32
}

pub async fn board(
    state: State<AppState>,
    jar: CookieJar,
    user: CurrentUser,
) -> Result<Response, AppError> {
    board_page(state, jar, user, Path(1)).await
}

pub async fn board_page(
    State(state): State<AppState>,
    jar: CookieJar,
    CurrentUser(user): CurrentUser,
    Path(page): Path<u32>,
) -> Result<Response, AppError> {
    let page = page.max(1);
    let per_page = state.config.posts_per_page;

    let total = state.db.count_posts()?;
    let posts = state
        .db
        .list_posts(per_page, (i64::from(page) - 1) * per_page)?;

    Ok(render(
        jar,
        Some(user),
        BoardPage {
            posts,
            current_page: page,
            total_pages: total_pages(total, per_page),
        },
    )
    .into_response())
}

pub async fn write_page(jar: CookieJar, CurrentUser(user): CurrentUser) -> impl IntoResponse {
    render(jar, Some(user), StaticPage { page: "write" })
}

pub async fn write_post(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    jar: CookieJar,
    CurrentUser(user): CurrentUser,
    Form(form): Form<WritePostForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    let title = form.title.trim();
    let content = form.content.trim();
    let actor = addr.ip().to_string();
    let now = Utc::now();

    if let Err(rejection) = state
        .guard
        .check(&actor, SubmissionKind::Post, &[title, content], now)
    {
        warn!(%actor, nickname = %user.nickname, %rejection, "Post rejected");
        let message = rejection_message(SubmissionKind::Post, &rejection);
        return Ok(flash::redirect(jar, message, "/write"));
    }

    let post_id = match state
        .db
        .insert_post(title, content, &form.category, &user.nickname, now)
    {
        Ok(id) => id,
        Err(e) => {
            state.guard.release(&actor, SubmissionKind::Post, now);
            return Err(e.into());
        }
    };
    info!(post_id, author = %user.nickname, "Post created");

    Ok((jar, Redirect::to("/board")))
}

pub async fn view_post(
    State(state): State<AppState>,
    jar: CookieJar,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<i64>,
) -> Result<Response, AppError> {
    match state.db.get_post(post_id)? {
        Some(post) => Ok(render(jar, Some(user), PostPage { post }).into_response()),
        None => Ok(Redirect::to("/board").into_response()),
    }
}

pub async fn add_comment(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    jar: CookieJar,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<i64>,
    Form(form): Form<CommentForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    let back = format!("/post/{post_id}");

    // Missing posts must not use up the caller's comment allowance
    if !state.db.post_exists(post_id)? {
        return Ok((jar, Redirect::to(&back)));
    }

    let actor = addr.ip().to_string();
    let now = Utc::now();
    if let Err(rejection) = state.guard.check(
        &actor,
        SubmissionKind::Comment,
        &[form.comment.as_str()],
        now,
    ) {
        warn!(%actor, nickname = %user.nickname, post_id, %rejection, "Comment rejected");
        let message = rejection_message(SubmissionKind::Comment, &rejection);
        return Ok(flash::redirect(jar, message, &back));
    }

    // The post may have been deleted since the existence check
    match state
        .db
        .insert_comment(post_id, &form.comment, &user.nickname, now)
    {
        Ok(Some(comment_id)) => {
            info!(post_id, comment_id, author = %user.nickname, "Comment added");
        }
        Ok(None) => state.guard.release(&actor, SubmissionKind::Comment, now),
        Err(e) => {
            state.guard.release(&actor, SubmissionKind::Comment, now);
            return Err(e.into());
        }
    }

    Ok((jar, Redirect::to(&back)))
}

pub async fn delete_post(
    State(state): State<AppState>,
    jar: CookieJar,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<i64>,
) -> Result<(CookieJar, Redirect), AppError> {
    let message = match state.db.delete_post(post_id, &user.nickname)? {
        DeleteOutcome::Deleted => {
            info!(post_id, author = %user.nickname, "Post deleted");
            POST_DELETED
        }
        DeleteOutcome::NotFound | DeleteOutcome::NotAuthor => {
            warn!(post_id, nickname = %user.nickname, "Post delete denied");
            NOT_ALLOWED
        }
    };
    Ok(flash::redirect(jar, message, "/board"))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    jar: CookieJar,
    CurrentUser(user): CurrentUser,
    Path((post_id, comment_id)): Path<(i64, i64)>,
) -> Result<(CookieJar, Redirect), AppError> {
    let back = format!("/post/{post_id}");
    let jar = match state.db.delete_comment(post_id, comment_id, &user.nickname)? {
        None => jar,
        Some(DeleteOutcome::Deleted) => {
            info!(post_id, comment_id, author = %user.nickname, "Comment deleted");
            flash::push(jar, COMMENT_DELETED)
        }
        Some(DeleteOutcome::NotFound | DeleteOutcome::NotAuthor) => {
            warn!(post_id, comment_id, nickname = %user.nickname, "Comment delete denied");
            flash::push(jar, NOT_ALLOWED)
        }
    };
    Ok((jar, Redirect::to(&back)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
    }

    #[test]
    fn rate_limit_messages_name_window_and_count() {
        let limited = Rejection::RateLimited {
            window_secs: 30,
            max_count: 3,
        };
        assert_eq!(
            rejection_message(SubmissionKind::Post, &limited),
            "게시글은 30초 동안 3개만 작성할 수 있습니다."
        );
        let limited = Rejection::RateLimited {
            window_secs: 15,
            max_count: 5,
        };
        assert_eq!(
            rejection_message(SubmissionKind::Comment, &limited),
            "댓글은 15초 동안 5개만 작성할 수 있습니다."
        );
    }

    #[test]
    fn spam_message_depends_on_kind() {
        assert_eq!(
            rejection_message(SubmissionKind::Post, &Rejection::SpamPattern),
            SPAM_POST
        );
        assert_eq!(
            rejection_message(SubmissionKind::Comment, &Rejection::SpamPattern),
            SPAM_COMMENT
        );
        assert_eq!(
            rejection_message(SubmissionKind::Comment, &Rejection::Profanity),
            PROFANITY
        );
    }
}
