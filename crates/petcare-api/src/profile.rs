use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header;
use axum::response::{IntoResponse, Redirect};
use axum::{Form, body::Bytes};
use axum_extra::extract::cookie::CookieJar;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use tracing::{info, warn};

use petcare_db::models::ProfileUpdate;
use petcare_types::api::{ProfileForm, ProfilePage, StaticPage};

use crate::error::AppError;
use crate::flash;
use crate::middleware::CurrentUser;
use crate::pages::render;
use crate::state::AppState;

const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];
const PROFILE_UPDATED: &str = "프로필이 업데이트되었습니다.";

/// Lowercased extension when it is an accepted image type.
pub fn allowed_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// Reduces a client-supplied filename to a safe basename made of
/// `[A-Za-z0-9._-]`. May return an empty string.
pub fn secure_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let joined = base.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Stored avatar path relative to the upload directory:
/// `<owner>/<safe name>`, where the owner directory is `u` followed by the
/// URL-safe base64 of the login id (never empty, never `..`). Distinct logins
/// always get distinct directories, and a sanitized name never contains `/`.
/// `None` for disallowed types.
pub fn avatar_file_name(login_id: &str, filename: &str) -> Option<String> {
    let ext = allowed_extension(filename)?;

    let mut safe = secure_filename(filename);
    if allowed_extension(&safe).as_deref() != Some(ext.as_str()) {
        safe = format!("avatar.{ext}");
    }

    Some(format!("u{}/{safe}", URL_SAFE_NO_PAD.encode(login_id)))
}

fn to_update(form: ProfileForm) -> ProfileUpdate {
    ProfileUpdate {
        pet_type: form.pet_type,
        pet_name: form.pet_name,
        pet_age: form.pet_age,
        bio: form.bio,
    }
}

pub async fn profile(
    State(state): State<AppState>,
    jar: CookieJar,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let post_count = state.db.count_posts_by_author(&user.nickname)?;
    let comment_count = state.db.count_comments_by_author(&user.nickname)?;

    Ok(render(
        jar,
        Some(user),
        ProfilePage {
            post_count,
            comment_count,
        },
    ))
}

pub async fn edit_page(jar: CookieJar, CurrentUser(user): CurrentUser) -> impl IntoResponse {
    render(jar, Some(user), StaticPage { page: "edit_profile" })
}

struct Upload {
    filename: String,
    data: Bytes,
}

async fn read_multipart(mut multipart: Multipart) -> Result<(ProfileForm, Option<Upload>), AppError> {
    let bad = |e: axum::extract::multipart::MultipartError| AppError::BadRequest(e.body_text());

    let mut form = ProfileForm::default();
    let mut upload = None;

    while let Some(field) = multipart.next_field().await.map_err(bad)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "profile_image" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(bad)?;
                if !filename.is_empty() {
                    upload = Some(Upload { filename, data });
                }
            }
            "pet_type" => form.pet_type = field.text().await.map_err(bad)?,
            "pet_name" => form.pet_name = field.text().await.map_err(bad)?,
            "pet_age" => form.pet_age = field.text().await.map_err(bad)?,
            "bio" => form.bio = field.text().await.map_err(bad)?,
            _ => {}
        }
    }

    Ok((form, upload))
}

/// Accepts either a multipart form (with an optional `profile_image`) or a
/// plain urlencoded form.
pub async fn edit_profile(
    State(state): State<AppState>,
    jar: CookieJar,
    CurrentUser(user): CurrentUser,
    request: Request,
) -> Result<(CookieJar, Redirect), AppError> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    let (form, upload) = if is_multipart {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        read_multipart(multipart).await?
    } else {
        let Form(form) = Form::<ProfileForm>::from_request(request, &state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        (form, None)
    };

    state.db.update_profile(&user.login_id, &to_update(form))?;

    if let Some(upload) = upload {
        match avatar_file_name(&user.login_id, &upload.filename) {
            Some(stored) => {
                let path = state.config.upload_dir.join(&stored);
                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::write(&path, &upload.data).await?;
                state.db.set_profile_image(&user.login_id, &stored)?;
                info!(login_id = %user.login_id, file = %stored, bytes = upload.data.len(), "Avatar saved");
            }
            None => {
                warn!(login_id = %user.login_id, filename = %upload.filename, "Ignoring avatar with disallowed type");
            }
        }
    }

    info!(login_id = %user.login_id, "Profile updated");
    Ok(flash::redirect(jar, PROFILE_UPDATED, "/profile"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_check_is_case_insensitive() {
        assert_eq!(allowed_extension("Cat.PNG").as_deref(), Some("png"));
        assert_eq!(allowed_extension("dog.jpeg").as_deref(), Some("jpeg"));
        assert_eq!(allowed_extension("notes.txt"), None);
        assert_eq!(allowed_extension("noext"), None);
    }

    #[test]
    fn secure_filename_strips_paths_and_odd_chars() {
        assert_eq!(secure_filename("../../etc/passwd"), "passwd");
        assert_eq!(secure_filename("C:\\photos\\my cat.png"), "my_cat.png");
        assert_eq!(secure_filename("..hidden.gif"), "hidden.gif");
        assert_eq!(secure_filename("고양이.png"), "png");
    }

    #[test]
    fn avatar_names_are_owner_scoped() {
        assert_eq!(
            avatar_file_name("mongmong", "cat.png").as_deref(),
            Some("ubW9uZ21vbmc/cat.png")
        );
        assert_ne!(
            avatar_file_name("alice", "cat.png"),
            avatar_file_name("bob", "cat.png")
        );
    }

    #[test]
    fn owner_and_file_name_cannot_blur_together() {
        assert_ne!(
            avatar_file_name("a", "b_cat.png"),
            avatar_file_name("a_b", "cat.png")
        );
        // "YWIh" is both a plain login id and the encoding of "ab!"
        assert_ne!(
            avatar_file_name("ab!", "cat.png"),
            avatar_file_name("YWIh", "cat.png")
        );
    }

    #[test]
    fn avatar_falls_back_when_name_sanitizes_away() {
        assert_eq!(
            avatar_file_name("mongmong", "고양이.png").as_deref(),
            Some("ubW9uZ21vbmc/avatar.png")
        );
        assert_eq!(avatar_file_name("mongmong", "virus.exe"), None);
    }

    #[test]
    fn non_ascii_owner_is_encoded() {
        let name = avatar_file_name("멍멍이", "cat.gif").unwrap();
        assert!(name.ends_with("/cat.gif"));
        assert!(name.is_ascii());
        assert_eq!(name.matches('/').count(), 1);
    }

    #[test]
    fn empty_login_still_gets_a_relative_directory() {
        assert_eq!(avatar_file_name("", "cat.png").as_deref(), Some("u/cat.png"));
    }
}
