use serde::{Deserialize, Serialize};

use crate::models::{Post, PostSummary, User};

// -- Auth forms --

// Missing fields read as empty so they fail validation instead of extraction.

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub user_id: String,
    pub password: String,
    /// Present (any value) when "keep me logged in" is checked.
    pub remember: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub user_id: String,
    pub password: String,
    pub password_confirm: String,
    pub nickname: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct DuplicateCheckForm {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DuplicateCheckResponse {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FindIdForm {
    pub nickname: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FindPasswordForm {
    pub user_id: String,
    pub nickname: String,
}

// -- Board forms --

#[derive(Debug, Deserialize)]
pub struct WritePostForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub comment: String,
}

// -- Profile --

/// Text fields of the profile edit form. Missing fields clear the value.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub pet_type: String,
    #[serde(default)]
    pub pet_name: String,
    #[serde(default)]
    pub pet_age: String,
    #[serde(default)]
    pub bio: String,
}

// -- Consultation --

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default = "default_pet_type")]
    pub pet_type: String,
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_pet_type() -> String {
    "dog".to_string()
}

fn default_category() -> String {
    "general".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl ChatResponse {
    pub fn answer(text: String) -> Self {
        Self { success: true, response: Some(text), error: None }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self { success: false, response: None, error: Some(message.into()) }
    }
}

// -- Page views --

/// Envelope for every rendered page: pending flash messages, the
/// logged-in user (if any), and the page's own fields.
#[derive(Debug, Serialize)]
pub struct PageView<T: Serialize> {
    pub flash: Vec<String>,
    pub user: Option<User>,
    #[serde(flatten)]
    pub page: T,
}

/// Pages whose content is entirely client-side.
#[derive(Debug, Serialize)]
pub struct StaticPage {
    pub page: &'static str,
}

#[derive(Debug, Serialize)]
pub struct BoardPage {
    pub posts: Vec<PostSummary>,
    pub current_page: u32,
    pub total_pages: u32,
}

#[derive(Debug, Serialize)]
pub struct PostPage {
    pub post: Post,
}

#[derive(Debug, Serialize)]
pub struct ProfilePage {
    pub post_count: i64,
    pub comment_count: i64,
}

#[derive(Debug, Serialize)]
pub struct FindIdPage {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub found_users: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct FindPasswordPage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_fills_defaults() {
        let req: ChatRequest = serde_json::from_str(r#"{"message":"밥을 안 먹어요"}"#).unwrap();
        assert_eq!(req.pet_type, "dog");
        assert_eq!(req.category, "general");
    }

    #[test]
    fn auth_forms_tolerate_missing_fields() {
        let login: LoginForm = serde_json::from_str(r#"{"user_id":"mongmong"}"#).unwrap();
        assert_eq!(login.user_id, "mongmong");
        assert!(login.password.is_empty());
        assert!(login.remember.is_none());

        let register: RegisterForm = serde_json::from_str("{}").unwrap();
        assert!(register.password.is_empty() && register.nickname.is_empty());

        let find_id: FindIdForm = serde_json::from_str("{}").unwrap();
        assert!(find_id.nickname.is_empty());

        let find_password: FindPasswordForm =
            serde_json::from_str(r#"{"user_id":"mongmong"}"#).unwrap();
        assert!(find_password.nickname.is_empty());
    }

    #[test]
    fn page_view_flattens_page_fields() {
        let view = PageView {
            flash: vec!["로그인되었습니다.".to_string()],
            user: None,
            page: StaticPage { page: "index" },
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["page"], "index");
        assert_eq!(json["flash"][0], "로그인되었습니다.");
        assert!(json["user"].is_null());
    }

    #[test]
    fn chat_failure_omits_response() {
        let json = serde_json::to_value(ChatResponse::failure("boom")).unwrap();
        assert_eq!(json["success"], false);
        assert!(json.get("response").is_none());
    }
}
