use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Avatar reference given to every new account.
pub const DEFAULT_PROFILE_IMAGE: &str = "default.jpg";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub pet_type: String,
    pub pet_name: String,
    pub pet_age: String,
    pub bio: String,
    pub profile_image: String,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            pet_type: String::new(),
            pet_name: String::new(),
            pet_age: String::new(),
            bio: String::new(),
            profile_image: DEFAULT_PROFILE_IMAGE.to_string(),
        }
    }
}

impl Profile {
    /// Consultation pages stay locked until the pet has a name.
    pub fn is_complete(&self) -> bool {
        !self.pet_name.is_empty()
    }
}

/// A registered account. The password hash never leaves the db layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub login_id: String,
    pub nickname: String,
    pub profile: Profile,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    /// Unique within the parent post only.
    pub id: i64,
    pub post_id: i64,
    pub content: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub category: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub comments: Vec<Comment>,
}

/// One row of the board listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub comment_count: i64,
}
