//! Database row types. Users keep their own row type so the password hash
//! stays inside the db layer; posts and comments map straight onto the
//! shared models.

use chrono::{DateTime, Utc};
use petcare_types::models::{Profile, User};

pub struct UserRow {
    pub login_id: String,
    pub password: String,
    pub nickname: String,
    pub pet_type: String,
    pub pet_name: String,
    pub pet_age: String,
    pub bio: String,
    pub profile_image: String,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub fn into_user(self) -> User {
        User {
            login_id: self.login_id,
            nickname: self.nickname,
            profile: Profile {
                pet_type: self.pet_type,
                pet_name: self.pet_name,
                pet_age: self.pet_age,
                bio: self.bio,
                profile_image: self.profile_image,
            },
            created_at: self.created_at,
        }
    }
}

/// Editable profile fields (the avatar is updated separately).
#[derive(Debug, Default, Clone)]
pub struct ProfileUpdate {
    pub pet_type: String,
    pub pet_name: String,
    pub pet_age: String,
    pub bio: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserInsert {
    Created,
    LoginIdTaken,
    NicknameTaken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
    NotAuthor,
}
