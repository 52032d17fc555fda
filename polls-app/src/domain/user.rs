use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: uuid::Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl User {
    pub fn new(username: String, email: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            username,
            email,
            first_name: String::new(),
            last_name: String::new(),
            is_staff: false,
            is_superuser: false,
            created_at: None,
            updated_at: None,
        }
    }

    /// Staff and superusers bypass the expiration gate.
    pub fn is_admin(&self) -> bool {
        self.is_staff || self.is_superuser
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: uuid::Uuid,
    pub avatar: String,
    pub bio: Option<String>,
}

/// User together with the profile extension, for the profile page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub user: User,
    pub profile: UserProfile,
}
