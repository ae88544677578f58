//! User repository abstraction
//!
//! The authentication backend only ever calls [`UserRepository::find_by_id`];
//! the remaining operations back the registration, login and profile
//! endpoints.

use crate::auth::jwt::Subject;
use crate::types::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;

/// User record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Primary key
    pub id: i64,
    pub username: String,
    pub email: String,
    pub phone_number: String,
    /// Argon2 PHC string
    pub password_hash: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether the account may authenticate.
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn full_name(&self) -> &str {
        &self.username
    }

    pub fn short_name(&self) -> &str {
        &self.username
    }

    /// Subject reference embedded in tokens issued for this user.
    pub fn subject(&self) -> Subject {
        Subject::from(self.id)
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.email)
    }
}

/// Fields needed to create a user; the repository assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// Abstract trait for user persistence.
///
/// Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Resolve a token subject to a user. Subjects that do not name a stored
    /// primary key resolve to `None`.
    async fn find_by_id(&self, id: &Subject) -> Result<Option<User>>;

    /// Get a user by (normalized) email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Get a user by username
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Store a new user, enforcing username and email uniqueness
    async fn insert(&self, user: NewUser) -> Result<User>;

    /// Persist changes to an existing user
    async fn update(&self, user: &User) -> Result<User>;
}
