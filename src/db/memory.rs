//! In-process user store
//!
//! Backs the service when no external database is configured and is used
//! throughout the test suite.

use super::traits::{NewUser, User, UserRepository};
use crate::auth::jwt::Subject;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::BTreeMap;

#[derive(Debug)]
struct Inner {
    users: BTreeMap<i64, User>,
    next_id: i64,
}

/// Thread-safe in-memory [`UserRepository`] with auto-incrementing ids starting at 1.
#[derive(Debug)]
pub struct InMemoryUserRepository {
    inner: RwLock<Inner>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                users: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Number of stored users
    pub fn len(&self) -> usize {
        self.inner.read().users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Inner {
    fn check_unique(&self, id: Option<i64>, username: &str, email: &str) -> Result<()> {
        for other in self.users.values().filter(|u| Some(u.id) != id) {
            if other.username == username {
                return Err(AppError::Conflict(
                    "user with this username already exists.".to_string(),
                ));
            }
            if other.email == email {
                return Err(AppError::Conflict(
                    "user with this email already exists.".to_string(),
                ));
            }
        }
        Ok(())
    }
}

fn primary_key(subject: &Subject) -> Option<i64> {
    match subject {
        Subject::Numeric(id) => Some(*id),
        Subject::Text(raw) => raw.trim().parse().ok(),
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &Subject) -> Result<Option<User>> {
        let Some(pk) = primary_key(id) else {
            return Ok(None);
        };
        Ok(self.inner.read().users.get(&pk).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .inner
            .read()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .inner
            .read()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User> {
        let mut inner = self.inner.write();
        inner.check_unique(None, &user.username, &user.email)?;

        let now = Utc::now();
        let id = inner.next_id;
        inner.next_id += 1;

        let stored = User {
            id,
            username: user.username,
            email: user.email,
            phone_number: user.phone_number,
            password_hash: user.password_hash,
            is_active: true,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(id, stored.clone());

        Ok(stored)
    }

    async fn update(&self, user: &User) -> Result<User> {
        let mut inner = self.inner.write();
        if !inner.users.contains_key(&user.id) {
            return Err(AppError::NotFound(format!("user {}", user.id)));
        }
        inner.check_unique(Some(user.id), &user.username, &user.email)?;

        let mut stored = user.clone();
        stored.updated_at = Utc::now();
        inner.users.insert(stored.id, stored.clone());

        Ok(stored)
    }
}
