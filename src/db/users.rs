//! Account creation and credential checks on top of a [`UserRepository`].

use super::traits::{NewUser, User, UserRepository};
use crate::auth::password::{hash_password, verify_password};
use crate::types::{AppError, Result};
use std::sync::Arc;
use tracing::info;

/// Creates users and checks their credentials.
#[derive(Clone)]
pub struct UserManager {
    users: Arc<dyn UserRepository>,
}

impl UserManager {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub fn repository(&self) -> &Arc<dyn UserRepository> {
        &self.users
    }

    /// Lower-cases the domain part of an email address, leaving the local
    /// part untouched.
    pub fn normalize_email(email: &str) -> String {
        let email = email.trim();
        match email.rsplit_once('@') {
            Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
            None => email.to_string(),
        }
    }

    /// Create a regular user. Username, email and password are required.
    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
        phone_number: &str,
    ) -> Result<User> {
        self.create(username, email, password, phone_number, false)
            .await
    }

    /// Create a user with staff and superuser rights.
    pub async fn create_superuser(
        &self,
        username: &str,
        email: &str,
        password: &str,
        phone_number: &str,
    ) -> Result<User> {
        if password.is_empty() {
            return Err(AppError::InvalidInput(
                "Superuser must have a password.".to_string(),
            ));
        }
        self.create(username, email, password, phone_number, true)
            .await
    }

    async fn create(
        &self,
        username: &str,
        email: &str,
        password: &str,
        phone_number: &str,
        privileged: bool,
    ) -> Result<User> {
        if username.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Users must have a username.".to_string(),
            ));
        }
        if email.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Users must have an email address.".to_string(),
            ));
        }
        if password.is_empty() {
            return Err(AppError::InvalidInput(
                "Users must have a password.".to_string(),
            ));
        }

        let user = self
            .users
            .insert(NewUser {
                username: username.trim().to_string(),
                email: Self::normalize_email(email),
                phone_number: phone_number.trim().to_string(),
                password_hash: hash_password(password)?,
                is_staff: privileged,
                is_superuser: privileged,
            })
            .await?;

        info!(user_id = user.id, superuser = privileged, "Created user");
        Ok(user)
    }

    /// Look up a user by email and check the password.
    ///
    /// Returns `None` for an unknown email or a wrong password. Inactive
    /// users are returned so the caller can report deactivation.
    pub async fn check_credentials(&self, email: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = self
            .users
            .find_by_email(&Self::normalize_email(email))
            .await?
        else {
            return Ok(None);
        };

        if verify_password(password, &user.password_hash)? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Replace a user's password with a fresh hash and persist it.
    pub async fn set_password(&self, mut user: User, password: &str) -> Result<User> {
        user.password_hash = hash_password(password)?;
        self.users.update(&user).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::InMemoryUserRepository;

    fn manager() -> UserManager {
        UserManager::new(Arc::new(InMemoryUserRepository::new()))
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            UserManager::normalize_email("Jane.Doe@EXAMPLE.Com"),
            "Jane.Doe@example.com"
        );
        assert_eq!(UserManager::normalize_email("  no-at-sign "), "no-at-sign");
    }

    #[tokio::test]
    async fn test_create_user_hashes_password() {
        let manager = manager();

        let user = manager
            .create_user("jane", "jane@Example.com", "password123", "010-1234-5678")
            .await
            .expect("should create user");

        assert_eq!(user.email, "jane@example.com");
        assert_ne!(user.password_hash, "password123");
        assert!(user.is_active());
        assert!(!user.is_staff);
        assert!(!user.is_superuser);
        assert_eq!(user.full_name(), "jane");
        assert_eq!(user.short_name(), "jane");
        assert_eq!(user.to_string(), "jane@example.com");
    }

    #[tokio::test]
    async fn test_create_user_requires_fields() {
        let manager = manager();

        let no_username = manager.create_user("", "a@b.c", "password123", "").await;
        let no_email = manager.create_user("a", " ", "password123", "").await;
        let no_password = manager.create_user("a", "a@b.c", "", "").await;

        assert!(
            matches!(no_username, Err(AppError::InvalidInput(ref m)) if m == "Users must have a username.")
        );
        assert!(
            matches!(no_email, Err(AppError::InvalidInput(ref m)) if m == "Users must have an email address.")
        );
        assert!(
            matches!(no_password, Err(AppError::InvalidInput(ref m)) if m == "Users must have a password.")
        );
    }

    #[tokio::test]
    async fn test_create_superuser() {
        let manager = manager();

        let admin = manager
            .create_superuser("root", "root@example.com", "password123", "")
            .await
            .expect("should create superuser");
        let missing = manager
            .create_superuser("root2", "root2@example.com", "", "")
            .await;

        assert!(admin.is_staff && admin.is_superuser);
        assert!(
            matches!(missing, Err(AppError::InvalidInput(ref m)) if m == "Superuser must have a password.")
        );
    }

    #[tokio::test]
    async fn test_check_credentials() {
        let manager = manager();
        let user = manager
            .create_user("jane", "jane@example.com", "password123", "")
            .await
            .unwrap();

        let ok = manager
            .check_credentials("jane@EXAMPLE.com", "password123")
            .await
            .unwrap();
        let wrong = manager
            .check_credentials("jane@example.com", "password124")
            .await
            .unwrap();
        let unknown = manager
            .check_credentials("nobody@example.com", "password123")
            .await
            .unwrap();

        assert_eq!(ok.map(|u| u.id), Some(user.id));
        assert!(wrong.is_none());
        assert!(unknown.is_none());
    }

    #[tokio::test]
    async fn test_set_password() {
        let manager = manager();
        let user = manager
            .create_user("jane", "jane@example.com", "password123", "")
            .await
            .unwrap();

        manager.set_password(user, "new-password-456").await.unwrap();

        assert!(manager
            .check_credentials("jane@example.com", "password123")
            .await
            .unwrap()
            .is_none());
        assert!(manager
            .check_credentials("jane@example.com", "new-password-456")
            .await
            .unwrap()
            .is_some());
    }
}
