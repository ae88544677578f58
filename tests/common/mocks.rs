//! Mock implementations for testing.
//!
//! A mockall-generated [`UserRepository`] so backend tests can script lookups,
//! simulate storage failures and assert how often the repository is consulted.

use async_trait::async_trait;
use mockall::mock;
use shop_auth::Subject;
use shop_auth::db::{NewUser, User, UserRepository};
use shop_auth::types::Result;

mock! {
    pub Users {}

    #[async_trait]
    impl UserRepository for Users {
        async fn find_by_id(&self, id: &Subject) -> Result<Option<User>>;
        async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
        async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
        async fn insert(&self, user: NewUser) -> Result<User>;
        async fn update(&self, user: &User) -> Result<User>;
    }
}
