//! Shared helpers for integration tests.
#![allow(dead_code)]

pub mod mocks;

use chrono::Utc;
use shop_auth::{
    AppState, InMemoryUserRepository, ShopConfig, TokenCodec, User, UserRepository,
};
use std::sync::Arc;

/// Signing secret used by every test codec.
pub const TEST_SECRET: &[u8] = b"test_secret_key_for_testing_only_32b";

pub fn test_codec() -> TokenCodec {
    TokenCodec::with_default_lifetime(TEST_SECRET).expect("test codec")
}

/// A user record as the repository would return it.
pub fn sample_user(id: i64, active: bool) -> User {
    let now = Utc::now();
    User {
        id,
        username: format!("user{}", id),
        email: format!("user{}@example.com", id),
        phone_number: "010-9999-9999".to_string(),
        password_hash: "unused".to_string(),
        is_active: active,
        is_staff: false,
        is_superuser: false,
        created_at: now,
        updated_at: now,
    }
}

/// Application state over an empty in-memory repository.
pub fn create_test_state() -> (AppState, Arc<InMemoryUserRepository>) {
    let repo = Arc::new(InMemoryUserRepository::new());
    let users: Arc<dyn UserRepository> = repo.clone();
    let state = AppState::new(ShopConfig::default(), test_codec(), users);
    (state, repo)
}

pub fn token_header(token: &str) -> String {
    format!("Token {}", token)
}
