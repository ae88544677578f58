//! # shop-auth
//!
//! Stateless token authentication for the shop API. Signed session tokens are
//! issued at login and registration and verified on every request, with no
//! server-side session storage: a token is valid exactly when its HS256
//! signature checks out, its expiry lies in the future and its subject is an
//! active user.
//!
//! ## Overview
//!
//! The crate can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `shop-auth` binary
//! 2. **As a library** - Embed [`AuthenticationBackend`] in your own stack
//!
//! ## Library Usage
//!
//! ```rust,ignore
//! use shop_auth::{AuthenticationBackend, InMemoryUserRepository, TokenCodec};
//! use std::sync::Arc;
//!
//! let users = Arc::new(InMemoryUserRepository::new());
//! let codec = Arc::new(TokenCodec::with_default_lifetime(b"secret")?);
//! let backend = AuthenticationBackend::new(codec, users);
//!
//! let outcome = backend.authenticate(request_header).await?;
//! ```
//!
//! ## Modules
//!
//! - [`auth`] - Token codec, authentication backend and middleware
//! - [`api`] - REST API handlers and routes
//! - [`cli`] - Command-line parsing for the binary
//! - [`db`] - User repository abstraction and account management
//! - [`types`] - Common types and error handling
//! - [`utils`] - Configuration loading

#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP API handlers and routes.
pub mod api;
/// Token authentication and middleware.
pub mod auth;
/// Command-line interface.
pub mod cli;
/// User persistence and account management.
pub mod db;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use auth::backend::{
    AuthenticatedPrincipal, Authentication, AuthenticationBackend, AuthenticationFailed,
};
pub use auth::jwt::{Subject, TokenClaims, TokenCodec, TokenError};
pub use db::{InMemoryUserRepository, User, UserManager, UserRepository};
pub use types::{AppError, Result};
pub use utils::toml_config::{ConfigError, ShopConfig};

use axum::{Router, middleware, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<ShopConfig>,
    /// User creation and credential checks
    pub accounts: UserManager,
    /// Token issuing and per-request authentication
    pub auth: Arc<AuthenticationBackend>,
}

impl AppState {
    /// Wire up the application from configuration and a user repository.
    ///
    /// Resolves the signing secret from the environment; a missing or empty
    /// secret is a [`ConfigError`] and the service must not start.
    pub fn from_config(
        config: ShopConfig,
        users: Arc<dyn UserRepository>,
    ) -> std::result::Result<Self, ConfigError> {
        let secret = config.secret_key()?;
        let codec = TokenCodec::new(secret.as_bytes(), config.auth.token_lifetime()?)?;
        Ok(Self::new(config, codec, users))
    }

    /// Wire up the application with an explicit codec.
    pub fn new(config: ShopConfig, codec: TokenCodec, users: Arc<dyn UserRepository>) -> Self {
        let auth = AuthenticationBackend::new(Arc::new(codec), users.clone())
            .with_header_prefix(config.auth.header_prefix.clone());

        Self {
            config: Arc::new(config),
            accounts: UserManager::new(users),
            auth: Arc::new(auth),
        }
    }
}

/// Build the full application router.
///
/// Every route, public or not, runs behind the authentication middleware.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .nest("/api", api::routes::create_router())
        .layer(middleware::from_fn_with_state(
            state.auth.clone(),
            auth::middleware::authenticate_request,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
