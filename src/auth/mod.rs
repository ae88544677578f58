//! Token Authentication and Middleware
//!
//! This module provides the stateless authentication layer: signed session
//! tokens are issued at login/registration and verified on every request
//! without any server-side session record.
//!
//! # Module Structure
//!
//! - [`auth::jwt`](crate::auth::jwt) - token encoding, decoding and claims
//! - [`auth::backend`](crate::auth::backend) - per-request header parsing,
//!   token verification, user resolution and activation policy
//! - [`auth::middleware`](crate::auth::middleware) - Axum middleware and extractors
//! - [`auth::password`](crate::auth::password) - Argon2id password hashing
//!
//! # Security Features
//!
//! - **Tokens**: HS256 only. The accepted algorithm is fixed by the server,
//!   never taken from the token header, so `alg: none` and asymmetric
//!   algorithms are rejected.
//! - **Claims**: `{"id": <subject>, "exp": <unix seconds>}`, both required.
//! - **Password Hashing**: Argon2id (memory-hard) PHC strings
//!
//! # Usage
//!
//! ```ignore
//! use shop_auth::auth::backend::{Authentication, AuthenticationBackend};
//! use shop_auth::auth::jwt::TokenCodec;
//!
//! let codec = Arc::new(TokenCodec::with_default_lifetime(secret.as_bytes())?);
//! let backend = AuthenticationBackend::new(codec, users);
//!
//! let token = backend.issue_token(&user.subject())?;
//! match backend.authenticate(Some(&format!("Token {token}"))).await {
//!     Ok(Authentication::Authenticated(principal)) => { /* ... */ }
//!     Ok(Authentication::Unauthenticated) => { /* public access */ }
//!     Err(failure) => { /* 401 with failure.to_string() */ }
//! }
//! ```
//!
//! # Configuration
//!
//! Configure via `shop.toml`:
//! ```toml
//! [auth]
//! secret_key_env = "SECRET_KEY"   # env var holding the signing secret
//! token_lifetime_days = 60
//! header_prefix = "Token"
//! ```

/// Per-request authentication backend.
pub mod backend;
/// Token encoding, decoding and claims.
pub mod jwt;
/// Authentication middleware and extractors for protected routes.
pub mod middleware;
/// Password hashing.
pub mod password;
