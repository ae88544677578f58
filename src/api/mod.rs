//! HTTP API Handlers and Routes
//!
//! This module provides the REST API layer, built on the Axum web framework.
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route definitions and OpenAPI document
//!
//! # API Endpoints
//!
//! ## Users (`/api/users`)
//! - `POST /api/users/register` - Register a new user and receive a token
//! - `POST /api/users/login` - Login and receive a token
//! - `GET /api/users/current` - Get the authenticated user
//! - `PUT|PATCH /api/users/current` - Update the authenticated user
//!
//! ## Documentation
//! - `GET /api/openapi.json` - OpenAPI document
//!
//! # Authentication
//!
//! Every request passes through the token authentication middleware.
//! Protected endpoints require:
//! ```text
//! Authorization: Token <token>
//! ```

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;
