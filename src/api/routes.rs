use crate::AppState;
use crate::api::handlers::users;
use crate::types::{LoginRequest, RegisterRequest, UpdateUserRequest, UserResponse};
use axum::{
    Json, Router,
    routing::{get, post},
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        users::register,
        users::login,
        users::current_user,
        users::update_current_user,
    ),
    components(schemas(RegisterRequest, LoginRequest, UpdateUserRequest, UserResponse)),
    modifiers(&TokenSecurity),
    tags((name = "users", description = "Registration, login and profile"))
)]
pub struct ApiDoc;

/// Declares the `Authorization: Token <jwt>` scheme referenced by protected paths.
struct TokenSecurity;

impl Modify for TokenSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "Authorization",
                    "Token <jwt>",
                ))),
            );
        }
    }
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Routes mounted under `/api`.
///
/// Authentication is applied by the caller around the whole application, so
/// public and protected routes share one router; protected handlers take a
/// [`CurrentUser`](crate::auth::middleware::CurrentUser) argument.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(users::register))
        .route("/users/login", post(users::login))
        .route(
            "/users/current",
            get(users::current_user)
                .put(users::update_current_user)
                .patch(users::update_current_user),
        )
        .route("/openapi.json", get(openapi_json))
}
