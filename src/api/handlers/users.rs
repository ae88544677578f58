use crate::{
    AppState,
    auth::middleware::CurrentUser,
    db::{User, UserManager},
    types::{
        AppError, LoginRequest, RegisterRequest, Result, UpdateUserRequest, UserEnvelope,
        UserResponse,
    },
};
use axum::{Json, extract::State, http::StatusCode};
use tracing::info;

const MIN_PASSWORD_LEN: usize = 8;
const MAX_PASSWORD_LEN: usize = 128;

fn validate_password(password: &str) -> Result<()> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidInput(format!(
            "Ensure this field has at least {} characters.",
            MIN_PASSWORD_LEN
        )));
    }
    if len > MAX_PASSWORD_LEN {
        return Err(AppError::InvalidInput(format!(
            "Ensure this field has no more than {} characters.",
            MAX_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Build the response body for `user`, issuing a fresh token.
fn user_response(state: &AppState, user: &User, with_phone: bool) -> Result<UserResponse> {
    let token = state
        .auth
        .issue_token(&user.subject())
        .map_err(|e| AppError::Internal(format!("Failed to issue token: {}", e)))?;

    Ok(UserResponse {
        email: user.email.clone(),
        username: user.username.clone(),
        phone_number: with_phone.then(|| user.phone_number.clone()),
        token,
    })
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/users/register",
    request_body(content = RegisterRequest, description = "Wrapped as {\"user\": {...}}"),
    responses(
        (status = 201, description = "User registered successfully", body = UserResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "User already exists")
    ),
    tag = "users"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<UserEnvelope<RegisterRequest>>,
) -> Result<(StatusCode, Json<UserEnvelope<UserResponse>>)> {
    let request = payload.user;
    validate_password(&request.password)?;

    let user = state
        .accounts
        .create_user(
            &request.username,
            &request.email,
            &request.password,
            &request.phone_number,
        )
        .await?;

    info!(user_id = user.id, "Registered user");
    let body = user_response(&state, &user, true)?;
    Ok((StatusCode::CREATED, Json(UserEnvelope { user: body })))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/api/users/login",
    request_body(content = LoginRequest, description = "Wrapped as {\"user\": {...}}"),
    responses(
        (status = 200, description = "Login successful", body = UserResponse),
        (status = 400, description = "Missing or invalid credentials, or deactivated account")
    ),
    tag = "users"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<UserEnvelope<LoginRequest>>,
) -> Result<Json<UserEnvelope<UserResponse>>> {
    let email = payload
        .user
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| {
            AppError::InvalidInput("An email address is required to log in.".to_string())
        })?;
    let password = payload
        .user
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::InvalidInput("A password is required to log in.".to_string()))?;

    let user = state
        .accounts
        .check_credentials(&email, &password)
        .await?
        .ok_or_else(|| {
            AppError::InvalidInput(
                "A user with this email and password was not found.".to_string(),
            )
        })?;

    if !user.is_active() {
        return Err(AppError::InvalidInput(
            "This user has been deactivated.".to_string(),
        ));
    }

    let body = user_response(&state, &user, false)?;
    Ok(Json(UserEnvelope { user: body }))
}

/// Get the authenticated user
#[utoipa::path(
    get,
    path = "/api/users/current",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Missing or rejected credentials")
    ),
    security(("token" = [])),
    tag = "users"
)]
pub async fn current_user(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> Result<Json<UserEnvelope<UserResponse>>> {
    let body = user_response(&state, &principal.user, true)?;
    Ok(Json(UserEnvelope { user: body }))
}

/// Update the authenticated user
#[utoipa::path(
    put,
    path = "/api/users/current",
    request_body(content = UpdateUserRequest, description = "Wrapped as {\"user\": {...}}"),
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Missing or rejected credentials"),
        (status = 409, description = "Username or email already taken")
    ),
    security(("token" = [])),
    tag = "users"
)]
pub async fn update_current_user(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Json(payload): Json<UserEnvelope<UpdateUserRequest>>,
) -> Result<Json<UserEnvelope<UserResponse>>> {
    let changes = payload.user;
    let mut user = principal.user;

    if let Some(username) = changes.username {
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::InvalidInput(
                "Users must have a username.".to_string(),
            ));
        }
        user.username = username.to_string();
    }
    if let Some(email) = changes.email {
        if email.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Users must have an email address.".to_string(),
            ));
        }
        user.email = UserManager::normalize_email(&email);
    }
    if let Some(phone_number) = changes.phone_number {
        user.phone_number = phone_number.trim().to_string();
    }

    let user = match changes.password {
        Some(password) => {
            validate_password(&password)?;
            state.accounts.set_password(user, &password).await?
        }
        None => state.accounts.repository().update(&user).await?,
    };

    info!(user_id = user.id, "Updated user");
    let body = user_response(&state, &user, true)?;
    Ok(Json(UserEnvelope { user: body }))
}
