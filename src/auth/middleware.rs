use crate::auth::backend::{AuthenticatedPrincipal, AuthenticationBackend};
use crate::types::AppError;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Runs the authentication backend on every request.
///
/// A verified principal is stored in the request extensions. Requests
/// without a usable credential continue untouched; a presented token that
/// fails verification ends the request with 401 and the backend's message.
/// Every 401, including those raised later by [`CurrentUser`], challenges
/// with the backend's configured scheme.
pub async fn authenticate_request(
    State(backend): State<Arc<AuthenticationBackend>>,
    mut req: Request,
    next: Next,
) -> Response {
    // Non-visible-ASCII header values are treated like any other malformed header
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let outcome = backend.authenticate(auth_header).await;
    let response = match outcome {
        Ok(outcome) => {
            if let Some(principal) = outcome.into_principal() {
                req.extensions_mut().insert(principal);
            }
            next.run(req).await
        }
        Err(failure) => AppError::from(failure).into_response(),
    };

    with_challenge(response, backend.header_prefix())
}

fn with_challenge(mut response: Response, scheme: &str) -> Response {
    if response.status() == StatusCode::UNAUTHORIZED {
        if let Ok(value) = HeaderValue::from_str(scheme) {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, value);
        }
    }
    response
}

/// Extractor for handlers that require an authenticated user.
pub struct CurrentUser(pub AuthenticatedPrincipal);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedPrincipal>()
            .cloned()
            .map(CurrentUser)
            .ok_or(AppError::NotAuthenticated)
    }
}
