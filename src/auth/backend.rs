//! Per-request token authentication.
//!
//! [`AuthenticationBackend::authenticate`] turns the raw `Authorization`
//! header into one of three outcomes:
//!
//! - `Ok(Authentication::Unauthenticated)` - no credential, or a header whose shape
//!   or scheme is not ours. Not an error: public endpoints accept it and
//!   protected ones reject it themselves.
//! - `Ok(Authentication::Authenticated(principal))` - verified token for an
//!   active user.
//! - `Err(AuthenticationFailed)` - a well-formed `Token <jwt>` header that
//!   could not be honoured. The three reasons carry fixed, client-safe
//!   messages.

use crate::auth::jwt::{Subject, TokenCodec, TokenError};
use crate::db::traits::{User, UserRepository};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Scheme name used when none is configured.
pub const DEFAULT_HEADER_PREFIX: &str = "Token";

/// Hard rejection of a presented credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthenticationFailed {
    #[error("Invalid authentication. Could not decode token.")]
    UndecodableToken,

    #[error("No user matching this token was found.")]
    UnknownUser,

    #[error("This user has been deactivated.")]
    Deactivated,
}

/// A verified user together with the token they presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedPrincipal {
    pub user: User,
    pub token: String,
}

/// Outcome of a request that did not hard-fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authentication {
    Unauthenticated,
    Authenticated(AuthenticatedPrincipal),
}

impl Authentication {
    pub fn principal(&self) -> Option<&AuthenticatedPrincipal> {
        match self {
            Authentication::Unauthenticated => None,
            Authentication::Authenticated(principal) => Some(principal),
        }
    }

    pub fn into_principal(self) -> Option<AuthenticatedPrincipal> {
        match self {
            Authentication::Unauthenticated => None,
            Authentication::Authenticated(principal) => Some(principal),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Authentication::Authenticated(_))
    }
}

/// Splits `"<scheme> <token>"` and returns the token when the scheme matches
/// `prefix` case-insensitively.
///
/// Any other shape (empty, a lone word, three or more words, a foreign
/// scheme) yields `None`.
pub fn parse_authorization_header<'a>(header: &'a str, prefix: &str) -> Option<&'a str> {
    let mut parts = header.split_ascii_whitespace();
    let (Some(scheme), Some(token), None) = (parts.next(), parts.next(), parts.next()) else {
        return None;
    };

    scheme.eq_ignore_ascii_case(prefix).then_some(token)
}

/// Stateless token authentication backend.
///
/// Holds no per-request state; a single instance is shared by every request.
#[derive(Clone)]
pub struct AuthenticationBackend {
    codec: Arc<TokenCodec>,
    users: Arc<dyn UserRepository>,
    header_prefix: String,
}

impl AuthenticationBackend {
    pub fn new(codec: Arc<TokenCodec>, users: Arc<dyn UserRepository>) -> Self {
        Self {
            codec,
            users,
            header_prefix: DEFAULT_HEADER_PREFIX.to_string(),
        }
    }

    /// Use a scheme other than `Token` in front of the credential.
    pub fn with_header_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.header_prefix = prefix.into();
        self
    }

    pub fn header_prefix(&self) -> &str {
        &self.header_prefix
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Issues a token for `subject`. Called by the login and registration
    /// flows, never by `authenticate` itself.
    pub fn issue_token(&self, subject: &Subject) -> Result<String, TokenError> {
        self.codec.encode(subject)
    }

    /// Authenticates a request from its raw `Authorization` header value.
    pub async fn authenticate(
        &self,
        header: Option<&str>,
    ) -> Result<Authentication, AuthenticationFailed> {
        let Some(header) = header else {
            return Ok(Authentication::Unauthenticated);
        };

        let Some(token) = parse_authorization_header(header, &self.header_prefix) else {
            debug!(
                "Authorization header not in '{} <token>' form, continuing unauthenticated",
                self.header_prefix
            );
            return Ok(Authentication::Unauthenticated);
        };

        self.authenticate_credentials(token).await
    }

    async fn authenticate_credentials(
        &self,
        token: &str,
    ) -> Result<Authentication, AuthenticationFailed> {
        let claims = self.codec.decode(token).map_err(|e| {
            match e {
                TokenError::Expired => warn!("Rejected expired token"),
                TokenError::Invalid => warn!("Rejected token that failed verification"),
            }
            AuthenticationFailed::UndecodableToken
        })?;

        let user = match self.users.find_by_id(&claims.subject).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!(subject = %claims.subject, "Token subject does not match any user");
                return Err(AuthenticationFailed::UnknownUser);
            }
            Err(e) => {
                error!(subject = %claims.subject, "User lookup failed: {}", e);
                return Err(AuthenticationFailed::UnknownUser);
            }
        };

        if !user.is_active() {
            warn!(user_id = user.id, "Token presented for deactivated user");
            return Err(AuthenticationFailed::Deactivated);
        }

        debug!(user_id = user.id, "Authenticated request");
        Ok(Authentication::Authenticated(AuthenticatedPrincipal {
            user,
            token: token.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::InMemoryUserRepository;
    use crate::db::traits::NewUser;
    use chrono::{Duration, Utc};

    const SECRET: &[u8] = b"backend-test-secret-that-is-32-chars";

    async fn setup() -> (AuthenticationBackend, Arc<InMemoryUserRepository>, User) {
        let repo = Arc::new(InMemoryUserRepository::new());
        let user = repo
            .insert(NewUser {
                username: "jane".to_string(),
                email: "jane@example.com".to_string(),
                phone_number: String::new(),
                password_hash: "unused".to_string(),
                is_staff: false,
                is_superuser: false,
            })
            .await
            .unwrap();

        let codec = Arc::new(TokenCodec::with_default_lifetime(SECRET).unwrap());
        let backend = AuthenticationBackend::new(codec, repo.clone());
        (backend, repo, user)
    }

    #[test]
    fn test_parse_header_shapes() {
        assert_eq!(parse_authorization_header("Token abc", "Token"), Some("abc"));
        assert_eq!(parse_authorization_header("token abc", "Token"), Some("abc"));
        assert_eq!(parse_authorization_header("TOKEN  abc ", "Token"), Some("abc"));
        assert_eq!(parse_authorization_header("", "Token"), None);
        assert_eq!(parse_authorization_header("   ", "Token"), None);
        assert_eq!(parse_authorization_header("Token", "Token"), None);
        assert_eq!(parse_authorization_header("Token a b", "Token"), None);
        assert_eq!(parse_authorization_header("Bearer abc", "Token"), None);
    }

    #[tokio::test]
    async fn test_absent_header_is_unauthenticated() {
        let (backend, _, _) = setup().await;
        assert_eq!(backend.authenticate(None).await, Ok(Authentication::Unauthenticated));
    }

    #[tokio::test]
    async fn test_valid_token_authenticates() {
        let (backend, _, user) = setup().await;
        let token = backend.issue_token(&user.subject()).unwrap();

        let outcome = backend
            .authenticate(Some(&format!("Token {}", token)))
            .await
            .expect("should authenticate");

        let principal = outcome.into_principal().expect("principal");
        assert_eq!(principal.user, user);
        assert_eq!(principal.token, token);
    }

    #[tokio::test]
    async fn test_foreign_scheme_with_valid_token_is_unauthenticated() {
        let (backend, _, user) = setup().await;
        let token = backend.issue_token(&user.subject()).unwrap();

        let outcome = backend.authenticate(Some(&format!("Bearer {}", token))).await;

        assert_eq!(outcome, Ok(Authentication::Unauthenticated));
    }

    #[tokio::test]
    async fn test_expired_token_fails_as_undecodable() {
        let (backend, _, user) = setup().await;
        let token = backend
            .codec()
            .encode_at(&user.subject(), Utc::now() - Duration::days(61))
            .unwrap();

        let outcome = backend.authenticate(Some(&format!("Token {}", token))).await;

        assert_eq!(outcome, Err(AuthenticationFailed::UndecodableToken));
    }

    #[tokio::test]
    async fn test_unknown_subject() {
        let (backend, _, _) = setup().await;
        let token = backend.issue_token(&Subject::from(404)).unwrap();

        let outcome = backend.authenticate(Some(&format!("Token {}", token))).await;

        assert_eq!(outcome, Err(AuthenticationFailed::UnknownUser));
    }

    #[tokio::test]
    async fn test_deactivated_user() {
        let (backend, repo, mut user) = setup().await;
        let token = backend.issue_token(&user.subject()).unwrap();
        user.is_active = false;
        repo.update(&user).await.unwrap();

        let outcome = backend.authenticate(Some(&format!("Token {}", token))).await;

        assert_eq!(outcome, Err(AuthenticationFailed::Deactivated));
    }

    #[tokio::test]
    async fn test_custom_prefix() {
        let (backend, _, user) = setup().await;
        let backend = backend.with_header_prefix("JWT");
        let token = backend.issue_token(&user.subject()).unwrap();

        let custom = backend.authenticate(Some(&format!("jwt {}", token))).await;
        let default = backend.authenticate(Some(&format!("Token {}", token))).await;

        assert!(custom.expect("should authenticate").is_authenticated());
        assert_eq!(default, Ok(Authentication::Unauthenticated));
    }

    #[test]
    fn test_failure_messages_are_stable() {
        assert_eq!(
            AuthenticationFailed::UndecodableToken.to_string(),
            "Invalid authentication. Could not decode token."
        );
        assert_eq!(
            AuthenticationFailed::UnknownUser.to_string(),
            "No user matching this token was found."
        );
        assert_eq!(
            AuthenticationFailed::Deactivated.to_string(),
            "This user has been deactivated."
        );
    }
}
