//! Client-credentials token exchange and the resulting [`Credential`].

use std::fmt;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::{error, info};

use crate::contract::DriveApi;
use crate::error::{PublishError, Result};

/// Tokens are renewed this long before the lifetime reported by the
/// identity provider runs out.
pub const REFRESH_MARGIN: Duration = Duration::from_secs(5 * 60);

/// Application identity used for the token exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    /// The user whose drive is written to.
    pub user_id: String,
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("user_id", &self.user_id)
            .finish()
    }
}

/// A bearer token bound to the user it acts for.
#[derive(Clone)]
pub struct Credential {
    token: String,
    user_id: String,
    acquired_at: Instant,
    expires_in: Option<Duration>,
}

impl Credential {
    pub fn new(
        token: impl Into<String>,
        user_id: impl Into<String>,
        expires_in: Option<Duration>,
    ) -> Self {
        Self {
            token: token.into(),
            user_id: user_id.into(),
            acquired_at: Instant::now(),
            expires_in,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn expires_in(&self) -> Option<Duration> {
        self.expires_in
    }

    /// True once the token is within [`REFRESH_MARGIN`] of its reported
    /// lifetime. A token without a reported lifetime never needs refreshing.
    pub fn needs_refresh(&self) -> bool {
        match self.expires_in {
            Some(lifetime) => {
                self.acquired_at.elapsed() >= lifetime.saturating_sub(REFRESH_MARGIN)
            }
            None => false,
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Exchanges `identity` for a bearer token. Single attempt; a response
/// without a non-empty `access_token` is an [`PublishError::Auth`].
pub async fn acquire<A>(api: &A, identity: &Identity) -> Result<Credential>
where
    A: DriveApi + ?Sized,
{
    info!(
        tenant_id = %identity.tenant_id,
        client_id = %identity.client_id,
        "Requesting access token"
    );
    let response = api.request_token(identity).await?;

    let token = response
        .json::<TokenResponse>()
        .ok()
        .and_then(|parsed| match parsed.access_token {
            Some(token) if !token.is_empty() => Some((token, parsed.expires_in)),
            _ => None,
        });
    match token {
        Some((token, expires_in)) => {
            info!(
                status = response.status,
                expires_in_secs = expires_in,
                "Access token acquired"
            );
            Ok(Credential::new(
                token,
                identity.user_id.clone(),
                expires_in.map(Duration::from_secs),
            ))
        }
        None => {
            error!(
                status = response.status,
                body = %response.body,
                "Token response did not contain an access token"
            );
            Err(PublishError::Auth {
                status: response.status,
                body: response.body,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{ApiResponse, MockDriveApi};
    use crate::error::ErrorKind;

    fn identity() -> Identity {
        Identity {
            tenant_id: "tenant".into(),
            client_id: "client".into(),
            client_secret: "s3cret".into(),
            user_id: "user".into(),
        }
    }

    fn api_returning(status: u16, body: &'static str) -> MockDriveApi {
        let mut api = MockDriveApi::new();
        api.expect_request_token()
            .times(1)
            .returning(move |_| Ok(ApiResponse::new(status, body)));
        api
    }

    #[tokio::test]
    async fn token_is_taken_from_access_token_field() {
        let api = api_returning(200, r#"{"access_token": "abc"}"#);
        let credential = acquire(&api, &identity()).await.unwrap();
        assert_eq!(credential.token(), "abc");
        assert_eq!(credential.user_id(), "user");
        assert!(!credential.needs_refresh());
    }

    #[tokio::test]
    async fn missing_token_is_an_auth_failure() {
        let api = api_returning(200, "{}");
        let err = acquire(&api, &identity()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthFailure);
    }

    #[tokio::test]
    async fn error_body_is_an_auth_failure() {
        let api = api_returning(401, r#"{"error": "invalid_client"}"#);
        match acquire(&api, &identity()).await.unwrap_err() {
            PublishError::Auth { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("invalid_client"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_token_is_an_auth_failure() {
        let api = api_returning(200, r#"{"access_token": ""}"#);
        assert!(acquire(&api, &identity()).await.is_err());
    }

    #[tokio::test]
    async fn expires_in_is_tracked() {
        let api = api_returning(200, r#"{"access_token": "abc", "expires_in": 3599}"#);
        let credential = acquire(&api, &identity()).await.unwrap();
        assert_eq!(credential.expires_in(), Some(Duration::from_secs(3599)));
        assert!(!credential.needs_refresh());
    }

    #[test]
    fn short_lived_token_needs_refresh() {
        let credential = Credential::new("abc", "user", Some(Duration::from_secs(60)));
        assert!(credential.needs_refresh());
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let rendered = format!("{:?} {:?}", identity(), Credential::new("abc", "user", None));
        assert!(!rendered.contains("s3cret"));
        assert!(!rendered.contains("abc"));
    }
}
