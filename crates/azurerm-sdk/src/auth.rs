//! Bearer tokens for ARM requests.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use jiff::{SignedDuration, Timestamp};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::environment::Environment;
use crate::error::ArmError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_on: Timestamp,
}

impl AccessToken {
    /// True if the token expires within `grace` from now.
    pub fn is_expired(&self, grace: SignedDuration) -> bool {
        Timestamp::now() + grace >= self.expires_on
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

/// Source of bearer tokens for the ARM audience.
pub trait TokenCredential: Send + Sync + fmt::Debug {
    fn token(&self) -> BoxFuture<'_, Result<AccessToken, ArmError>>;
}

/// A token obtained elsewhere, e.g. from `az account get-access-token`.
#[derive(Debug, Clone)]
pub struct StaticTokenCredential {
    token: AccessToken,
}

impl StaticTokenCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: AccessToken {
                token: token.into(),
                expires_on: Timestamp::MAX,
            },
        }
    }
}

impl TokenCredential for StaticTokenCredential {
    fn token(&self) -> BoxFuture<'_, Result<AccessToken, ArmError>> {
        Box::pin(async { Ok(self.token.clone()) })
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// OAuth2 client-credentials flow against Microsoft Entra ID, with caching.
pub struct ClientSecretCredential {
    tenant_id: String,
    client_id: String,
    client_secret: String,
    authority_host: String,
    scope: String,
    http: reqwest::Client,
    cached: Arc<RwLock<Option<AccessToken>>>,
    /// Refresh this long before the token actually expires.
    grace: SignedDuration,
}

impl ClientSecretCredential {
    pub fn new(
        environment: Environment,
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            authority_host: environment.login_endpoint().to_string(),
            scope: environment.token_scope(),
            http: reqwest::Client::new(),
            cached: Arc::new(RwLock::new(None)),
            grace: SignedDuration::from_mins(5),
        }
    }

    /// Point the credential at a different login endpoint.
    pub fn with_authority_host(mut self, host: impl Into<String>) -> Self {
        self.authority_host = host.into();
        self
    }

    #[instrument(skip(self), fields(tenant_id = %self.tenant_id, client_id = %self.client_id))]
    async fn acquire(&self) -> Result<AccessToken, ArmError> {
        let url = format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority_host.trim_end_matches('/'),
            self.tenant_id
        );
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", self.scope.as_str()),
        ];

        let response = self
            .http
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(|e| ArmError::Auth(format!("token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ArmError::Auth(format!(
                "token request failed with status {status}: {body}"
            )));
        }

        let parsed: TokenResponse = response
            .json()
            .await
            .map_err(|e| ArmError::Auth(format!("parsing token response: {e}")))?;

        let expires_on = Timestamp::now() + SignedDuration::from_secs(parsed.expires_in);
        debug!(%expires_on, "acquired access token");

        Ok(AccessToken {
            token: parsed.access_token,
            expires_on,
        })
    }
}

impl fmt::Debug for ClientSecretCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSecretCredential")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("authority_host", &self.authority_host)
            .finish_non_exhaustive()
    }
}

impl TokenCredential for ClientSecretCredential {
    fn token(&self) -> BoxFuture<'_, Result<AccessToken, ArmError>> {
        Box::pin(async {
            {
                let cached = self.cached.read().await;
                if let Some(token) = cached.as_ref() {
                    if !token.is_expired(self.grace) {
                        return Ok(token.clone());
                    }
                }
            }

            let token = self.acquire().await?;
            *self.cached.write().await = Some(token.clone());
            Ok(token)
        })
    }
}
