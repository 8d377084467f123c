//! Short-lived bearer token management (Veeam OAuth2 password grant).
//!
//! The token lives behind an async mutex that stays locked for the whole
//! refresh, so callers that find the token expired at the same moment queue
//! up behind one exchange and then reuse its result.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{error, info};

use crate::error::{ProviderError, Result};
use crate::transport::{HttpRequest, Transport};

pub const TOKEN_PATH: &str = "/api/oauth2/token";
pub const API_VERSION: &str = "1.0-rev1";
const DEFAULT_EXPIRES_IN: u64 = 900;
// Upper bound on a vendor-supplied lifetime.
const MAX_EXPIRES_IN: u64 = 24 * 60 * 60;

/// Observable lifecycle state of the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPhase {
    Absent,
    Valid,
    Expired,
}

enum TokenState {
    Absent,
    Issued {
        access_token: String,
        expires_at: Instant,
    },
}

impl TokenState {
    fn phase(&self, now: Instant) -> TokenPhase {
        match self {
            TokenState::Absent => TokenPhase::Absent,
            TokenState::Issued { expires_at, .. } if now < *expires_at => TokenPhase::Valid,
            TokenState::Issued { .. } => TokenPhase::Expired,
        }
    }
}

/// Owns the bearer token of one adapter instance.
pub struct TokenManager {
    transport: Arc<dyn Transport>,
    username: String,
    password: String,
    state: Mutex<TokenState>,
}

impl TokenManager {
    pub fn new(
        transport: Arc<dyn Transport>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            username: username.into(),
            password: password.into(),
            state: Mutex::new(TokenState::Absent),
        }
    }

    /// A valid access token, exchanging credentials first when needed.
    pub async fn bearer(&self) -> Result<String> {
        let mut state = self.state.lock().await;
        let now = Instant::now();

        if let TokenState::Issued {
            access_token,
            expires_at,
        } = &*state
            && now < *expires_at
        {
            return Ok(access_token.clone());
        }

        match self.exchange().await {
            Ok((access_token, expires_in)) => {
                info!(expires_in_secs = expires_in.as_secs(), "veeam token issued");
                *state = TokenState::Issued {
                    access_token: access_token.clone(),
                    expires_at: Instant::now() + expires_in,
                };
                Ok(access_token)
            }
            Err(e) => {
                error!(error = %e, "veeam token exchange failed");
                *state = TokenState::Absent;
                Err(match e {
                    ProviderError::AuthRefresh(_) => e,
                    other => ProviderError::AuthRefresh(other.to_string()),
                })
            }
        }
    }

    /// Drop the cached token if it is still `rejected`, the bearer the
    /// vendor just refused. A token refreshed meanwhile by another caller
    /// is kept. Returns whether the token was dropped.
    pub async fn invalidate(&self, rejected: &str) -> bool {
        let mut state = self.state.lock().await;
        match &*state {
            TokenState::Issued { access_token, .. } if access_token == rejected => {
                *state = TokenState::Absent;
                true
            }
            _ => false,
        }
    }

    pub async fn phase(&self) -> TokenPhase {
        self.state.lock().await.phase(Instant::now())
    }

    async fn exchange(&self) -> Result<(String, Duration)> {
        let basic = BASE64.encode(format!("{}:{}", self.username, self.password));
        let request = HttpRequest::post(TOKEN_PATH)
            .header("Authorization", format!("Basic {basic}"))
            .header("x-api-version", API_VERSION)
            .form(vec![
                ("grant_type".to_string(), "password".to_string()),
                ("username".to_string(), self.username.clone()),
                ("password".to_string(), self.password.clone()),
            ]);

        let response = self.transport.send(request).await?;
        let access_token = response
            .body
            .get("access_token")
            .and_then(|v| v.as_str())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ProviderError::AuthRefresh("response has no access_token".to_string()))?
            .to_string();
        let expires_in = response
            .body
            .get("expires_in")
            .and_then(|v| v.as_u64())
            .unwrap_or(DEFAULT_EXPIRES_IN)
            .min(MAX_EXPIRES_IN);

        Ok((access_token, Duration::from_secs(expires_in)))
    }
}

impl fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenManager")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}
