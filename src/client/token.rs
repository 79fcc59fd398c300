//! Tokens returned by the provider's token endpoint

use crate::error::{AuthError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

const TOKEN_EXPIRY_BUFFER_SECS: i64 = 60;

/// Token endpoint response body
#[derive(Debug, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Tokens kept in memory after a completed callback. Never verified here.
#[derive(Debug, Clone)]
pub struct TokenSet {
    pub access_token: String,
    pub id_token: Option<String>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenSet {
    /// Fails when `expires_in` cannot be represented as a point in time
    pub fn from_response(response: TokenResponse, received_at: DateTime<Utc>) -> Result<Self> {
        let expires_at = match response.expires_in {
            Some(secs) => Some(
                Duration::try_seconds(secs)
                    .and_then(|lifetime| received_at.checked_add_signed(lifetime))
                    .ok_or_else(|| {
                        AuthError::Token(format!("expires_in out of range: {}", secs))
                    })?,
            ),
            None => None,
        };

        Ok(TokenSet {
            expires_at,
            access_token: response.access_token,
            id_token: response.id_token,
            refresh_token: response.refresh_token,
            scope: response.scope,
        })
    }

    /// Expired, or within a minute of expiring
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        if self.access_token.is_empty() {
            return true;
        }

        match self.expires_at {
            Some(expires_at) => {
                let refresh_at = expires_at
                    .checked_sub_signed(Duration::seconds(TOKEN_EXPIRY_BUFFER_SECS))
                    .unwrap_or(DateTime::<Utc>::MIN_UTC);
                now >= refresh_at
            }
            None => false,
        }
    }
}
