//! Kinde client
//!
//! Builds authorization URLs for the authorization code flow with PKCE and
//! exchanges the callback code for tokens.

use super::pkce::{self, PkceParams};
use super::{CallbackParams, IdentityClient, TokenResponse, TokenSet};
use crate::config::SetupConfig;
use crate::error::{AuthError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use url::Url;

const SCOPES: &str = "openid profile email";
const AUTHORIZE_PATH: &str = "oauth2/auth";
const TOKEN_PATH: &str = "oauth2/token";
const SDK_HEADER: &str = "Kinde-SDK";
const SDK_ID: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// How long an issued `state` stays redeemable
const PENDING_TTL_SECS: i64 = 600;
/// Upper bound on unredeemed `state` values held at once
const MAX_PENDING: usize = 10_000;

#[derive(Debug, Clone)]
struct PendingLogin {
    pkce: PkceParams,
    issued_at: DateTime<Utc>,
}

impl PendingLogin {
    fn is_stale(&self, now: DateTime<Utc>) -> bool {
        now - self.issued_at >= Duration::seconds(PENDING_TTL_SECS)
    }
}

pub struct KindeClient {
    client_id: String,
    client_secret: String,
    redirect_url: Url,
    authorization_endpoint: Url,
    token_endpoint: Url,
    http: reqwest::Client,
    pending: Arc<Mutex<HashMap<String, PendingLogin>>>,
    tokens: Arc<RwLock<Option<TokenSet>>>,
}

impl KindeClient {
    pub fn new(config: &SetupConfig) -> Result<Self> {
        let issuer = Url::parse(&format!(
            "{}/",
            config.issuer_base_url.trim_end_matches('/')
        ))?;

        Ok(Self {
            client_id: config.client_id.clone(),
            client_secret: config.secret.clone(),
            redirect_url: Url::parse(&config.redirect_url)?,
            authorization_endpoint: issuer.join(AUTHORIZE_PATH)?,
            token_endpoint: issuer.join(TOKEN_PATH)?,
            http: reqwest::Client::new(),
            pending: Arc::new(Mutex::new(HashMap::new())),
            tokens: Arc::new(RwLock::new(None)),
        })
    }

    /// Tokens from the most recent successful callback, unless expired
    pub async fn latest_tokens(&self) -> Option<TokenSet> {
        let now = Utc::now();
        self.tokens
            .read()
            .await
            .as_ref()
            .filter(|tokens| !tokens.is_expired(now))
            .cloned()
    }

    /// Record an issued `state`, evicting stale entries and, at capacity, the oldest one
    async fn remember(&self, state: String, pkce: PkceParams, now: DateTime<Utc>) {
        let mut pending = self.pending.lock().await;

        pending.retain(|_, login| !login.is_stale(now));
        if pending.len() >= MAX_PENDING {
            let oldest = pending
                .iter()
                .min_by_key(|(_, login)| login.issued_at)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                tracing::warn!("Pending login limit reached, evicting oldest state");
                pending.remove(&oldest);
            }
        }

        pending.insert(state, PendingLogin { pkce, issued_at: now });
    }

    async fn authorization_url(
        &self,
        org_code: Option<&str>,
        start_page: Option<&str>,
    ) -> Url {
        let pkce = PkceParams::generate();
        let state = pkce::generate_state();

        let mut url = self.authorization_endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", &self.client_id)
                .append_pair("response_type", "code")
                .append_pair("redirect_uri", self.redirect_url.as_str())
                .append_pair("scope", SCOPES)
                .append_pair("state", &state)
                .append_pair("code_challenge", &pkce.code_challenge)
                .append_pair("code_challenge_method", "S256");
            if let Some(page) = start_page {
                query.append_pair("start_page", page);
            }
            if let Some(org_code) = org_code {
                query.append_pair("org_code", org_code);
            }
        }

        self.remember(state, pkce, Utc::now()).await;
        tracing::debug!("Built authorization URL: {}", url);
        url
    }

    async fn exchange_code(&self, code: &str, pkce: &PkceParams) -> Result<TokenSet> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.redirect_url.as_str()),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("code_verifier", pkce.code_verifier.as_str()),
        ];

        let response = self
            .http
            .post(self.token_endpoint.clone())
            .header(SDK_HEADER, SDK_ID)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Token(format!(
                "Token exchange failed with status {}: {}",
                status, body
            )));
        }

        let token_response: TokenResponse = response.json().await?;
        TokenSet::from_response(token_response, Utc::now())
    }
}

#[async_trait]
impl IdentityClient for KindeClient {
    async fn register(&self, org_code: Option<&str>) -> Result<Url> {
        Ok(self.authorization_url(org_code, Some("registration")).await)
    }

    async fn login(&self, org_code: Option<&str>) -> Result<Url> {
        Ok(self.authorization_url(org_code, None).await)
    }

    async fn handle_redirect_to_app(&self, params: &CallbackParams) -> Result<()> {
        if let Some(ref error) = params.error {
            let description = params
                .error_description
                .as_deref()
                .unwrap_or("No description provided");
            return Err(AuthError::Callback(format!(
                "OAuth error: {} - {}",
                error, description
            )));
        }

        let (code, state) = match (&params.code, &params.state) {
            (Some(code), Some(state)) => (code, state),
            _ => {
                return Err(AuthError::Callback(
                    "Missing code or state parameter in callback".to_string(),
                ))
            }
        };

        let login = self
            .pending
            .lock()
            .await
            .remove(state)
            .ok_or_else(|| AuthError::Callback("Unknown or reused state parameter".to_string()))?;

        if login.is_stale(Utc::now()) {
            return Err(AuthError::Callback("State parameter has expired".to_string()));
        }

        let tokens = self.exchange_code(code, &login.pkce).await?;
        *self.tokens.write().await = Some(tokens);

        tracing::info!("Authorization code exchanged successfully");
        Ok(())
    }
}
