//! Configuration validation and client initialization
//!
//! Routes are built from an [`AuthContext`], which can only exist once a
//! validated config and a client are in hand. [`ClientSetup`] keeps the
//! initialize-once, read-many slot for applications that wire things up at
//! startup and look them up later.

use crate::client::{IdentityClient, KindeClient};
use crate::config::SetupConfig;
use crate::error::{AuthError, Result};
use std::sync::{Arc, RwLock};

/// Check that every required field is present, returning the config unchanged.
pub fn validate_config(config: SetupConfig) -> Result<SetupConfig> {
    let required = [
        ("issuerBaseUrl", &config.issuer_base_url),
        ("siteUrl", &config.site_url),
        ("secret", &config.secret),
        ("clientId", &config.client_id),
        ("unAuthorisedUrl", &config.unauthorised_url),
        ("redirectUrl", &config.redirect_url),
    ];

    if let Some((name, _)) = required.iter().find(|(_, value)| value.is_empty()) {
        return Err(AuthError::MissingConfig(*name));
    }

    Ok(config)
}

/// Validated config and the client the auth routes delegate to
#[derive(Clone)]
pub struct AuthContext {
    config: Arc<SetupConfig>,
    client: Arc<dyn IdentityClient>,
}

impl AuthContext {
    pub fn new(config: SetupConfig, client: Arc<dyn IdentityClient>) -> Result<Self> {
        Ok(Self {
            config: Arc::new(validate_config(config)?),
            client,
        })
    }

    pub fn config(&self) -> &SetupConfig {
        &self.config
    }

    pub fn client(&self) -> &Arc<dyn IdentityClient> {
        &self.client
    }
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("site_url", &self.config.site_url)
            .field("client_id", &self.config.client_id)
            .finish_non_exhaustive()
    }
}

/// Holder for the config and client created at startup.
///
/// Later initializations replace earlier ones. Initializing while requests
/// are being served is the caller's responsibility.
#[derive(Default)]
pub struct ClientSetup {
    slot: RwLock<Option<AuthContext>>,
}

impl ClientSetup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `config`, build a [`KindeClient`] from it and store both.
    pub fn initialize_client(&self, config: SetupConfig) -> Result<Arc<dyn IdentityClient>> {
        let config = validate_config(config)?;
        let client: Arc<dyn IdentityClient> = Arc::new(KindeClient::new(&config)?);
        self.initialize_with(config, client)
    }

    /// Validate `config` and store it alongside a caller-provided client.
    pub fn initialize_with(
        &self,
        config: SetupConfig,
        client: Arc<dyn IdentityClient>,
    ) -> Result<Arc<dyn IdentityClient>> {
        let context = AuthContext::new(config, client)?;
        let client = context.client.clone();

        *self.slot.write().unwrap_or_else(|e| e.into_inner()) = Some(context);
        tracing::debug!("Identity provider client initialized");
        Ok(client)
    }

    pub fn context(&self) -> Result<AuthContext> {
        self.slot
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or(AuthError::Uninitialized("Initial config"))
    }

    pub fn config(&self) -> Result<Arc<SetupConfig>> {
        self.context()
            .map(|context| context.config)
            .map_err(|_| AuthError::Uninitialized("Initial config"))
    }

    pub fn client(&self) -> Result<Arc<dyn IdentityClient>> {
        self.context()
            .map(|context| context.client)
            .map_err(|_| AuthError::Uninitialized("Identity provider client"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::CallbackParams;
    use async_trait::async_trait;
    use url::Url;

    struct StaticClient;

    #[async_trait]
    impl IdentityClient for StaticClient {
        async fn register(&self, _org_code: Option<&str>) -> Result<Url> {
            Ok(Url::parse("https://idp.example.com/register")?)
        }

        async fn login(&self, _org_code: Option<&str>) -> Result<Url> {
            Ok(Url::parse("https://idp.example.com/login")?)
        }

        async fn handle_redirect_to_app(&self, _params: &CallbackParams) -> Result<()> {
            Ok(())
        }
    }

    fn full_config() -> SetupConfig {
        SetupConfig {
            issuer_base_url: "https://x".to_string(),
            redirect_url: "https://y/cb".to_string(),
            site_url: "https://z".to_string(),
            secret: "s".to_string(),
            unauthorised_url: "https://z/unauth".to_string(),
            client_id: "c".to_string(),
        }
    }

    #[test]
    fn test_validate_returns_config_unchanged() {
        assert_eq!(validate_config(full_config()).unwrap(), full_config());
    }

    #[test]
    fn test_validate_names_each_missing_field() {
        let cases: [(&str, fn(&mut SetupConfig)); 6] = [
            ("issuerBaseUrl", |c| c.issuer_base_url.clear()),
            ("redirectUrl", |c| c.redirect_url.clear()),
            ("siteUrl", |c| c.site_url.clear()),
            ("secret", |c| c.secret.clear()),
            ("unAuthorisedUrl", |c| c.unauthorised_url.clear()),
            ("clientId", |c| c.client_id.clear()),
        ];

        for (field, clear) in cases {
            let mut config = full_config();
            clear(&mut config);

            match validate_config(config) {
                Err(AuthError::MissingConfig(name)) => assert_eq!(name, field),
                other => panic!("expected missing {}, got {:?}", field, other.map(|_| ())),
            }
        }
    }

    #[test]
    fn test_accessors_fail_before_initialization() {
        let setup = ClientSetup::new();

        let err = setup.config().unwrap_err();
        assert!(matches!(err, AuthError::Uninitialized(_)));
        assert_eq!(err.to_string(), "Initial config is not initialized");

        let err = setup.client().err().unwrap();
        assert_eq!(
            err.to_string(),
            "Identity provider client is not initialized"
        );
    }

    #[test]
    fn test_initialize_client_stores_config_and_client() {
        let setup = ClientSetup::new();
        let client = setup.initialize_client(full_config()).unwrap();

        assert_eq!(*setup.config().unwrap(), full_config());
        assert!(Arc::ptr_eq(&setup.client().unwrap(), &client));
    }

    #[test]
    fn test_initialize_rejects_invalid_config_and_keeps_state_empty() {
        let setup = ClientSetup::new();
        let mut config = full_config();
        config.secret.clear();

        assert!(matches!(
            setup.initialize_client(config),
            Err(AuthError::MissingConfig("secret"))
        ));
        assert!(setup.config().is_err());
    }

    #[test]
    fn test_reinitialization_overwrites() {
        let setup = ClientSetup::new();
        setup.initialize_client(full_config()).unwrap();

        let mut config = full_config();
        config.site_url = "https://other".to_string();
        let client: Arc<dyn IdentityClient> = Arc::new(StaticClient);
        setup.initialize_with(config, client.clone()).unwrap();

        assert_eq!(setup.config().unwrap().site_url, "https://other");
        assert!(Arc::ptr_eq(&setup.client().unwrap(), &client));
    }
}
