//! Identity-provider client capability
//!
//! The router only depends on [`IdentityClient`]; [`KindeClient`] is the
//! HTTP implementation used by the binary.

pub mod kinde;
pub mod pkce;
pub mod token;

pub use kinde::KindeClient;
pub use pkce::PkceParams;
pub use token::{TokenResponse, TokenSet};

use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

/// Query parameters the provider appends when redirecting back to the app
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Capabilities the auth routes consume
#[async_trait]
pub trait IdentityClient: Send + Sync {
    /// Build the URL that starts the provider's registration flow
    async fn register(&self, org_code: Option<&str>) -> Result<Url>;

    /// Build the URL that starts the provider's login flow
    async fn login(&self, org_code: Option<&str>) -> Result<Url>;

    /// Complete the authorization code flow from the callback parameters.
    ///
    /// Any error means the user is not authenticated.
    async fn handle_redirect_to_app(&self, params: &CallbackParams) -> Result<()>;
}
