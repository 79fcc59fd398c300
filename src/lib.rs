//! Kinde Auth Router
//!
//! axum routes for registration, login and the OAuth callback, delegating
//! authentication to an identity-provider client.

pub mod client;
pub mod config;
pub mod error;
pub mod router;
pub mod setup;

pub use client::{CallbackParams, IdentityClient, KindeClient};
pub use config::SetupConfig;
pub use error::{AuthError, Result};
pub use router::auth_router;
pub use setup::{validate_config, AuthContext, ClientSetup};
