//! Register, login and callback routes
//!
//! All three routes answer with a 302 redirect. Only the callback recovers
//! from client failures; register and login surface them as 500s.

use crate::client::CallbackParams;
use crate::error::{AuthError, Result};
use crate::setup::AuthContext;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use http::{header, StatusCode};
use serde::Deserialize;

pub const REGISTER_PATH: &str = "/register";
pub const LOGIN_PATH: &str = "/login";
pub const CALLBACK_PATH: &str = "/kinde_callback";

const ORG_CODE_PARAM: &str = "org_code";

#[derive(Debug, Default, Deserialize)]
pub struct AuthQuery {
    pub org_code: Option<String>,
}

impl AuthQuery {
    /// An unparseable query (e.g. a repeated `org_code`) counts as an invalid org code.
    fn from_extracted(query: std::result::Result<Query<Self>, QueryRejection>) -> Result<Self> {
        match query {
            Ok(Query(query)) => Ok(query),
            Err(rejection) => {
                tracing::debug!("Rejected auth query: {}", rejection.body_text());
                Err(invalid_org_code())
            }
        }
    }

    /// Absent stays `None`; present but empty is rejected.
    fn org_code(&self) -> Result<Option<&str>> {
        match self.org_code.as_deref() {
            Some("") => Err(invalid_org_code()),
            org_code => Ok(org_code),
        }
    }
}

fn invalid_org_code() -> AuthError {
    AuthError::InvalidParameter {
        param: ORG_CODE_PARAM,
        value: String::new(),
    }
}

/// Routes bound to `ctx`, ready to be merged or nested into an application
pub fn auth_router(ctx: AuthContext) -> Router {
    Router::new()
        .route(REGISTER_PATH, get(handle_register))
        .route(LOGIN_PATH, get(handle_login))
        .route(CALLBACK_PATH, get(handle_callback))
        .with_state(ctx)
}

async fn handle_register(
    State(ctx): State<AuthContext>,
    query: std::result::Result<Query<AuthQuery>, QueryRejection>,
) -> Result<Response> {
    let query = AuthQuery::from_extracted(query)?;
    let org_code = query.org_code()?;
    let url = ctx.client().register(org_code).await?;

    tracing::info!("Redirecting to registration");
    Ok(found(url.as_str()))
}

async fn handle_login(
    State(ctx): State<AuthContext>,
    query: std::result::Result<Query<AuthQuery>, QueryRejection>,
) -> Result<Response> {
    let query = AuthQuery::from_extracted(query)?;
    let org_code = query.org_code()?;
    let url = ctx.client().login(org_code).await?;

    tracing::info!("Redirecting to login");
    Ok(found(url.as_str()))
}

async fn handle_callback(
    State(ctx): State<AuthContext>,
    query: std::result::Result<Query<CallbackParams>, QueryRejection>,
) -> Response {
    let params = match query {
        Ok(Query(params)) => params,
        Err(rejection) => {
            tracing::warn!("Malformed callback query: {}", rejection.body_text());
            return found(&ctx.config().unauthorised_url);
        }
    };

    match ctx.client().handle_redirect_to_app(&params).await {
        Ok(()) => found(&ctx.config().site_url),
        Err(e) => {
            tracing::warn!("Callback handling failed: {}", e);
            found(&ctx.config().unauthorised_url)
        }
    }
}

fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_org_code_is_valid() {
        let query = AuthQuery { org_code: None };
        assert_eq!(query.org_code().unwrap(), None);
    }

    #[test]
    fn test_non_empty_org_code_is_passed_through() {
        let query = AuthQuery {
            org_code: Some("org_123".to_string()),
        };
        assert_eq!(query.org_code().unwrap(), Some("org_123"));
    }

    #[test]
    fn test_empty_org_code_is_rejected() {
        let query = AuthQuery {
            org_code: Some(String::new()),
        };
        assert!(matches!(
            query.org_code(),
            Err(AuthError::InvalidParameter { param: "org_code", .. })
        ));
    }

    #[test]
    fn test_found_sets_location() {
        let response = found("https://z");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "https://z");
    }
}
