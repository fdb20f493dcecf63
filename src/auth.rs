//! HTTP Basic Authentication for administrative routes

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::sync::Arc;

use crate::config::env_var;

/// Credentials guarding `/admin/*`; without both halves the routes are open
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl AuthConfig {
    /// Read ADMIN_USERNAME / ADMIN_PASSWORD. A lone half is ignored.
    pub fn from_env() -> Self {
        match (env_var("ADMIN_USERNAME"), env_var("ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => {
                tracing::info!("Admin routes require Basic authentication");
                Self {
                    username: Some(username),
                    password: Some(password),
                }
            }
            (username, password) => {
                if username.is_some() != password.is_some() {
                    tracing::warn!("Only one of ADMIN_USERNAME/ADMIN_PASSWORD is set; ignoring it");
                }
                tracing::warn!("Admin routes are unauthenticated; history can be cleared by anyone");
                Self::default()
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }

    /// Compare a username/password pair; always true when auth is off
    pub fn credentials_match(&self, username: &str, password: &str) -> bool {
        let (Some(expected_user), Some(expected_pass)) = (&self.username, &self.password) else {
            return true;
        };
        // Both comparisons always run
        let user_ok = bytes_equal(expected_user.as_bytes(), username.as_bytes());
        let pass_ok = bytes_equal(expected_pass.as_bytes(), password.as_bytes());
        user_ok & pass_ok
    }

    /// Check an `Authorization` header value
    fn accepts(&self, authorization: &str) -> bool {
        authorization
            .strip_prefix("Basic ")
            .and_then(|credentials| STANDARD.decode(credentials.trim()).ok())
            .and_then(|decoded| String::from_utf8(decoded).ok())
            .and_then(|decoded| {
                decoded
                    .split_once(':')
                    .map(|(username, password)| self.credentials_match(username, password))
            })
            .unwrap_or(false)
    }
}

/// Equality whose running time depends only on the input lengths
fn bytes_equal(expected: &[u8], given: &[u8]) -> bool {
    expected.len() == given.len()
        && expected
            .iter()
            .zip(given)
            .fold(0u8, |diff, (a, b)| diff | (a ^ b))
            == 0
}

/// Middleware guarding the admin routes
pub async fn admin_auth_middleware(
    State(auth_config): State<Arc<AuthConfig>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !auth_config.is_enabled() {
        return next.run(request).await;
    }

    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| auth_config.accepts(value));

    if authorized {
        return next.run(request).await;
    }

    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Basic realm=\"Familiada Admin\"")],
        "Unauthorized",
    )
        .into_response()
}
