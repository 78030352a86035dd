//! Session cookie handling and the session endpoints.
//!
//! The cookie carries the identity itself (JSON, base64url without padding);
//! there is no server-side session table, so logout only clears the cookie.

use axum::{
    Json,
    extract::{Extension, FromRequestParts},
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{COOKIE, InvalidHeaderValue, SET_COOKIE},
        request::Parts,
    },
    response::{IntoResponse, Response},
};
use base64ct::{Base64UrlUnpadded, Encoding};
use serde::Serialize;
use std::{convert::Infallible, sync::Arc};
use thiserror::Error;
use tracing::{debug, error};

use super::{
    error::{AuthFlow, LOGIN_REQUIRED, failure},
    state::{AuthConfig, AuthState},
    types::{FailureResponse, LogoutResponse, SessionIdentity, SessionResponse},
};

pub const SESSION_COOKIE_NAME: &str = "user_session";

#[derive(Debug, Error)]
pub enum CookieError {
    #[error("failed to encode session identity: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("invalid cookie header: {0}")]
    Header(#[from] InvalidHeaderValue),
}

/// Request-scoped session identity, read from the `user_session` cookie.
///
/// Extraction never fails: a missing or unreadable cookie is no session.
#[derive(Clone, Debug, Default)]
pub struct SessionContext(Option<SessionIdentity>);

impl SessionContext {
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self(read_session(headers))
    }

    #[must_use]
    pub fn identity(&self) -> Option<&SessionIdentity> {
        self.0.as_ref()
    }

    /// # Errors
    /// Returns a `401` response when there is no session.
    pub fn require(self) -> Result<SessionIdentity, Response> {
        self.0
            .ok_or_else(|| failure(StatusCode::UNAUTHORIZED, LOGIN_REQUIRED))
    }
}

impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

pub(super) fn encode_identity(identity: &SessionIdentity) -> Result<String, serde_json::Error> {
    let json = serde_json::to_vec(identity)?;
    Ok(Base64UrlUnpadded::encode_string(&json))
}

pub(super) fn decode_identity(value: &str) -> Option<SessionIdentity> {
    let json = Base64UrlUnpadded::decode_vec(value).ok()?;
    serde_json::from_slice(&json).ok()
}

/// Build the `HttpOnly` session cookie for `identity`.
pub(super) fn session_cookie(
    config: &AuthConfig,
    identity: &SessionIdentity,
) -> Result<HeaderValue, CookieError> {
    let value = encode_identity(identity)?;
    let ttl_seconds = config.session_ttl_seconds();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}"
    );
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    Ok(HeaderValue::from_str(&cookie)?)
}

fn clear_session_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn extract_session_value(headers: &HeaderMap) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let (Some(key), Some(val)) = (parts.next(), parts.next()) else {
                continue;
            };
            if key.trim() == SESSION_COOKIE_NAME {
                return Some(val.trim().to_string());
            }
        }
    }
    None
}

/// Decode the session cookie; absent or malformed cookies yield `None`.
pub(crate) fn read_session(headers: &HeaderMap) -> Option<SessionIdentity> {
    let value = extract_session_value(headers)?;
    if value.is_empty() {
        return None;
    }
    let identity = decode_identity(&value);
    if identity.is_none() {
        debug!("ignoring malformed session cookie");
    }
    identity
}

/// `200` with `body` and the session cookie for `identity`.
pub(super) fn issue_session<T: Serialize>(
    config: &AuthConfig,
    identity: &SessionIdentity,
    flow: AuthFlow,
    body: T,
) -> Response {
    match session_cookie(config, identity) {
        Ok(cookie) => {
            let mut headers = HeaderMap::new();
            headers.insert(SET_COOKIE, cookie);
            (StatusCode::OK, headers, Json(body)).into_response()
        }
        Err(err) => {
            error!("Failed to build session cookie: {err}");
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                flow.unavailable_message(),
            )
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/auth/session",
    responses(
        (status = 200, description = "Session is active", body = SessionResponse),
        (status = 204, description = "No active session")
    ),
    tag = "auth"
)]
pub async fn session(session: SessionContext) -> impl IntoResponse {
    match session.identity() {
        Some(identity) => (
            StatusCode::OK,
            Json(SessionResponse {
                success: true,
                user: identity.clone(),
            }),
        )
            .into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current identity", body = SessionResponse),
        (status = 401, description = "Not logged in", body = FailureResponse)
    ),
    tag = "auth"
)]
pub async fn me(session: SessionContext) -> Response {
    match session.require() {
        Ok(user) => (
            StatusCode::OK,
            Json(SessionResponse {
                success: true,
                user,
            }),
        )
            .into_response(),
        Err(response) => response,
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Session cookie cleared", body = LogoutResponse)
    ),
    tag = "auth"
)]
pub async fn logout(auth_state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    match clear_session_cookie(auth_state.config()) {
        Ok(cookie) => {
            headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to build clearing cookie: {err}"),
    }
    (
        StatusCode::OK,
        headers,
        Json(LogoutResponse { success: true }),
    )
}
