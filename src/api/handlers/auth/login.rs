use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::{
    credentials,
    error::{AuthError, AuthFlow},
    session::issue_session,
    state::AuthState,
    trimmed,
    types::{FailureResponse, LoginRequest, LoginResponse, SessionIdentity},
};

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; sets the session cookie", body = LoginResponse),
        (status = 400, description = "Roll number or password missing", body = FailureResponse),
        (status = 401, description = "Roll number or password wrong", body = FailureResponse),
        (status = 500, description = "Store failure", body = FailureResponse)
    ),
    tag = "auth"
)]
#[instrument(skip(auth_state, payload))]
pub async fn login(
    auth_state: Extension<Arc<AuthState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let flow = AuthFlow::Login;
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!("rejected login body: {rejection}");
            return AuthError::MissingFields.into_response_for(flow);
        }
    };

    let roll = trimmed(request.roll_number);
    let password = request.password.unwrap_or_default();

    match credentials::login(auth_state.store(), &roll, &password).await {
        Ok(user) => {
            let identity = SessionIdentity::from(&user);
            let body = LoginResponse {
                success: true,
                user: identity.clone(),
            };
            issue_session(auth_state.config(), &identity, flow, body)
        }
        Err(err) => err.into_response_for(flow),
    }
}
