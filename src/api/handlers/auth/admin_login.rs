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
    types::{AdminLoginRequest, AdminLoginResponse, AdminSummary, FailureResponse, SessionIdentity},
};

#[utoipa::path(
    post,
    path = "/api/auth/admin-login",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "Admin or mentor logged in; sets the session cookie", body = AdminLoginResponse),
        (status = 400, description = "Username or password missing", body = FailureResponse),
        (status = 401, description = "Username or password wrong", body = FailureResponse),
        (status = 500, description = "Store failure", body = FailureResponse)
    ),
    tag = "auth"
)]
#[instrument(skip(auth_state, payload))]
pub async fn admin_login(
    auth_state: Extension<Arc<AuthState>>,
    payload: Result<Json<AdminLoginRequest>, JsonRejection>,
) -> Response {
    let flow = AuthFlow::AdminLogin;
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!("rejected admin login body: {rejection}");
            return AuthError::MissingFields.into_response_for(flow);
        }
    };

    let username = trimmed(request.username);
    let password = request.password.unwrap_or_default();

    match credentials::admin_login(auth_state.store(), &username, &password).await {
        Ok(admin) => {
            // Staff sessions reuse the student shape with the username as roll.
            let identity = SessionIdentity::from(&admin);
            let body = AdminLoginResponse {
                success: true,
                admin: AdminSummary::from(&admin),
            };
            issue_session(auth_state.config(), &identity, flow, body)
        }
        Err(err) => err.into_response_for(flow),
    }
}
