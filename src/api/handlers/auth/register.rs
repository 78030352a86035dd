use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{
    credentials,
    error::{AuthError, AuthFlow},
    state::AuthState,
    trimmed,
    types::{FailureResponse, MessageResponse, RegisterRequest},
};
use crate::store::NewUser;

pub const REGISTERED_MESSAGE: &str = "নিবন্ধন সফল। এখন লগইন করুন।";

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Student registered", body = MessageResponse),
        (status = 400, description = "Missing fields or weak password", body = FailureResponse),
        (status = 409, description = "Roll number or email already registered", body = FailureResponse),
        (status = 500, description = "Store failure", body = FailureResponse)
    ),
    tag = "auth"
)]
#[instrument(skip(auth_state, payload))]
pub async fn register(
    auth_state: Extension<Arc<AuthState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Response {
    let flow = AuthFlow::Register;
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!("rejected register body: {rejection}");
            return AuthError::MissingFields.into_response_for(flow);
        }
    };

    let user = NewUser {
        name: trimmed(request.name),
        roll: trimmed(request.roll_number),
        pass: request.password.unwrap_or_default(),
        username: trimmed(request.email),
        phone: trimmed(request.phone),
    };

    match credentials::register(auth_state.store(), user).await {
        Ok(id) => {
            info!("Registered student {id}");
            (
                StatusCode::CREATED,
                Json(MessageResponse {
                    success: true,
                    message: REGISTERED_MESSAGE.to_string(),
                }),
            )
                .into_response()
        }
        Err(err) => err.into_response_for(flow),
    }
}
