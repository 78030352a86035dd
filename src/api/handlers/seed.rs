use super::auth::{AuthState, failure, types::{FailureResponse, MessageResponse}};
use crate::store::seed::seed_demo_data;
use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{error, info, instrument};

#[utoipa::path(
    post,
    path = "/api/seed",
    responses(
        (status = 200, description = "Demo students and admins present", body = MessageResponse),
        (status = 500, description = "Seeding failed", body = FailureResponse)
    ),
    tag = "examify"
)]
#[instrument(skip(auth_state))]
pub async fn seed(auth_state: Extension<Arc<AuthState>>) -> Response {
    match seed_demo_data(auth_state.store()).await {
        Ok(report) => {
            info!(
                "Seeded {} students and {} admins",
                report.users_created, report.admins_created
            );
            (
                StatusCode::OK,
                Json(MessageResponse {
                    success: true,
                    message: "Database seeded successfully".to_string(),
                }),
            )
                .into_response()
        }
        Err(err) => {
            error!("Failed to seed database: {err}");
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to seed database")
        }
    }
}
