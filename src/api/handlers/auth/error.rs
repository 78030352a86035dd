//! Auth failures and their localized HTTP representation.

use super::types::FailureResponse;
use crate::store::StoreError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

pub const MIN_PASSWORD_CHARS: usize = 6;

pub(super) const LOGIN_REQUIRED: &str = "লগইন প্রয়োজন";

/// Which endpoint an outcome belongs to; messages differ per flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthFlow {
    Login,
    AdminLogin,
    Register,
}

impl AuthFlow {
    #[must_use]
    pub const fn unavailable_message(self) -> &'static str {
        match self {
            Self::Login => "লগইনে ত্রুটি হয়েছে",
            Self::AdminLogin => "অ্যাডমিন লগইনে ত্রুটি হয়েছে",
            Self::Register => "নিবন্ধনে ত্রুটি হয়েছে",
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("required fields are missing")]
    MissingFields,
    #[error("password is too short")]
    WeakPassword,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("roll number is already registered")]
    DuplicateRoll,
    /// The store rejected the insert on a unique index.
    #[error("roll number or email is already registered")]
    AlreadyRegistered,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingFields | Self::WeakPassword => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::DuplicateRoll | Self::AlreadyRegistered => StatusCode::CONFLICT,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub const fn message(&self, flow: AuthFlow) -> &'static str {
        match (self, flow) {
            (Self::MissingFields, AuthFlow::Login) => "রোল নম্বর এবং পাসওয়ার্ড প্রয়োজন",
            (Self::MissingFields, AuthFlow::AdminLogin) => {
                "ব্যবহারকারীর নাম এবং পাসওয়ার্ড প্রয়োজন"
            }
            (Self::MissingFields, AuthFlow::Register) => "সব ফিল্ড প্রয়োজন",
            (Self::WeakPassword, _) => "পাসওয়ার্ড কমপক্ষে ৬ অক্ষর হতে হবে",
            (Self::InvalidCredentials, AuthFlow::AdminLogin) => "ব্যবহারকারীর নাম বা পাসওয়ার্ড ভুল",
            (Self::InvalidCredentials, _) => "রোল নম্বর বা পাসওয়ার্ড ভুল",
            (Self::DuplicateRoll, _) => "এই রোল নম্বর ইতিমধ্যে নিবন্ধিত",
            (Self::AlreadyRegistered, _) => "এই রোল নম্বর বা ইমেইল ইতিমধ্যে নিবন্ধিত",
            (Self::Store(_), flow) => flow.unavailable_message(),
        }
    }

    /// Render the failure body. Store errors are logged here and never leak
    /// to the client.
    #[must_use]
    pub fn into_response_for(self, flow: AuthFlow) -> Response {
        if let Self::Store(err) = &self {
            error!("{flow:?} failed: {err}");
        }
        failure(self.status(), self.message(flow))
    }
}

/// `{success: false, error}` with the given status.
pub fn failure(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(FailureResponse {
            success: false,
            error: message.to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses() {
        assert_eq!(AuthError::MissingFields.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::WeakPassword.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AuthError::InvalidCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::DuplicateRoll.status(), StatusCode::CONFLICT);
        assert_eq!(AuthError::AlreadyRegistered.status(), StatusCode::CONFLICT);
        assert_eq!(
            AuthError::Store(StoreError::Unavailable("down".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn messages_follow_flow() {
        assert_eq!(
            AuthError::MissingFields.message(AuthFlow::Login),
            "রোল নম্বর এবং পাসওয়ার্ড প্রয়োজন"
        );
        assert_eq!(
            AuthError::MissingFields.message(AuthFlow::Register),
            "সব ফিল্ড প্রয়োজন"
        );
        assert_eq!(
            AuthError::InvalidCredentials.message(AuthFlow::AdminLogin),
            "ব্যবহারকারীর নাম বা পাসওয়ার্ড ভুল"
        );
        assert_eq!(
            AuthError::Store(StoreError::Unavailable("connection refused".to_string()))
                .message(AuthFlow::Register),
            "নিবন্ধনে ত্রুটি হয়েছে"
        );
    }
}
