//! Request/response types for auth endpoints.
//!
//! Request fields are optional so that missing keys surface as a validation
//! failure with a localized message instead of a JSON rejection.

use crate::store::{AdminRecord, AdminRole, UserRecord};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub roll_number: Option<String>,
    pub password: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub roll_number: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
pub struct AdminLoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Identity carried by the `user_session` cookie.
///
/// For admins and mentors `roll` holds the username.
#[derive(ToSchema, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SessionIdentity {
    pub uuid: String,
    pub name: String,
    pub roll: String,
}

impl From<&UserRecord> for SessionIdentity {
    fn from(user: &UserRecord) -> Self {
        Self {
            uuid: user.id.clone(),
            name: user.name.clone(),
            roll: user.roll.clone(),
        }
    }
}

impl From<&AdminRecord> for SessionIdentity {
    fn from(admin: &AdminRecord) -> Self {
        Self {
            uuid: admin.id.clone(),
            name: admin.name.clone(),
            roll: admin.username.clone(),
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AdminSummary {
    pub uuid: String,
    pub name: String,
    pub username: String,
    pub role: AdminRole,
}

impl From<&AdminRecord> for AdminSummary {
    fn from(admin: &AdminRecord) -> Self {
        Self {
            uuid: admin.id.clone(),
            name: admin.name.clone(),
            username: admin.username.clone(),
            role: admin.role,
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub success: bool,
    pub user: SessionIdentity,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct AdminLoginResponse {
    pub success: bool,
    pub admin: AdminSummary,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SessionResponse {
    pub success: bool,
    pub user: SessionIdentity,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LogoutResponse {
    pub success: bool,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct FailureResponse {
    pub success: bool,
    pub error: String,
}
