//! Student and staff authentication.
//!
//! Students log in with roll number and password, admins and mentors with
//! username and password. A successful login sets the `user_session` cookie;
//! registration never does.
//!
//! > **Warning:** passwords are stored and compared in plaintext.

pub mod admin_login;
pub mod credentials;
pub mod error;
pub mod login;
pub mod register;
pub mod session;
mod state;
pub mod types;

pub use error::{AuthError, AuthFlow, failure};
pub use session::SessionContext;
pub use state::{AuthConfig, AuthState, Environment};

/// Strip surrounding whitespace; absent fields become empty.
fn trimmed(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}
