//! # Examify (exam portal authentication)
//!
//! `examify` serves the authentication contract of the Examify exam portal:
//! student registration, student and admin login, and a cookie-held session
//! identity. Pages, forms and theming live in a separate frontend that only
//! talks to the HTTP routes exposed here.
//!
//! ## Credential store
//!
//! Users and admins live in a document store reached through
//! [`store::DocumentStore`]. The backend is chosen by the scheme of
//! `--store-url`:
//!
//! - `https://…`: a hosted Appwrite project (REST API, API key auth).
//! - `postgres://…`: `PostgreSQL` tables with unique indexes (`sql/schema.sql`).
//! - `memory://`: a process-local store, useful for demos and tests.
//!
//! Roll numbers and usernames are unique. Registration checks the roll before
//! inserting, but the store's unique constraint is the real guard: a conflict
//! raised by the insert is reported as `409 Conflict`.
//!
//! ## Sessions
//!
//! There is no server-side session table. Login sets the `user_session` cookie
//! to the JSON identity `{uuid, name, roll}` (base64url wrapped), `HttpOnly`,
//! `SameSite=Lax`, 7 days. A session cannot be revoked before it expires;
//! logout only asks the browser to drop the cookie.
//!
//! > **Warning:** passwords are stored and compared in plaintext to stay
//! > compatible with existing demo data.

pub mod api;
pub mod cli;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
