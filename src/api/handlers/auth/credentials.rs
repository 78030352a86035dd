//! Credential checks against the document store.
//!
//! Passwords are compared by exact string equality inside the store query.

use super::error::{AuthError, MIN_PASSWORD_CHARS};
use crate::store::{
    AdminRecord, Collection, DocumentStore, Equal, Field, NewUser, UserRecord, records::to_data,
};
use tracing::{debug, instrument};

/// Find the student with this roll number and password.
///
/// # Errors
/// [`AuthError::MissingFields`] for empty input, [`AuthError::InvalidCredentials`]
/// when nothing matches, [`AuthError::Store`] when the lookup fails.
#[instrument(skip(store, password))]
pub async fn login(
    store: &dyn DocumentStore,
    roll: &str,
    password: &str,
) -> Result<UserRecord, AuthError> {
    if roll.is_empty() || password.is_empty() {
        return Err(AuthError::MissingFields);
    }

    let found = store
        .list(
            Collection::Users,
            &[Equal::new(Field::Roll, roll), Equal::new(Field::Pass, password)],
        )
        .await?;

    // Duplicates cannot exist behind the unique index; take the first match.
    match found.documents.first() {
        Some(document) => Ok(document.decode()?),
        None => {
            debug!("no student matches roll {roll}");
            Err(AuthError::InvalidCredentials)
        }
    }
}

/// Find the admin or mentor with this username and password.
///
/// # Errors
/// Same as [`login`].
#[instrument(skip(store, password))]
pub async fn admin_login(
    store: &dyn DocumentStore,
    username: &str,
    password: &str,
) -> Result<AdminRecord, AuthError> {
    if username.is_empty() || password.is_empty() {
        return Err(AuthError::MissingFields);
    }

    let found = store
        .list(
            Collection::Admins,
            &[
                Equal::new(Field::Username, username),
                Equal::new(Field::Pass, password),
            ],
        )
        .await?;

    match found.documents.first() {
        Some(document) => Ok(document.decode()?),
        None => {
            debug!("no admin matches username {username}");
            Err(AuthError::InvalidCredentials)
        }
    }
}

/// Create a student account. No session is issued.
///
/// Returns the id of the new record.
///
/// # Errors
/// [`AuthError::MissingFields`], [`AuthError::WeakPassword`],
/// [`AuthError::DuplicateRoll`] when the roll exists,
/// [`AuthError::AlreadyRegistered`] when the insert hits a unique index,
/// [`AuthError::Store`] otherwise.
#[instrument(skip(store, user), fields(roll = %user.roll))]
pub async fn register(store: &dyn DocumentStore, user: NewUser) -> Result<String, AuthError> {
    if [&user.name, &user.roll, &user.username, &user.phone, &user.pass]
        .iter()
        .any(|value| value.is_empty())
    {
        return Err(AuthError::MissingFields);
    }

    if user.pass.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AuthError::WeakPassword);
    }

    let existing = store
        .list(Collection::Users, &[Equal::new(Field::Roll, user.roll.as_str())])
        .await?;
    if existing.total > 0 || !existing.documents.is_empty() {
        return Err(AuthError::DuplicateRoll);
    }

    let document = store
        .create(Collection::Users, to_data(&user)?)
        .await
        .map_err(|err| {
            if err.is_conflict() {
                debug!("insert rejected by unique index: {err}");
                AuthError::AlreadyRegistered
            } else {
                AuthError::Store(err)
            }
        })?;

    Ok(document.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{AdminRole, MemoryStore, NewAdmin, StoreError, seed::seed_demo_data};
    use serde_json::Value;

    fn student(roll: &str, email: &str, pass: &str) -> NewUser {
        NewUser {
            name: "রহিম উদ্দিন".to_string(),
            roll: roll.to_string(),
            pass: pass.to_string(),
            username: email.to_string(),
            phone: "01711111111".to_string(),
        }
    }

    #[tokio::test]
    async fn login_matches_roll_and_password() -> anyhow::Result<()> {
        let store = MemoryStore::default();
        seed_demo_data(&store).await?;

        let user = login(&store, "2024001", "password123").await?;
        assert_eq!(user.name, "মুহাম্মদ করিম");
        assert_eq!(user.roll, "2024001");

        assert!(matches!(
            login(&store, "2024001", "wrong").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            login(&store, "", "password123").await,
            Err(AuthError::MissingFields)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn admin_login_is_keyed_on_username() -> anyhow::Result<()> {
        let store = MemoryStore::default();
        seed_demo_data(&store).await?;

        let admin = admin_login(&store, "mentor1", "password123").await?;
        assert_eq!(admin.name, "শিক্ষক");

        assert!(matches!(
            admin_login(&store, "admin", "password123").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            admin_login(&store, "admin", "").await,
            Err(AuthError::MissingFields)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn admin_with_unknown_role_names_the_document() -> anyhow::Result<()> {
        let store = MemoryStore::default();
        let mut data = to_data(&NewAdmin {
            username: "head".to_string(),
            pass: "password123".to_string(),
            name: "Head".to_string(),
            role: AdminRole::Admin,
        })?;
        data.insert("role".to_string(), Value::String("Admin".to_string()));
        let document = store.create(Collection::Admins, data).await?;

        let result = admin_login(&store, "head", "password123").await;
        assert!(matches!(
            result,
            Err(AuthError::Store(StoreError::Record { ref id, .. })) if *id == document.id
        ));
        Ok(())
    }

    #[tokio::test]
    async fn register_then_login() -> anyhow::Result<()> {
        let store = MemoryStore::default();

        let id = register(&store, student("9999001", "new@examify.com", "secret1")).await?;
        let user = login(&store, "9999001", "secret1").await?;
        assert_eq!(user.id, id);
        Ok(())
    }

    #[tokio::test]
    async fn register_validates_input() {
        let store = MemoryStore::default();

        let mut missing = student("1", "a@examify.com", "secret1");
        missing.phone = String::new();
        assert!(matches!(
            register(&store, missing).await,
            Err(AuthError::MissingFields)
        ));

        assert!(matches!(
            register(&store, student("1", "a@examify.com", "12345")).await,
            Err(AuthError::WeakPassword)
        ));

        // Six Bengali digits are six characters even though they take more bytes.
        assert!(
            register(&store, student("1", "a@examify.com", "১২৩৪৫৬"))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn register_rejects_duplicates() -> anyhow::Result<()> {
        let store = MemoryStore::default();
        register(&store, student("7", "first@examify.com", "secret1")).await?;

        assert!(matches!(
            register(&store, student("7", "second@examify.com", "secret1")).await,
            Err(AuthError::DuplicateRoll)
        ));
        assert!(matches!(
            register(&store, student("8", "first@examify.com", "secret1")).await,
            Err(AuthError::AlreadyRegistered)
        ));
        Ok(())
    }
}
