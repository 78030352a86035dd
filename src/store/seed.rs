//! Demo data for fresh installations.
//!
//! Each collection is only seeded while it is empty, so seeding twice leaves
//! the data untouched.

use super::{
    AdminRole, Collection, DocumentStore, NewAdmin, NewUser, StoreError, records::to_data,
};
use tracing::info;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users_created: usize,
    pub admins_created: usize,
}

fn demo_students() -> Vec<NewUser> {
    vec![
        NewUser {
            name: "মুহাম্মদ করিম".to_string(),
            roll: "2024001".to_string(),
            pass: "password123".to_string(),
            username: "karim@examify.com".to_string(),
            phone: "01700000001".to_string(),
        },
        NewUser {
            name: "ফাতিমা আক্তার".to_string(),
            roll: "2024002".to_string(),
            pass: "password123".to_string(),
            username: "fatima@examify.com".to_string(),
            phone: "01700000002".to_string(),
        },
    ]
}

fn demo_admins() -> Vec<NewAdmin> {
    vec![
        NewAdmin {
            username: "admin".to_string(),
            pass: "admin123".to_string(),
            name: "প্রশাসক".to_string(),
            role: AdminRole::Admin,
        },
        NewAdmin {
            username: "mentor1".to_string(),
            pass: "password123".to_string(),
            name: "শিক্ষক".to_string(),
            role: AdminRole::Mentor,
        },
    ]
}

/// Insert demo students and admins into empty collections.
///
/// # Errors
/// Returns the first store error encountered; documents inserted before the
/// failure are kept.
pub async fn seed_demo_data(store: &dyn DocumentStore) -> Result<SeedReport, StoreError> {
    let mut report = SeedReport::default();

    if store.list(Collection::Users, &[]).await?.total == 0 {
        for student in demo_students() {
            store.create(Collection::Users, to_data(&student)?).await?;
            report.users_created += 1;
        }
        info!("Sample students created");
    }

    if store.list(Collection::Admins, &[]).await?.total == 0 {
        for admin in demo_admins() {
            store.create(Collection::Admins, to_data(&admin)?).await?;
            report.admins_created += 1;
        }
        info!("Sample admins created");
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{AdminRecord, Equal, Field, MemoryStore};

    #[tokio::test]
    async fn seeds_empty_store_once() -> Result<(), StoreError> {
        let store = MemoryStore::default();

        let first = seed_demo_data(&store).await?;
        assert_eq!(
            first,
            SeedReport {
                users_created: 2,
                admins_created: 2
            }
        );

        let second = seed_demo_data(&store).await?;
        assert_eq!(second, SeedReport::default());
        assert_eq!(store.list(Collection::Users, &[]).await?.total, 2);

        let mentors = store
            .list(Collection::Admins, &[Equal::new(Field::Username, "mentor1")])
            .await?;
        let mentor: AdminRecord = mentors.documents[0].decode()?;
        assert_eq!(mentor.role, AdminRole::Mentor);
        Ok(())
    }

    #[tokio::test]
    async fn leaves_populated_collections_alone() -> Result<(), StoreError> {
        let store = MemoryStore::default();
        store
            .create(
                Collection::Admins,
                to_data(&NewAdmin {
                    username: "root".to_string(),
                    pass: "secret".to_string(),
                    name: "Root".to_string(),
                    role: AdminRole::Admin,
                })?,
            )
            .await?;

        let report = seed_demo_data(&store).await?;
        assert_eq!(report.users_created, 2);
        assert_eq!(report.admins_created, 0);
        assert_eq!(store.list(Collection::Admins, &[]).await?.total, 1);
        Ok(())
    }
}
