use secrecy::SecretString;

pub const DEFAULT_USERS_COLLECTION: &str = "users";
pub const DEFAULT_ADMINS_COLLECTION: &str = "admins";

/// Store connection settings shared by every action.
#[derive(Clone)]
pub struct GlobalArgs {
    pub store_url: String,
    pub appwrite_project_id: Option<String>,
    pub appwrite_api_key: Option<SecretString>,
    pub appwrite_database_id: Option<String>,
    pub users_collection: String,
    pub admins_collection: String,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(store_url: String) -> Self {
        Self {
            store_url,
            appwrite_project_id: None,
            appwrite_api_key: None,
            appwrite_database_id: None,
            users_collection: DEFAULT_USERS_COLLECTION.to_string(),
            admins_collection: DEFAULT_ADMINS_COLLECTION.to_string(),
        }
    }

    pub fn set_api_key(&mut self, api_key: SecretString) {
        self.appwrite_api_key = Some(api_key);
    }
}

impl std::fmt::Debug for GlobalArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalArgs")
            .field("store_url", &self.store_url)
            .field("appwrite_project_id", &self.appwrite_project_id)
            .field(
                "appwrite_api_key",
                &self.appwrite_api_key.as_ref().map(|_| "***"),
            )
            .field("appwrite_database_id", &self.appwrite_database_id)
            .field("users_collection", &self.users_collection)
            .field("admins_collection", &self.admins_collection)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_global_args() {
        let mut args = GlobalArgs::new("memory://".to_string());
        assert_eq!(args.store_url, "memory://");
        assert_eq!(args.users_collection, "users");
        assert_eq!(args.admins_collection, "admins");
        assert!(args.appwrite_api_key.is_none());

        args.set_api_key(SecretString::from("top-secret".to_string()));
        assert_eq!(
            args.appwrite_api_key.as_ref().map(ExposeSecret::expose_secret),
            Some("top-secret")
        );
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let mut args = GlobalArgs::new("https://cloud.appwrite.io/v1".to_string());
        args.set_api_key(SecretString::from("top-secret".to_string()));
        let debug = format!("{args:?}");
        assert!(!debug.contains("top-secret"));
        assert!(debug.contains("***"));
    }
}
