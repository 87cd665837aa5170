//! Account directory and session marker persisted as JSON values.

use crate::kv::KeyValueStore;
use ifx_core::PageError;
use ifx_core::PageResult;
use serde::Deserialize;
use serde::Serialize;

/// Key holding the serialized user directory.
pub const USERS_KEY: &str = "users";
/// Key holding the serialized session marker.
pub const SESSION_KEY: &str = "loggedInUser";

/// Registered user. The password is stored in plaintext on purpose: this is
/// a client-side demo account system, not a security mechanism.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub name: String,
    pub email: String,
    pub password: String,
    pub score: i64,
}

/// Repository over a key-value store. Corrupt persisted data reads as
/// empty/absent rather than propagating a failure.
#[derive(Debug, Clone)]
pub struct AccountStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> AccountStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The full directory; empty when the value is absent, unreadable, or
    /// not a JSON array of records.
    pub fn list_users(&self) -> Vec<UserRecord> {
        let raw = match self.store.get(USERS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(error) => {
                tracing::warn!(%error, "user directory unreadable; treating as empty");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<UserRecord>>(&raw) {
            Ok(users) => users,
            Err(error) => {
                tracing::warn!(%error, "user directory corrupt; treating as empty");
                Vec::new()
            }
        }
    }

    /// Overwrites the directory in a single synchronous write.
    pub fn save_users(&mut self, users: &[UserRecord]) -> PageResult<()> {
        let encoded = serde_json::to_string(users).map_err(|error| {
            PageError::new(
                "store.users_encode_failed",
                format!("failed to encode user directory: {error}"),
            )
        })?;
        self.store.set(USERS_KEY, &encoded)
    }

    /// Case-insensitive directory lookup by email.
    pub fn find_by_email(&self, email: &str) -> Option<UserRecord> {
        self.list_users()
            .into_iter()
            .find(|user| user.email.eq_ignore_ascii_case(email))
    }

    pub fn set_session(&mut self, user: &UserRecord) -> PageResult<()> {
        let encoded = serde_json::to_string(user).map_err(|error| {
            PageError::new(
                "store.session_encode_failed",
                format!("failed to encode session marker: {error}"),
            )
        })?;
        self.store.set(SESSION_KEY, &encoded)
    }

    /// The current session, absent (not an error) on any parse failure.
    pub fn get_session(&self) -> Option<UserRecord> {
        let raw = match self.store.get(SESSION_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(error) => {
                tracing::warn!(%error, "session marker unreadable; treating as absent");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(error) => {
                tracing::warn!(%error, "session marker corrupt; treating as absent");
                None
            }
        }
    }

    pub fn clear_session(&mut self) -> PageResult<()> {
        self.store.remove(SESSION_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::AccountStore;
    use super::SESSION_KEY;
    use super::USERS_KEY;
    use super::UserRecord;
    use crate::kv::MemoryStore;

    fn user(email: &str) -> UserRecord {
        UserRecord {
            name: "Sam".to_owned(),
            email: email.to_owned(),
            password: "secret1".to_owned(),
            score: 0,
        }
    }

    #[test]
    fn directory_roundtrips_passwords_verbatim() {
        let mut accounts = AccountStore::new(MemoryStore::new());
        let record = UserRecord {
            password: "p@ss word\u{00e9}".to_owned(),
            ..user("a@x.com")
        };
        assert_eq!(accounts.save_users(std::slice::from_ref(&record)), Ok(()));
        assert_eq!(accounts.list_users(), vec![record]);
    }

    #[test]
    fn corrupt_directory_reads_as_empty() {
        let mut seeded = MemoryStore::new();
        seeded.seed(USERS_KEY, "{not json");
        let accounts = AccountStore::new(seeded);
        assert!(accounts.list_users().is_empty());

        let mut seeded = MemoryStore::new();
        seeded.seed(USERS_KEY, "{\"an\":\"object\"}");
        let accounts = AccountStore::new(seeded);
        assert!(accounts.list_users().is_empty());
    }

    #[test]
    fn email_lookup_is_case_insensitive() {
        let mut accounts = AccountStore::new(MemoryStore::new());
        assert_eq!(accounts.save_users(&[user("Sam@Example.COM")]), Ok(()));
        assert!(accounts.find_by_email("sam@example.com").is_some());
        assert!(accounts.find_by_email("other@example.com").is_none());
    }

    #[test]
    fn session_laws() {
        let mut accounts = AccountStore::new(MemoryStore::new());
        assert_eq!(accounts.get_session(), None);

        let record = user("a@x.com");
        assert_eq!(accounts.set_session(&record), Ok(()));
        assert_eq!(accounts.get_session(), Some(record));

        assert_eq!(accounts.clear_session(), Ok(()));
        assert_eq!(accounts.get_session(), None);
    }

    #[test]
    fn corrupt_session_reads_as_absent() {
        let mut seeded = MemoryStore::new();
        seeded.seed(SESSION_KEY, "][");
        let accounts = AccountStore::new(seeded);
        assert_eq!(accounts.get_session(), None);
    }
}
