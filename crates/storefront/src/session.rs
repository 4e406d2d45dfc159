//! Credential and user persistence.
//!
//! Stores the bearer token, refresh token and signed-in user profile under
//! [`keys::ACCESS_TOKEN`], [`keys::REFRESH_TOKEN`] and [`keys::USER`].
//! Tokens leave storage wrapped in [`SecretString`] so they never end up in
//! logs through `Debug`.

use std::sync::Arc;

use lecas_core::StoredUser;
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, warn};

use crate::events::{ChangeNotifier, StoreEvent};
use crate::storage::{self, KeyValueStore, StorageError, keys};

/// Session credentials over a key-value store.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    notifier: ChangeNotifier,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Create a session store.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>, notifier: ChangeNotifier) -> Self {
        Self { storage, notifier }
    }

    /// The stored bearer token.
    #[must_use]
    pub fn access_token(&self) -> Option<SecretString> {
        self.read_secret(keys::ACCESS_TOKEN)
    }

    /// The stored refresh token.
    #[must_use]
    pub fn refresh_token(&self) -> Option<SecretString> {
        self.read_secret(keys::REFRESH_TOKEN)
    }

    /// The stored user profile. An unparseable profile reads as none.
    #[must_use]
    pub fn user(&self) -> Option<StoredUser> {
        storage::read_json(self.storage.as_ref(), keys::USER)
    }

    /// Whether a bearer token is stored.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    /// Store new credentials.
    ///
    /// The refresh token is only replaced when one is given; the auth
    /// service may rotate it or keep the old one valid.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if either token cannot be written.
    pub fn set_tokens(
        &self,
        access_token: &SecretString,
        refresh_token: Option<&SecretString>,
    ) -> Result<(), StorageError> {
        self.storage
            .set(keys::ACCESS_TOKEN, access_token.expose_secret())?;
        if let Some(refresh_token) = refresh_token {
            self.storage
                .set(keys::REFRESH_TOKEN, refresh_token.expose_secret())?;
        }
        self.notifier.notify(StoreEvent::SessionUpdated);
        Ok(())
    }

    /// Store the signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the profile cannot be written.
    pub fn set_user(&self, user: &StoredUser) -> Result<(), StorageError> {
        storage::write_json(self.storage.as_ref(), keys::USER, user)?;
        self.notifier.notify(StoreEvent::SessionUpdated);
        Ok(())
    }

    /// Remove all credentials and the user profile.
    ///
    /// Subscribers receive [`StoreEvent::SessionCleared`] and should send the
    /// user back to sign-in.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if a key cannot be removed.
    pub fn clear(&self) -> Result<(), StorageError> {
        for key in [keys::ACCESS_TOKEN, keys::REFRESH_TOKEN, keys::USER] {
            self.storage.remove(key)?;
        }
        info!("Session cleared");
        self.notifier.notify(StoreEvent::SessionCleared);
        Ok(())
    }

    fn read_secret(&self, key: &str) -> Option<SecretString> {
        match self.storage.get(key) {
            Ok(value) => value
                .filter(|v| !v.is_empty())
                .map(SecretString::from),
            Err(e) => {
                warn!(key, error = %e, "Failed to read credential");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use lecas_core::UserRole;

    use super::*;
    use crate::storage::MemoryStore;

    fn store() -> (SessionStore, Arc<MemoryStore>, ChangeNotifier) {
        let storage = Arc::new(MemoryStore::new());
        let notifier = ChangeNotifier::new();
        let session = SessionStore::new(storage.clone(), notifier.clone());
        (session, storage, notifier)
    }

    fn user() -> StoredUser {
        StoredUser {
            id: "u-1".to_string(),
            email: "linh@lecas.vn".to_string(),
            full_name: Some("Linh Tran".to_string()),
            role: UserRole::Admin,
        }
    }

    #[test]
    fn test_set_tokens_keeps_refresh_when_absent() {
        let (session, _, _) = store();

        session
            .set_tokens(
                &SecretString::from("access-1"),
                Some(&SecretString::from("refresh-1")),
            )
            .unwrap();
        session
            .set_tokens(&SecretString::from("access-2"), None)
            .unwrap();

        assert_eq!(session.access_token().unwrap().expose_secret(), "access-2");
        assert_eq!(session.refresh_token().unwrap().expose_secret(), "refresh-1");
        assert!(session.is_authenticated());
    }

    #[test]
    fn test_clear_removes_everything() {
        let (session, storage, notifier) = store();
        session
            .set_tokens(
                &SecretString::from("a"),
                Some(&SecretString::from("r")),
            )
            .unwrap();
        session.set_user(&user()).unwrap();
        let mut rx = notifier.subscribe();

        session.clear().unwrap();

        assert!(!session.is_authenticated());
        assert!(session.refresh_token().is_none());
        assert!(session.user().is_none());
        assert!(storage.is_empty());
        assert_eq!(rx.try_recv().unwrap(), StoreEvent::SessionCleared);
    }

    #[test]
    fn test_user_round_trip() {
        let (session, _, _) = store();
        session.set_user(&user()).unwrap();
        assert_eq!(session.user(), Some(user()));
    }

    #[test]
    fn test_bad_user_json_reads_as_none() {
        let (session, storage, _) = store();
        storage.set(keys::USER, "{\"id\": 5").unwrap();
        assert!(session.user().is_none());
    }

    #[test]
    fn test_empty_token_is_not_a_session() {
        let (session, storage, _) = store();
        storage.set(keys::ACCESS_TOKEN, "").unwrap();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_debug_does_not_leak_tokens() {
        let (session, _, _) = store();
        session
            .set_tokens(&SecretString::from("very-secret"), None)
            .unwrap();
        let debug = format!("{session:?}");
        assert!(!debug.contains("very-secret"));
    }
}
