//! In-memory credential store

use super::CredentialStore;
use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct StoredUser {
    auth: String,
    acl: Option<String>,
}

/// Map-backed store for tests and self-contained embedders.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, StoredUser>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user with a credential but no topic filter.
    pub fn insert_without_acl(&self, username: &str, auth: &str) {
        self.users.write().insert(
            username.to_string(),
            StoredUser {
                auth: auth.to_string(),
                acl: None,
            },
        );
    }

    pub fn user_count(&self) -> usize {
        self.users.read().len()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn fetch_auth(&self, username: &str) -> Result<Option<String>> {
        Ok(self.users.read().get(username).map(|u| u.auth.clone()))
    }

    async fn fetch_acl(&self, username: &str) -> Result<Option<String>> {
        Ok(self
            .users
            .read()
            .get(username)
            .and_then(|u| u.acl.clone()))
    }

    async fn store_user(&self, username: &str, auth: &str, acl: &str) -> Result<()> {
        self.users.write().insert(
            username.to_string(),
            StoredUser {
                auth: auth.to_string(),
                acl: Some(acl.to_string()),
            },
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_and_fetch() {
        let store = MemoryStore::new();
        store.store_user("foo", "salt:abcd", "/foo/#").await.unwrap();

        assert_eq!(
            store.fetch_auth("foo").await.unwrap().as_deref(),
            Some("salt:abcd")
        );
        assert_eq!(
            store.fetch_acl("foo").await.unwrap().as_deref(),
            Some("/foo/#")
        );
        assert_eq!(store.fetch_auth("bar").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_overwrite_replaces_both_fields() {
        let store = MemoryStore::new();
        store.store_user("foo", "a:1", "/a/#").await.unwrap();
        store.store_user("foo", "b:2", "/b/#").await.unwrap();

        assert_eq!(store.fetch_auth("foo").await.unwrap().as_deref(), Some("b:2"));
        assert_eq!(store.fetch_acl("foo").await.unwrap().as_deref(), Some("/b/#"));
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn test_user_without_acl() {
        let store = MemoryStore::new();
        store.insert_without_acl("foo", "salt:abcd");

        assert!(store.fetch_auth("foo").await.unwrap().is_some());
        assert_eq!(store.fetch_acl("foo").await.unwrap(), None);
    }
}
