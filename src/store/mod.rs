//! Credential stores
//!
//! One record per username: a `salt:hexdigest` credential and an optional
//! topic filter. Runtime callbacks only ever read; the admin path writes.

mod memory;
mod mysql;
mod redis;

pub use memory::MemoryStore;
pub use mysql::MysqlStore;
pub use redis::RedisStore;

use crate::config::BackendConfig;
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Store seam shared by the MySQL, Redis, and in-memory backends.
///
/// Implementations must be safe for concurrent use: the broker may run
/// callbacks for many client connections at once against one store instance.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Stored `salt:hexdigest` credential for a username, if the user exists.
    async fn fetch_auth(&self, username: &str) -> Result<Option<String>>;

    /// Stored topic filter for a username, if one is set.
    async fn fetch_acl(&self, username: &str) -> Result<Option<String>>;

    /// Create or overwrite a user's credential and topic filter.
    async fn store_user(&self, username: &str, auth: &str, acl: &str) -> Result<()>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

/// Connect the store a backend configuration names.
///
/// The test backend carries no store; callers that need one (the admin CLI)
/// get an error rather than a silently inert handle.
pub async fn connect(backend: &BackendConfig) -> Result<Arc<dyn CredentialStore>> {
    match backend {
        BackendConfig::Mysql(opts) => Ok(Arc::new(MysqlStore::connect(opts).await?)),
        BackendConfig::Redis(opts) => Ok(Arc::new(RedisStore::connect(opts).await?)),
        BackendConfig::Test => bail!("test backend has no credential store"),
    }
}
