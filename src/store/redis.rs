//! Redis-backed credential store
//!
//! Each user lives in a hash keyed `mosq.<username>` with fields `auth`
//! (the `salt:hexdigest` credential) and `acl` (the topic filter).

use super::CredentialStore;
use crate::config::RedisOptions;
use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::debug;

const KEY_PREFIX: &str = "mosq.";

pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connect to the configured server. The connection manager reconnects
    /// transparently; a failed command during an outage surfaces as an error
    /// and the callbacks collapse it to a denial.
    pub async fn connect(options: &RedisOptions) -> Result<Self> {
        let url = format!("redis://{}:{}/", options.host, options.port);
        let client = redis::Client::open(url.as_str())
            .with_context(|| format!("invalid redis url: {url}"))?;
        let conn = client
            .get_connection_manager()
            .await
            .with_context(|| format!("failed to connect to redis at {url}"))?;

        debug!(host = %options.host, port = options.port, "redis store initialized");

        Ok(Self { conn })
    }

    fn key(username: &str) -> String {
        format!("{KEY_PREFIX}{username}")
    }
}

#[async_trait]
impl CredentialStore for RedisStore {
    async fn fetch_auth(&self, username: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let auth: Option<String> = conn
            .hget(Self::key(username), "auth")
            .await
            .context("auth hash lookup failed")?;
        Ok(auth)
    }

    async fn fetch_acl(&self, username: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let acl: Option<String> = conn
            .hget(Self::key(username), "acl")
            .await
            .context("acl hash lookup failed")?;
        Ok(acl)
    }

    async fn store_user(&self, username: &str, auth: &str, acl: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .hset_multiple(Self::key(username), &[("auth", auth), ("acl", acl)])
            .await
            .context("user hash write failed")?;
        Ok(())
    }

    fn name(&self) -> &str {
        "redis"
    }
}
