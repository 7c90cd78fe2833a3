//! MySQL-backed credential store
//!
//! Expects the conventional schema:
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS users (
//!     username VARCHAR(256) NOT NULL,
//!     auth VARCHAR(1024) NOT NULL,
//!     acl VARCHAR(256),
//!     PRIMARY KEY(username));
//! ```

use super::CredentialStore;
use crate::config::MysqlOptions;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use tracing::debug;

/// Connection pool size. Callbacks hold a connection only for the duration
/// of a single query.
const POOL_SIZE: u32 = 5;

pub struct MysqlStore {
    pool: MySqlPool,
}

impl MysqlStore {
    /// Connect a pool against the configured server.
    pub async fn connect(options: &MysqlOptions) -> Result<Self> {
        let connect = MySqlConnectOptions::new()
            .host(&options.host)
            .port(options.port)
            .username(&options.user)
            .password(&options.password)
            .database(&options.database);

        let pool = MySqlPoolOptions::new()
            .max_connections(POOL_SIZE)
            .connect_with(connect)
            .await
            .with_context(|| {
                format!("failed to connect to mysql at {}:{}", options.host, options.port)
            })?;

        debug!(host = %options.host, port = options.port, "mysql store initialized");

        Ok(Self { pool })
    }
}

#[async_trait]
impl CredentialStore for MysqlStore {
    async fn fetch_auth(&self, username: &str) -> Result<Option<String>> {
        let auth: Option<String> =
            sqlx::query_scalar("SELECT auth FROM users WHERE username = ?")
                .bind(username)
                .fetch_optional(&self.pool)
                .await
                .context("auth lookup query failed")?;
        Ok(auth)
    }

    async fn fetch_acl(&self, username: &str) -> Result<Option<String>> {
        // acl is a nullable column: distinguish "no row" from "row, NULL acl"
        let acl: Option<Option<String>> =
            sqlx::query_scalar("SELECT acl FROM users WHERE username = ?")
                .bind(username)
                .fetch_optional(&self.pool)
                .await
                .context("acl lookup query failed")?;
        Ok(acl.flatten())
    }

    async fn store_user(&self, username: &str, auth: &str, acl: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (username, auth, acl) VALUES (?, ?, ?) \
             ON DUPLICATE KEY UPDATE auth = VALUES(auth), acl = VALUES(acl)",
        )
        .bind(username)
        .bind(auth)
        .bind(acl)
        .execute(&self.pool)
        .await
        .context("user upsert failed")?;
        Ok(())
    }

    fn name(&self) -> &str {
        "mysql"
    }
}
