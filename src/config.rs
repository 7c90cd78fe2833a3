//! Configuration types for the auth plugin
//!
//! Two input shapes feed the same typed configuration: a JSON file in the
//! embedding application's hands, or the `key value` option pairs the broker
//! collects from `auth_opt_<key> <value>` lines in its own config file.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Prefix the broker uses for plugin options in its config file.
pub const AUTH_OPT_PREFIX: &str = "auth_opt_";

/// Option key that selects the backend. Consumed during config construction
/// and never visible to the backend itself.
pub const BACKEND_KEY: &str = "backend";

/// Plugin configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case", default)]
pub struct PluginConfig {
    /// Which credential store backs the callbacks
    pub backend: BackendConfig,

    /// What to do when an authenticated user has no stored topic filter
    pub missing_acl: MissingAclPolicy,

    /// Pre-shared key returned by `psk_key_get` (none = PSK unsupported)
    pub psk_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum BackendConfig {
    /// MySQL `users(username, auth, acl)` table
    Mysql(MysqlOptions),

    /// Redis `mosq.<username>` hash with `auth` and `acl` fields
    Redis(RedisOptions),

    /// Logging stub that permits everything
    #[default]
    Test,
}

/// Policy for an authenticated user whose record has no topic filter.
///
/// Historical deployments disagreed here: most refused access, one revision
/// granted it. Deny is the default; Allow exists for compatibility with
/// stores provisioned under the permissive behavior.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MissingAclPolicy {
    #[default]
    Deny,
    Allow,
}

/// MySQL connection options
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", default)]
pub struct MysqlOptions {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub port: u16,
}

impl Default for MysqlOptions {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            user: "root".to_string(),
            password: "password".to_string(),
            database: "mydb".to_string(),
            port: 3306,
        }
    }
}

impl MysqlOptions {
    /// Build from broker options (`mysql_host`, `mysql_user`, ...),
    /// falling back to defaults for missing keys.
    pub fn from_options(opts: &PluginOptions) -> Result<Self> {
        let mut out = Self::default();
        if let Some(host) = opts.get("mysql_host") {
            out.host = host.to_string();
        }
        if let Some(user) = opts.get("mysql_user") {
            out.user = user.to_string();
        }
        if let Some(password) = opts.get("mysql_password") {
            out.password = password.to_string();
        }
        if let Some(database) = opts.get("mysql_database") {
            out.database = database.to_string();
        }
        if let Some(port) = opts.get("mysql_port") {
            out.port = port
                .parse()
                .with_context(|| format!("invalid mysql_port value: {port}"))?;
        }
        Ok(out)
    }
}

/// Redis connection options
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", default)]
pub struct RedisOptions {
    pub host: String,
    pub port: u16,
}

impl Default for RedisOptions {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
        }
    }
}

impl RedisOptions {
    pub fn from_options(opts: &PluginOptions) -> Result<Self> {
        let mut out = Self::default();
        if let Some(host) = opts.get("redis_host") {
            out.host = host.to_string();
        }
        if let Some(port) = opts.get("redis_port") {
            out.port = port
                .parse()
                .with_context(|| format!("invalid redis_port value: {port}"))?;
        }
        Ok(out)
    }
}

/// Key/value option pairs as handed over by the broker's plugin interface.
#[derive(Debug, Clone, Default)]
pub struct PluginOptions {
    entries: HashMap<String, String>,
}

impl PluginOptions {
    /// Build from already-stripped key/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Collect `auth_opt_<key> <value>` lines from a broker config file.
    ///
    /// Everything else in the file is ignored; the `auth_opt_` prefix is
    /// stripped from the keys.
    pub fn from_conf_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read broker config: {}", path.display()))?;

        let mut entries = HashMap::new();
        for line in contents.lines() {
            let line = line.trim();
            let Some(rest) = line.strip_prefix(AUTH_OPT_PREFIX) else {
                continue;
            };
            let mut parts = rest.splitn(2, char::is_whitespace);
            let key = parts.next().unwrap_or_default();
            let Some(value) = parts.next() else {
                bail!("option line has no value: {line}");
            };
            entries.insert(key.to_string(), value.trim().to_string());
        }

        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl PluginConfig {
    /// Load from a JSON config file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Build from broker options, consuming the reserved backend key.
    pub fn from_options(mut opts: PluginOptions) -> Result<Self> {
        let backend = match opts.remove(BACKEND_KEY).as_deref() {
            Some("mysql") => BackendConfig::Mysql(MysqlOptions::from_options(&opts)?),
            Some("redis") => BackendConfig::Redis(RedisOptions::from_options(&opts)?),
            Some("test") => BackendConfig::Test,
            Some(other) => bail!("unknown backend: {other}"),
            None => bail!("no backend selected (missing {AUTH_OPT_PREFIX}{BACKEND_KEY})"),
        };

        let missing_acl = match opts.get("acl_missing") {
            Some("allow") => MissingAclPolicy::Allow,
            Some("deny") | None => MissingAclPolicy::Deny,
            Some(other) => bail!("unknown acl_missing value: {other}"),
        };

        Ok(Self {
            backend,
            missing_acl,
            psk_key: opts.remove("psk_key"),
        })
    }

    /// Build from a broker config file's `auth_opt_` lines.
    pub fn from_conf_file(path: &Path) -> Result<Self> {
        Self::from_options(PluginOptions::from_conf_file(path)?)
    }
}
