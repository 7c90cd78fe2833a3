//! Broker callback surface
//!
//! The host broker drives these callbacks: `security_init`/`security_cleanup`
//! around (re)loads, `unpwd_check` per connection attempt, `acl_check` per
//! publish/subscribe, and `psk_key_get` during TLS-PSK handshakes. Every
//! failure mode collapses to a boolean denial at this boundary; store errors
//! and malformed records are logged apart from ordinary denials so operators
//! can tell an outage from a bad password.

use crate::config::{BackendConfig, MissingAclPolicy, PluginConfig, PluginOptions};
use crate::hash;
use crate::store::{self, CredentialStore};
use crate::topic::{MqttTopicMatcher, TopicMatcher};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Access the broker is asking about in `acl_check`.
///
/// The integer codes match the broker's ACL constants for conversion at the
/// dispatch edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    None,
    Read,
    Write,
    Subscribe,
}

impl AccessLevel {
    /// Convert from the broker's integer code.
    pub fn from_broker(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::None),
            1 => Some(Self::Read),
            2 => Some(Self::Write),
            4 => Some(Self::Subscribe),
            _ => None,
        }
    }

    pub fn as_broker(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Read => 1,
            Self::Write => 2,
            Self::Subscribe => 4,
        }
    }
}

/// The callback contract the broker's plugin interface expects.
#[async_trait]
pub trait AuthPlugin: Send + Sync {
    /// Called when the broker (re)loads its security settings.
    async fn security_init(&self, _options: &PluginOptions, _reload: bool) -> Result<()> {
        Ok(())
    }

    /// Counterpart to [`security_init`](Self::security_init).
    async fn security_cleanup(&self, _reload: bool) -> Result<()> {
        Ok(())
    }

    /// Called when the broker unloads the plugin.
    async fn plugin_cleanup(&self) -> Result<()> {
        Ok(())
    }

    /// Verify a username/password pair. False denies the connection.
    async fn unpwd_check(&self, username: &str, password: &str) -> bool;

    /// Decide whether a client may perform `access` on `topic`.
    ///
    /// `payload` is present for publish checks on brokers that forward it;
    /// it never gates the decision here.
    async fn acl_check(
        &self,
        client_id: &str,
        username: Option<&str>,
        topic: &str,
        access: AccessLevel,
        payload: Option<&[u8]>,
    ) -> bool;

    /// Look up the pre-shared key for a TLS-PSK identity. None means PSK
    /// authentication is refused.
    async fn psk_key_get(&self, identity: &str, hint: &str) -> Option<String>;
}

/// Store-backed plugin: the MySQL and Redis variants share this logic, with
/// the store and topic matcher injected instead of living in process-global
/// state.
pub struct StorePlugin {
    store: Arc<dyn CredentialStore>,
    matcher: Arc<dyn TopicMatcher>,
    missing_acl: MissingAclPolicy,
    psk_key: Option<String>,
}

impl StorePlugin {
    pub fn new(store: Arc<dyn CredentialStore>, config: &PluginConfig) -> Self {
        Self::with_matcher(store, Arc::new(MqttTopicMatcher::new()), config)
    }

    /// Use the embedding environment's own topic matcher.
    pub fn with_matcher(
        store: Arc<dyn CredentialStore>,
        matcher: Arc<dyn TopicMatcher>,
        config: &PluginConfig,
    ) -> Self {
        Self {
            store,
            matcher,
            missing_acl: config.missing_acl,
            psk_key: config.psk_key.clone(),
        }
    }
}

#[async_trait]
impl AuthPlugin for StorePlugin {
    async fn security_init(&self, _options: &PluginOptions, reload: bool) -> Result<()> {
        debug!(store = %self.store.name(), reload, "security init");
        Ok(())
    }

    async fn security_cleanup(&self, reload: bool) -> Result<()> {
        debug!(store = %self.store.name(), reload, "security cleanup");
        Ok(())
    }

    async fn unpwd_check(&self, username: &str, password: &str) -> bool {
        let stored = match self.store.fetch_auth(username).await {
            Ok(Some(stored)) => stored,
            Ok(None) => {
                debug!(username, "auth: no such user");
                return false;
            }
            Err(e) => {
                warn!(username, store = %self.store.name(), error = %e, "auth: credential lookup failed");
                return false;
            }
        };

        match hash::verify_credential(&stored, password) {
            Ok(ok) => {
                debug!(username, matches = ok, "auth: password checked");
                ok
            }
            Err(e) => {
                warn!(username, error = %e, "auth: malformed stored credential");
                false
            }
        }
    }

    async fn acl_check(
        &self,
        client_id: &str,
        username: Option<&str>,
        topic: &str,
        access: AccessLevel,
        _payload: Option<&[u8]>,
    ) -> bool {
        let Some(username) = username else {
            debug!(client_id, topic, "acl: no username, authentication required");
            return false;
        };

        let pattern = match self.store.fetch_acl(username).await {
            Ok(pattern) => pattern,
            Err(e) => {
                warn!(username, store = %self.store.name(), error = %e, "acl: pattern lookup failed");
                return false;
            }
        };

        // An empty stored value counts as missing
        let Some(pattern) = pattern.filter(|p| !p.is_empty()) else {
            let allowed = self.missing_acl == MissingAclPolicy::Allow;
            debug!(username, topic, allowed, "acl: no pattern for user");
            return allowed;
        };

        let matches = self.matcher.matches(&pattern, topic);
        debug!(
            client_id,
            username,
            topic,
            pattern = %pattern,
            access = ?access,
            matches,
            "acl: pattern checked"
        );
        matches
    }

    async fn psk_key_get(&self, identity: &str, hint: &str) -> Option<String> {
        debug!(identity, hint, configured = self.psk_key.is_some(), "psk lookup");
        self.psk_key.clone()
    }
}

/// Test stub: logs every callback with its arguments and permits everything.
pub struct StubPlugin {
    psk_key: String,
}

impl StubPlugin {
    pub fn new() -> Self {
        Self {
            psk_key: "0123456789".to_string(),
        }
    }
}

impl Default for StubPlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthPlugin for StubPlugin {
    async fn security_init(&self, options: &PluginOptions, reload: bool) -> Result<()> {
        info!(option_count = options.len(), reload, "stub: security_init");
        Ok(())
    }

    async fn security_cleanup(&self, reload: bool) -> Result<()> {
        info!(reload, "stub: security_cleanup");
        Ok(())
    }

    async fn plugin_cleanup(&self) -> Result<()> {
        info!("stub: plugin_cleanup");
        Ok(())
    }

    async fn unpwd_check(&self, username: &str, _password: &str) -> bool {
        info!(username, "stub: unpwd_check");
        true
    }

    async fn acl_check(
        &self,
        client_id: &str,
        username: Option<&str>,
        topic: &str,
        access: AccessLevel,
        _payload: Option<&[u8]>,
    ) -> bool {
        info!(client_id, username = ?username, topic, access = ?access, "stub: acl_check");
        true
    }

    async fn psk_key_get(&self, identity: &str, hint: &str) -> Option<String> {
        info!(identity, hint, "stub: psk_key_get");
        Some(self.psk_key.clone())
    }
}

/// Build the plugin a configuration names, connecting its store.
///
/// This is the broker-facing `plugin_init` entry point.
pub async fn plugin_init(config: &PluginConfig) -> Result<Box<dyn AuthPlugin>> {
    match &config.backend {
        BackendConfig::Test => Ok(Box::new(StubPlugin::new())),
        backend => {
            let store = store::connect(backend).await?;
            info!(store = %store.name(), "auth plugin initialized");
            Ok(Box::new(StorePlugin::new(store, config)))
        }
    }
}
