//! Authentication/authorization backends for an MQTT broker's pluggable
//! auth interface.
//!
//! The host broker owns packet parsing, the configuration file format, and
//! plugin dispatch; this crate supplies the callback semantics it invokes at
//! connection and publish/subscribe time:
//!
//! - **Credential check**: salted SHA-1 comparison against a stored
//!   `salt:hexdigest` value (`unpwd_check`)
//! - **ACL check**: per-user topic filter matched against the requested
//!   topic with MQTT wildcard semantics (`acl_check`)
//! - **PSK lookup**: pre-shared key retrieval for TLS-PSK handshakes
//!   (`psk_key_get`)
//! - **Provisioning**: a command-line admin path that writes a user's
//!   credential and topic filter into the backing store
//!
//! Three backends implement the same [`CredentialStore`] contract: MySQL
//! (`users(username, auth, acl)` table), Redis (`mosq.<username>` hash), and
//! an in-memory map. A logging stub plugin that permits everything is also
//! provided for broker integration testing.
//!
//! # Example configuration
//!
//! ```json
//! {
//!   "backend": {
//!     "type": "mysql",
//!     "host": "127.0.0.1",
//!     "user": "root",
//!     "password": "password",
//!     "database": "mydb",
//!     "port": 3306
//!   },
//!   "missing-acl": "deny",
//!   "psk-key": null
//! }
//! ```
//!
//! The same settings can come from the broker's own config file as
//! `auth_opt_<key> <value>` lines, e.g. `auth_opt_mysql_host 127.0.0.1`.
//!
//! # Security note
//!
//! The stored credential scheme is single-round SHA-1 with a plaintext salt,
//! compared with ordinary string equality. That is what the deployed stores
//! contain and what this crate verifies; it is not a recommendation. There is
//! no rate limiting or lockout here either; put those in front of the broker.

pub mod admin;
pub mod config;
pub mod hash;
pub mod plugin;
pub mod store;
pub mod topic;

// Re-export main types
pub use config::{PluginConfig, PluginOptions};
pub use plugin::{plugin_init, AccessLevel, AuthPlugin, StorePlugin, StubPlugin};
pub use store::CredentialStore;
pub use topic::{MqttTopicMatcher, TopicMatcher};
