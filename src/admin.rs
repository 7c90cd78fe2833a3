//! Provisioning
//!
//! The admin path runs outside the broker: it salts and hashes a new
//! password and writes the user's record, overwriting any existing one.

use crate::hash;
use crate::store::CredentialStore;
use crate::topic::MqttTopicMatcher;
use anyhow::Result;
use tracing::{info, warn};

/// Create or overwrite a user's credential and topic filter.
pub async fn provision_user(
    store: &dyn CredentialStore,
    username: &str,
    password: &str,
    topic_filter: &str,
) -> Result<()> {
    // The filter is stored as given; a dubious one only costs the user
    // access, so warn rather than refuse.
    if !MqttTopicMatcher::new().is_valid_filter(topic_filter) {
        warn!(topic_filter, "topic filter does not look like a valid MQTT filter");
    }

    let salt = hash::generate_salt();
    let auth = hash::encode_credential(&salt, password);
    store.store_user(username, &auth, topic_filter).await?;

    info!(username, store = %store.name(), "password set successfully");
    Ok(())
}
