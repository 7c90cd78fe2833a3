//! Integration tests for the auth plugin

use mqtt_auth_plugin::config::{
    BackendConfig, MissingAclPolicy, MysqlOptions, PluginConfig, PluginOptions,
};
use mqtt_auth_plugin::store::MemoryStore;
use mqtt_auth_plugin::{admin, hash, AccessLevel, AuthPlugin, MqttTopicMatcher, StorePlugin, TopicMatcher};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

/// Provision-then-check: the documented end-to-end scenario.
#[tokio::test]
async fn test_provision_and_check_scenario() {
    let store = Arc::new(MemoryStore::new());
    admin::provision_user(store.as_ref(), "foo", "foobar", "/foo/#")
        .await
        .unwrap();

    let plugin = StorePlugin::new(store, &PluginConfig::default());

    assert!(plugin.unpwd_check("foo", "foobar").await);
    assert!(!plugin.unpwd_check("foo", "wrong").await);

    assert!(
        plugin
            .acl_check("client-1", Some("foo"), "/foo/x", AccessLevel::Read, None)
            .await
    );
    assert!(
        !plugin
            .acl_check("client-1", Some("foo"), "/bar/x", AccessLevel::Read, None)
            .await
    );

    // no username at all: refused regardless of topic
    assert!(
        !plugin
            .acl_check("client-1", None, "/foo/x", AccessLevel::Read, None)
            .await
    );
}

/// Unknown users fail both checks without panicking.
#[tokio::test]
async fn test_unknown_user() {
    let plugin = StorePlugin::new(Arc::new(MemoryStore::new()), &PluginConfig::default());

    assert!(!plugin.unpwd_check("nobody", "pw").await);
    assert!(
        !plugin
            .acl_check("c", Some("nobody"), "/t", AccessLevel::Write, None)
            .await
    );
}

/// The missing-pattern policy is explicit, not variant-dependent.
#[tokio::test]
async fn test_missing_acl_is_a_policy_decision() {
    let store = Arc::new(MemoryStore::new());
    store.insert_without_acl("bare", &hash::encode_credential("abcdef", "pw"));

    let deny = StorePlugin::new(store.clone(), &PluginConfig::default());
    assert!(
        !deny
            .acl_check("c", Some("bare"), "/any", AccessLevel::Read, None)
            .await
    );

    let permissive = PluginConfig {
        missing_acl: MissingAclPolicy::Allow,
        ..Default::default()
    };
    let allow = StorePlugin::new(store, &permissive);
    assert!(
        allow
            .acl_check("c", Some("bare"), "/any", AccessLevel::Read, None)
            .await
    );
}

/// Bundled matcher honors MQTT wildcard semantics.
#[test]
fn test_topic_matcher_contract() {
    let m = MqttTopicMatcher::new();

    assert!(m.matches("/foo/#", "/foo/bar"));
    assert!(!m.matches("/foo/#", "/bar/baz"));
    assert!(m.matches("/+/x", "/a/x"));
    assert!(!m.matches("/+/x", "/a/y"));
}

/// A user provisioned with a bare `#` filter still cannot reach system
/// topics.
#[tokio::test]
async fn test_wildcard_acl_excludes_system_topics() {
    let store = Arc::new(MemoryStore::new());
    admin::provision_user(store.as_ref(), "foo", "pw", "#")
        .await
        .unwrap();

    let plugin = StorePlugin::new(store, &PluginConfig::default());
    assert!(
        plugin
            .acl_check("c", Some("foo"), "sensors/temp", AccessLevel::Read, None)
            .await
    );
    assert!(
        !plugin
            .acl_check("c", Some("foo"), "$SYS/broker/uptime", AccessLevel::Read, None)
            .await
    );
}

/// The plugin delegates to whatever matcher is injected.
#[tokio::test]
async fn test_injected_matcher() {
    struct DenyAll;
    impl TopicMatcher for DenyAll {
        fn matches(&self, _filter: &str, _topic: &str) -> bool {
            false
        }
    }

    let store = Arc::new(MemoryStore::new());
    admin::provision_user(store.as_ref(), "foo", "pw", "#")
        .await
        .unwrap();

    let plugin = StorePlugin::with_matcher(store, Arc::new(DenyAll), &PluginConfig::default());
    assert!(
        !plugin
            .acl_check("c", Some("foo"), "/foo/x", AccessLevel::Read, None)
            .await
    );
}

/// Broker conf parsing: auth_opt_ lines become typed options, the reserved
/// backend key is consumed, unrelated lines are ignored.
#[test]
fn test_config_from_broker_conf() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "# broker settings").unwrap();
    writeln!(file, "listener 1883").unwrap();
    writeln!(file, "auth_plugin /usr/lib/mqtt-auth.so").unwrap();
    writeln!(file, "auth_opt_backend mysql").unwrap();
    writeln!(file, "auth_opt_mysql_host 10.1.2.3").unwrap();
    writeln!(file, "auth_opt_mysql_user mqtt").unwrap();
    writeln!(file, "auth_opt_mysql_password s3cret").unwrap();
    writeln!(file, "auth_opt_mysql_database broker").unwrap();
    writeln!(file, "auth_opt_mysql_port 3307").unwrap();
    writeln!(file, "auth_opt_acl_missing allow").unwrap();

    let config = PluginConfig::from_conf_file(file.path()).unwrap();

    assert_eq!(
        config.backend,
        BackendConfig::Mysql(MysqlOptions {
            host: "10.1.2.3".to_string(),
            user: "mqtt".to_string(),
            password: "s3cret".to_string(),
            database: "broker".to_string(),
            port: 3307,
        })
    );
    assert_eq!(config.missing_acl, MissingAclPolicy::Allow);
    assert_eq!(config.psk_key, None);
}

/// Options parsed from a conf file never expose the backend key.
#[test]
fn test_reserved_key_stripped_from_options() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "auth_opt_backend redis").unwrap();
    writeln!(file, "auth_opt_redis_host cache.internal").unwrap();

    let mut opts = PluginOptions::from_conf_file(file.path()).unwrap();
    assert_eq!(opts.get("redis_host"), Some("cache.internal"));

    // consumed during config construction
    let config = PluginConfig::from_options(opts.clone()).unwrap();
    assert!(matches!(config.backend, BackendConfig::Redis(_)));
    assert!(opts.remove("backend").is_some());
}

/// JSON config round-trips through serde.
#[test]
fn test_config_json_round_trip() {
    let config = PluginConfig {
        backend: BackendConfig::Mysql(MysqlOptions::default()),
        missing_acl: MissingAclPolicy::Deny,
        psk_key: Some("0123456789".to_string()),
    };

    let json = serde_json::to_string(&config).unwrap();
    let parsed: PluginConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.backend, config.backend);
    assert_eq!(parsed.missing_acl, config.missing_acl);
    assert_eq!(parsed.psk_key, config.psk_key);
}
