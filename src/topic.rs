//! MQTT topic-filter matching
//!
//! The broker that hosts this plugin has its own topic matcher; embedders
//! that can reach it should implement [`TopicMatcher`] on top of it. The
//! bundled [`MqttTopicMatcher`] implements the same contract per the MQTT
//! 3.1.1 and 5.0 specifications: `+` matches exactly one topic level, `#`
//! matches zero or more trailing levels, and neither matches the first
//! level of a `$`-prefixed system topic.

/// Matching seam between the plugin and the topic wildcard semantics.
pub trait TopicMatcher: Send + Sync {
    /// Returns true iff `topic` falls within the wildcard scope of `filter`.
    ///
    /// `topic` is a concrete topic name (no wildcards); `filter` may contain
    /// `+` and `#`.
    fn matches(&self, filter: &str, topic: &str) -> bool;
}

/// Self-contained matcher implementing MQTT topic-filter semantics.
#[derive(Debug, Clone, Copy, Default)]
pub struct MqttTopicMatcher;

impl MqttTopicMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Check if a topic filter is syntactically valid.
    ///
    /// `#` must be alone in the last level and `+` must occupy a whole
    /// level. Empty levels are permitted; a leading `/` is a common shape
    /// for stored filters.
    pub fn is_valid_filter(&self, filter: &str) -> bool {
        if filter.is_empty() {
            return false;
        }

        let levels: Vec<&str> = split_levels(filter).collect();

        for (i, level) in levels.iter().enumerate() {
            if level.contains('#') && (*level != "#" || i != levels.len() - 1) {
                return false;
            }
            if level.contains('+') && *level != "+" {
                return false;
            }
        }

        true
    }

    /// Check if a topic name is valid (non-empty, no wildcard characters).
    pub fn is_valid_topic(&self, topic: &str) -> bool {
        !topic.is_empty() && !topic.contains('+') && !topic.contains('#')
    }
}

impl TopicMatcher for MqttTopicMatcher {
    fn matches(&self, filter: &str, topic: &str) -> bool {
        // Per MQTT 3.1.1 [MQTT-4.7.2-1]: a wildcard in the first filter
        // level never matches a $-prefixed (system) topic
        if topic.starts_with('$') {
            let first = split_levels(filter).next().unwrap_or_default();
            if first == "+" || first == "#" {
                return false;
            }
        }

        let mut topic_levels = split_levels(topic);
        let mut filter_levels = split_levels(filter);

        loop {
            match (filter_levels.next(), topic_levels.next()) {
                // # swallows the rest of the topic, including zero levels,
                // but only when it is the final filter level
                (Some("#"), _) => return filter_levels.next().is_none(),
                (Some("+"), Some(_)) => {}
                (Some(f), Some(t)) if f == t => {}
                (Some(_), _) => return false,
                (None, Some(_)) => return false,
                (None, None) => return true,
            }
        }
    }
}

/// Split a topic or filter into levels. A leading `/` produces an empty
/// first level, which is significant: `/foo/#` does not match `foo/bar`.
fn split_levels(s: &str) -> std::str::Split<'_, char> {
    s.split('/')
}
