use serde::{Deserialize, Serialize};
use web_time::Duration;

use crate::debounce::DEFAULT_MIN_NAVIGATION_INTERVAL;
use crate::namespace::DEFAULT_DESTINATION_COUNT;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Number of route slots, including the one reserved for ad-hoc views.
    /// Changing it between runs invalidates restored routes.
    pub destination_count: usize,
    pub min_navigation_interval: Duration,
    /// How long popped entries keep their metadata.
    pub prune_delay: Duration,
    /// Push a `"<key>?"` placeholder entry for values with no destination
    /// instead of ignoring them.
    pub push_unregistered: bool,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            destination_count: DEFAULT_DESTINATION_COUNT,
            min_navigation_interval: DEFAULT_MIN_NAVIGATION_INTERVAL,
            prune_delay: Duration::from_secs(1),
            push_unregistered: true,
        }
    }
}

impl NavigatorConfig {
    pub fn with_destination_count(self, destination_count: usize) -> Self {
        Self {
            destination_count,
            ..self
        }
    }

    pub fn with_min_navigation_interval(self, min_navigation_interval: Duration) -> Self {
        Self {
            min_navigation_interval,
            ..self
        }
    }

    pub fn with_prune_delay(self, prune_delay: Duration) -> Self {
        Self {
            prune_delay,
            ..self
        }
    }

    pub fn with_push_unregistered(self, push_unregistered: bool) -> Self {
        Self {
            push_unregistered,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: NavigatorConfig = serde_json::from_str(r#"{"destination_count": 16}"#).unwrap();
        assert_eq!(cfg.destination_count, 16);
        assert_eq!(cfg.min_navigation_interval, Duration::from_millis(350));
        assert!(cfg.push_unregistered);
    }
}
