//! Dispatcher configuration.

use crate::shortcut::EventProperty;

#[cfg(feature = "recorder")]
use serde::{Deserialize, Serialize};

/// Initial settings of a [`crate::Dispatcher`].
///
/// Every field can also be changed at runtime through the matching
/// dispatcher method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "recorder", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "recorder", serde(default))]
pub struct Config {
    /// Key identifier space used for shortcut matching.
    pub event_property: EventProperty,
    /// Verbose logging, also forwarded to the backend on install.
    pub debug: bool,
    /// Whether mouse clicks reach the OS window chain.
    pub click_propagation: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            event_property: EventProperty::Keycode,
            debug: false,
            click_propagation: true,
        }
    }
}

impl Config {
    /// Match shortcuts on rawcodes instead of keycodes.
    pub fn use_rawcode(mut self, enabled: bool) -> Self {
        self.event_property = if enabled {
            EventProperty::Rawcode
        } else {
            EventProperty::Keycode
        };
        self
    }

    /// Enable verbose logging.
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// Let mouse clicks through (`true`) or swallow them (`false`).
    pub fn click_propagation(mut self, enabled: bool) -> Self {
        self.click_propagation = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.event_property, EventProperty::Keycode);
        assert!(!config.debug);
        assert!(config.click_propagation);
    }

    #[test]
    fn test_builder() {
        let config = Config::default()
            .use_rawcode(true)
            .debug(true)
            .click_propagation(false);
        assert_eq!(config.event_property, EventProperty::Rawcode);
        assert!(config.debug);
        assert!(!config.click_propagation);
        assert_eq!(
            config.use_rawcode(false).event_property,
            EventProperty::Keycode
        );
    }

    #[cfg(feature = "recorder")]
    #[test]
    fn test_partial_json() {
        let config: Config = serde_json::from_str(r#"{"debug": true}"#).unwrap();
        assert!(config.debug);
        assert!(config.click_propagation);
    }
}
