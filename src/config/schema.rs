//! Configuration schema definitions
//!
//! Defines the structure of the argonaut configuration file using serde.

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Appearance settings
    #[serde(default)]
    pub appearance: AppearanceConfig,

    /// View to open on startup (clusters, namespaces, projects, appsets, apps)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_view: Option<String>,
}

/// Appearance configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppearanceConfig {
    /// Active theme name
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_theme() -> String {
    "default".to_string()
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.appearance.theme, "default");
        assert_eq!(config.default_view, None);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(yaml.contains("appearance"));
        assert!(yaml.contains("theme"));
    }

    #[test]
    fn test_config_deserialization() {
        let yaml = r#"
appearance:
  theme: dracula
defaultView: apps
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.appearance.theme, "dracula");
        assert_eq!(config.default_view.as_deref(), Some("apps"));
    }
}
