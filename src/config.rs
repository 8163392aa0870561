//! Alias configuration loaded from TOML
//!
//! A configuration names each alias and gives its pattern, priority and
//! default options. Configurations stack: the built-in defaults, then a site
//! file, then per-document overrides, each layer merged over the previous one
//! with [`Config::layer`].

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::alias::{Alias, AliasError};
use crate::options::{self, OptionMap};
use crate::resolver::Dealiaser;

/// Errors that can occur when loading a configuration or building its aliases
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("alias `{name}` has no pattern")]
    MissingPattern { name: String },
    #[error("alias `{name}`: {source}")]
    Alias {
        name: String,
        #[source]
        source: AliasError,
    },
}

/// One alias entry as written in a config layer
///
/// Every field is optional so that a later layer can change only what it
/// names. A pattern must be present once all layers are merged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AliasSpec {
    pub pattern: Option<String>,
    pub priority: Option<i64>,
    #[serde(default)]
    pub options: OptionMap,
    pub enabled: Option<bool>,
}

impl AliasSpec {
    /// Merge a later layer's entry over this one
    fn merge(&mut self, other: AliasSpec) {
        if other.pattern.is_some() {
            self.pattern = other.pattern;
        }
        if other.priority.is_some() {
            self.priority = other.priority;
        }
        if other.enabled.is_some() {
            self.enabled = other.enabled;
        }
        self.options = options::resolve(&self.options, other.options);
    }

    fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

/// A set of named alias specifications
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub aliases: IndexMap<String, AliasSpec>,
}

/// Built-in aliases for the usual TeX math notations
const DEFAULT_ALIASES: &str = r#"
[aliases.tag]
pattern = '(?s)\{%\s*tex\b(?<markup>.*?)%\}(?<code>.*?)\{%\s*endtex\s*%\}'
priority = 1000

[aliases.display]
pattern = '(?s)\$\$(?<code>.+?)\$\$'
priority = 100
options = { classes = "antex display" }

[aliases.brackets]
pattern = '(?s)\\\[(?<code>.+?)\\\]'
priority = 100
options = { classes = "antex display" }

[aliases.inline]
pattern = '\$(?<code>[^$\n]+?)\$'
priority = 10
options = { classes = "antex inline" }
"#;

impl Config {
    /// A configuration without any aliases
    pub fn empty() -> Self {
        Self {
            aliases: IndexMap::new(),
        }
    }

    /// Load a configuration layer from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load a configuration layer from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Merge `overrides` over this configuration
    ///
    /// Aliases are matched by name. A known alias takes whichever of
    /// `pattern`, `priority` and `enabled` the override sets, and its options
    /// are merged the same way occurrence markup is. Unknown aliases are
    /// appended.
    pub fn layer(mut self, overrides: Config) -> Self {
        for (name, spec) in overrides.aliases {
            match self.aliases.get_mut(&name) {
                Some(existing) => existing.merge(spec),
                None => {
                    self.aliases.insert(name, spec);
                }
            }
        }
        self
    }

    /// Build every enabled alias, in table order
    ///
    /// Fails on the first invalid alias; a partially registered set would
    /// silently change which alias wins where.
    pub fn build_aliases(&self) -> Result<Vec<Alias>, ConfigError> {
        self.aliases
            .iter()
            .filter(|(_, spec)| spec.is_enabled())
            .map(|(name, spec)| -> Result<Alias, ConfigError> {
                let pattern = spec
                    .pattern
                    .as_deref()
                    .ok_or_else(|| ConfigError::MissingPattern { name: name.clone() })?;
                let alias = Alias::new(pattern, spec.priority.unwrap_or(0), spec.options.clone())
                    .map_err(|source| ConfigError::Alias {
                        name: name.clone(),
                        source,
                    })?;
                Ok(alias.with_name(name.clone()))
            })
            .collect()
    }

    /// Build a ready dealiaser from this configuration
    pub fn dealiaser(&self) -> Result<Dealiaser, ConfigError> {
        let aliases = self.build_aliases()?;
        debug!(count = aliases.len(), "building dealiaser from config");
        let mut dealiaser = Dealiaser::new();
        dealiaser.add_all(aliases);
        Ok(dealiaser)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_str(DEFAULT_ALIASES).expect("Default aliases should be valid TOML")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::OptionValue;

    #[test]
    fn test_default_config_builds() {
        let config = Config::default();
        let names: Vec<_> = config.aliases.keys().map(|k| k.as_str()).collect();
        assert_eq!(names, vec!["tag", "display", "brackets", "inline"]);
        let aliases = config.build_aliases().expect("Should build");
        assert_eq!(aliases.len(), 4);
    }

    #[test]
    fn test_options_keep_table_order() {
        let config = Config::from_str(
            r#"
[aliases.baz]
pattern = 'BAZ(?<markup>.*?)#(?<code>.*?)ZAB'
options = { z = 1, a = 2.5, m = "x", b = true }
"#,
        )
        .expect("Should parse");
        let keys: Vec<_> = config.aliases["baz"].options.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["z", "a", "m", "b"]);
        assert_eq!(config.aliases["baz"].options["a"], OptionValue::Float(2.5));
        assert_eq!(config.aliases["baz"].options["b"], OptionValue::Bool(true));
    }

    #[test]
    fn test_priority_defaults_to_zero() {
        let config = Config::from_str("[aliases.foo]\npattern = 'FOO(?<code>.*?)OOF'\n")
            .expect("Should parse");
        let aliases = config.build_aliases().expect("Should build");
        assert_eq!(aliases[0].priority(), 0);
        assert_eq!(aliases[0].name(), Some("foo"));
    }

    #[test]
    fn test_layer_merges_fields_and_options() {
        let base = Config::from_str(
            r#"
[aliases.baz]
pattern = 'BAZ(?<markup>.*?)#(?<code>.*?)ZAB'
priority = 1
options = { a = 1, b = 2 }
"#,
        )
        .expect("Should parse");
        let page = Config::from_str(
            r#"
[aliases.baz]
priority = 50
options = { b = 0, c = -1 }

[aliases.foo]
pattern = 'FOO(?<code>.*?)OOF'
"#,
        )
        .expect("Should parse");

        let merged = base.layer(page);
        let baz = &merged.aliases["baz"];
        assert_eq!(baz.pattern.as_deref(), Some("BAZ(?<markup>.*?)#(?<code>.*?)ZAB"));
        assert_eq!(baz.priority, Some(50));
        let entries: Vec<_> = baz.options.iter().map(|(k, v)| (k.as_str(), v.clone())).collect();
        assert_eq!(
            entries,
            vec![
                ("a", OptionValue::Integer(1)),
                ("b", OptionValue::Integer(0)),
                ("c", OptionValue::Integer(-1)),
            ]
        );
        assert!(merged.aliases.contains_key("foo"));
    }

    #[test]
    fn test_layer_can_disable_alias() {
        let page = Config::from_str("[aliases.inline]\nenabled = false\n").expect("Should parse");
        let merged = Config::default().layer(page);
        let aliases = merged.build_aliases().expect("Should build");
        assert!(aliases.iter().all(|a| a.name() != Some("inline")));
        assert_eq!(aliases.len(), 3);
    }

    #[test]
    fn test_missing_pattern_fails_whole_batch() {
        let config = Config::from_str(
            "[aliases.ok]\npattern = '(?<code>x)'\n\n[aliases.broken]\npriority = 3\n",
        )
        .expect("Should parse");
        let result = config.build_aliases();
        assert!(matches!(result, Err(ConfigError::MissingPattern { ref name }) if name == "broken"));
    }

    #[test]
    fn test_pattern_without_code_group_fails() {
        let config = Config::from_str("[aliases.bad]\npattern = 'FOO(.*?)OOF'\n").expect("Should parse");
        let result = config.dealiaser();
        assert!(matches!(
            result,
            Err(ConfigError::Alias {
                source: AliasError::MalformedPattern { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_toml_error() {
        let result = Config::from_str("this is not valid toml {{{{");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
