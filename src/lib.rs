//! texyll - alias resolution for typeset code blocks
//!
//! Authors register compact notations ("aliases") for embedding TeX in their
//! documents. This library finds every alias occurrence and rewrites it into
//! the canonical `{% texyll %}` tag that the downstream renderer consumes.
//!
//! # Example
//!
//! ```rust
//! use texyll::dealias;
//!
//! let out = dealias("Euler: $e^{i\\pi} + 1 = 0$").unwrap();
//! assert!(out.starts_with("Euler: {% texyll ---\n"));
//! assert!(out.ends_with("e^{i\\pi} + 1 = 0{% endtexyll %}"));
//! ```

pub mod alias;
pub mod config;
pub mod error;
pub mod logging;
pub mod options;
pub mod resolver;

pub use alias::{render_tag, Alias, AliasError};
pub use config::{AliasSpec, Config, ConfigError};
pub use error::ParseError;
pub use options::{OptionMap, OptionValue};
pub use resolver::Dealiaser;

use thiserror::Error;

/// Errors that can occur while configuring and running the dealiaser
#[derive(Debug, Error)]
pub enum DealiasError {
    /// Error while loading configuration or building aliases
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Error while rewriting a document
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Rewrite a document with the built-in aliases
pub fn dealias(source: &str) -> Result<String, DealiasError> {
    dealias_with_config(source, &Config::default())
}

/// Rewrite a document with the aliases of `config`
///
/// # Example
///
/// ```rust
/// use texyll::{dealias_with_config, Config};
///
/// let config = Config::from_str(r#"
///     [aliases.foo]
///     pattern = 'FOO(?<code>.*?)OOF'
///     priority = 10
/// "#).unwrap();
///
/// let out = dealias_with_config("FOO code here OOF", &config).unwrap();
/// assert_eq!(out, "{% texyll --- {}\n %} code here {% endtexyll %}");
/// ```
pub fn dealias_with_config(source: &str, config: &Config) -> Result<String, DealiasError> {
    let dealiaser = config.dealiaser()?;
    Ok(dealiaser.parse(source)?)
}
