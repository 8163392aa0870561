//! Alias definitions: author notations that rewrite into the canonical tag

use regex::Regex;
use thiserror::Error;

use crate::options::{self, OptionMap};

/// Named group holding the code to typeset
pub const CODE_GROUP: &str = "code";

/// Named group holding per-occurrence option markup
pub const MARKUP_GROUP: &str = "markup";

/// Errors that can occur when constructing an alias
#[derive(Debug, Error)]
pub enum AliasError {
    /// Pattern has no `code` capture group
    #[error("malformed alias pattern `{pattern}`: missing named group `code`")]
    MalformedPattern { pattern: String },

    /// Pattern is not a valid regular expression
    #[error("invalid alias pattern `{pattern}`: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A registered alias
///
/// Immutable once built. The pattern decides what the author writes; the
/// rewritten form is always the canonical `texyll` tag.
#[derive(Debug, Clone)]
pub struct Alias {
    name: Option<String>,
    pattern: Regex,
    priority: i64,
    options: OptionMap,
    has_markup: bool,
}

impl Alias {
    /// Compile `pattern` and build an alias from it
    pub fn new(pattern: &str, priority: i64, options: OptionMap) -> Result<Self, AliasError> {
        let regex = Regex::new(pattern).map_err(|source| AliasError::InvalidRegex {
            pattern: pattern.to_string(),
            source,
        })?;
        Self::from_regex(regex, priority, options)
    }

    /// Build an alias from an already compiled pattern
    pub fn from_regex(
        pattern: Regex,
        priority: i64,
        options: OptionMap,
    ) -> Result<Self, AliasError> {
        let has_group = |group: &str| pattern.capture_names().flatten().any(|n| n == group);
        if !has_group(CODE_GROUP) {
            return Err(AliasError::MalformedPattern {
                pattern: pattern.as_str().to_string(),
            });
        }
        let has_markup = has_group(MARKUP_GROUP);

        Ok(Self {
            name: None,
            pattern,
            priority,
            options,
            has_markup,
        })
    }

    /// Attach a name, used for listings and diagnostics
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    pub fn priority(&self) -> i64 {
        self.priority
    }

    /// Default option values
    pub fn options(&self) -> &OptionMap {
        &self.options
    }

    /// Whether the pattern declares a `markup` group
    pub fn has_markup(&self) -> bool {
        self.has_markup
    }

    /// Merge per-occurrence overrides over this alias's defaults
    pub fn resolve(&self, overrides: OptionMap) -> OptionMap {
        options::resolve(&self.options, overrides)
    }

    /// Render one occurrence as the canonical tag
    ///
    /// `code` is inserted verbatim, so any whitespace the pattern captured
    /// around it is what separates it from the tag delimiters. An empty option
    /// map is spelled `{}` on the opening line; otherwise each entry gets its
    /// own line.
    pub fn render(&self, code: &str, options: &OptionMap) -> String {
        render_tag(code, options)
    }
}

/// Build the canonical `{% texyll %}` tag for a code span and option map
pub fn render_tag(code: &str, options: &OptionMap) -> String {
    let front_matter = if options.is_empty() {
        "--- {}\n".to_string()
    } else {
        format!("---\n{}", options::to_front_matter(options))
    };
    format!("{{% texyll {} %}}{}{{% endtexyll %}}", front_matter, code)
}
