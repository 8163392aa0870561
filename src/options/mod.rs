//! Option maps carried by aliases and overridden per occurrence
//!
//! An option map is an insertion-ordered mapping from option names to scalar
//! values. Aliases declare defaults, each occurrence may override them through
//! its `markup` capture, and the merged map is serialized into the front
//! matter of the canonical tag. Order matters at every step: it is the order
//! the renderer sees the entries in.

mod grammar;
pub mod lexer;

use std::fmt;

use indexmap::IndexMap;
use serde::Deserialize;

pub use grammar::parse_markup;

/// Ordered option name to value mapping
pub type OptionMap = IndexMap<String, OptionValue>;

/// A scalar option value
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Integer(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Float(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::String(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::String(value)
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{}", b),
            OptionValue::Integer(n) => write!(f, "{}", n),
            // Whole floats keep a fractional digit so they read back as floats
            OptionValue::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{:.1}", x),
            OptionValue::Float(x) => write!(f, "{}", x),
            OptionValue::String(s) if is_bare_word(s) => f.write_str(s),
            OptionValue::String(s) => write!(f, "{:?}", s),
        }
    }
}

/// True when `s` lexes back as exactly one bare word
fn is_bare_word(s: &str) -> bool {
    match lexer::lex(s).as_deref() {
        Ok([(lexer::Token::Word(word), _)]) => word == s,
        _ => false,
    }
}

/// Merge per-occurrence overrides over alias defaults
///
/// Keys already present keep their position and take the override value; new
/// keys are appended in the order they appear in `overrides`. Resolving with
/// an empty override map returns `defaults` unchanged.
pub fn resolve(defaults: &OptionMap, overrides: OptionMap) -> OptionMap {
    let mut merged = defaults.clone();
    for (key, value) in overrides {
        // IndexMap::insert replaces in place for existing keys
        merged.insert(key, value);
    }
    merged
}

/// Serialize an option map into front matter lines
///
/// Each entry becomes `key: value` followed by a newline. An empty map
/// serializes to an empty string; callers decide how to spell the empty case.
pub fn to_front_matter(options: &OptionMap) -> String {
    let mut out = String::new();
    for (key, value) in options {
        let key = OptionValue::String(key.clone());
        out.push_str(&format!("{}: {}\n", key, value));
    }
    out
}
