//! Translation tree and key lookup.

use std::collections::HashMap;

use serde_json::{
    Map,
    Value,
};
use thiserror::Error;

/// Default separator between key segments.
pub const DEFAULT_KEY_SEPARATOR: &str = ".";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Translation data root must be a JSON object, found {found}")]
pub struct InvalidRootError {
    pub found: &'static str,
}

/// Nested string-keyed translations for one locale.
///
/// Loaded wholesale and never mutated afterwards; a locale switch replaces the
/// whole tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationTree {
    root: Value,
    separator: String,
}

impl Default for TranslationTree {
    fn default() -> Self {
        Self::empty()
    }
}

impl TranslationTree {
    /// Tree without any entries. Every lookup misses.
    #[must_use]
    pub fn empty() -> Self {
        Self { root: Value::Object(Map::new()), separator: DEFAULT_KEY_SEPARATOR.to_string() }
    }

    /// # Errors
    /// The root value is not a JSON object.
    pub fn from_value(root: Value) -> Result<Self, InvalidRootError> {
        if !root.is_object() {
            return Err(InvalidRootError { found: value_kind(&root) });
        }
        Ok(Self { root, separator: DEFAULT_KEY_SEPARATOR.to_string() })
    }

    /// Use `separator` between key segments instead of `.`.
    ///
    /// An empty separator is ignored.
    #[must_use]
    pub fn with_separator(mut self, separator: &str) -> Self {
        if !separator.is_empty() {
            self.separator = separator.to_string();
        }
        self
    }

    #[must_use]
    pub fn separator(&self) -> &str {
        &self.separator
    }

    #[must_use]
    pub const fn root(&self) -> &Value {
        &self.root
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.as_object().is_none_or(Map::is_empty)
    }

    /// Descend the tree segment by segment and return whatever value the key
    /// ends on.
    #[must_use]
    pub fn node(&self, key: &str) -> Option<&Value> {
        if key.is_empty() {
            return None;
        }
        key.split(self.separator.as_str())
            .try_fold(&self.root, |node, segment| node.as_object()?.get(segment))
    }

    /// Look up a translated string.
    ///
    /// Returns `None` when a segment is missing, when the path descends into a
    /// string leaf, or when the terminal value is not a non-empty string.
    ///
    /// ```
    /// use serde_json::json;
    /// use site_i18n::input::translation::TranslationTree;
    ///
    /// let tree = TranslationTree::from_value(json!({"a": {"b": "X"}})).unwrap();
    /// assert_eq!(tree.lookup("a.b"), Some("X"));
    /// assert_eq!(tree.lookup("a.c"), None);
    /// assert_eq!(tree.lookup("a.b.c"), None);
    /// ```
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.node(key)?.as_str().filter(|text| !text.is_empty())
    }

    /// All leaves keyed by their full path.
    #[must_use]
    pub fn flatten(&self) -> HashMap<String, String> {
        flatten_json(&self.root, &self.separator, None)
    }
}

const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Flatten nested JSON object into dot-separated key map.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use site_i18n::input::translation::flatten_json;
///
/// let json = json!({
///     "nav": {
///         "home": "Home",
///         "articles": "Articles"
///     }
/// });
///
/// let flattened = flatten_json(&json, ".", None);
/// assert_eq!(flattened.get("nav.home"), Some(&"Home".to_string()));
/// assert_eq!(flattened.get("nav.articles"), Some(&"Articles".to_string()));
/// ```
#[must_use]
pub fn flatten_json(
    json: &Value,
    separator: &str,
    prefix: Option<&str>,
) -> HashMap<String, String> {
    let mut result = HashMap::new();
    flatten_json_value(json, separator, prefix, &mut result);
    result
}

fn flatten_json_value(
    json: &Value,
    separator: &str,
    prefix: Option<&str>,
    result: &mut HashMap<String, String>,
) {
    match json {
        Value::Object(map) => {
            for (key, value) in map {
                let full_key =
                    prefix.map_or_else(|| key.clone(), |p| format!("{p}{separator}{key}"));
                flatten_json_value(value, separator, Some(&full_key), result);
            }
        }
        Value::Array(arr) => {
            for (index, value) in arr.iter().enumerate() {
                let full_key =
                    prefix.map_or_else(|| format!("[{index}]"), |p| format!("{p}[{index}]"));
                flatten_json_value(value, separator, Some(&full_key), result);
            }
        }
        Value::String(s) => {
            if let Some(key) = prefix {
                result.insert(key.to_string(), s.clone());
            }
        }
        _ => {
            if let Some(key) = prefix {
                result.insert(key.to_string(), json.to_string());
            }
        }
    }
}
