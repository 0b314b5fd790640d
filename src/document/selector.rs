//! Element selectors.

use std::fmt;

/// Condition on a single attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeFilter {
    /// `[name]`
    Present(String),
    /// `[name="value"]`
    Equals(String, String),
    /// `[name^="prefix"]`
    Prefix(String, String),
}

/// Subset of CSS selectors: optional tag, optional class, attribute filters.
///
/// Renders to CSS through `Display`, so a browser-backed [`Document`] can pass
/// it straight to `querySelectorAll`.
///
/// [`Document`]: super::Document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selector {
    tag: Option<String>,
    class: Option<String>,
    attributes: Vec<AttributeFilter>,
}

impl Selector {
    /// Matches every element.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn tag(tag: &str) -> Self {
        Self { tag: Some(tag.to_ascii_lowercase()), ..Self::default() }
    }

    #[must_use]
    pub fn class(class: &str) -> Self {
        Self { class: Some(class.to_string()), ..Self::default() }
    }

    #[must_use]
    pub fn with_attribute(mut self, name: &str) -> Self {
        self.attributes.push(AttributeFilter::Present(name.to_string()));
        self
    }

    #[must_use]
    pub fn with_attribute_value(mut self, name: &str, value: &str) -> Self {
        self.attributes.push(AttributeFilter::Equals(name.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn with_attribute_prefix(mut self, name: &str, prefix: &str) -> Self {
        self.attributes.push(AttributeFilter::Prefix(name.to_string(), prefix.to_string()));
        self
    }

    /// Test an element given its tag and an attribute accessor.
    pub fn matches<'a>(&self, tag: &str, attribute: impl Fn(&str) -> Option<&'a str>) -> bool {
        if let Some(expected) = &self.tag
            && !expected.eq_ignore_ascii_case(tag)
        {
            return false;
        }

        if let Some(class) = &self.class {
            let has_class = attribute("class")
                .is_some_and(|classes| classes.split_whitespace().any(|c| c == class));
            if !has_class {
                return false;
            }
        }

        self.attributes.iter().all(|filter| match filter {
            AttributeFilter::Present(name) => attribute(name).is_some(),
            AttributeFilter::Equals(name, value) => attribute(name) == Some(value.as_str()),
            AttributeFilter::Prefix(name, prefix) => {
                attribute(name).is_some_and(|actual| actual.starts_with(prefix.as_str()))
            }
        })
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            f.write_str("\\")?;
        }
        write!(f, "{c}")?;
    }
    f.write_str("\"")
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(tag) = &self.tag {
            f.write_str(tag)?;
        }
        if let Some(class) = &self.class {
            write!(f, ".{class}")?;
        }
        for filter in &self.attributes {
            match filter {
                AttributeFilter::Present(name) => write!(f, "[{name}]")?,
                AttributeFilter::Equals(name, value) => {
                    write!(f, "[{name}=")?;
                    write_quoted(f, value)?;
                    f.write_str("]")?;
                }
                AttributeFilter::Prefix(name, prefix) => {
                    write!(f, "[{name}^=")?;
                    write_quoted(f, prefix)?;
                    f.write_str("]")?;
                }
            }
        }
        if self.tag.is_none() && self.class.is_none() && self.attributes.is_empty() {
            f.write_str("*")?;
        }
        Ok(())
    }
}
