use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::value::FieldValue;

/// Separator between path segments in a field name.
pub const PATH_SEPARATOR: char = '.';

/// A named, typed configuration value with validation metadata and an
/// inclusion flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Dot-delimited hierarchical path, unique within a collection.
    pub name: String,
    /// Current value.
    #[serde(default)]
    pub value: FieldValue,
    /// Help text.
    #[serde(default)]
    pub info: String,
    /// Example value shown to authors.
    #[serde(default)]
    pub example: FieldValue,
    /// Range DSL string describing the allowed values.
    #[serde(default)]
    pub range: String,
    /// Optional documentation link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Inclusion flag; absent is treated as `false`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
}

impl Field {
    /// Create a field with a name and value, everything else defaulted.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            info: String::new(),
            example: FieldValue::default(),
            range: String::new(),
            link: None,
            checked: None,
        }
    }

    /// Set the inclusion flag (builder-style, consuming).
    #[must_use]
    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = Some(checked);
        self
    }

    /// Set the range DSL string (builder-style, consuming).
    #[must_use]
    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range = range.into();
        self
    }

    /// Set the help text (builder-style, consuming).
    #[must_use]
    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = info.into();
        self
    }

    /// Set the example value (builder-style, consuming).
    #[must_use]
    pub fn with_example(mut self, example: impl Into<FieldValue>) -> Self {
        self.example = example.into();
        self
    }

    /// Set the documentation link (builder-style, consuming).
    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    /// The inclusion flag, absent treated as `false`.
    #[must_use]
    pub fn is_checked(&self) -> bool {
        self.checked.unwrap_or(false)
    }

    /// Whether this field lives strictly below `prefix` in the path hierarchy.
    ///
    /// `server.http.port` is a descendant of `server` and `server.http`,
    /// but not of `serv` or of itself.
    #[must_use]
    pub fn is_descendant_of(&self, prefix: &str) -> bool {
        is_descendant_path(&self.name, prefix)
    }

    /// Path of the enclosing group, if any.
    #[must_use]
    pub fn parent_path(&self) -> Option<&str> {
        self.name
            .rsplit_once(PATH_SEPARATOR)
            .map(|(parent, _)| parent)
    }

    /// Last path segment.
    #[must_use]
    pub fn leaf_name(&self) -> &str {
        self.name
            .rsplit_once(PATH_SEPARATOR)
            .map_or(self.name.as_str(), |(_, leaf)| leaf)
    }

    /// Check the name against path naming rules.
    pub fn check_name(&self) -> Result<(), ModelError> {
        if self.name.trim().is_empty() {
            return Err(ModelError::InvalidFieldName {
                name: self.name.clone(),
                reason: "name is empty".into(),
            });
        }
        if self.name.split(PATH_SEPARATOR).any(str::is_empty) {
            return Err(ModelError::InvalidFieldName {
                name: self.name.clone(),
                reason: "empty path segment".into(),
            });
        }
        Ok(())
    }
}

/// Whether `path` lives strictly below `prefix`.
#[must_use]
pub fn is_descendant_path(path: &str, prefix: &str) -> bool {
    path.len() > prefix.len()
        && path.starts_with(prefix)
        && path[prefix.len()..].starts_with(PATH_SEPARATOR)
}
