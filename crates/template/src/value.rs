use std::fmt;

use serde::{Deserialize, Serialize};

/// The concrete value held by a field.
///
/// Serialized untagged, so templates carry plain JSON scalars and arrays.
/// An empty array deserializes as an empty [`FieldValue::TextList`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// `true` / `false`.
    Bool(bool),
    /// Any JSON number.
    Number(f64),
    /// Free text. May itself hold a JSON-encoded array.
    Text(String),
    /// A native sequence of text items.
    TextList(Vec<String>),
    /// A native sequence of numbers.
    NumberList(Vec<f64>),
}

impl Default for FieldValue {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl FieldValue {
    /// Shorthand for an empty text value.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether this is the empty string (the "cleared" value).
    #[must_use]
    pub fn is_empty_text(&self) -> bool {
        matches!(self, Self::Text(s) if s.is_empty())
    }

    /// Borrow the inner text, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view: numbers directly, text if it parses as a number.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Whether this is a native sequence.
    #[must_use]
    pub fn is_list(&self) -> bool {
        matches!(self, Self::TextList(_) | Self::NumberList(_))
    }

    /// Items of this value viewed as a sequence.
    ///
    /// Native lists yield their items; text yields items only when it
    /// decodes as a JSON array. Everything else is `None`.
    #[must_use]
    pub fn sequence_items(&self) -> Option<Vec<serde_json::Value>> {
        match self {
            Self::TextList(items) => Some(
                items
                    .iter()
                    .map(|s| serde_json::Value::String(s.clone()))
                    .collect(),
            ),
            Self::NumberList(items) => Some(items.iter().map(|n| number_to_json(*n)).collect()),
            Self::Text(s) => decode_json_array(s),
            Self::Bool(_) | Self::Number(_) => None,
        }
    }

    /// Plain JSON form of this value, used for audit records and re-encoding.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => number_to_json(*n),
            Self::Text(s) => serde_json::Value::String(s.clone()),
            Self::TextList(items) => serde_json::Value::Array(
                items
                    .iter()
                    .map(|s| serde_json::Value::String(s.clone()))
                    .collect(),
            ),
            Self::NumberList(items) => {
                serde_json::Value::Array(items.iter().map(|n| number_to_json(*n)).collect())
            }
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::TextList(_) | Self::NumberList(_) => write!(f, "{}", self.to_json()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        Self::TextList(value)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(value: Vec<&str>) -> Self {
        Self::TextList(value.into_iter().map(str::to_owned).collect())
    }
}

impl From<Vec<f64>> for FieldValue {
    fn from(value: Vec<f64>) -> Self {
        Self::NumberList(value)
    }
}

/// Decode text as a JSON array, returning its items.
#[must_use]
pub fn decode_json_array(text: &str) -> Option<Vec<serde_json::Value>> {
    if !text.trim_start().starts_with('[') {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(serde_json::Value::Array(items)) => Some(items),
        _ => None,
    }
}

/// Text form of a sequence item: strings unquoted, everything else as JSON.
#[must_use]
pub fn item_text(item: &serde_json::Value) -> String {
    match item {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Integral numbers become JSON integers so `8080.0` is written as `8080`.
#[must_use]
pub fn number_to_json(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        serde_json::Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n).map_or(serde_json::Value::Null, serde_json::Value::Number)
    }
}
