//! Parsing of the range DSL into [`ParsedRange`].
//!
//! Grammar, tried in this order:
//!
//! | Form                       | Variant                  |
//! |----------------------------|--------------------------|
//! | `(a\|\|b)[min..max]`       | [`ParsedRange::EnumArray`] |
//! | `type[min..max]`           | [`ParsedRange::Array`]     |
//! | `type` / `type(min..max)`  | [`ParsedRange::Scalar`]    |
//! | `a\|\|b\|\|c`              | [`ParsedRange::Enum`]      |
//! | `a / b` (legacy)           | [`ParsedRange::Enum`]      |
//! | regex-looking text         | [`ParsedRange::Pattern`]   |
//! | anything else, or empty    | scalar `string`            |
//!
//! Bounds may omit either side (`min..`, `..max`); `[n]` means exactly `n`
//! items. Parsing never fails.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static SCALAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(string|boolean|integer|url)(?:\(\s*(-?\d+)?\s*\.\.\s*(-?\d+)?\s*\))?$")
        .expect("scalar grammar is a valid regex")
});

static ARRAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(string|boolean|integer|url)\[\s*(\d+)?\s*(\.\.)?\s*(\d+)?\s*\]$")
        .expect("array grammar is a valid regex")
});

static ENUM_ARRAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\((.+)\)\[\s*(\d+)?\s*(\.\.)?\s*(\d+)?\s*\]$")
        .expect("enum array grammar is a valid regex")
});

const ENUM_SEPARATOR: &str = "||";
const LEGACY_ENUM_SEPARATOR: &str = " / ";

/// Scalar kinds a range can constrain a value (or array item) to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// Any text. Bounds, when given, limit the character count.
    #[serde(rename = "string")]
    Text,
    /// A boolean or the literal strings `true` / `false`.
    Boolean,
    /// A whole number. Bounds, when given, limit the value.
    Integer,
    /// An absolute URL.
    Url,
}

impl DataType {
    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "string" => Some(Self::Text),
            "boolean" => Some(Self::Boolean),
            "integer" => Some(Self::Integer),
            "url" => Some(Self::Url),
            _ => None,
        }
    }

    /// The DSL keyword for this type.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Text => "string",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Url => "url",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A field's value domain, as described by its range DSL string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParsedRange {
    /// A single value of `data_type`.
    Scalar {
        /// Kind of value accepted.
        data_type: DataType,
        /// Lower bound: the value for integers, the length for text.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        /// Upper bound, read like `min`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
    },
    /// A sequence of `item_type` values.
    Array {
        /// Kind every item must be.
        item_type: DataType,
        /// Fewest items allowed.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_size: Option<usize>,
        /// Most items allowed.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_size: Option<usize>,
    },
    /// Exactly one of the listed options.
    Enum {
        /// Allowed values, in declaration order.
        options: Vec<String>,
    },
    /// A sequence drawn from the listed options.
    EnumArray {
        /// Allowed items, in declaration order.
        options: Vec<String>,
        /// Fewest items allowed.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_size: Option<usize>,
        /// Most items allowed.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_size: Option<usize>,
    },
    /// Text matching a regular expression.
    Pattern {
        /// Regex source, unanchored unless it anchors itself.
        regex: String,
    },
}

impl ParsedRange {
    /// The most permissive range: any text.
    #[must_use]
    pub fn any_text() -> Self {
        Self::Scalar {
            data_type: DataType::Text,
            min: None,
            max: None,
        }
    }
}

impl Default for ParsedRange {
    fn default() -> Self {
        Self::any_text()
    }
}

impl fmt::Display for ParsedRange {
    /// Renders the canonical DSL form; parsing it yields the same range.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar {
                data_type,
                min,
                max,
            } => {
                write!(f, "{data_type}")?;
                if min.is_some() || max.is_some() {
                    f.write_str("(")?;
                    write_bounds(f, *min, *max)?;
                    f.write_str(")")?;
                }
                Ok(())
            }
            Self::Array {
                item_type,
                min_size,
                max_size,
            } => {
                write!(f, "{item_type}[")?;
                write_size_bounds(f, *min_size, *max_size)?;
                f.write_str("]")
            }
            Self::Enum { options } => f.write_str(&options.join(ENUM_SEPARATOR)),
            Self::EnumArray {
                options,
                min_size,
                max_size,
            } => {
                write!(f, "({})[", options.join(ENUM_SEPARATOR))?;
                write_size_bounds(f, *min_size, *max_size)?;
                f.write_str("]")
            }
            Self::Pattern { regex } => f.write_str(regex),
        }
    }
}

fn write_bounds<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    min: Option<T>,
    max: Option<T>,
) -> fmt::Result {
    if let Some(min) = min {
        write!(f, "{min}")?;
    }
    f.write_str("..")?;
    if let Some(max) = max {
        write!(f, "{max}")?;
    }
    Ok(())
}

fn write_size_bounds(
    f: &mut fmt::Formatter<'_>,
    min: Option<usize>,
    max: Option<usize>,
) -> fmt::Result {
    if min.is_none() && max.is_none() {
        return Ok(());
    }
    write_bounds(f, min, max)
}

/// Parse a range DSL string. Never fails: unrecognised syntax degrades to
/// the most permissive applicable variant.
#[must_use]
pub fn parse_range(range: &str) -> ParsedRange {
    let range = range.trim();
    if range.is_empty() {
        return ParsedRange::any_text();
    }

    if let Some(caps) = ENUM_ARRAY.captures(range) {
        let options = split_options(&caps[1], ENUM_SEPARATOR);
        if !options.is_empty() {
            let (min_size, max_size) = size_bounds(
                caps.get(2).map(|m| m.as_str()),
                caps.get(3).is_some(),
                caps.get(4).map(|m| m.as_str()),
            );
            return ParsedRange::EnumArray {
                options,
                min_size,
                max_size,
            };
        }
    }

    if let Some(caps) = ARRAY.captures(range) {
        if let Some(item_type) = DataType::from_keyword(&caps[1]) {
            let (min_size, max_size) = size_bounds(
                caps.get(2).map(|m| m.as_str()),
                caps.get(3).is_some(),
                caps.get(4).map(|m| m.as_str()),
            );
            return ParsedRange::Array {
                item_type,
                min_size,
                max_size,
            };
        }
    }

    if let Some(caps) = SCALAR.captures(range) {
        if let Some(data_type) = DataType::from_keyword(&caps[1]) {
            return ParsedRange::Scalar {
                data_type,
                min: caps.get(2).and_then(|m| m.as_str().parse().ok()),
                max: caps.get(3).and_then(|m| m.as_str().parse().ok()),
            };
        }
    }

    // An alternation inside a regex, such as `^(a||b)$`, is not an enum.
    let is_pattern = looks_like_regex(range);

    if range.contains(ENUM_SEPARATOR) {
        let options = split_options(range, ENUM_SEPARATOR);
        if !options.is_empty() && !(is_pattern && has_regex_fragment(&options)) {
            return ParsedRange::Enum { options };
        }
    }

    if range.contains(LEGACY_ENUM_SEPARATOR) {
        let options = split_options(range, LEGACY_ENUM_SEPARATOR);
        if options.len() > 1 && !(is_pattern && has_regex_fragment(&options)) {
            return ParsedRange::Enum { options };
        }
    }

    if is_pattern {
        return ParsedRange::Pattern {
            regex: range.to_owned(),
        };
    }

    tracing::trace!(range, "unrecognised range syntax, treating as free text");
    ParsedRange::any_text()
}

fn split_options(text: &str, separator: &str) -> Vec<String> {
    text.split(separator)
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_owned)
        .collect()
}

fn size_bounds(
    min: Option<&str>,
    has_range: bool,
    max: Option<&str>,
) -> (Option<usize>, Option<usize>) {
    let min = min.and_then(|m| m.parse().ok());
    let max = max.and_then(|m| m.parse().ok());
    if has_range {
        (min, max)
    } else {
        // `[n]` pins the size exactly.
        (min, min)
    }
}

/// Whether any option opens or closes with a regex anchor, group or class.
fn has_regex_fragment(options: &[String]) -> bool {
    options
        .iter()
        .any(|o| o.starts_with(['^', '(', '[', '\\']) || o.ends_with(['$', ')', ']']))
}

fn looks_like_regex(text: &str) -> bool {
    text.starts_with(['^', '[', '(', '\\', '.'])
        || text.ends_with(['$', ']', ')', '*', '+', '?', '}'])
}
