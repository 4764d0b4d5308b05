//! Checking concrete values against a [`ParsedRange`].
//!
//! Validation is a predicate: malformed values, unparsable numbers and
//! invalid regexes all yield `false`, never an error.

use regex::Regex;
use stencil_template::value::item_text;
use stencil_template::{Field, FieldValue};

use crate::parse::{DataType, ParsedRange, parse_range};

impl ParsedRange {
    /// Whether `value` lies in this range.
    #[must_use]
    pub fn validate(&self, value: &FieldValue) -> bool {
        match self {
            Self::Scalar {
                data_type,
                min,
                max,
            } => scalar_ok(*data_type, value, *min, *max),
            Self::Array {
                item_type,
                min_size,
                max_size,
            } => value.sequence_items().is_some_and(|items| {
                size_ok(items.len(), *min_size, *max_size)
                    && items
                        .iter()
                        .all(|item| scalar_ok(*item_type, &from_json_item(item), None, None))
            }),
            Self::Enum { options } => {
                let text = value.to_string();
                options.iter().any(|o| *o == text)
            }
            Self::EnumArray {
                options,
                min_size,
                max_size,
            } => value.sequence_items().is_some_and(|items| {
                size_ok(items.len(), *min_size, *max_size)
                    && items.iter().all(|item| {
                        let text = item_text(item);
                        options.iter().any(|o| *o == text)
                    })
            }),
            Self::Pattern { regex } => match Regex::new(regex) {
                Ok(re) => re.is_match(&value.to_string()),
                Err(error) => {
                    tracing::debug!(regex = %regex, %error, "invalid range pattern");
                    false
                }
            },
        }
    }
}

/// Parse `range` and check `value` against it.
#[must_use]
pub fn validate_value(value: &FieldValue, range: &str) -> bool {
    parse_range(range).validate(value)
}

/// Check a field's value against its own range.
#[must_use]
pub fn validate_field(field: &Field) -> bool {
    validate_value(&field.value, &field.range)
}

/// Checked fields whose value falls outside their range, in input order.
///
/// Unchecked fields are excluded from the configuration and never reported.
#[must_use]
pub fn invalid_fields(fields: &[Field]) -> Vec<&Field> {
    fields
        .iter()
        .filter(|f| f.is_checked() && !validate_field(f))
        .collect()
}

fn scalar_ok(data_type: DataType, value: &FieldValue, min: Option<i64>, max: Option<i64>) -> bool {
    match data_type {
        DataType::Text => {
            if min.is_none() && max.is_none() {
                return true;
            }
            let len = value.to_string().chars().count() as i64;
            bounds_ok(len, min, max)
        }
        DataType::Boolean => match value {
            FieldValue::Bool(_) => true,
            FieldValue::Text(s) => s == "true" || s == "false",
            _ => false,
        },
        DataType::Integer => as_integer(value).is_some_and(|n| bounds_ok(n, min, max)),
        DataType::Url => match value {
            FieldValue::Text(s) => url::Url::parse(s.trim()).is_ok(),
            _ => false,
        },
    }
}

fn as_integer(value: &FieldValue) -> Option<i64> {
    let n = match value {
        FieldValue::Number(n) => *n,
        FieldValue::Text(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (n.is_finite() && n.fract() == 0.0).then_some(n as i64)
}

fn bounds_ok(n: i64, min: Option<i64>, max: Option<i64>) -> bool {
    min.is_none_or(|m| n >= m) && max.is_none_or(|m| n <= m)
}

fn size_ok(len: usize, min: Option<usize>, max: Option<usize>) -> bool {
    min.is_none_or(|m| len >= m) && max.is_none_or(|m| len <= m)
}

fn from_json_item(item: &serde_json::Value) -> FieldValue {
    match item {
        serde_json::Value::Bool(b) => FieldValue::Bool(*b),
        serde_json::Value::Number(n) => n.as_f64().map_or_else(FieldValue::empty, FieldValue::Number),
        serde_json::Value::String(s) => FieldValue::Text(s.clone()),
        other => FieldValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("integer(1..65535)", FieldValue::Number(8080.0), true)]
    #[case("integer(1..65535)", FieldValue::Number(99999.0), false)]
    #[case("integer(1..65535)", FieldValue::from("443"), true)]
    #[case("integer(1..65535)", FieldValue::Number(1.5), false)]
    #[case("integer(1..65535)", FieldValue::from("8080.0"), true)]
    #[case("integer(1..65535)", FieldValue::from("1e3"), true)]
    #[case("integer(1..65535)", FieldValue::from("80.5"), false)]
    #[case("integer", FieldValue::from("NaN"), false)]
    #[case("integer", FieldValue::from("abc"), false)]
    #[case("boolean", FieldValue::Bool(false), true)]
    #[case("boolean", FieldValue::from("true"), true)]
    #[case("boolean", FieldValue::from("yes"), false)]
    #[case("url", FieldValue::from("https://example.com/a"), true)]
    #[case("url", FieldValue::from("not a url"), false)]
    #[case("string", FieldValue::Number(3.0), true)]
    #[case("string(2..4)", FieldValue::from("abc"), true)]
    #[case("string(2..4)", FieldValue::from("abcde"), false)]
    #[case("", FieldValue::from("anything"), true)]
    fn scalars(#[case] range: &str, #[case] value: FieldValue, #[case] expected: bool) {
        assert_eq!(validate_value(&value, range), expected, "{range} vs {value:?}");
    }

    #[rstest]
    #[case("string[1..2]", FieldValue::from(vec!["a"]), true)]
    #[case("string[1..2]", FieldValue::from(vec!["a", "b", "c"]), false)]
    #[case("string[1..]", FieldValue::TextList(vec![]), false)]
    #[case("integer[]", FieldValue::NumberList(vec![1.0, 2.0]), true)]
    #[case("integer[]", FieldValue::from(r#"[1, "x"]"#), false)]
    #[case("integer[]", FieldValue::from("[1, 2]"), true)]
    #[case("integer[]", FieldValue::from("1, 2"), false)]
    #[case("boolean[]", FieldValue::from("[true, false]"), true)]
    fn arrays(#[case] range: &str, #[case] value: FieldValue, #[case] expected: bool) {
        assert_eq!(validate_value(&value, range), expected, "{range} vs {value:?}");
    }

    #[rstest]
    #[case("debug||info", FieldValue::from("info"), true)]
    #[case("debug||info", FieldValue::from("trace"), false)]
    #[case("tcp / udp", FieldValue::from("udp"), true)]
    #[case("1||2", FieldValue::Number(2.0), true)]
    #[case("^(a||b)$", FieldValue::from("b"), true)]
    #[case("^(a||b)$", FieldValue::from("^(a"), false)]
    #[case("(read||write)[1..2]", FieldValue::from(vec!["read"]), true)]
    #[case("(read||write)[1..2]", FieldValue::from(vec!["read", "exec"]), false)]
    #[case("(read||write)[1..2]", FieldValue::TextList(vec![]), false)]
    #[case("(read||write)[]", FieldValue::from(r#"["write"]"#), true)]
    fn enums(#[case] range: &str, #[case] value: FieldValue, #[case] expected: bool) {
        assert_eq!(validate_value(&value, range), expected, "{range} vs {value:?}");
    }

    #[test]
    fn patterns_match_stringified_value() {
        assert!(validate_value(&FieldValue::from("abc"), "^[a-z]+$"));
        assert!(!validate_value(&FieldValue::from("ABC"), "^[a-z]+$"));
        assert!(validate_value(&FieldValue::Number(123.0), "^[0-9]+$"));
    }

    #[test]
    fn invalid_regex_is_false_not_panic() {
        let range = ParsedRange::Pattern {
            regex: "(unclosed".into(),
        };
        assert!(!range.validate(&FieldValue::from("(unclosed")));
    }

    #[test]
    fn invalid_fields_skips_unchecked() {
        let fields = vec![
            Field::new("port", 99999_i64)
                .with_range("integer(1..65535)")
                .with_checked(true),
            Field::new("other_port", 99999_i64).with_range("integer(1..65535)"),
            Field::new("host", "localhost")
                .with_range("string")
                .with_checked(true),
        ];
        let invalid: Vec<&str> = invalid_fields(&fields)
            .into_iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(invalid, vec!["port"]);
    }
}
