//! In-place target application.

use regex::Regex;
use stencil_template::value::{decode_json_array, item_text};
use stencil_template::{Field, FieldValue, RuleDomain, RuleState};

/// Apply `target` to `field`, returning whether the value or `checked` flag
/// changed.
///
/// A valued target without a value leaves the field untouched, except a
/// negated `SetToValue`, which clears regardless.
pub fn apply_target(field: &mut Field, target: &RuleDomain) -> bool {
    let before_value = field.value.clone();
    let before_checked = field.is_checked();
    let apply = !target.not;

    match (target.state, apply) {
        (RuleState::Set, _) => field.checked = Some(apply),
        (RuleState::SetToValue, true) => {
            if let Some(value) = &target.value {
                field.value = value.clone();
                field.checked = Some(true);
            }
        }
        (RuleState::SetToValue, false) => {
            field.value = FieldValue::empty();
            field.checked = Some(false);
        }
        (RuleState::Contains, true) => {
            if let Some(value) = &target.value {
                field.value = with_item(&field.value, value);
                field.checked = Some(true);
            }
        }
        (RuleState::Contains, false) => {
            if let Some(value) = &target.value {
                let (remaining, emptied) = without_item(&field.value, value);
                field.value = remaining;
                if emptied {
                    field.checked = Some(false);
                }
            }
        }
    }

    field.value != before_value || field.is_checked() != before_checked
}

fn with_item(current: &FieldValue, item: &FieldValue) -> FieldValue {
    let needle = item.to_string();
    match current {
        FieldValue::TextList(items) => {
            let mut items = items.clone();
            if !items.contains(&needle) {
                items.push(needle);
            }
            FieldValue::TextList(items)
        }
        FieldValue::NumberList(numbers) => match item.as_f64() {
            Some(n) => {
                let mut numbers = numbers.clone();
                if !numbers.contains(&n) {
                    numbers.push(n);
                }
                FieldValue::NumberList(numbers)
            }
            None => {
                let mut items: Vec<String> =
                    numbers.iter().map(|n| FieldValue::Number(*n).to_string()).collect();
                items.push(needle);
                FieldValue::TextList(items)
            }
        },
        other => {
            let text = other.to_string();
            if let Some(mut items) = decode_json_array(&text) {
                if !items.iter().any(|i| item_text(i) == needle) {
                    items.push(item.to_json());
                }
                return FieldValue::Text(serde_json::Value::Array(items).to_string());
            }
            if text.trim().is_empty() {
                FieldValue::Text(needle)
            } else if text.contains(&needle) {
                current.clone()
            } else {
                FieldValue::Text(format!("{text} {needle}"))
            }
        }
    }
}

/// The value with `item` removed, and whether that removal emptied it.
///
/// A value that was already empty, or did not hold `item`, is never reported
/// as emptied.
fn without_item(current: &FieldValue, item: &FieldValue) -> (FieldValue, bool) {
    let needle = item.to_string();
    match current {
        FieldValue::TextList(items) => {
            let kept: Vec<String> = items.iter().filter(|i| **i != needle).cloned().collect();
            let emptied = kept.len() < items.len() && kept.is_empty();
            (FieldValue::TextList(kept), emptied)
        }
        FieldValue::NumberList(numbers) => {
            let kept: Vec<f64> = match item.as_f64() {
                Some(n) => numbers.iter().copied().filter(|x| *x != n).collect(),
                None => numbers.clone(),
            };
            let emptied = kept.len() < numbers.len() && kept.is_empty();
            (FieldValue::NumberList(kept), emptied)
        }
        FieldValue::Text(text) => {
            if let Some(items) = decode_json_array(text) {
                let before = items.len();
                let kept: Vec<serde_json::Value> = items
                    .into_iter()
                    .filter(|i| item_text(i) != needle)
                    .collect();
                let emptied = kept.len() < before && kept.is_empty();
                return (
                    FieldValue::Text(serde_json::Value::Array(kept).to_string()),
                    emptied,
                );
            }
            let removed = !needle.is_empty() && text.contains(&needle);
            let remaining = remove_token(text, &needle);
            let emptied = removed && remaining.is_empty();
            (FieldValue::Text(remaining), emptied)
        }
        FieldValue::Bool(_) | FieldValue::Number(_) => {
            if current.to_string() == needle {
                (FieldValue::empty(), true)
            } else {
                (current.clone(), false)
            }
        }
    }
}

/// Remove every occurrence of `token` and its surrounding whitespace.
fn remove_token(text: &str, token: &str) -> String {
    if token.is_empty() {
        return text.trim().to_owned();
    }
    let pattern = format!(r"\s*{}\s*", regex::escape(token));
    match Regex::new(&pattern) {
        Ok(re) => re.replace_all(text, " ").trim().to_owned(),
        Err(_) => text.replace(token, " ").trim().to_owned(),
    }
}
