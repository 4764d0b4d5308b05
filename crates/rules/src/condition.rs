//! Condition evaluation against field state.

use std::collections::HashMap;

use stencil_template::value::item_text;
use stencil_template::{Field, FieldValue, RuleDomain, RuleState, is_descendant_path};

/// Whether `condition` holds for `field`, before `not` is applied.
///
/// Every state requires the field to be checked. A `Contains` condition
/// without a value never holds.
#[must_use]
pub fn check_condition(field: &Field, condition: &RuleDomain) -> bool {
    if !field.is_checked() {
        return false;
    }
    match condition.state {
        RuleState::Set => !field.value.is_empty_text(),
        RuleState::SetToValue => condition
            .value
            .as_ref()
            .is_some_and(|expected| field.value == *expected),
        RuleState::Contains => condition
            .value
            .as_ref()
            .is_some_and(|needle| value_contains(&field.value, needle)),
    }
}

/// Sequence membership for lists and JSON-array text, substring otherwise.
#[must_use]
pub fn value_contains(haystack: &FieldValue, needle: &FieldValue) -> bool {
    match haystack {
        FieldValue::TextList(items) => {
            let needle = needle.to_string();
            items.iter().any(|item| *item == needle)
        }
        FieldValue::NumberList(items) => needle
            .as_f64()
            .is_some_and(|n| items.iter().any(|item| *item == n)),
        other => {
            let needle = needle.to_string();
            match other.sequence_items() {
                Some(items) => items.iter().any(|item| item_text(item) == needle),
                None => other.to_string().contains(&needle),
            }
        }
    }
}

/// Name → position lookup over a field slice, built once per application.
#[derive(Debug, Clone, Default)]
pub struct FieldIndex {
    by_name: HashMap<String, usize>,
}

impl FieldIndex {
    /// Index `fields` by name. On duplicate names the first field wins.
    #[must_use]
    pub fn build(fields: &[Field]) -> Self {
        let mut by_name = HashMap::with_capacity(fields.len());
        for (i, field) in fields.iter().enumerate() {
            by_name.entry(field.name.clone()).or_insert(i);
        }
        Self { by_name }
    }

    /// Position of the field named exactly `name`.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Positions a domain named `name` addresses: the exact field if there is
    /// one, otherwise every descendant in slice order.
    #[must_use]
    pub fn resolve(&self, fields: &[Field], name: &str) -> Vec<usize> {
        if let Some(i) = self.position(name) {
            return vec![i];
        }
        fields
            .iter()
            .enumerate()
            .filter(|(_, f)| is_descendant_path(&f.name, name))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Evaluate `condition` over `fields`, including negation and the group
/// fallback.
///
/// A name with no exact field addresses its descendants, and the condition
/// must hold for all of them. A name matching nothing does not hold.
#[must_use]
pub fn evaluate_condition(fields: &[Field], index: &FieldIndex, condition: &RuleDomain) -> bool {
    let positions = index.resolve(fields, &condition.name);
    let held = !positions.is_empty()
        && positions
            .iter()
            .all(|&i| check_condition(&fields[i], condition));
    held != condition.not
}
