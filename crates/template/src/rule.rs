use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::value::FieldValue;

/// The state a domain checks for (as a condition) or enforces (as a target).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleState {
    /// The field is checked and non-empty.
    Set,
    /// The field is checked and equals a value.
    SetToValue,
    /// The field is checked and its sequence or text contains a value.
    Contains,
}

impl RuleState {
    /// Whether a domain in this state must carry a `value`.
    #[must_use]
    pub fn requires_value(self) -> bool {
        match self {
            Self::Set => false,
            Self::SetToValue | Self::Contains => true,
        }
    }
}

impl fmt::Display for RuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Set => f.write_str("set"),
            Self::SetToValue => f.write_str("set_to_value"),
            Self::Contains => f.write_str("contains"),
        }
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// A single named-field state check or mutation instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDomain {
    /// Dot-delimited field path. May name a group via its parent path.
    pub name: String,
    /// The state to check or enforce.
    pub state: RuleState,
    /// Required for [`RuleState::SetToValue`] and [`RuleState::Contains`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<FieldValue>,
    /// Negates the check (condition) or the effect (target).
    #[serde(default, skip_serializing_if = "is_false")]
    pub not: bool,
}

impl RuleDomain {
    /// A [`RuleState::Set`] domain.
    #[must_use]
    pub fn set(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: RuleState::Set,
            value: None,
            not: false,
        }
    }

    /// A [`RuleState::SetToValue`] domain.
    #[must_use]
    pub fn set_to(name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            name: name.into(),
            state: RuleState::SetToValue,
            value: Some(value.into()),
            not: false,
        }
    }

    /// A [`RuleState::Contains`] domain.
    #[must_use]
    pub fn contains(name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            name: name.into(),
            state: RuleState::Contains,
            value: Some(value.into()),
            not: false,
        }
    }

    /// Flip the `not` flag (builder-style, consuming).
    #[must_use]
    pub fn negated(mut self) -> Self {
        self.not = !self.not;
        self
    }

    /// The value, but only where the state gives it meaning.
    #[must_use]
    pub fn relevant_value(&self) -> Option<&FieldValue> {
        if self.state.requires_value() {
            self.value.as_ref()
        } else {
            None
        }
    }

    /// Check the value-presence invariant.
    pub fn check(&self) -> Result<(), ModelError> {
        if self.state.requires_value() && self.value.is_none() {
            return Err(ModelError::MissingValue {
                field: self.name.clone(),
                state: self.state,
            });
        }
        Ok(())
    }
}

/// Conditions (AND-combined, optional) plus targets applied when they hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Empty means the rule is unconditional.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<RuleDomain>,
    /// Must be non-empty.
    pub targets: Vec<RuleDomain>,
    /// Optional author-supplied description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Rule {
    /// An unconditional rule.
    #[must_use]
    pub fn new(targets: Vec<RuleDomain>) -> Self {
        Self {
            conditions: Vec::new(),
            targets,
            description: None,
        }
    }

    /// A rule applied only when every condition holds.
    #[must_use]
    pub fn when(conditions: Vec<RuleDomain>, targets: Vec<RuleDomain>) -> Self {
        Self {
            conditions,
            targets,
            description: None,
        }
    }

    /// Attach a description (builder-style, consuming).
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether the rule has no conditions.
    #[must_use]
    pub fn is_unconditional(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Field names referenced by conditions, in declaration order.
    pub fn condition_fields(&self) -> impl Iterator<Item = &str> {
        self.conditions.iter().map(|c| c.name.as_str())
    }

    /// Field names referenced by targets, in declaration order.
    pub fn target_fields(&self) -> impl Iterator<Item = &str> {
        self.targets.iter().map(|t| t.name.as_str())
    }

    /// Every shape problem of this rule.
    #[must_use]
    pub fn problems(&self) -> Vec<ModelError> {
        let mut problems = Vec::new();
        if self.targets.is_empty() {
            problems.push(ModelError::EmptyTargets);
        }
        for domain in self.conditions.iter().chain(&self.targets) {
            if let Err(e) = domain.check() {
                problems.push(e);
            }
        }
        problems
    }

    /// Check the rule shape, stopping at the first problem.
    pub fn check(&self) -> Result<(), ModelError> {
        match self.problems().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn state_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(RuleState::SetToValue).unwrap(),
            json!("set_to_value")
        );
        let s: RuleState = serde_json::from_value(json!("contains")).unwrap();
        assert_eq!(s, RuleState::Contains);
    }

    #[test]
    fn domain_omits_defaults_in_json() {
        let json = serde_json::to_value(RuleDomain::set("a")).unwrap();
        assert_eq!(json, json!({"name": "a", "state": "set"}));

        let json = serde_json::to_value(RuleDomain::contains("tags", "x").negated()).unwrap();
        assert_eq!(
            json,
            json!({"name": "tags", "state": "contains", "value": "x", "not": true})
        );
    }

    #[test]
    fn rule_without_conditions_deserializes_as_unconditional() {
        let rule: Rule = serde_json::from_value(json!({
            "targets": [{"name": "server.port", "state": "set"}]
        }))
        .unwrap();
        assert!(rule.is_unconditional());
        assert_eq!(rule.targets.len(), 1);
    }

    #[test]
    fn problems_reports_every_shape_issue() {
        let rule = Rule {
            conditions: vec![RuleDomain {
                name: "mode".into(),
                state: RuleState::SetToValue,
                value: None,
                not: false,
            }],
            targets: vec![],
            description: None,
        };
        let problems = rule.problems();
        assert_eq!(problems.len(), 2);
        assert_eq!(problems[0], ModelError::EmptyTargets);
        assert!(matches!(problems[1], ModelError::MissingValue { .. }));
        assert!(rule.check().is_err());
    }

    #[test]
    fn well_formed_rule_checks_ok() {
        let rule = Rule::when(
            vec![RuleDomain::set("a")],
            vec![RuleDomain::set_to("b", "x")],
        );
        assert!(rule.check().is_ok());
    }

    #[test]
    fn relevant_value_ignores_value_on_set() {
        let mut d = RuleDomain::set("a");
        d.value = Some(FieldValue::from("ignored"));
        assert!(d.relevant_value().is_none());
        assert_eq!(
            RuleDomain::set_to("a", "x").relevant_value(),
            Some(&FieldValue::from("x"))
        );
    }
}
