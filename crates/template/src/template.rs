use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::collection::FieldCollection;
use crate::error::ModelError;
use crate::field::Field;
use crate::ruleset::RuleSet;

/// A configuration template: fields plus the rulesets that govern them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// Template name.
    #[serde(default)]
    pub name: String,
    /// Field definitions and their current values.
    #[serde(default)]
    pub fields: FieldCollection,
    /// Rulesets, resolvable through their `extends` chains.
    #[serde(default)]
    pub rule_sets: Vec<RuleSet>,
}

impl Template {
    /// Create an empty template.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parse a template from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        serde_json::from_str(json).map_err(|e| ModelError::Deserialization {
            error: e.to_string(),
        })
    }

    /// Add a field (builder-style, consuming).
    #[must_use]
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.add(field);
        self
    }

    /// Add a ruleset (builder-style, consuming).
    #[must_use]
    pub fn with_rule_set(mut self, rule_set: RuleSet) -> Self {
        self.rule_sets.push(rule_set);
        self
    }

    /// Find a ruleset by name.
    #[must_use]
    pub fn rule_set(&self, name: &str) -> Option<&RuleSet> {
        self.rule_sets.iter().find(|rs| rs.name == name)
    }

    /// Find a ruleset by position.
    #[must_use]
    pub fn rule_set_at(&self, index: usize) -> Option<&RuleSet> {
        self.rule_sets.get(index)
    }

    /// Check the whole template, collecting every problem.
    ///
    /// Covers field naming, uniqueness of field and ruleset names, and the
    /// shape of every rule. Inheritance is checked separately.
    #[must_use]
    pub fn check(&self) -> Vec<ModelError> {
        let mut errors = Vec::new();

        let mut seen_fields = HashSet::new();
        for field in &self.fields {
            if let Err(e) = field.check_name() {
                errors.push(e);
            }
            if !seen_fields.insert(field.name.as_str()) {
                errors.push(ModelError::DuplicateField {
                    name: field.name.clone(),
                });
            }
        }

        let mut seen_sets = HashSet::new();
        for rule_set in &self.rule_sets {
            if !seen_sets.insert(rule_set.name.as_str()) {
                errors.push(ModelError::DuplicateRuleSet {
                    name: rule_set.name.clone(),
                });
            }
            errors.extend(rule_set.problems());
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{Rule, RuleDomain};

    #[test]
    fn lookup_by_name_and_index() {
        let t = Template::new("svc")
            .with_rule_set(RuleSet::new("base"))
            .with_rule_set(RuleSet::new("dev").with_extends("base"));
        assert_eq!(t.rule_set("dev").unwrap().name, "dev");
        assert_eq!(t.rule_set_at(0).unwrap().name, "base");
        assert!(t.rule_set("prod").is_none());
        assert!(t.rule_set_at(5).is_none());
    }

    #[test]
    fn check_collects_everything() {
        let t = Template::new("svc")
            .with_field(Field::new("a", ""))
            .with_field(Field::new("a", ""))
            .with_field(Field::new("b..c", ""))
            .with_rule_set(RuleSet::new("base").with_rule(Rule::new(vec![])))
            .with_rule_set(RuleSet::new("base"));

        let errors = t.check();
        assert!(errors.iter().any(|e| matches!(e, ModelError::DuplicateField { .. })));
        assert!(errors.iter().any(|e| matches!(e, ModelError::InvalidFieldName { .. })));
        assert!(errors.iter().any(|e| matches!(e, ModelError::DuplicateRuleSet { .. })));
        assert!(errors.iter().any(|e| matches!(e, ModelError::InRule { .. })));
    }

    #[test]
    fn valid_template_has_no_problems() {
        let t = Template::new("svc")
            .with_field(Field::new("server.host", "localhost"))
            .with_rule_set(RuleSet::new("base").with_rule(Rule::when(
                vec![RuleDomain::set("server.host")],
                vec![RuleDomain::set("server.port")],
            )));
        assert!(t.check().is_empty());
    }

    #[test]
    fn from_json_reports_bad_documents() {
        let err = Template::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ModelError::Deserialization { .. }));
    }
}
