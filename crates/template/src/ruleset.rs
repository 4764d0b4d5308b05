use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::rule::Rule;

/// A named, taggable, optionally inheriting collection of rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Unique within a template.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Labels for filtering and grouping.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Own rules, in evaluation order.
    #[serde(default)]
    pub rules: Vec<Rule>,
    /// Name of the parent ruleset whose rules come first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
}

impl RuleSet {
    /// Create an empty ruleset.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Append a rule (builder-style, consuming).
    #[must_use]
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Set the parent ruleset (builder-style, consuming).
    #[must_use]
    pub fn with_extends(mut self, parent: impl Into<String>) -> Self {
        self.extends = Some(parent.into());
        self
    }

    /// Set the description (builder-style, consuming).
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a tag (builder-style, consuming).
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Whether `extends` names this ruleset itself.
    #[must_use]
    pub fn extends_itself(&self) -> bool {
        self.extends.as_deref() == Some(self.name.as_str())
    }

    /// Shape problems of every rule, located by rule index.
    #[must_use]
    pub fn problems(&self) -> Vec<ModelError> {
        self.rules
            .iter()
            .enumerate()
            .flat_map(|(index, rule)| {
                rule.problems()
                    .into_iter()
                    .map(move |source| ModelError::InRule {
                        rule_set: self.name.clone(),
                        index,
                        source: Box::new(source),
                    })
            })
            .collect()
    }
}
