//! Per-call options for rule application and validation.

use serde::{Deserialize, Serialize};
use stencil_template::Field;

use crate::change::ChangeTrigger;

/// Optional inputs to [`RuleEngine::apply`](crate::RuleEngine::apply).
///
/// When both `trigger` and `original_fields` are present, the changes the
/// trigger made are recorded ahead of rule-driven changes. Neither affects
/// evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplyOptions {
    /// The user action that led to this application.
    #[serde(default)]
    pub trigger: Option<ChangeTrigger>,
    /// Field snapshot from before the trigger.
    #[serde(default)]
    pub original_fields: Option<Vec<Field>>,
}

impl ApplyOptions {
    /// Options with no trigger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `trigger` against the `original` snapshot (builder-style, consuming).
    #[must_use]
    pub fn with_trigger(mut self, trigger: ChangeTrigger, original: Vec<Field>) -> Self {
        self.trigger = Some(trigger);
        self.original_fields = Some(original);
        self
    }
}

/// Switches for [`validate_rules_with`](crate::validate_rules_with).
///
/// The defaults reproduce [`validate_rules`](crate::validate_rules).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOptions {
    /// Drop cycles made up only of contrapositive-pair fields.
    #[serde(default = "default_true")]
    pub filter_contrapositive_cycles: bool,
    /// Produce merge suggestions as warnings.
    #[serde(default = "default_true")]
    pub suggest_merges: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            filter_contrapositive_cycles: default_true(),
            suggest_merges: default_true(),
        }
    }
}
