//! Single-pass rule application.

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use stencil_template::{Field, Rule};

use crate::audit::{ConditionOutcome, RuleEvaluation, RuleLogger, SilentLogger, TracingLogger};
use crate::change::{ChangeOrigin, FieldChange, diff_field};
use crate::condition::{FieldIndex, evaluate_condition};
use crate::config::ApplyOptions;
use crate::describe::{PlainDescriber, RuleDescriber};
use crate::target::apply_target;

/// Result of [`RuleEngine::apply`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplyOutcome {
    /// A copy of the input fields with every applied target written in.
    pub updated_fields: Vec<Field>,
    /// Field name → description of the last rule that targeted it, in order
    /// of first application.
    pub disabled_reasons: IndexMap<String, String>,
    /// Trigger changes first, then rule changes in application order.
    pub changes: Vec<FieldChange>,
}

/// Applies rules to a field snapshot.
///
/// Rules are evaluated once each, in slice order. A rule sees what earlier
/// rules wrote during the same pass, but is never revisited when a later rule
/// changes a field it read. There is no fixed-point iteration.
///
/// # Examples
///
/// ```ignore
/// let engine = RuleEngine::new().with_logger(Arc::new(MemoryLogger::new()));
/// let outcome = engine.apply(&fields, &rules, &ApplyOptions::default());
/// ```
#[derive(Debug, Clone)]
pub struct RuleEngine {
    logger: Arc<dyn RuleLogger>,
    describer: Arc<dyn RuleDescriber>,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self {
            logger: Arc::new(TracingLogger),
            describer: Arc::new(PlainDescriber),
        }
    }
}

impl RuleEngine {
    /// An engine that logs through `tracing` and describes rules in English.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine that emits no events.
    #[must_use]
    pub fn silent() -> Self {
        Self::default().with_logger(Arc::new(SilentLogger))
    }

    /// Replace the event sink (builder-style, consuming).
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn RuleLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Replace the rule renderer (builder-style, consuming).
    #[must_use]
    pub fn with_describer(mut self, describer: Arc<dyn RuleDescriber>) -> Self {
        self.describer = describer;
        self
    }

    /// Apply `rules` to a copy of `fields` in one pass.
    ///
    /// Targets go to the field with the exact name, or, when there is none,
    /// to every field below that path. Targets naming nothing are skipped.
    #[must_use]
    pub fn apply(&self, fields: &[Field], rules: &[Rule], options: &ApplyOptions) -> ApplyOutcome {
        let mut fields = fields.to_vec();
        let index = FieldIndex::build(&fields);
        let mut disabled_reasons = IndexMap::new();
        let mut changes = match (&options.trigger, &options.original_fields) {
            (Some(trigger), Some(original)) => trigger.changes(original, &fields),
            _ => Vec::new(),
        };

        for (i, rule) in rules.iter().enumerate() {
            let mut conditions = Vec::with_capacity(rule.conditions.len());
            let mut matched = true;
            for condition in &rule.conditions {
                let satisfied = evaluate_condition(&fields, &index, condition);
                conditions.push(ConditionOutcome {
                    field: condition.name.clone(),
                    satisfied,
                });
                if !satisfied {
                    matched = false;
                    break;
                }
            }

            let mut changed_fields = Vec::new();
            if matched {
                for target in &rule.targets {
                    for pos in index.resolve(&fields, &target.name) {
                        let before = fields[pos].clone();
                        apply_target(&mut fields[pos], target);

                        let name = fields[pos].name.clone();
                        let reason = self.describer.describe(rule, &name);
                        let diff = diff_field(&before, &fields[pos], &reason, ChangeOrigin::Rule);
                        if !diff.is_empty() && !changed_fields.contains(&name) {
                            changed_fields.push(name.clone());
                        }
                        changes.extend(diff);
                        disabled_reasons.insert(name, reason);
                    }
                }
            }

            let targets: Vec<String> = rule.target_fields().map(str::to_owned).collect();
            let description = targets
                .first()
                .map(|t| self.describer.describe(rule, t))
                .unwrap_or_default();
            self.logger.rule_evaluated(&RuleEvaluation {
                index: i,
                description,
                targets,
                conditions,
                matched,
                changed_fields,
            });
        }

        if !changes.is_empty() {
            self.logger.changes_recorded(&changes);
        }

        ApplyOutcome {
            updated_fields: fields,
            disabled_reasons,
            changes,
        }
    }
}

/// [`RuleEngine::apply`] with the default engine.
#[must_use]
pub fn apply_rules(fields: &[Field], rules: &[Rule], options: &ApplyOptions) -> ApplyOutcome {
    RuleEngine::default().apply(fields, rules, options)
}

/// Whether an unconditional, non-negated rule targets `field_name` exactly.
#[must_use]
pub fn is_field_required(field_name: &str, rules: &[Rule]) -> bool {
    rules
        .iter()
        .filter(|r| r.is_unconditional())
        .flat_map(|r| &r.targets)
        .any(|t| t.name == field_name && !t.not)
}

/// Every field name for which [`is_field_required`] holds, in rule order.
#[must_use]
pub fn required_fields(rules: &[Rule]) -> Vec<String> {
    let names: IndexSet<&str> = rules
        .iter()
        .filter(|r| r.is_unconditional())
        .flat_map(|r| &r.targets)
        .filter(|t| !t.not)
        .map(|t| t.name.as_str())
        .collect();
    names.into_iter().map(str::to_owned).collect()
}
