//! Observation hooks for rule application.
//!
//! The engine reports each rule it evaluates and, once per call, the batch of
//! changes it recorded. Loggers never influence the outcome.

use std::fmt;

use parking_lot::Mutex;
use serde::Serialize;

use crate::change::FieldChange;

/// Result of one condition while evaluating a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionOutcome {
    /// Field the condition reads.
    pub field: String,
    /// Whether it held (after negation).
    pub satisfied: bool,
}

/// What happened to one rule during an application pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleEvaluation {
    /// Position of the rule in the applied slice.
    pub index: usize,
    /// Rendered description of the rule.
    pub description: String,
    /// Target field names, in declaration order.
    pub targets: Vec<String>,
    /// Per-condition results, in declaration order. Evaluation stops at the
    /// first unsatisfied condition.
    pub conditions: Vec<ConditionOutcome>,
    /// Whether all conditions held and targets were applied.
    pub matched: bool,
    /// Fields whose value or `checked` flag the targets changed.
    pub changed_fields: Vec<String>,
}

/// Receives rule evaluation events from [`RuleEngine`](crate::RuleEngine).
pub trait RuleLogger: Send + Sync + fmt::Debug {
    /// Called once per rule, in application order.
    fn rule_evaluated(&self, evaluation: &RuleEvaluation);

    /// Called once per application with every recorded change, if any.
    fn changes_recorded(&self, changes: &[FieldChange]);
}

/// Emits rule events through `tracing`.
///
/// Per-rule events go out at `debug`, change batches at `info`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl RuleLogger for TracingLogger {
    fn rule_evaluated(&self, evaluation: &RuleEvaluation) {
        tracing::debug!(
            hook = "rules",
            rule = evaluation.index,
            matched = evaluation.matched,
            changed = evaluation.changed_fields.len(),
            description = %evaluation.description,
            "Rule evaluated"
        );
    }

    fn changes_recorded(&self, changes: &[FieldChange]) {
        tracing::info!(hook = "rules", count = changes.len(), "Field changes recorded");
        for change in changes {
            tracing::trace!(
                field = %change.field,
                property = ?change.property,
                origin = ?change.origin,
                old = %change.old_value,
                new = %change.new_value,
                "Field change"
            );
        }
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentLogger;

impl RuleLogger for SilentLogger {
    fn rule_evaluated(&self, _evaluation: &RuleEvaluation) {}

    fn changes_recorded(&self, _changes: &[FieldChange]) {}
}

/// Keeps events in memory for later inspection.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    evaluations: Mutex<Vec<RuleEvaluation>>,
    changes: Mutex<Vec<FieldChange>>,
}

impl MemoryLogger {
    /// Create an empty logger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every evaluation seen so far.
    #[must_use]
    pub fn evaluations(&self) -> Vec<RuleEvaluation> {
        self.evaluations.lock().clone()
    }

    /// Every change seen so far, across all batches.
    #[must_use]
    pub fn changes(&self) -> Vec<FieldChange> {
        self.changes.lock().clone()
    }

    /// Drop everything recorded.
    pub fn clear(&self) {
        self.evaluations.lock().clear();
        self.changes.lock().clear();
    }
}

impl RuleLogger for MemoryLogger {
    fn rule_evaluated(&self, evaluation: &RuleEvaluation) {
        self.evaluations.lock().push(evaluation.clone());
    }

    fn changes_recorded(&self, changes: &[FieldChange]) {
        self.changes.lock().extend_from_slice(changes);
    }
}
