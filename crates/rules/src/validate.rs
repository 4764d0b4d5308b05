//! Whole-ruleset validation that collects every issue.

use serde::Serialize;
use stencil_template::Rule;

use crate::config::ValidationOptions;
use crate::contradiction::{find_contradictions, find_internal_contradictions};
use crate::contrapositive::filter_contrapositive_cycles;
use crate::error::RuleIssue;
use crate::graph::DependencyGraph;
use crate::merge::{MergeSuggestion, suggest_merges};

/// Outcome of [`validate_rules`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    /// `true` iff `errors` is empty. Warnings never invalidate.
    pub is_valid: bool,
    /// Cycles, then contradictions, then internal contradictions.
    pub errors: Vec<RuleIssue>,
    /// Merge suggestions.
    pub warnings: Vec<MergeSuggestion>,
}

/// Validate `rules` with default options.
#[must_use]
pub fn validate_rules(rules: &[Rule]) -> ValidationResult {
    validate_rules_with(rules, &ValidationOptions::default())
}

/// Validate `rules`, collecting every problem instead of stopping at the first.
#[must_use]
pub fn validate_rules_with(rules: &[Rule], options: &ValidationOptions) -> ValidationResult {
    let mut errors = Vec::new();

    // 1. Dependency cycles
    let mut cycles = DependencyGraph::from_rules(rules).find_cycles();
    if options.filter_contrapositive_cycles {
        cycles = filter_contrapositive_cycles(cycles, rules);
    }
    errors.extend(
        cycles
            .into_iter()
            .map(|path| RuleIssue::CircularDependency { path }),
    );

    // 2. Conflicting targets under identical conditions
    errors.extend(find_contradictions(rules));

    // 3. Self-inconsistent rules
    errors.extend(find_internal_contradictions(rules));

    let warnings = if options.suggest_merges {
        suggest_merges(rules)
    } else {
        Vec::new()
    };

    tracing::debug!(
        rules = rules.len(),
        errors = errors.len(),
        warnings = warnings.len(),
        "Rules validated"
    );

    ValidationResult {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}
