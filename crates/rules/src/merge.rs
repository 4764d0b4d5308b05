//! Merge suggestions for redundant rule layouts.

use std::fmt;

use serde::Serialize;
use stencil_template::Rule;

use crate::contradiction::{group_by_conditions, group_contradictions};

/// Why rules could be merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeReason {
    /// More than one rule has no conditions.
    Unconditional,
    /// The rules have identical conditions and compatible targets.
    SharedConditions,
}

/// A non-fatal hint that several rules could be written as one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeSuggestion {
    /// Indices of the rules to merge, ascending.
    pub rule_indices: Vec<usize>,
    /// Why they qualify.
    pub reason: MergeReason,
}

impl fmt::Display for MergeSuggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indices = self
            .rule_indices
            .iter()
            .map(|i| format!("#{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        match self.reason {
            MergeReason::Unconditional => {
                write!(f, "unconditional rules {indices} could be merged into one")
            }
            MergeReason::SharedConditions => write!(
                f,
                "rules {indices} share the same conditions and could be merged into one"
            ),
        }
    }
}

/// Suggest merging all unconditional rules, and each group of rules with
/// identical conditions whose targets do not contradict.
#[must_use]
pub fn suggest_merges(rules: &[Rule]) -> Vec<MergeSuggestion> {
    let mut suggestions = Vec::new();

    let unconditional: Vec<usize> = rules
        .iter()
        .enumerate()
        .filter(|(_, r)| r.is_unconditional())
        .map(|(i, _)| i)
        .collect();
    if unconditional.len() > 1 {
        suggestions.push(MergeSuggestion {
            rule_indices: unconditional,
            reason: MergeReason::Unconditional,
        });
    }

    for members in group_by_conditions(rules) {
        if members.len() < 2 || rules[members[0]].is_unconditional() {
            continue;
        }
        if group_contradictions(rules, &members).is_empty() {
            suggestions.push(MergeSuggestion {
                rule_indices: members,
                reason: MergeReason::SharedConditions,
            });
        }
    }

    suggestions
}
