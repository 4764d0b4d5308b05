#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Stencil Rules
//!
//! Rule evaluation and static analysis for Stencil templates.
//!
//! - [`RuleEngine`] and [`apply_rules`] run a single ordered pass of rules
//!   over a field snapshot, recording reasons and old→new [`FieldChange`]s
//! - [`check_condition`] and [`apply_target`] are the per-field primitives
//! - [`RuleLogger`] receives evaluation events ([`TracingLogger`] by default)
//! - [`RuleDescriber`] renders rules as sentences ([`PlainDescriber`])
//! - [`validate_rules`] collects dependency cycles, contradictions and merge
//!   suggestions using [`DependencyGraph`] (a `petgraph` wrapper)
//! - [`resolve_rule_set_rules`] and friends follow ruleset `extends` chains

pub mod audit;
pub mod change;
pub mod condition;
pub mod config;
pub mod contradiction;
pub mod contrapositive;
pub mod describe;
pub mod engine;
pub mod error;
pub mod graph;
pub mod inheritance;
pub mod merge;
pub mod target;
pub mod validate;

pub use audit::{ConditionOutcome, MemoryLogger, RuleEvaluation, RuleLogger, SilentLogger, TracingLogger};
pub use change::{ChangeOrigin, ChangeTrigger, FieldChange, FieldProperty};
pub use condition::{FieldIndex, check_condition, evaluate_condition};
pub use config::{ApplyOptions, ValidationOptions};
pub use contradiction::{find_contradictions, find_internal_contradictions};
pub use contrapositive::{contrapositive_fields, is_contrapositive_pair};
pub use describe::{PlainDescriber, RuleDescriber};
pub use engine::{ApplyOutcome, RuleEngine, apply_rules, is_field_required, required_fields};
pub use error::{Conflict, InheritanceError, RuleIssue, RulePart};
pub use graph::DependencyGraph;
pub use inheritance::{
    CIRCULAR_MARKER, InheritanceReport, RuleSetRef, get_child_rule_sets,
    get_rule_set_inheritance_chain, has_child_rule_sets, resolve_rule_set_rules,
    validate_rule_set_inheritance,
};
pub use merge::{MergeReason, MergeSuggestion, suggest_merges};
pub use target::apply_target;
pub use validate::{ValidationResult, validate_rules, validate_rules_with};
