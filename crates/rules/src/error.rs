//! Rule analysis and inheritance error types.

use std::fmt;

use serde::Serialize;
use stencil_template::{FieldValue, RuleState};

/// How two domains on the same field disagree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Conflict {
    /// One domain is negated, the other is not.
    Negation,
    /// The domains use different states.
    State {
        /// State of the earlier domain.
        first: RuleState,
        /// State of the later domain.
        second: RuleState,
    },
    /// Same valued state, different values.
    Value {
        /// Value of the earlier domain.
        first: FieldValue,
        /// Value of the later domain.
        second: FieldValue,
    },
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Negation => f.write_str("one requires it, the other negates it"),
            Self::State { first, second } => write!(f, "state `{first}` vs `{second}`"),
            Self::Value { first, second } => write!(f, "value '{first}' vs '{second}'"),
        }
    }
}

/// Which half of a rule an internal contradiction sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RulePart {
    /// The `conditions` list.
    Conditions,
    /// The `targets` list.
    Targets,
}

impl fmt::Display for RulePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conditions => f.write_str("conditions"),
            Self::Targets => f.write_str("targets"),
        }
    }
}

/// A structural problem found by [`validate_rules`](crate::validate_rules).
///
/// Rule indices refer to positions in the validated slice.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum RuleIssue {
    /// Rules feed each other in a loop that is not a stable equilibrium.
    #[error("circular dependency detected: {}", .path.join(" → "))]
    CircularDependency {
        /// The cycle, first node repeated at the end.
        path: Vec<String>,
    },

    /// Two rules with identical conditions impose conflicting targets.
    #[error("contradiction on `{field}` between rules #{first} and #{second}: {conflict}")]
    Contradiction {
        /// Target field both rules set.
        field: String,
        /// Index of the earlier rule.
        first: usize,
        /// Index of the later rule.
        second: usize,
        /// How the two targets disagree.
        conflict: Conflict,
    },

    /// A single rule names one field twice with disagreeing domains.
    #[error("rule #{rule} is inconsistent on `{field}` within its {part}: {conflict}")]
    InternalContradiction {
        /// Index of the inconsistent rule.
        rule: usize,
        /// Field named twice.
        field: String,
        /// Half of the rule holding both domains.
        part: RulePart,
        /// How the two domains disagree.
        conflict: Conflict,
    },
}

impl RuleIssue {
    /// Machine-readable error code for programmatic handling.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::CircularDependency { .. } => "RULE_CYCLE",
            Self::Contradiction { .. } => "RULE_CONTRADICTION",
            Self::InternalContradiction { .. } => "RULE_INTERNAL_CONTRADICTION",
        }
    }
}

/// Problems in a template's `extends` graph.
///
/// [`resolve_rule_set_rules`](crate::resolve_rule_set_rules) returns
/// [`Cycle`](Self::Cycle) as a fatal error;
/// [`validate_rule_set_inheritance`](crate::validate_rule_set_inheritance)
/// reports every variant without failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum InheritanceError {
    /// `extends` names a ruleset that does not exist.
    #[error("ruleset `{rule_set}` extends nonexistent ruleset `{parent}`")]
    MissingParent {
        /// Ruleset carrying the `extends`.
        rule_set: String,
        /// Name it extends.
        parent: String,
    },

    /// `extends` names the ruleset itself.
    #[error("ruleset `{rule_set}` extends itself")]
    SelfExtension {
        /// Ruleset extending itself.
        rule_set: String,
    },

    /// Following `extends` leads back to a ruleset already on the chain.
    #[error("circular inheritance: {}", .chain.join(" → "))]
    Cycle {
        /// The walked chain, repeated ruleset last.
        chain: Vec<String>,
    },
}

impl InheritanceError {
    /// Machine-readable error code for programmatic handling.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingParent { .. } => "INHERIT_MISSING_PARENT",
            Self::SelfExtension { .. } => "INHERIT_SELF",
            Self::Cycle { .. } => "INHERIT_CYCLE",
        }
    }

    /// Inheritance problems are structural, so retrying never helps.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        false
    }
}
