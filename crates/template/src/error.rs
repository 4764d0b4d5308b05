use crate::rule::RuleState;

/// Error type for template model checks.
///
/// Covers field naming, uniqueness, and rule shape problems. These are
/// reported, never repaired.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Field name does not meet path naming rules.
    #[error("invalid field name `{name}`: {reason}")]
    InvalidFieldName {
        /// Offending name.
        name: String,
        /// Which naming rule it breaks.
        reason: String,
    },

    /// Two fields share the same path.
    #[error("duplicate field name `{name}`")]
    DuplicateField {
        /// Repeated path.
        name: String,
    },

    /// Two rulesets share the same name.
    #[error("duplicate ruleset name `{name}`")]
    DuplicateRuleSet {
        /// Repeated ruleset name.
        name: String,
    },

    /// A rule declares no targets.
    #[error("rule has no targets")]
    EmptyTargets,

    /// A domain uses a valued state without a value.
    #[error("`{field}` uses state `{state}` without a value")]
    MissingValue {
        /// Field the domain names.
        field: String,
        /// Valued state left without a value.
        state: RuleState,
    },

    /// A rule-level problem, located inside a ruleset.
    #[error("ruleset `{rule_set}`, rule #{index}: {source}")]
    InRule {
        /// Ruleset holding the rule.
        rule_set: String,
        /// Position of the rule in the ruleset.
        index: usize,
        /// The rule-level problem.
        #[source]
        source: Box<ModelError>,
    },

    /// Failed to deserialize a template document.
    #[error("deserialization failed: {error}")]
    Deserialization {
        /// Message from the JSON decoder.
        error: String,
    },
}

impl ModelError {
    /// Machine-readable error code for programmatic handling.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidFieldName { .. } => "MODEL_INVALID_FIELD_NAME",
            Self::DuplicateField { .. } => "MODEL_DUPLICATE_FIELD",
            Self::DuplicateRuleSet { .. } => "MODEL_DUPLICATE_RULESET",
            Self::EmptyTargets => "MODEL_EMPTY_TARGETS",
            Self::MissingValue { .. } => "MODEL_MISSING_VALUE",
            Self::InRule { source, .. } => source.code(),
            Self::Deserialization { .. } => "MODEL_DESER",
        }
    }

    /// Whether the operation might succeed if retried with the same input.
    ///
    /// Model checks are deterministic, so this is always `false`.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        false
    }
}
