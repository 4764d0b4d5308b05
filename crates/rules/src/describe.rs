//! Human-readable rendering of rules.

use std::fmt;

use stencil_template::{Rule, RuleDomain, RuleState, is_descendant_path};

/// Renders a rule as a sentence, focused on one target field.
///
/// The engine calls this once per applied target to fill
/// `disabled_reasons`. Output must be deterministic.
pub trait RuleDescriber: Send + Sync + fmt::Debug {
    /// Describe `rule` from the point of view of `field`.
    fn describe(&self, rule: &Rule, field: &str) -> String;
}

/// Default English renderer.
///
/// ```text
/// If 'server.host' is set, then 'database.connection' is required to be set.
/// 'log.level' is always required to be set to 'info'.
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainDescriber;

impl RuleDescriber for PlainDescriber {
    fn describe(&self, rule: &Rule, field: &str) -> String {
        let target = rule
            .targets
            .iter()
            .find(|t| t.name == field)
            .or_else(|| rule.targets.iter().find(|t| is_descendant_path(field, &t.name)))
            .or_else(|| rule.targets.first());

        let Some(target) = target else {
            return String::new();
        };
        let requirement = describe_target(field, target);

        if rule.is_unconditional() {
            return match requirement.strip_prefix(&format!("'{field}' is required")) {
                Some(rest) => format!("'{field}' is always required{rest}."),
                None => format!("{requirement} in every configuration."),
            };
        }

        let conditions = rule
            .conditions
            .iter()
            .map(describe_condition)
            .collect::<Vec<_>>()
            .join(" and ");
        format!("If {conditions}, then {requirement}.")
    }
}

/// "'X' is set", "'X' does not contain 'v'", ...
#[must_use]
pub fn describe_condition(domain: &RuleDomain) -> String {
    let name = &domain.name;
    let value = value_text(domain);
    match (domain.state, domain.not) {
        (RuleState::Set, false) => format!("'{name}' is set"),
        (RuleState::Set, true) => format!("'{name}' is not set"),
        (RuleState::SetToValue, false) => format!("'{name}' is set to '{value}'"),
        (RuleState::SetToValue, true) => format!("'{name}' is not set to '{value}'"),
        (RuleState::Contains, false) => format!("'{name}' contains '{value}'"),
        (RuleState::Contains, true) => format!("'{name}' does not contain '{value}'"),
    }
}

/// Requirement clause for `field` under `domain`, e.g. "'Y' is required to be set".
#[must_use]
pub fn describe_target(field: &str, domain: &RuleDomain) -> String {
    let value = value_text(domain);
    match (domain.state, domain.not) {
        (RuleState::Set, false) => format!("'{field}' is required to be set"),
        (RuleState::Set, true) => format!("'{field}' is required to be unset"),
        (RuleState::SetToValue, false) => format!("'{field}' is required to be set to '{value}'"),
        (RuleState::SetToValue, true) => format!("'{field}' must not be set to '{value}'"),
        (RuleState::Contains, false) => format!("'{field}' is required to contain '{value}'"),
        (RuleState::Contains, true) => format!("'{field}' must not contain '{value}'"),
    }
}

fn value_text(domain: &RuleDomain) -> String {
    domain
        .value
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_default()
}
