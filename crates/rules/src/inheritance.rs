//! Resolving `extends` chains between rulesets.
//!
//! Two policies apply. [`resolve_rule_set_rules`] needs a usable rule list,
//! so it fails on a true cycle but quietly stops at a missing parent.
//! [`validate_rule_set_inheritance`] never fails and reports every problem.

use std::collections::HashSet;

use serde::Serialize;
use stencil_template::{Rule, RuleSet, Template};

use crate::error::InheritanceError;

/// Placed first in an inheritance chain when the walk loops.
pub const CIRCULAR_MARKER: &str = "[circular]";

/// Addresses a ruleset within a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSetRef {
    /// By `name`.
    Name(String),
    /// By position in `rule_sets`.
    Index(usize),
}

impl From<&str> for RuleSetRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<String> for RuleSetRef {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<usize> for RuleSetRef {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl RuleSetRef {
    fn lookup<'a>(&self, template: &'a Template) -> Option<&'a RuleSet> {
        match self {
            Self::Name(name) => template.rule_set(name),
            Self::Index(index) => template.rule_set_at(*index),
        }
    }
}

/// Outcome of [`validate_rule_set_inheritance`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InheritanceReport {
    /// `true` iff `errors` is empty.
    pub is_valid: bool,
    /// Every problem found, in ruleset order.
    pub errors: Vec<InheritanceError>,
}

/// How a walk up the `extends` chain ended.
enum Walk<'a> {
    /// Reached a ruleset without `extends`.
    Root(Vec<&'a RuleSet>),
    /// `extends` named a ruleset that does not exist.
    MissingParent(Vec<&'a RuleSet>, String),
    /// Revisited a ruleset; the names walked, the repeat last.
    Cycle(Vec<String>),
}

/// Follow `extends` from `start`, self first.
fn walk<'a>(template: &'a Template, start: &'a RuleSet) -> Walk<'a> {
    let mut chain = vec![start];
    let mut seen: HashSet<&str> = HashSet::from([start.name.as_str()]);
    let mut current = start;

    while let Some(parent_name) = current.extends.as_deref() {
        if seen.contains(parent_name) {
            let mut names: Vec<String> = chain.iter().map(|rs| rs.name.clone()).collect();
            names.push(parent_name.to_owned());
            return Walk::Cycle(names);
        }
        let Some(parent) = template.rule_set(parent_name) else {
            return Walk::MissingParent(chain, parent_name.to_owned());
        };
        seen.insert(parent_name);
        chain.push(parent);
        current = parent;
    }
    Walk::Root(chain)
}

/// Rules of a ruleset with all inherited rules first, root ancestor first.
///
/// An unknown ruleset yields no rules. A missing parent ends the chain
/// without error.
///
/// # Errors
///
/// Returns [`InheritanceError::Cycle`] when the `extends` chain loops,
/// including a ruleset extending itself.
pub fn resolve_rule_set_rules(
    template: &Template,
    rule_set: impl Into<RuleSetRef>,
) -> Result<Vec<Rule>, InheritanceError> {
    let Some(start) = rule_set.into().lookup(template) else {
        return Ok(Vec::new());
    };
    let chain = match walk(template, start) {
        Walk::Root(chain) => chain,
        Walk::MissingParent(chain, parent) => {
            tracing::debug!(
                rule_set = %start.name,
                %parent,
                "Parent ruleset missing, resolving partial chain"
            );
            chain
        }
        Walk::Cycle(chain) => return Err(InheritanceError::Cycle { chain }),
    };
    Ok(chain
        .into_iter()
        .rev()
        .flat_map(|rs| rs.rules.iter().cloned())
        .collect())
}

/// Check every ruleset's `extends` without failing.
///
/// Self-extension is reported as such rather than as a cycle. Cycles are
/// reported once per ruleset whose walk loops.
#[must_use]
pub fn validate_rule_set_inheritance(template: &Template) -> InheritanceReport {
    let mut errors = Vec::new();
    for rule_set in &template.rule_sets {
        if rule_set.extends_itself() {
            errors.push(InheritanceError::SelfExtension {
                rule_set: rule_set.name.clone(),
            });
            continue;
        }
        match walk(template, rule_set) {
            Walk::Root(_) => {}
            Walk::MissingParent(chain, parent) => {
                // Only the ruleset that names the missing parent reports it.
                if chain.len() == 1 {
                    errors.push(InheritanceError::MissingParent {
                        rule_set: rule_set.name.clone(),
                        parent,
                    });
                }
            }
            Walk::Cycle(chain) => errors.push(InheritanceError::Cycle { chain }),
        }
    }
    InheritanceReport {
        is_valid: errors.is_empty(),
        errors,
    }
}

/// Names from the root ancestor down to `name`.
///
/// A looping chain is returned with [`CIRCULAR_MARKER`] first. A missing
/// parent is left out. An unknown `name` yields an empty chain.
#[must_use]
pub fn get_rule_set_inheritance_chain(template: &Template, name: &str) -> Vec<String> {
    let Some(start) = template.rule_set(name) else {
        return Vec::new();
    };
    match walk(template, start) {
        Walk::Root(chain) | Walk::MissingParent(chain, _) => {
            chain.iter().rev().map(|rs| rs.name.clone()).collect()
        }
        Walk::Cycle(mut names) => {
            names.pop();
            names.reverse();
            names.insert(0, CIRCULAR_MARKER.to_owned());
            names
        }
    }
}

/// Rulesets whose `extends` is exactly `name`, in template order.
#[must_use]
pub fn get_child_rule_sets<'a>(template: &'a Template, name: &str) -> Vec<&'a RuleSet> {
    template
        .rule_sets
        .iter()
        .filter(|rs| rs.extends.as_deref() == Some(name))
        .collect()
}

/// Whether any ruleset extends `name`.
#[must_use]
pub fn has_child_rule_sets(template: &Template, name: &str) -> bool {
    template
        .rule_sets
        .iter()
        .any(|rs| rs.extends.as_deref() == Some(name))
}
