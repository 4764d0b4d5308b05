//! Conflicting targets among rules with identical conditions, and
//! self-inconsistent rules.

use std::cmp::Ordering;

use indexmap::IndexMap;
use stencil_template::{FieldValue, Rule, RuleDomain, RuleState};

use crate::error::{Conflict, RuleIssue, RulePart};

/// One condition reduced to what makes it distinct.
#[derive(Debug, PartialEq)]
struct SignatureEntry<'a> {
    name: &'a str,
    state: RuleState,
    not: bool,
    value: Option<serde_json::Value>,
}

fn signature(rule: &Rule) -> Vec<SignatureEntry<'_>> {
    let mut entries: Vec<SignatureEntry<'_>> = rule
        .conditions
        .iter()
        .map(|c| SignatureEntry {
            name: &c.name,
            state: c.state,
            not: c.not,
            value: c.relevant_value().map(FieldValue::to_json),
        })
        .collect();
    entries.sort_by(|a, b| {
        a.name
            .cmp(b.name)
            .then(a.state.cmp(&b.state))
            .then(a.not.cmp(&b.not))
            .then_with(|| compare_values(a.value.as_ref(), b.value.as_ref()))
    });
    entries
}

fn compare_values(a: Option<&serde_json::Value>, b: Option<&serde_json::Value>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.to_string().cmp(&b.to_string()),
        (a, b) => a.is_some().cmp(&b.is_some()),
    }
}

/// Rule indices grouped by identical condition sets, ignoring condition
/// order. Groups appear in order of their first rule; unconditional rules
/// share one group.
#[must_use]
pub fn group_by_conditions(rules: &[Rule]) -> Vec<Vec<usize>> {
    let mut groups: Vec<(Vec<SignatureEntry<'_>>, Vec<usize>)> = Vec::new();
    for (i, rule) in rules.iter().enumerate() {
        let sig = signature(rule);
        match groups.iter_mut().find(|(s, _)| *s == sig) {
            Some((_, members)) => members.push(i),
            None => groups.push((sig, vec![i])),
        }
    }
    groups.into_iter().map(|(_, members)| members).collect()
}

/// How two target domains on the same field disagree, if they do.
///
/// Checked in order: negation, state, then value for valued states.
#[must_use]
pub fn compare_domains(a: &RuleDomain, b: &RuleDomain) -> Option<Conflict> {
    if a.not != b.not {
        return Some(Conflict::Negation);
    }
    if a.state != b.state {
        return Some(Conflict::State {
            first: a.state,
            second: b.state,
        });
    }
    if a.state.requires_value() && a.value != b.value {
        return Some(Conflict::Value {
            first: a.value.clone().unwrap_or_default(),
            second: b.value.clone().unwrap_or_default(),
        });
    }
    None
}

/// Pairwise target conflicts among the rules at `members`.
#[must_use]
pub fn group_contradictions(rules: &[Rule], members: &[usize]) -> Vec<RuleIssue> {
    let mut by_field: IndexMap<&str, Vec<(usize, &RuleDomain)>> = IndexMap::new();
    for &i in members {
        let Some(rule) = rules.get(i) else { continue };
        for target in &rule.targets {
            by_field.entry(target.name.as_str()).or_default().push((i, target));
        }
    }

    let mut issues = Vec::new();
    for (field, domains) in &by_field {
        for (k, (first, a)) in domains.iter().enumerate() {
            for (second, b) in &domains[k + 1..] {
                if first == second {
                    continue;
                }
                if let Some(conflict) = compare_domains(a, b) {
                    issues.push(RuleIssue::Contradiction {
                        field: (*field).to_owned(),
                        first: *first,
                        second: *second,
                        conflict,
                    });
                }
            }
        }
    }
    issues
}

/// Contradictions between rules that share a condition signature.
#[must_use]
pub fn find_contradictions(rules: &[Rule]) -> Vec<RuleIssue> {
    group_by_conditions(rules)
        .into_iter()
        .filter(|members| members.len() > 1)
        .flat_map(|members| group_contradictions(rules, &members))
        .collect()
}

/// Rules that name one field twice, within their conditions or within their
/// targets, with a different state or `not` flag.
#[must_use]
pub fn find_internal_contradictions(rules: &[Rule]) -> Vec<RuleIssue> {
    let mut issues = Vec::new();
    for (i, rule) in rules.iter().enumerate() {
        for (part, domains) in [
            (RulePart::Conditions, &rule.conditions),
            (RulePart::Targets, &rule.targets),
        ] {
            for (k, a) in domains.iter().enumerate() {
                for b in &domains[k + 1..] {
                    if a.name != b.name {
                        continue;
                    }
                    let conflict = if a.not == b.not {
                        (a.state != b.state).then_some(Conflict::State {
                            first: a.state,
                            second: b.state,
                        })
                    } else {
                        Some(Conflict::Negation)
                    };
                    if let Some(conflict) = conflict {
                        issues.push(RuleIssue::InternalContradiction {
                            rule: i,
                            field: a.name.clone(),
                            part,
                            conflict,
                        });
                    }
                }
            }
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn grouping_ignores_condition_order() {
        let rules = vec![
            Rule::when(
                vec![RuleDomain::set("a"), RuleDomain::set_to("b", "x")],
                vec![RuleDomain::set("t")],
            ),
            Rule::new(vec![RuleDomain::set("u")]),
            Rule::when(
                vec![RuleDomain::set_to("b", "x"), RuleDomain::set("a")],
                vec![RuleDomain::set("v")],
            ),
            Rule::when(
                vec![RuleDomain::set_to("b", "y"), RuleDomain::set("a")],
                vec![RuleDomain::set("v")],
            ),
            Rule::new(vec![RuleDomain::set("w")]),
        ];
        assert_eq!(group_by_conditions(&rules), vec![vec![0, 2], vec![1, 4], vec![3]]);
    }

    #[test]
    fn set_value_is_irrelevant_to_signature() {
        let mut with_value = RuleDomain::set("a");
        with_value.value = Some(FieldValue::from("ignored"));
        let rules = vec![
            Rule::when(vec![RuleDomain::set("a")], vec![RuleDomain::set("t")]),
            Rule::when(vec![with_value], vec![RuleDomain::set("u")]),
        ];
        assert_eq!(group_by_conditions(&rules), vec![vec![0, 1]]);
    }

    #[test]
    fn same_conditions_opposite_targets() {
        let rules = vec![
            Rule::when(vec![RuleDomain::set("a")], vec![RuleDomain::set("b")]),
            Rule::when(vec![RuleDomain::set("a")], vec![RuleDomain::set("b").negated()]),
        ];
        assert_eq!(
            find_contradictions(&rules),
            vec![RuleIssue::Contradiction {
                field: "b".into(),
                first: 0,
                second: 1,
                conflict: Conflict::Negation,
            }]
        );
    }

    #[test]
    fn differing_values_and_states() {
        let rules = vec![
            Rule::new(vec![RuleDomain::set_to("level", "debug")]),
            Rule::new(vec![RuleDomain::set_to("level", "warn")]),
            Rule::new(vec![RuleDomain::contains("level", "warn")]),
        ];
        let issues = find_contradictions(&rules);
        assert_eq!(issues.len(), 3);
        assert!(matches!(
            &issues[0],
            RuleIssue::Contradiction { conflict: Conflict::Value { .. }, first: 0, second: 1, .. }
        ));
        assert!(matches!(
            &issues[1],
            RuleIssue::Contradiction { conflict: Conflict::State { .. }, first: 0, second: 2, .. }
        ));
    }

    #[test]
    fn different_conditions_never_contradict() {
        let rules = vec![
            Rule::when(vec![RuleDomain::set("a")], vec![RuleDomain::set("b")]),
            Rule::when(vec![RuleDomain::set("c")], vec![RuleDomain::set("b").negated()]),
        ];
        assert!(find_contradictions(&rules).is_empty());
    }

    #[test]
    fn agreeing_targets_are_fine() {
        let rules = vec![
            Rule::when(vec![RuleDomain::set("a")], vec![RuleDomain::set_to("b", 1_i64)]),
            Rule::when(vec![RuleDomain::set("a")], vec![RuleDomain::set_to("b", 1_i64)]),
        ];
        assert!(find_contradictions(&rules).is_empty());
    }

    #[test]
    fn internal_contradictions_per_part() {
        let rules = vec![
            Rule::when(
                vec![RuleDomain::set("a"), RuleDomain::set("a").negated()],
                vec![RuleDomain::set("b")],
            ),
            Rule::new(vec![
                RuleDomain::set("c"),
                RuleDomain::set_to("c", "x"),
                RuleDomain::set("d"),
            ]),
            Rule::when(vec![RuleDomain::set("e")], vec![RuleDomain::set("e").negated()]),
        ];
        assert_eq!(
            find_internal_contradictions(&rules),
            vec![
                RuleIssue::InternalContradiction {
                    rule: 0,
                    field: "a".into(),
                    part: RulePart::Conditions,
                    conflict: Conflict::Negation,
                },
                RuleIssue::InternalContradiction {
                    rule: 1,
                    field: "c".into(),
                    part: RulePart::Targets,
                    conflict: Conflict::State {
                        first: RuleState::Set,
                        second: RuleState::SetToValue,
                    },
                },
            ]
        );
    }
}
