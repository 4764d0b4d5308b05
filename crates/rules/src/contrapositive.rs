//! Recognising stable contrapositive pairs among rules.
//!
//! `A → ¬B` together with `¬B → A` loops in the dependency graph, but applying
//! the pair settles immediately: whichever of `A` or `¬B` holds, the other is
//! forced and nothing flips back. Cycles made only of such fields are not
//! reported.

use std::collections::HashSet;

use stencil_template::{Rule, RuleDomain, RuleState};

/// Whether `first` and `second` form a contrapositive pair, in either order.
#[must_use]
pub fn is_contrapositive_pair(first: &Rule, second: &Rule) -> bool {
    links_oppositely(first, second) || links_oppositely(second, first)
}

fn links_oppositely(r1: &Rule, r2: &Rule) -> bool {
    if !feeds(r1, r2) || !feeds(r2, r1) {
        return false;
    }
    set_links(r1, r2).any(|forward| set_links(r2, r1).any(|back| back != forward))
}

/// Some target of `from` names a condition field of `to`.
fn feeds(from: &Rule, to: &Rule) -> bool {
    from.target_fields()
        .any(|t| to.condition_fields().any(|c| c == t))
}

/// The `not` flag of every Set target of `from` that matches a Set condition
/// of `to` on the same field with the same flag.
fn set_links<'a>(from: &'a Rule, to: &'a Rule) -> impl Iterator<Item = bool> + 'a {
    from.targets.iter().filter_map(move |target| {
        to.conditions
            .iter()
            .any(|condition| same_set_domain(target, condition))
            .then_some(target.not)
    })
}

fn same_set_domain(a: &RuleDomain, b: &RuleDomain) -> bool {
    a.name == b.name && a.state == RuleState::Set && b.state == RuleState::Set && a.not == b.not
}

/// Every field named by a rule that belongs to some contrapositive pair.
#[must_use]
pub fn contrapositive_fields(rules: &[Rule]) -> HashSet<String> {
    let mut fields = HashSet::new();
    for (i, first) in rules.iter().enumerate() {
        for second in &rules[i + 1..] {
            if is_contrapositive_pair(first, second) {
                for rule in [first, second] {
                    fields.extend(rule.condition_fields().map(str::to_owned));
                    fields.extend(rule.target_fields().map(str::to_owned));
                }
            }
        }
    }
    fields
}

/// Drop every cycle whose path lies entirely within contrapositive fields.
#[must_use]
pub fn filter_contrapositive_cycles(cycles: Vec<Vec<String>>, rules: &[Rule]) -> Vec<Vec<String>> {
    let fields = contrapositive_fields(rules);
    if fields.is_empty() {
        return cycles;
    }
    cycles
        .into_iter()
        .filter(|path| !path.iter().all(|node| fields.contains(node)))
        .collect()
}
