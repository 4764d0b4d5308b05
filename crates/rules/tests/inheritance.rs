use pretty_assertions::assert_eq;
use stencil_rules::{
    CIRCULAR_MARKER, InheritanceError, get_rule_set_inheritance_chain,
    resolve_rule_set_rules, validate_rule_set_inheritance,
};
use stencil_template::{Rule, Template};

const TEMPLATE: &str = r#"{
    "name": "web",
    "rule_sets": [
        {
            "name": "Base",
            "rules": [
                {"targets": [{"name": "server.host", "state": "set"}]}
            ]
        },
        {
            "name": "Development",
            "extends": "Base",
            "tags": ["dev"],
            "rules": [
                {"targets": [{"name": "debug", "state": "set"}]},
                {
                    "conditions": [{"name": "debug", "state": "set"}],
                    "targets": [{"name": "log.level", "state": "set_to_value", "value": "trace"}]
                }
            ]
        },
        {"name": "Loop", "extends": "Loop"},
        {
            "name": "Orphan",
            "extends": "Staging",
            "rules": [{"targets": [{"name": "orphan.flag", "state": "set"}]}]
        }
    ]
}"#;

fn targets(rules: &[Rule]) -> Vec<&str> {
    rules.iter().flat_map(Rule::target_fields).collect()
}

#[test]
fn base_rules_come_before_development_rules() {
    let template = Template::from_json(TEMPLATE).unwrap();
    let rules = resolve_rule_set_rules(&template, "Development").unwrap();
    assert_eq!(targets(&rules), vec!["server.host", "debug", "log.level"]);
    assert_eq!(
        get_rule_set_inheritance_chain(&template, "Development"),
        vec!["Base", "Development"]
    );
}

#[test]
fn self_extension_is_an_error() {
    let template = Template::from_json(TEMPLATE).unwrap();
    let err = resolve_rule_set_rules(&template, "Loop").unwrap_err();
    assert_eq!(err.code(), "INHERIT_CYCLE");
    assert!(!err.is_retryable());
    assert_eq!(
        get_rule_set_inheritance_chain(&template, "Loop"),
        vec![CIRCULAR_MARKER, "Loop"]
    );
}

#[test]
fn nonexistent_parent_returns_own_rules() {
    let template = Template::from_json(TEMPLATE).unwrap();
    let rules = resolve_rule_set_rules(&template, "Orphan").unwrap();
    assert_eq!(targets(&rules), vec!["orphan.flag"]);
}

#[test]
fn resolve_by_index_matches_by_name() {
    let template = Template::from_json(TEMPLATE).unwrap();
    assert_eq!(
        resolve_rule_set_rules(&template, 1_usize).unwrap(),
        resolve_rule_set_rules(&template, "Development").unwrap()
    );
}

#[test]
fn validation_reports_every_problem_without_failing() {
    let template = Template::from_json(TEMPLATE).unwrap();
    let report = validate_rule_set_inheritance(&template);
    assert!(!report.is_valid);
    assert_eq!(
        report.errors,
        vec![
            InheritanceError::SelfExtension {
                rule_set: "Loop".into()
            },
            InheritanceError::MissingParent {
                rule_set: "Orphan".into(),
                parent: "Staging".into(),
            },
        ]
    );
}

#[test]
fn three_way_cycle_is_reported_per_ruleset() {
    let template = Template::from_json(
        r#"{"rule_sets": [
            {"name": "a", "extends": "b"},
            {"name": "b", "extends": "c"},
            {"name": "c", "extends": "a"},
            {"name": "d", "extends": "a"}
        ]}"#,
    )
    .unwrap();

    let report = validate_rule_set_inheritance(&template);
    let messages: Vec<String> = report.errors.iter().map(ToString::to_string).collect();
    assert_eq!(
        messages,
        vec![
            "circular inheritance: a → b → c → a",
            "circular inheritance: b → c → a → b",
            "circular inheritance: c → a → b → c",
            "circular inheritance: d → a → b → c → a",
        ]
    );
    assert!(resolve_rule_set_rules(&template, "d").is_err());
}
