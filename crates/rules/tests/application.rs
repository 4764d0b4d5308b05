use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use stencil_range::invalid_fields;
use stencil_rules::{
    ApplyOptions, ChangeOrigin, ChangeTrigger, FieldProperty, MemoryLogger, RuleEngine,
    apply_rules,
};
use stencil_template::{Field, FieldValue, Rule, RuleDomain, Template};

fn apply(fields: &[Field], rules: &[Rule]) -> stencil_rules::ApplyOutcome {
    RuleEngine::silent().apply(fields, rules, &ApplyOptions::default())
}

fn find<'a>(fields: &'a [Field], name: &str) -> &'a Field {
    fields
        .iter()
        .find(|f| f.name == name)
        .unwrap_or_else(|| panic!("field {name} should exist"))
}

// ---------------------------------------------------------------------------
// 1. Conditional application
// ---------------------------------------------------------------------------

#[test]
fn server_host_requires_database_connection() {
    let fields = vec![
        Field::new("server.host", "localhost").with_checked(true),
        Field::new("database.connection", "postgres://db/app"),
    ];
    let rules = vec![Rule::when(
        vec![RuleDomain::set("server.host")],
        vec![RuleDomain::set("database.connection")],
    )];

    let out = apply_rules(&fields, &rules, &ApplyOptions::default());

    assert!(find(&out.updated_fields, "database.connection").is_checked());
    assert!(out.disabled_reasons.contains_key("database.connection"));
    assert_eq!(out.disabled_reasons.len(), 1);
}

#[test]
fn negated_condition_fires_on_unchecked_field() {
    let fields = vec![
        Field::new("cache.enabled", true),
        Field::new("cache.ttl", 60_i64).with_checked(true),
    ];
    let rules = vec![Rule::when(
        vec![RuleDomain::set("cache.enabled").negated()],
        vec![RuleDomain::set("cache.ttl").negated()],
    )];

    let out = apply(&fields, &rules);
    assert!(!find(&out.updated_fields, "cache.ttl").is_checked());
    assert_eq!(
        out.disabled_reasons["cache.ttl"],
        "If 'cache.enabled' is not set, then 'cache.ttl' is required to be unset."
    );
}

#[test]
fn all_conditions_must_hold() {
    let fields = vec![
        Field::new("mode", "cluster").with_checked(true),
        Field::new("tls", "").with_checked(true),
        Field::new("nodes", "3"),
    ];
    let rules = vec![Rule::when(
        vec![RuleDomain::set_to("mode", "cluster"), RuleDomain::set("tls")],
        vec![RuleDomain::set("nodes")],
    )];

    let out = apply(&fields, &rules);
    assert!(!find(&out.updated_fields, "nodes").is_checked());
    assert!(out.changes.is_empty());
}

#[test]
fn rule_reading_an_earlier_target_settles_in_one_pass() {
    let fields = vec![
        Field::new("tls.enabled", false),
        Field::new("tls.cert", ""),
    ];
    let rules = vec![
        Rule::new(vec![RuleDomain::set("tls.enabled")]),
        Rule::when(
            vec![RuleDomain::set("tls.enabled")],
            vec![RuleDomain::set_to("tls.cert", "/etc/tls/cert.pem")],
        ),
    ];

    let once = apply(&fields, &rules);
    assert_eq!(
        find(&once.updated_fields, "tls.cert").value,
        FieldValue::from("/etc/tls/cert.pem")
    );
    let twice = apply(&once.updated_fields, &rules);
    assert_eq!(twice.updated_fields, once.updated_fields);
}

// ---------------------------------------------------------------------------
// 2. Unconditional rules
// ---------------------------------------------------------------------------

#[test]
fn unconditional_targets_apply_regardless_of_other_fields() {
    let rules = vec![Rule::new(vec![
        RuleDomain::set("log.level"),
        RuleDomain::set_to("log.format", "json"),
    ])];

    for other_checked in [false, true] {
        let fields = vec![
            Field::new("log.level", "info"),
            Field::new("log.format", "text"),
            Field::new("unrelated", "x").with_checked(other_checked),
        ];
        let out = apply(&fields, &rules);
        assert!(find(&out.updated_fields, "log.level").is_checked());
        let format = find(&out.updated_fields, "log.format");
        assert!(format.is_checked());
        assert_eq!(format.value, FieldValue::from("json"));
    }
}

// ---------------------------------------------------------------------------
// 3. Contains targets
// ---------------------------------------------------------------------------

#[test]
fn json_text_remove_keeps_checked_when_non_empty() {
    let fields = vec![Field::new("features", r#"["a","b"]"#).with_checked(true)];
    let rules = vec![Rule::new(vec![RuleDomain::contains("features", "b").negated()])];

    let out = apply(&fields, &rules);
    let features = find(&out.updated_fields, "features");
    assert_eq!(features.value, FieldValue::from(r#"["a"]"#));
    assert!(features.is_checked());
}

#[test]
fn contains_add_is_deduplicated_across_rules() {
    let fields = vec![Field::new("plugins", vec!["auth"])];
    let rules = vec![
        Rule::new(vec![RuleDomain::contains("plugins", "metrics")]),
        Rule::new(vec![RuleDomain::contains("plugins", "metrics")]),
        Rule::new(vec![RuleDomain::contains("plugins", "auth")]),
    ];

    let out = apply(&fields, &rules);
    let plugins = find(&out.updated_fields, "plugins");
    assert_eq!(plugins.value, FieldValue::from(vec!["auth", "metrics"]));
    assert!(plugins.is_checked());
}

#[test]
fn removing_last_entry_clears_checked() {
    let fields = vec![Field::new("plugins", vec!["auth"]).with_checked(true)];
    let rules = vec![Rule::new(vec![RuleDomain::contains("plugins", "auth").negated()])];

    let out = apply(&fields, &rules);
    assert!(!find(&out.updated_fields, "plugins").is_checked());
}

// ---------------------------------------------------------------------------
// 4. Change records and logging
// ---------------------------------------------------------------------------

#[test]
fn changes_record_old_and_new_values() {
    let fields = vec![
        Field::new("a", "x").with_checked(true),
        Field::new("b", "old"),
    ];
    let rules = vec![Rule::when(
        vec![RuleDomain::set("a")],
        vec![RuleDomain::set_to("b", "new")],
    )];

    let out = apply(&fields, &rules);
    assert_eq!(out.changes.len(), 2);
    let value_change = &out.changes[0];
    assert_eq!(value_change.field, "b");
    assert_eq!(value_change.property, FieldProperty::Value);
    assert_eq!(value_change.old_value, json!("old"));
    assert_eq!(value_change.new_value, json!("new"));
    assert_eq!(value_change.reason, out.disabled_reasons["b"]);
    assert_eq!(out.changes[1].property, FieldProperty::Checked);
}

#[test]
fn bulk_check_trigger_precedes_rule_changes() {
    let original = vec![Field::new("a", "1"), Field::new("b", "2"), Field::new("c", "3")];
    let current = vec![
        Field::new("a", "1").with_checked(true),
        Field::new("b", "2").with_checked(true),
        Field::new("c", "3"),
    ];
    let rules = vec![Rule::when(
        vec![RuleDomain::set("b")],
        vec![RuleDomain::set("c")],
    )];
    let options = ApplyOptions::new().with_trigger(
        ChangeTrigger::BulkCheck {
            fields: vec!["a".into(), "b".into()],
            checked: true,
        },
        original,
    );

    let logger = Arc::new(MemoryLogger::new());
    let out = RuleEngine::new()
        .with_logger(logger.clone())
        .apply(&current, &rules, &options);

    let summary: Vec<(&str, ChangeOrigin)> = out
        .changes
        .iter()
        .map(|c| (c.field.as_str(), c.origin))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("a", ChangeOrigin::User),
            ("b", ChangeOrigin::User),
            ("c", ChangeOrigin::Rule),
        ]
    );
    assert_eq!(logger.changes(), out.changes);
}

// ---------------------------------------------------------------------------
// 5. With the range DSL
// ---------------------------------------------------------------------------

#[test]
fn rule_driven_values_are_checked_against_ranges() {
    let template = Template::from_json(
        r#"{
            "name": "service",
            "fields": [
                {"name": "server.port", "value": 8080, "range": "integer(1..65535)", "checked": true},
                {"name": "server.mode", "value": "", "range": "dev||prod"},
                {"name": "server.debug", "value": false, "range": "boolean"}
            ],
            "rule_sets": [{
                "name": "default",
                "rules": [
                    {"targets": [{"name": "server.mode", "state": "set_to_value", "value": "staging"}]},
                    {
                        "conditions": [{"name": "server.mode", "state": "set_to_value", "value": "prod"}],
                        "targets": [{"name": "server.debug", "state": "set"}]
                    }
                ]
            }]
        }"#,
    )
    .unwrap();

    let rules = &template.rule_sets[0].rules;
    let out = apply(template.fields.as_slice(), rules);

    let invalid: Vec<&str> = invalid_fields(&out.updated_fields)
        .into_iter()
        .map(|f| f.name.as_str())
        .collect();
    assert_eq!(invalid, vec!["server.mode"]);
    assert!(!find(&out.updated_fields, "server.debug").is_checked());
}
