//! Old→new change records for history, audit and undo consumers.

use serde::{Deserialize, Serialize};
use stencil_template::Field;

/// Which property of a field changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldProperty {
    /// The field's value.
    Value,
    /// The field's `checked` flag.
    Checked,
}

/// Who caused a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeOrigin {
    /// A direct user edit.
    User,
    /// A rule applied by the engine.
    Rule,
    /// An assistant-originated edit.
    Ai,
}

/// A single old→new transition of one field property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    /// Field path.
    pub field: String,
    /// The property that changed.
    pub property: FieldProperty,
    /// Value before the change.
    pub old_value: serde_json::Value,
    /// Value after the change.
    pub new_value: serde_json::Value,
    /// Human-readable explanation.
    pub reason: String,
    /// Who caused it.
    pub origin: ChangeOrigin,
}

/// The user action that preceded a rule application, recorded ahead of
/// rule-driven changes. Never affects evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeTrigger {
    /// A single field was edited.
    FieldEdit {
        /// Edited field.
        field: String,
    },
    /// Many fields were checked or unchecked at once.
    BulkCheck {
        /// Fields toggled together.
        fields: Vec<String>,
        /// Flag they were set to.
        checked: bool,
    },
    /// An assistant edited one or more fields.
    AiEdit {
        /// Fields the assistant touched.
        fields: Vec<String>,
        /// Short description of the edit, possibly empty.
        #[serde(default)]
        summary: String,
    },
}

impl ChangeTrigger {
    fn fields(&self) -> Vec<&str> {
        match self {
            Self::FieldEdit { field } => vec![field.as_str()],
            Self::BulkCheck { fields, .. } | Self::AiEdit { fields, .. } => {
                fields.iter().map(String::as_str).collect()
            }
        }
    }

    fn origin(&self) -> ChangeOrigin {
        match self {
            Self::FieldEdit { .. } | Self::BulkCheck { .. } => ChangeOrigin::User,
            Self::AiEdit { .. } => ChangeOrigin::Ai,
        }
    }

    fn reason(&self) -> String {
        match self {
            Self::FieldEdit { .. } => "Edited by user".to_owned(),
            Self::BulkCheck { checked: true, .. } => "Checked in bulk by user".to_owned(),
            Self::BulkCheck { checked: false, .. } => "Unchecked in bulk by user".to_owned(),
            Self::AiEdit { summary, .. } if !summary.is_empty() => {
                format!("Edited by assistant: {summary}")
            }
            Self::AiEdit { .. } => "Edited by assistant".to_owned(),
        }
    }

    /// Changes this trigger made, found by diffing `original` against `current`
    /// for the fields it names. Fields missing from either side are skipped.
    #[must_use]
    pub fn changes(&self, original: &[Field], current: &[Field]) -> Vec<FieldChange> {
        let origin = self.origin();
        let reason = self.reason();
        let mut changes = Vec::new();
        for name in self.fields() {
            let (Some(before), Some(after)) = (
                original.iter().find(|f| f.name == name),
                current.iter().find(|f| f.name == name),
            ) else {
                continue;
            };
            changes.extend(diff_field(before, after, &reason, origin));
        }
        changes
    }
}

/// Value and `checked` transitions between two snapshots of one field.
#[must_use]
pub fn diff_field(
    before: &Field,
    after: &Field,
    reason: &str,
    origin: ChangeOrigin,
) -> Vec<FieldChange> {
    let mut changes = Vec::new();
    if before.value != after.value {
        changes.push(FieldChange {
            field: after.name.clone(),
            property: FieldProperty::Value,
            old_value: before.value.to_json(),
            new_value: after.value.to_json(),
            reason: reason.to_owned(),
            origin,
        });
    }
    if before.is_checked() != after.is_checked() {
        changes.push(FieldChange {
            field: after.name.clone(),
            property: FieldProperty::Checked,
            old_value: serde_json::Value::Bool(before.is_checked()),
            new_value: serde_json::Value::Bool(after.is_checked()),
            reason: reason.to_owned(),
            origin,
        });
    }
    changes
}
