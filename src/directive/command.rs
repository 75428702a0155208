//! Typed UI commands extracted from agent responses.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Visual variant for a button command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonVariant {
    Primary,
    Secondary,
}

impl Default for ButtonVariant {
    fn default() -> Self {
        Self::Primary
    }
}

/// Input type for a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Email,
    Tel,
    Number,
}

impl FieldType {
    /// Parse a field type suffix, defaulting to `text`.
    pub fn from_suffix(suffix: &str) -> Self {
        match suffix.trim().to_lowercase().as_str() {
            "email" => Self::Email,
            "tel" => Self::Tel,
            "number" => Self::Number,
            _ => Self::Text,
        }
    }
}

/// One field of a `[FORM:...]` directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub required: bool,
    pub placeholder: String,
}

/// The directive payload, one variant per tag kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandKind {
    Button {
        text: String,
        action: String,
        variant: ButtonVariant,
    },
    Form {
        title: String,
        fields: Vec<FormField>,
    },
    SaveData {
        payload: serde_json::Value,
    },
    Info {
        message: String,
    },
}

/// A UI command extracted from an agent response.
///
/// The id is unique per parse (generation-time unique); it is not stable
/// across renders of the same text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub id: Uuid,
    #[serde(flatten)]
    pub kind: CommandKind,
}

impl Command {
    pub fn new(kind: CommandKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
        }
    }
}
