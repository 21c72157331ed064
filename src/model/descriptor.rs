use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{generate_id, Id};

/// Widget a field renders as. A superset of the semantic types, so that one
/// semantic type can pick between presentation variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UiKind {
    Text,
    SingleSelect,
    MultiSelect,
    Size,
    Integer,
    Textarea,
    Checkbox,
    Radio,
    Slider,
    Switch,
}

impl UiKind {
    /// Widgets whose value is a number and which honor min/max bounds.
    pub fn is_numeric(&self) -> bool {
        matches!(self, UiKind::Integer | UiKind::Slider | UiKind::Size)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationRules {
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
}

impl ValidationRules {
    pub fn required() -> Self {
        Self {
            required: true,
            ..Self::default()
        }
    }

    pub fn bounded(min: i64, max: i64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub is_disabled: bool,
}

impl SelectOption {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
            is_disabled: false,
        }
    }
}

/// Type-specific render data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtraInfo {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    #[serde(default)]
    pub creatable: bool,
}

/// A resolved, renderable form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormFieldDescriptor {
    /// Render key, unique within one resolution pass only.
    pub id: Id,
    pub name: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub info: String,
    pub ui_kind: UiKind,
    pub default_value: Value,
    pub validation: ValidationRules,
    #[serde(default)]
    pub extra_info: ExtraInfo,
    pub hidden: bool,
}

impl FormFieldDescriptor {
    /// A visible field labelled by its name with no default.
    pub fn new(name: impl Into<String>, ui_kind: UiKind) -> Self {
        let name = name.into();
        Self {
            id: generate_id(),
            label: name.clone(),
            name,
            info: String::new(),
            ui_kind,
            default_value: Value::String(String::new()),
            validation: ValidationRules::default(),
            extra_info: ExtraInfo::default(),
            hidden: false,
        }
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = value;
        self
    }

    pub fn with_validation(mut self, validation: ValidationRules) -> Self {
        self.validation = validation;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Copy of this descriptor with a different visibility.
    pub fn with_hidden(&self, hidden: bool) -> Self {
        Self {
            hidden,
            ..self.clone()
        }
    }
}
