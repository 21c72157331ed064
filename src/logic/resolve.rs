use serde_json::Value;

use crate::config::ResolverSettings;
use crate::model::{
    generate_id, to_pascal_case, CatalogEntry, ExtraInfo, FieldPathConstants, FormFieldDescriptor,
    ObjectTypeCatalog, PropertyKind, PropertyMap, SelectOption, UiKind, ValidationRules,
};

/// Turns catalog definitions plus an object's current property values into
/// renderable form fields.
pub struct SchemaResolver<'a> {
    catalog: &'a ObjectTypeCatalog,
    constants: &'a FieldPathConstants,
    settings: ResolverSettings,
}

impl<'a> SchemaResolver<'a> {
    pub fn new(catalog: &'a ObjectTypeCatalog, constants: &'a FieldPathConstants) -> Self {
        Self::with_settings(catalog, constants, ResolverSettings::default())
    }

    pub fn with_settings(
        catalog: &'a ObjectTypeCatalog,
        constants: &'a FieldPathConstants,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            catalog,
            constants,
            settings,
        }
    }

    pub fn catalog(&self) -> &'a ObjectTypeCatalog {
        self.catalog
    }

    /// Resolve every definition attached to `object_type`, general catalog
    /// first, DRBD catalog after. Unknown or empty object types yield no
    /// fields.
    pub fn resolve(&self, object_type: &str, current: &PropertyMap) -> Vec<FormFieldDescriptor> {
        if object_type.is_empty() {
            return Vec::new();
        }

        if !self.catalog.has_object_type(object_type) {
            log::debug!("No property catalog for object type '{}'", object_type);
            return Vec::new();
        }

        self.catalog
            .entries_for(object_type)
            .into_iter()
            .filter_map(|entry| self.resolve_entry(entry, current))
            .collect()
    }

    /// Resolve a single definition. Returns `None` for semantic types this
    /// build does not understand.
    pub fn resolve_entry(
        &self,
        entry: CatalogEntry<'_>,
        current: &PropertyMap,
    ) -> Option<FormFieldDescriptor> {
        let definition = entry.definition;
        let name = self.constants.resolve(&definition.key);
        let stored = current.get(&name);

        let (ui_kind, default_value, validation, extra_info) = match &definition.kind {
            PropertyKind::String => (
                UiKind::Text,
                stored_or_empty(stored),
                ValidationRules::default(),
                ExtraInfo::default(),
            ),
            PropertyKind::Regex {
                pattern,
                invalid_message,
            } => (
                UiKind::Text,
                stored_or_empty(stored),
                ValidationRules {
                    pattern: Some(pattern.clone()),
                    invalid_message: invalid_message.clone(),
                    ..ValidationRules::default()
                },
                ExtraInfo::default(),
            ),
            PropertyKind::Enum { values } => (
                UiKind::SingleSelect,
                stored_or_empty(stored),
                ValidationRules::default(),
                ExtraInfo {
                    options: values.iter().map(SelectOption::new).collect(),
                    creatable: false,
                },
            ),
            PropertyKind::EnumCreatable { values } => (
                UiKind::SingleSelect,
                stored_or_empty(stored),
                ValidationRules::default(),
                ExtraInfo {
                    options: values.iter().map(SelectOption::new).collect(),
                    creatable: true,
                },
            ),
            PropertyKind::Range { min, max, default } => {
                let lower = min.unwrap_or(self.settings.range_default_min);
                let upper = max.unwrap_or(self.settings.range_default_max);
                let bounds = ValidationRules::bounded(lower, upper);

                if upper.saturating_sub(lower) > self.settings.slider_max_spread {
                    (UiKind::Integer, stored_or_empty(stored), bounds, ExtraInfo::default())
                } else {
                    // A missing `min` leaves the default empty rather than 0
                    let fallback = default
                        .or(*min)
                        .map(Value::from)
                        .unwrap_or_else(|| Value::String(String::new()));
                    let default_value = stored.cloned().unwrap_or(fallback);
                    (UiKind::Slider, default_value, bounds, ExtraInfo::default())
                }
            }
            PropertyKind::BooleanTrueFalse => (
                UiKind::Switch,
                Value::Bool(coerce_true_false(stored)),
                ValidationRules::default(),
                ExtraInfo::default(),
            ),
            PropertyKind::Boolean => (
                UiKind::Radio,
                stored_or_empty(stored),
                ValidationRules::default(),
                ExtraInfo {
                    options: ["yes", "no"].into_iter().map(SelectOption::new).collect(),
                    creatable: false,
                },
            ),
            PropertyKind::LongInteger => (
                UiKind::Integer,
                stored_or_empty(stored),
                ValidationRules::default(),
                ExtraInfo::default(),
            ),
            PropertyKind::Unsupported => {
                log::warn!(
                    "Skipping property '{}' ({}): unsupported semantic type",
                    entry.name,
                    name
                );
                return None;
            }
        };

        let label = if name.is_empty() {
            to_pascal_case(entry.name)
        } else {
            name.clone()
        };

        Some(FormFieldDescriptor {
            id: generate_id(),
            hidden: stored.is_none(),
            name,
            label,
            info: definition.info.clone(),
            ui_kind,
            default_value,
            validation,
            extra_info,
        })
    }
}

fn stored_or_empty(stored: Option<&Value>) -> Value {
    stored
        .cloned()
        .unwrap_or_else(|| Value::String(String::new()))
}

/// `"true"` is true, any other string is false, other values by truthiness.
fn coerce_true_false(stored: Option<&Value>) -> bool {
    match stored {
        Some(Value::String(s)) => s == "true",
        Some(other) => crate::model::is_truthy(other),
        None => false,
    }
}
