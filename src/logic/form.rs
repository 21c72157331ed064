use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use thiserror::Error;

use crate::config::FormSettings;
use crate::logic::validate::{FieldRules, ValidationResult};
use crate::model::FormFieldDescriptor;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Unknown form field: {0}")]
    UnknownField(String),

    #[error("Form field is not rendered: {0}")]
    NotRendered(String),

    #[error("Form fields cannot be removed in this form")]
    NotRemovable,
}

/// Outcome of a submit request.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitAttempt {
    /// A previous submission is still in flight; nothing happened.
    Ignored,
    /// At least one rule failed; nothing is submitted.
    Invalid(ValidationResult),
    /// Values of every rendered field, keyed by field name.
    Ready(BTreeMap<String, Value>),
}

/// Interactive state of a form built from resolved field descriptors.
#[derive(Debug, Clone)]
pub struct FormRuntime {
    fields: Vec<FormFieldDescriptor>,
    rules: HashMap<String, FieldRules>,
    edits: BTreeMap<String, Value>,
    advanced: BTreeSet<String>,
    advanced_expanded: bool,
    removable: bool,
    submitting: bool,
    settings: FormSettings,
}

impl FormRuntime {
    pub fn new(fields: Vec<FormFieldDescriptor>) -> Self {
        Self::with_settings(fields, FormSettings::default())
    }

    pub fn with_settings(fields: Vec<FormFieldDescriptor>, settings: FormSettings) -> Self {
        let mut runtime = Self {
            fields: Vec::new(),
            rules: HashMap::new(),
            edits: BTreeMap::new(),
            advanced: BTreeSet::new(),
            advanced_expanded: false,
            removable: false,
            submitting: false,
            settings,
        };
        for field in fields {
            runtime.register(field);
        }
        runtime
    }

    /// Let every field render an inline delete action.
    pub fn removable(mut self, removable: bool) -> Self {
        self.removable = removable;
        self
    }

    pub fn is_removable(&self) -> bool {
        self.removable
    }

    /// Add a field, or replace the field with the same name.
    pub fn register(&mut self, field: FormFieldDescriptor) {
        let rules = FieldRules::from_descriptor(&field, &self.settings);
        self.rules.insert(field.name.clone(), rules);
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
    }

    /// Drop a field together with its rules and any pending edit.
    pub fn deregister(&mut self, name: &str) -> Option<FormFieldDescriptor> {
        let position = self.fields.iter().position(|f| f.name == name)?;
        self.rules.remove(name);
        self.edits.remove(name);
        self.advanced.remove(name);
        Some(self.fields.remove(position))
    }

    /// Inline delete action of a removable form. The field is deregistered
    /// so a stale value is never resubmitted; the returned descriptor is what
    /// the owner hides and records for deletion.
    pub fn remove_field(&mut self, name: &str) -> Result<FormFieldDescriptor, FormError> {
        if !self.removable {
            return Err(FormError::NotRemovable);
        }
        self.deregister(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))
    }

    pub fn clear(&mut self) {
        self.fields.clear();
        self.rules.clear();
        self.edits.clear();
        self.advanced.clear();
    }

    /// Defer the named fields into the collapsible advanced group.
    pub fn set_advanced<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.advanced = names.into_iter().map(Into::into).collect();
    }

    pub fn is_advanced(&self, name: &str) -> bool {
        self.advanced.contains(name)
    }

    pub fn is_advanced_expanded(&self) -> bool {
        self.advanced_expanded
    }

    pub fn expand_advanced(&mut self) {
        self.advanced_expanded = true;
    }

    /// Collapse the advanced group, discarding edits made to its fields.
    pub fn collapse_advanced(&mut self) {
        self.advanced_expanded = false;
        let advanced = &self.advanced;
        self.edits.retain(|name, _| !advanced.contains(name));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// Every registered field, rendered or not.
    pub fn registered(&self) -> &[FormFieldDescriptor] {
        &self.fields
    }

    /// Fields currently on screen: not hidden, and not parked in a collapsed
    /// advanced group.
    pub fn fields(&self) -> impl Iterator<Item = &FormFieldDescriptor> + '_ {
        self.fields.iter().filter(move |f| self.is_rendered(f))
    }

    fn is_rendered(&self, field: &FormFieldDescriptor) -> bool {
        !field.hidden && (self.advanced_expanded || !self.advanced.contains(&field.name))
    }

    pub fn set_value(&mut self, name: &str, value: Value) -> Result<(), FormError> {
        let field = self
            .fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        if !self.is_rendered(field) {
            return Err(FormError::NotRendered(name.to_string()));
        }
        self.edits.insert(name.to_string(), value);
        Ok(())
    }

    /// Edited value if any, otherwise the field's resolved default.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.edits.get(name).or_else(|| {
            self.fields
                .iter()
                .find(|f| f.name == name)
                .map(|f| &f.default_value)
        })
    }

    pub fn edits(&self) -> &BTreeMap<String, Value> {
        &self.edits
    }

    /// Values of all rendered fields.
    pub fn values(&self) -> BTreeMap<String, Value> {
        self.fields()
            .filter_map(|f| self.value(&f.name).map(|v| (f.name.clone(), v.clone())))
            .collect()
    }

    pub fn validate(&self) -> ValidationResult {
        let errors = self
            .fields()
            .filter_map(|f| {
                let rules = self.rules.get(&f.name)?;
                let value = self.value(&f.name)?;
                rules.check(value)
            })
            .collect();
        ValidationResult::from_errors(errors)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Validate and, if clean, mark a submission as in flight. Further calls
    /// are ignored until `finish_submit`.
    pub fn begin_submit(&mut self) -> SubmitAttempt {
        if self.submitting {
            log::debug!("Submission already in flight, ignoring");
            return SubmitAttempt::Ignored;
        }

        let result = self.validate();
        if !result.valid {
            return SubmitAttempt::Invalid(result);
        }

        self.submitting = true;
        SubmitAttempt::Ready(self.values())
    }

    pub fn finish_submit(&mut self) {
        self.submitting = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::validate::FieldErrorType;
    use crate::model::{UiKind, ValidationRules};
    use serde_json::json;

    fn sample_fields() -> Vec<FormFieldDescriptor> {
        vec![
            FormFieldDescriptor::new("name", UiKind::Text).with_validation(ValidationRules::required()),
            FormFieldDescriptor::new("place_count", UiKind::Slider)
                .with_default(json!(2))
                .with_validation(ValidationRules::bounded(1, 16)),
            FormFieldDescriptor::new("diskless_on_remaining", UiKind::Switch).with_default(json!(false)),
        ]
    }

    #[test]
    fn test_values_merge_defaults_and_edits() {
        let mut form = FormRuntime::new(sample_fields());
        form.set_value("name", json!("rg1")).unwrap();

        let values = form.values();
        assert_eq!(values["name"], json!("rg1"));
        assert_eq!(values["place_count"], json!(2));
        assert_eq!(values["diskless_on_remaining"], json!(false));
        assert_eq!(
            form.set_value("missing", json!(1)),
            Err(FormError::UnknownField("missing".to_string()))
        );
    }

    #[test]
    fn test_hidden_fields_are_not_rendered() {
        let mut fields = sample_fields();
        fields[2] = fields[2].with_hidden(true);
        let mut form = FormRuntime::new(fields);

        assert_eq!(form.fields().count(), 2);
        assert!(!form.values().contains_key("diskless_on_remaining"));
        assert_eq!(
            form.set_value("diskless_on_remaining", json!(true)),
            Err(FormError::NotRendered("diskless_on_remaining".to_string()))
        );
    }

    #[test]
    fn test_submit_blocked_by_validation() {
        let mut form = FormRuntime::new(sample_fields());
        form.set_value("place_count", json!(20)).unwrap();

        match form.begin_submit() {
            SubmitAttempt::Invalid(result) => {
                assert!(!result.valid);
                assert_eq!(result.errors.len(), 2);
                assert_eq!(result.error_for("name").unwrap().error_type, FieldErrorType::Required);
                assert_eq!(
                    result.error_for("place_count").unwrap().error_type,
                    FieldErrorType::AboveMaximum
                );
            }
            other => panic!("expected invalid submission, got {:?}", other),
        }
        assert!(!form.is_submitting());
    }

    #[test]
    fn test_double_submit_is_ignored_until_finished() {
        let mut form = FormRuntime::new(sample_fields());
        form.set_value("name", json!("rg1")).unwrap();

        assert!(matches!(form.begin_submit(), SubmitAttempt::Ready(_)));
        assert!(form.is_submitting());
        assert_eq!(form.begin_submit(), SubmitAttempt::Ignored);

        form.finish_submit();
        assert!(matches!(form.begin_submit(), SubmitAttempt::Ready(_)));
    }

    #[test]
    fn test_remove_field_requires_removable_mode() {
        let mut form = FormRuntime::new(sample_fields());
        assert_eq!(form.remove_field("name"), Err(FormError::NotRemovable));

        let mut form = FormRuntime::new(sample_fields()).removable(true);
        form.set_value("place_count", json!(5)).unwrap();
        let removed = form.remove_field("place_count").unwrap();
        assert_eq!(removed.name, "place_count");
        assert!(!form.contains("place_count"));
        assert!(!form.values().contains_key("place_count"));
        assert!(form.value("place_count").is_none());
        assert_eq!(
            form.remove_field("place_count"),
            Err(FormError::UnknownField("place_count".to_string()))
        );
    }

    #[test]
    fn test_collapsing_advanced_discards_its_edits() {
        let mut form = FormRuntime::new(sample_fields());
        form.set_advanced(["place_count", "diskless_on_remaining"]);
        form.set_value("name", json!("rg1")).unwrap();

        assert_eq!(form.fields().count(), 1);
        assert!(form.set_value("place_count", json!(3)).is_err());

        form.expand_advanced();
        form.set_value("place_count", json!(3)).unwrap();
        form.set_value("diskless_on_remaining", json!(true)).unwrap();
        assert_eq!(form.values()["place_count"], json!(3));

        form.collapse_advanced();
        assert_eq!(form.edits().len(), 1);
        assert_eq!(form.edits()["name"], json!("rg1"));

        form.expand_advanced();
        assert_eq!(form.values()["place_count"], json!(2));
        assert_eq!(form.values()["diskless_on_remaining"], json!(false));
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut form = FormRuntime::new(sample_fields());
        form.register(FormFieldDescriptor::new("name", UiKind::Textarea));
        assert_eq!(form.registered().len(), 3);
        assert_eq!(form.registered()[0].ui_kind, UiKind::Textarea);
        // replacement dropped the required rule
        form.set_value("name", json!("")).unwrap();
        assert!(form.validate().valid);
    }
}
