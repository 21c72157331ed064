use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::FormSettings;
use crate::model::{is_blank, value_as_f64, value_to_property_string, FormFieldDescriptor};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<FieldError>,
}

impl ValidationResult {
    pub fn from_errors(errors: Vec<FieldError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn error_for(&self, field: &str) -> Option<&FieldError> {
        self.errors.iter().find(|error| error.field == field)
    }
}

/// A field-level message shown next to the offending input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub error_type: FieldErrorType,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldErrorType {
    Required,
    PatternMismatch,
    NotANumber,
    BelowMinimum,
    AboveMaximum,
}

/// Submission-time rules of one field, compiled from its descriptor.
#[derive(Debug, Clone)]
pub struct FieldRules {
    field: String,
    required: bool,
    required_message: String,
    pattern: Option<Regex>,
    invalid_message: String,
    min: Option<i64>,
    max: Option<i64>,
}

impl FieldRules {
    /// Translate a descriptor's rule set. A pattern that does not compile is
    /// dropped rather than blocking every submission.
    pub fn from_descriptor(descriptor: &FormFieldDescriptor, settings: &FormSettings) -> Self {
        let rules = &descriptor.validation;
        let pattern = rules.pattern.as_deref().and_then(|source| match Regex::new(source) {
            Ok(regex) => Some(regex),
            Err(e) => {
                log::warn!(
                    "Ignoring invalid pattern for field '{}': {}",
                    descriptor.name,
                    e
                );
                None
            }
        });
        let numeric = descriptor.ui_kind.is_numeric();

        Self {
            field: descriptor.name.clone(),
            required: rules.required,
            required_message: settings.required_message.clone(),
            pattern,
            invalid_message: rules
                .invalid_message
                .clone()
                .unwrap_or_else(|| settings.default_invalid_message.clone()),
            min: rules.min.filter(|_| numeric),
            max: rules.max.filter(|_| numeric),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// Check a rendered value. Empty values only ever fail the required rule.
    pub fn check(&self, value: &Value) -> Option<FieldError> {
        if is_blank(value) {
            return self
                .required
                .then(|| self.error(FieldErrorType::Required, self.required_message.clone()));
        }

        if let Some(pattern) = &self.pattern {
            let text = value_to_property_string(value).unwrap_or_default();
            if !pattern.is_match(&text) {
                return Some(self.error(FieldErrorType::PatternMismatch, self.invalid_message.clone()));
            }
        }

        if self.min.is_some() || self.max.is_some() {
            let Some(number) = value_as_f64(value) else {
                return Some(self.error(FieldErrorType::NotANumber, "Value must be a number".to_string()));
            };
            if let Some(min) = self.min {
                if number < min as f64 {
                    return Some(self.error(
                        FieldErrorType::BelowMinimum,
                        format!("Value must be at least {}", min),
                    ));
                }
            }
            if let Some(max) = self.max {
                if number > max as f64 {
                    return Some(self.error(
                        FieldErrorType::AboveMaximum,
                        format!("Value must be at most {}", max),
                    ));
                }
            }
        }

        None
    }

    fn error(&self, error_type: FieldErrorType, message: String) -> FieldError {
        FieldError {
            field: self.field.clone(),
            error_type,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{UiKind, ValidationRules};
    use serde_json::json;

    fn rules(descriptor: FormFieldDescriptor) -> FieldRules {
        FieldRules::from_descriptor(&descriptor, &FormSettings::default())
    }

    #[test]
    fn test_required_rule() {
        let rules = rules(
            FormFieldDescriptor::new("name", UiKind::Text).with_validation(ValidationRules::required()),
        );
        let error = rules.check(&json!("")).unwrap();
        assert_eq!(error.error_type, FieldErrorType::Required);
        assert_eq!(error.field, "name");
        assert!(rules.check(&json!(null)).is_some());
        assert!(rules.check(&json!("node-1")).is_none());
    }

    #[test]
    fn test_pattern_rule_uses_invalid_message() {
        let rules = rules(FormFieldDescriptor::new("ip", UiKind::Text).with_validation(ValidationRules {
            pattern: Some(r"^\d+\.\d+\.\d+\.\d+$".to_string()),
            invalid_message: Some("Not an IPv4 address".to_string()),
            ..ValidationRules::default()
        }));

        let error = rules.check(&json!("10.0.0")).unwrap();
        assert_eq!(error.error_type, FieldErrorType::PatternMismatch);
        assert_eq!(error.message, "Not an IPv4 address");
        assert!(rules.check(&json!("10.0.0.1")).is_none());
        // optional and empty
        assert!(rules.check(&json!("")).is_none());
    }

    #[test]
    fn test_invalid_pattern_is_dropped() {
        let rules = rules(FormFieldDescriptor::new("x", UiKind::Text).with_validation(ValidationRules {
            pattern: Some("([unclosed".to_string()),
            ..ValidationRules::default()
        }));
        assert!(rules.check(&json!("anything")).is_none());
    }

    #[test]
    fn test_bounds_on_numeric_widgets() {
        let slider = rules(
            FormFieldDescriptor::new("PlaceCount", UiKind::Slider).with_validation(ValidationRules::bounded(1, 16)),
        );
        assert!(slider.check(&json!(3)).is_none());
        assert!(slider.check(&json!("16")).is_none());
        assert_eq!(slider.check(&json!(0)).unwrap().error_type, FieldErrorType::BelowMinimum);
        assert_eq!(slider.check(&json!("17")).unwrap().error_type, FieldErrorType::AboveMaximum);
        assert_eq!(slider.check(&json!("many")).unwrap().error_type, FieldErrorType::NotANumber);
    }

    #[test]
    fn test_bounds_ignored_on_text_widgets() {
        let text = rules(
            FormFieldDescriptor::new("Note", UiKind::Text).with_validation(ValidationRules::bounded(1, 2)),
        );
        assert!(text.check(&json!("long text")).is_none());
    }
}
