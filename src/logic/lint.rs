use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::model::{FieldPath, FieldPathConstants, ObjectTypeCatalog, PropertyKind, PropertySchema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LintIssueType {
    /// An object type lists a property name with no definition
    DanglingReference,
    UnsupportedType,
    InvalidPattern,
    /// `min` is greater than `max`
    InvertedRange,
    UnknownConstant,
    /// Two definitions of one object type resolve to the same storage key
    DuplicateFieldPath,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LintIssue {
    /// `general`, `drbd`, or the object type for cross-catalog issues
    pub scope: String,
    pub property: String,
    pub issue_type: LintIssueType,
    pub message: String,
}

/// Static checks over a catalog, reporting the drift that resolution would
/// otherwise silently skip.
pub struct CatalogLinter;

impl CatalogLinter {
    pub fn lint(catalog: &ObjectTypeCatalog, constants: &FieldPathConstants) -> Vec<LintIssue> {
        let mut issues = Vec::new();
        Self::lint_schema("general", &catalog.general, constants, &mut issues);
        Self::lint_schema("drbd", &catalog.drbd, constants, &mut issues);
        Self::lint_duplicates(catalog, constants, &mut issues);
        issues
    }

    fn lint_schema(
        label: &str,
        schema: &PropertySchema,
        constants: &FieldPathConstants,
        issues: &mut Vec<LintIssue>,
    ) {
        let mut push = |property: &str, issue_type: LintIssueType, message: String| {
            issues.push(LintIssue {
                scope: label.to_string(),
                property: property.to_string(),
                issue_type,
                message,
            });
        };

        for object_type in schema.objects.keys().sorted() {
            for name in &schema.objects[object_type] {
                if !schema.properties.contains_key(name) {
                    push(
                        name,
                        LintIssueType::DanglingReference,
                        format!("Referenced by object type '{}' but never defined", object_type),
                    );
                }
            }
        }

        for (name, definition) in schema.properties.iter().sorted_by(|a, b| a.0.cmp(b.0)) {
            match &definition.kind {
                PropertyKind::Unsupported => push(
                    name,
                    LintIssueType::UnsupportedType,
                    "Semantic type is not supported".to_string(),
                ),
                PropertyKind::Regex { pattern, .. } => {
                    if let Err(e) = regex::Regex::new(pattern) {
                        push(name, LintIssueType::InvalidPattern, e.to_string());
                    }
                }
                PropertyKind::Range {
                    min: Some(min),
                    max: Some(max),
                    ..
                } if min > max => push(
                    name,
                    LintIssueType::InvertedRange,
                    format!("min {} is greater than max {}", min, max),
                ),
                _ => {}
            }

            if let FieldPath::Composite(segments) = &definition.key {
                for segment in segments.iter().filter(|s| !constants.contains(s)) {
                    push(
                        name,
                        LintIssueType::UnknownConstant,
                        format!("No field path constant named '{}'", segment),
                    );
                }
            }
        }
    }

    fn lint_duplicates(
        catalog: &ObjectTypeCatalog,
        constants: &FieldPathConstants,
        issues: &mut Vec<LintIssue>,
    ) {
        for object_type in catalog.object_types() {
            let mut seen: HashMap<String, &str> = HashMap::new();
            for entry in catalog.entries_for(object_type) {
                let path = constants.resolve(&entry.definition.key);
                if path.is_empty() {
                    continue;
                }
                if let Some(first) = seen.insert(path.clone(), entry.name) {
                    issues.push(LintIssue {
                        scope: object_type.to_string(),
                        property: entry.name.to_string(),
                        issue_type: LintIssueType::DuplicateFieldPath,
                        message: format!("'{}' is also defined by '{}'", path, first),
                    });
                }
            }
        }
    }
}
