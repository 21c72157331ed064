use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

fn read_catalog_file(path: &Path) -> Result<String, CatalogError> {
    std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Storage key of a property: either used verbatim or assembled from
/// constant names (e.g. `["NAMESPC_AUXILIARY", "KEY_DESCRIPTION"]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldPath {
    Flat(String),
    Composite(Vec<String>),
}

impl Default for FieldPath {
    fn default() -> Self {
        FieldPath::Flat(String::new())
    }
}

impl From<&str> for FieldPath {
    fn from(value: &str) -> Self {
        FieldPath::Flat(value.to_string())
    }
}

/// Semantic type of a property together with its type-specific metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PropertyKind {
    String,
    Regex {
        #[serde(alias = "value")]
        pattern: String,
        #[serde(default, rename = "invalidMessage", skip_serializing_if = "Option::is_none")]
        invalid_message: Option<String>,
    },
    #[serde(alias = "symbol")]
    Enum {
        #[serde(default)]
        values: Vec<String>,
    },
    #[serde(alias = "numeric-or-symbol")]
    EnumCreatable {
        #[serde(default)]
        values: Vec<String>,
    },
    Range {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<i64>,
    },
    Boolean,
    #[serde(alias = "boolean_true_false")]
    BooleanTrueFalse,
    #[serde(alias = "long")]
    LongInteger,
    /// Any tag this build does not know. Kept so that schema drift degrades
    /// to a skipped field instead of an unreadable catalog.
    #[serde(other)]
    Unsupported,
}

impl PropertyKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyKind::String => "string",
            PropertyKind::Regex { .. } => "regex",
            PropertyKind::Enum { .. } => "enum",
            PropertyKind::EnumCreatable { .. } => "enum-creatable",
            PropertyKind::Range { .. } => "range",
            PropertyKind::Boolean => "boolean",
            PropertyKind::BooleanTrueFalse => "boolean-true-false",
            PropertyKind::LongInteger => "long-integer",
            PropertyKind::Unsupported => "unsupported",
        }
    }
}

/// One schema entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    #[serde(default)]
    pub key: FieldPath,
    #[serde(default)]
    pub info: String,
    #[serde(flatten)]
    pub kind: PropertyKind,
}

impl PropertyDefinition {
    pub fn new(key: impl Into<FieldPath>, kind: PropertyKind) -> Self {
        Self {
            key: key.into(),
            info: String::new(),
            kind,
        }
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = info.into();
        self
    }
}

/// A borrowed catalog entry: the catalog name of a definition and the definition.
#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry<'a> {
    pub name: &'a str,
    pub definition: &'a PropertyDefinition,
}

/// One property catalog: named definitions plus, per object type, the
/// ordered list of definition names that apply to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertySchema {
    #[serde(default)]
    pub properties: HashMap<String, PropertyDefinition>,
    #[serde(default)]
    pub objects: HashMap<String, Vec<String>>,
}

impl PropertySchema {
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        serde_json::from_str(json).map_err(|source| CatalogError::Parse {
            origin: "<inline>".to_string(),
            source,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let json = read_catalog_file(path)?;
        serde_json::from_str(&json).map_err(|source| CatalogError::Parse {
            origin: path.display().to_string(),
            source,
        })
    }

    pub fn define(&mut self, name: &str, definition: PropertyDefinition) -> &mut Self {
        self.properties.insert(name.to_string(), definition);
        self
    }

    /// Append definition names to an object type, preserving order.
    pub fn attach<I, S>(&mut self, object_type: &str, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.objects
            .entry(object_type.to_string())
            .or_default()
            .extend(names.into_iter().map(Into::into));
        self
    }

    pub fn has_object_type(&self, object_type: &str) -> bool {
        self.objects.contains_key(object_type)
    }

    /// Definitions attached to an object type, in catalog order. References
    /// to names without a definition are reported and skipped.
    pub fn entries_for(&self, object_type: &str) -> Vec<CatalogEntry<'_>> {
        let Some(names) = self.objects.get(object_type) else {
            return Vec::new();
        };

        names
            .iter()
            .filter_map(|name| match self.properties.get_key_value(name) {
                Some((name, definition)) => Some(CatalogEntry {
                    name: name.as_str(),
                    definition,
                }),
                None => {
                    log::warn!(
                        "Object type '{}' references undefined property '{}'",
                        object_type,
                        name
                    );
                    None
                }
            })
            .collect()
    }
}

/// General and DRBD catalogs, unioned per object type at lookup time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectTypeCatalog {
    pub general: PropertySchema,
    #[serde(default)]
    pub drbd: PropertySchema,
}

impl ObjectTypeCatalog {
    pub fn new(general: PropertySchema, drbd: PropertySchema) -> Self {
        Self { general, drbd }
    }

    /// General entries first, DRBD entries appended after them.
    pub fn entries_for(&self, object_type: &str) -> Vec<CatalogEntry<'_>> {
        let mut entries = self.general.entries_for(object_type);
        entries.extend(self.drbd.entries_for(object_type));
        entries
    }

    pub fn has_object_type(&self, object_type: &str) -> bool {
        self.general.has_object_type(object_type) || self.drbd.has_object_type(object_type)
    }

    /// All object type keys known to either catalog, sorted.
    pub fn object_types(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .general
            .objects
            .keys()
            .chain(self.drbd.objects.keys())
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        keys.dedup();
        keys
    }
}

/// Lookup from constant names to storage path components.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPathConstants(HashMap<String, String>);

impl FieldPathConstants {
    pub fn new(table: HashMap<String, String>) -> Self {
        Self(table)
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        serde_json::from_str(json).map_err(|source| CatalogError::Parse {
            origin: "<inline>".to_string(),
            source,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let json = read_catalog_file(path)?;
        serde_json::from_str(&json).map_err(|source| CatalogError::Parse {
            origin: path.display().to_string(),
            source,
        })
    }

    pub fn get(&self, segment: &str) -> Option<&str> {
        self.0.get(segment).map(String::as_str)
    }

    pub fn contains(&self, segment: &str) -> bool {
        self.0.contains_key(segment)
    }

    /// Resolve a field path to its storage key. Composite segments missing
    /// from the table are used verbatim.
    pub fn resolve(&self, path: &FieldPath) -> String {
        match path {
            FieldPath::Flat(key) => key.clone(),
            FieldPath::Composite(segments) => segments
                .iter()
                .map(|segment| match self.get(segment) {
                    Some(component) => component,
                    None => {
                        log::warn!("No field path constant named '{}'", segment);
                        segment.as_str()
                    }
                })
                .collect::<Vec<_>>()
                .join("/"),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldPathConstants {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
