use serde_json::Value;
use std::collections::BTreeMap;

use crate::model::{aux_key, aux_name, AuxId, AuxiliaryProperty, PropertyMap};

/// Ordered, user-extensible list of auxiliary rows.
#[derive(Debug, Clone, Default)]
pub struct AuxiliaryPropertyTracker {
    entries: Vec<AuxiliaryProperty>,
    next_id: AuxId,
}

impl AuxiliaryPropertyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all rows with the `Aux/*` entries of `current`, in key order.
    /// Entries whose value is not a string are skipped.
    pub fn initialize_from(&mut self, current: &PropertyMap) {
        self.entries.clear();

        for (key, value) in current {
            let Some(name) = aux_name(key) else {
                continue;
            };
            match value {
                Value::String(value) => {
                    let id = self.allocate_id();
                    self.entries.push(AuxiliaryProperty {
                        id,
                        name: name.to_string(),
                        value: value.clone(),
                    });
                }
                other => {
                    log::debug!("Skipping auxiliary property '{}' with non-string value {}", key, other);
                }
            }
        }
    }

    /// Append an empty row and return its id.
    pub fn add(&mut self) -> AuxId {
        let id = self.allocate_id();
        self.entries.push(AuxiliaryProperty {
            id,
            name: String::new(),
            value: String::new(),
        });
        id
    }

    /// Replace the row with `id` in place. Returns false if no such row exists.
    pub fn update(&mut self, id: AuxId, name: impl Into<String>, value: impl Into<String>) -> bool {
        match self.entries.iter_mut().find(|entry| entry.id == id) {
            Some(entry) => {
                entry.name = name.into();
                entry.value = value.into();
                true
            }
            None => false,
        }
    }

    /// Remove the row with `id`, returning it so the caller can record its
    /// storage key for deletion.
    pub fn remove(&mut self, id: AuxId) -> Option<AuxiliaryProperty> {
        let position = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(position))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, id: AuxId) -> Option<&AuxiliaryProperty> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn entries(&self) -> &[AuxiliaryProperty] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `Aux/<name> -> value` for every row with both a name and a value.
    /// Incomplete rows are left out.
    pub fn serialize(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .filter(|entry| entry.is_complete())
            .map(|entry| (aux_key(&entry.name), entry.value.clone()))
            .collect()
    }

    fn allocate_id(&mut self) -> AuxId {
        self.next_id += 1;
        self.next_id
    }
}
