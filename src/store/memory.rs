use crate::model::{ObjectRef, PropertyMap, SubmissionPayload};
use crate::store::traits::{PropertySource, PropertySubmitter};
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;

/// A payload as it was received.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionRecord {
    pub target: ObjectRef,
    pub payload: SubmissionPayload,
    pub received_at: DateTime<Utc>,
}

/// In-memory property store keyed by object. Overrides are applied first,
/// then deletions.
#[derive(Debug, Default)]
pub struct MemoryPropertyStore {
    objects: RwLock<HashMap<ObjectRef, PropertyMap>>,
    history: RwLock<Vec<SubmissionRecord>>,
    read_only: RwLock<bool>,
}

impl MemoryPropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object with string properties.
    pub fn insert<K, V, I>(&self, target: ObjectRef, properties: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let properties = crate::model::property_map(properties);
        self.objects.write().insert(target, properties);
    }

    /// Make every following write fail, e.g. to exercise error paths.
    pub fn set_read_only(&self, read_only: bool) {
        *self.read_only.write() = read_only;
    }

    pub fn properties(&self, target: &ObjectRef) -> Option<PropertyMap> {
        self.objects.read().get(target).cloned()
    }

    /// Every payload received, including rejected ones, oldest first.
    pub fn history(&self) -> Vec<SubmissionRecord> {
        self.history.read().clone()
    }

    pub fn apply(&self, target: &ObjectRef, payload: &SubmissionPayload) -> Result<()> {
        if *self.read_only.read() {
            return Err(anyhow!("Property store is read-only, rejected change to {}", target));
        }

        let mut objects = self.objects.write();
        let properties = objects.entry(target.clone()).or_default();

        for (key, value) in &payload.override_props {
            properties.insert(key.clone(), Value::String(value.clone()));
        }
        for key in &payload.delete_props {
            properties.remove(key);
        }

        log::info!(
            "Applied {} override(s) and {} deletion(s) to {}",
            payload.override_props.len(),
            payload.delete_props.len(),
            target
        );
        Ok(())
    }
}

#[async_trait::async_trait]
impl PropertySource for MemoryPropertyStore {
    async fn get_properties(&self, target: &ObjectRef) -> Result<PropertyMap> {
        self.properties(target)
            .ok_or_else(|| anyhow!("Object not found: {}", target))
    }
}

#[async_trait::async_trait]
impl PropertySubmitter for MemoryPropertyStore {
    async fn modify_properties(&self, target: &ObjectRef, payload: SubmissionPayload) -> Result<()> {
        self.history.write().push(SubmissionRecord {
            target: target.clone(),
            payload: payload.clone(),
            received_at: Utc::now(),
        });
        self.apply(target, &payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node() -> ObjectRef {
        ObjectRef::new("node", "alpha")
    }

    #[tokio::test]
    async fn test_apply_overrides_then_deletes() {
        let store = MemoryPropertyStore::new();
        store.insert(node(), [("PrefNic", "eth0"), ("Aux/site", "berlin")]);

        let mut payload = SubmissionPayload::default();
        payload.override_props.insert("PrefNic".to_string(), "eth1".to_string());
        payload.override_props.insert("Aux/rack".to_string(), "4".to_string());
        payload.delete_props.push("Aux/site".to_string());

        store.modify_properties(&node(), payload).await.unwrap();

        let properties = store.get_properties(&node()).await.unwrap();
        assert_eq!(properties.get("PrefNic"), Some(&json!("eth1")));
        assert_eq!(properties.get("Aux/rack"), Some(&json!("4")));
        assert!(!properties.contains_key("Aux/site"));
        assert_eq!(store.history().len(), 1);
    }

    #[tokio::test]
    async fn test_read_only_rejects_writes() {
        let store = MemoryPropertyStore::new();
        store.insert(node(), [("PrefNic", "eth0")]);
        store.set_read_only(true);

        let mut payload = SubmissionPayload::default();
        payload.delete_props.push("PrefNic".to_string());
        assert!(store.modify_properties(&node(), payload).await.is_err());
        assert!(store.properties(&node()).unwrap().contains_key("PrefNic"));
        assert_eq!(store.history().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_object() {
        let store = MemoryPropertyStore::new();
        assert!(store.get_properties(&node()).await.is_err());
    }
}
