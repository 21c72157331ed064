use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mutation sent to the property store: keys to set and keys to remove.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub override_props: BTreeMap<String, String>,
    pub delete_props: Vec<String>,
}

impl SubmissionPayload {
    pub fn is_empty(&self) -> bool {
        self.override_props.is_empty() && self.delete_props.is_empty()
    }
}

/// The cluster object a property editor works on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectRef {
    /// Object-type key, e.g. `node` or `resource-definition`.
    pub object_type: String,
    /// Name of the object, e.g. the node name. Composite objects such as
    /// volume definitions join their parts with `/`.
    pub name: String,
}

impl ObjectRef {
    pub fn new(object_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} '{}'", self.object_type, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_wire_shape() {
        let mut payload = SubmissionPayload::default();
        payload
            .override_props
            .insert("Aux/foo".to_string(), "bar".to_string());
        payload.delete_props.push("PrefNic".to_string());

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "override_props": {"Aux/foo": "bar"},
                "delete_props": ["PrefNic"]
            })
        );
    }
}
