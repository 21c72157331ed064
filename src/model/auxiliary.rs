use serde::{Deserialize, Serialize};

use crate::model::AUX_NAMESPACE;

pub type AuxId = u64;

/// A free-form name/value row outside the catalog. `id` is the only stable
/// identity; name and value are edited freely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuxiliaryProperty {
    pub id: AuxId,
    pub name: String,
    pub value: String,
}

impl AuxiliaryProperty {
    /// Storage key of this row, `Aux/<name>`.
    pub fn storage_key(&self) -> String {
        aux_key(&self.name)
    }

    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.value.is_empty()
    }
}

pub fn aux_key(name: &str) -> String {
    format!("{}/{}", AUX_NAMESPACE, name)
}

/// Name of an auxiliary property stored under `key`, i.e. every segment
/// after a leading `Aux` rejoined with `/`.
pub fn aux_name(key: &str) -> Option<&str> {
    let (namespace, rest) = key.split_once('/')?;
    (namespace == AUX_NAMESPACE).then_some(rest)
}
