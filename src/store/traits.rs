use crate::model::{ObjectRef, PropertyMap, SubmissionPayload};
use anyhow::Result;

/// Supplies the current property values of a cluster object.
#[async_trait::async_trait]
pub trait PropertySource: Send + Sync {
    async fn get_properties(&self, target: &ObjectRef) -> Result<PropertyMap>;
}

/// Applies a property mutation to a cluster object. Success and failure
/// semantics belong to the implementation and its caller.
#[async_trait::async_trait]
pub trait PropertySubmitter: Send + Sync {
    async fn modify_properties(&self, target: &ObjectRef, payload: SubmissionPayload) -> Result<()>;
}
