use serde_json::Value;
use thiserror::Error;

use crate::config::FormSettings;
use crate::logic::auxiliary::AuxiliaryPropertyTracker;
use crate::logic::form::{FormError, FormRuntime, SubmitAttempt};
use crate::logic::resolve::SchemaResolver;
use crate::logic::validate::ValidationResult;
use crate::model::{
    aux_key, value_to_property_string, AuxId, AuxiliaryProperty, FormFieldDescriptor, ObjectRef,
    PropertyMap, SubmissionPayload,
};
use crate::store::traits::{PropertySource, PropertySubmitter};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error("Property editor is not open")]
    NotOpen,

    #[error("Unknown property: {0}")]
    UnknownProperty(String),

    #[error("Unknown auxiliary property id: {0}")]
    UnknownAuxiliary(AuxId),

    #[error(transparent)]
    Form(#[from] FormError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorPhase {
    Closed,
    Open,
    Submitting,
}

/// A payload ready for the property store.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSubmission {
    pub target: ObjectRef,
    pub payload: SubmissionPayload,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// A submission is already in flight.
    Ignored,
    /// Validation failed; the editor stays open.
    Invalid(ValidationResult),
    /// Payload built; the editor waits for `complete_submit`.
    Ready(PendingSubmission),
    /// The store accepted the payload; the editor is closed.
    Delivered(PendingSubmission),
    /// The store rejected the payload; the editor is closed anyway.
    Failed {
        submission: PendingSubmission,
        reason: String,
    },
}

/// State of one open/close cycle. Nothing survives into the next cycle.
#[derive(Debug, Clone)]
struct EditSession {
    target: ObjectRef,
    original: PropertyMap,
    fields: Vec<FormFieldDescriptor>,
    form: FormRuntime,
    auxiliary: AuxiliaryPropertyTracker,
    deleted: Vec<String>,
    delete_all: bool,
}

impl EditSession {
    fn field_position(&self, key: &str) -> Result<usize, EditorError> {
        self.fields
            .iter()
            .position(|f| f.name == key)
            .ok_or_else(|| EditorError::UnknownProperty(key.to_string()))
    }

    fn record_deletion(&mut self, key: String) {
        if !self.deleted.contains(&key) {
            self.deleted.push(key);
        }
    }

    fn build_payload(&self, values: &std::collections::BTreeMap<String, Value>) -> SubmissionPayload {
        let mut override_props: std::collections::BTreeMap<String, String> = values
            .iter()
            .filter_map(|(name, value)| value_to_property_string(value).map(|v| (name.clone(), v)))
            .collect();
        // Auxiliary rows go on top of schema values
        override_props.extend(self.auxiliary.serialize());

        // A key that is written again is not also deleted
        let delete_props = if self.delete_all {
            self.original.keys().cloned().collect()
        } else {
            self.deleted
                .iter()
                .filter(|key| !override_props.contains_key(key.as_str()))
                .cloned()
                .collect()
        };

        SubmissionPayload {
            override_props,
            delete_props,
        }
    }
}

/// Coordinates resolution, editing and submission of one object's properties.
pub struct PropertyEditor<'a> {
    resolver: SchemaResolver<'a>,
    form_settings: FormSettings,
    session: Option<EditSession>,
}

impl<'a> PropertyEditor<'a> {
    pub fn new(resolver: SchemaResolver<'a>) -> Self {
        Self::with_form_settings(resolver, FormSettings::default())
    }

    pub fn with_form_settings(resolver: SchemaResolver<'a>, form_settings: FormSettings) -> Self {
        Self {
            resolver,
            form_settings,
            session: None,
        }
    }

    pub fn phase(&self) -> EditorPhase {
        match &self.session {
            None => EditorPhase::Closed,
            Some(session) if session.form.is_submitting() => EditorPhase::Submitting,
            Some(_) => EditorPhase::Open,
        }
    }

    /// Start editing `target`. Any previous session is discarded.
    pub fn open(&mut self, target: ObjectRef, current: PropertyMap) {
        let fields = self.resolver.resolve(&target.object_type, &current);
        let shown: Vec<FormFieldDescriptor> = fields.iter().filter(|f| !f.hidden).cloned().collect();
        let form = FormRuntime::with_settings(shown, self.form_settings.clone()).removable(true);

        let mut auxiliary = AuxiliaryPropertyTracker::new();
        auxiliary.initialize_from(&current);

        log::debug!(
            "Opened property editor for {}: {} field(s), {} shown, {} auxiliary",
            target,
            fields.len(),
            form.registered().len(),
            auxiliary.len()
        );

        if self.session.is_some() {
            log::debug!("Discarding previous property editor session");
        }

        self.session = Some(EditSession {
            target,
            original: current,
            fields,
            form,
            auxiliary,
            deleted: Vec::new(),
            delete_all: false,
        });
    }

    /// Fetch current values from `source`, then open.
    pub async fn open_from<S: PropertySource + ?Sized>(
        &mut self,
        source: &S,
        target: ObjectRef,
    ) -> anyhow::Result<()> {
        let current = source.get_properties(&target).await?;
        self.open(target, current);
        Ok(())
    }

    /// Close without submitting, dropping every edit.
    pub fn cancel(&mut self) {
        if let Some(session) = self.session.take() {
            log::debug!("Cancelled property editor for {}", session.target);
        }
    }

    fn session(&self) -> Result<&EditSession, EditorError> {
        self.session.as_ref().ok_or(EditorError::NotOpen)
    }

    fn session_mut(&mut self) -> Result<&mut EditSession, EditorError> {
        self.session.as_mut().ok_or(EditorError::NotOpen)
    }

    pub fn target(&self) -> Option<&ObjectRef> {
        self.session.as_ref().map(|s| &s.target)
    }

    pub fn form(&self) -> Result<&FormRuntime, EditorError> {
        Ok(&self.session()?.form)
    }

    /// Direct access for presentation toggles such as the advanced group.
    pub fn form_mut(&mut self) -> Result<&mut FormRuntime, EditorError> {
        Ok(&mut self.session_mut()?.form)
    }

    /// Fields currently being edited.
    pub fn shown_fields(&self) -> Result<Vec<&FormFieldDescriptor>, EditorError> {
        Ok(self.session()?.fields.iter().filter(|f| !f.hidden).collect())
    }

    /// Catalog fields the user can still add.
    pub fn available_fields(&self) -> Result<Vec<&FormFieldDescriptor>, EditorError> {
        Ok(self.session()?.fields.iter().filter(|f| f.hidden).collect())
    }

    pub fn auxiliary(&self) -> Result<&[AuxiliaryProperty], EditorError> {
        Ok(self.session()?.auxiliary.entries())
    }

    pub fn pending_deletions(&self) -> Result<&[String], EditorError> {
        Ok(&self.session()?.deleted)
    }

    pub fn set_value(&mut self, name: &str, value: Value) -> Result<(), EditorError> {
        self.session_mut()?.form.set_value(name, value)?;
        Ok(())
    }

    /// Move a catalog field from "available" to "shown", keeping its
    /// resolved default.
    pub fn add_property(&mut self, key: &str) -> Result<(), EditorError> {
        let session = self.session_mut()?;
        let position = session.field_position(key)?;
        if !session.fields[position].hidden {
            return Ok(());
        }

        let shown = session.fields[position].with_hidden(false);
        session.form.register(shown.clone());
        session.fields[position] = shown;
        session.deleted.retain(|deleted| deleted != key);
        Ok(())
    }

    /// Move a field from "shown" to "available" and record it for deletion.
    pub fn remove_property(&mut self, key: &str) -> Result<(), EditorError> {
        let session = self.session_mut()?;
        let position = session.field_position(key)?;
        if session.fields[position].hidden {
            return Ok(());
        }

        session.form.remove_field(key)?;
        session.fields[position] = session.fields[position].with_hidden(true);
        session.record_deletion(key.to_string());
        Ok(())
    }

    pub fn add_auxiliary(&mut self) -> Result<AuxId, EditorError> {
        Ok(self.session_mut()?.auxiliary.add())
    }

    /// Update an auxiliary row. Renaming a row away from a key the object
    /// already has records that key for deletion.
    pub fn change_auxiliary(
        &mut self,
        id: AuxId,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), EditorError> {
        let session = self.session_mut()?;
        let previous = session
            .auxiliary
            .get(id)
            .ok_or(EditorError::UnknownAuxiliary(id))?
            .clone();
        let name = name.into();
        session.auxiliary.update(id, name.clone(), value);

        if !previous.name.is_empty() && previous.name != name {
            let stale = previous.storage_key();
            if session.original.contains_key(&stale) {
                log::debug!("Auxiliary property {} renamed to {}", stale, aux_key(&name));
                session.record_deletion(stale);
            }
        }
        Ok(())
    }

    /// Remove an auxiliary row and record `Aux/<name>` for deletion. Rows
    /// that never got a name record nothing.
    pub fn remove_auxiliary(&mut self, id: AuxId) -> Result<(), EditorError> {
        let session = self.session_mut()?;
        let removed = session
            .auxiliary
            .remove(id)
            .ok_or(EditorError::UnknownAuxiliary(id))?;
        if !removed.name.is_empty() {
            session.record_deletion(removed.storage_key());
        }
        Ok(())
    }

    /// Hide every field and drop every auxiliary row. On submit, every key
    /// the object had when the editor opened is deleted.
    pub fn delete_all(&mut self) -> Result<(), EditorError> {
        let session = self.session_mut()?;
        session.fields = session.fields.iter().map(|f| f.with_hidden(true)).collect();
        session.form.clear();
        session.auxiliary.clear();
        session.delete_all = true;
        Ok(())
    }

    /// Validate and build the payload. While a submission is in flight this
    /// returns `Ignored`.
    pub fn prepare_submit(&mut self) -> Result<SubmitOutcome, EditorError> {
        let session = self.session_mut()?;
        match session.form.begin_submit() {
            SubmitAttempt::Ignored => Ok(SubmitOutcome::Ignored),
            SubmitAttempt::Invalid(result) => Ok(SubmitOutcome::Invalid(result)),
            SubmitAttempt::Ready(values) => {
                let payload = session.build_payload(&values);
                Ok(SubmitOutcome::Ready(PendingSubmission {
                    target: session.target.clone(),
                    payload,
                }))
            }
        }
    }

    /// Close after a submission was handed off. Does nothing unless a
    /// submission is in flight.
    pub fn complete_submit(&mut self) {
        if self.phase() != EditorPhase::Submitting {
            log::debug!("No submission in flight, keeping property editor state");
            return;
        }
        if let Some(session) = self.session.take() {
            log::debug!("Closed property editor for {} after submit", session.target);
        }
    }

    /// Validate, hand the payload to `submitter` and close. The store's
    /// verdict is reported but never keeps the editor open.
    pub async fn submit<S: PropertySubmitter + ?Sized>(
        &mut self,
        submitter: &S,
    ) -> Result<SubmitOutcome, EditorError> {
        let submission = match self.prepare_submit()? {
            SubmitOutcome::Ready(submission) => submission,
            other => return Ok(other),
        };

        let result = submitter
            .modify_properties(&submission.target, submission.payload.clone())
            .await;
        self.complete_submit();

        match result {
            Ok(()) => Ok(SubmitOutcome::Delivered(submission)),
            Err(e) => {
                log::warn!("Failed to modify properties of {}: {}", submission.target, e);
                Ok(SubmitOutcome::Failed {
                    submission,
                    reason: e.to_string(),
                })
            }
        }
    }
}
