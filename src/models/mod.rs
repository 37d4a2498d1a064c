//! Data models for the ERP master-data resources.
//!
//! Field names follow the backend's upper-case column names so records deserialize
//! straight from the REST payloads.

mod city;
mod committee;
mod event;
mod lookup;
mod program;
mod student;

pub use city::*;
pub use committee::*;
pub use event::*;
pub use lookup::*;
pub use program::*;
pub use student::*;

use serde::{de::DeserializeOwned, Serialize};

use crate::auth::Session;
use crate::forms::FieldSpec;

/// Server-assigned record identifier.
pub type RecordId = i64;

/// Anything the backend lists under a collection path.
pub trait Record: DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection path, with leading and trailing slash.
    const COLLECTION: &'static str;

    fn id(&self) -> RecordId;

    /// Text shown when the record appears as a dropdown option.
    fn label(&self) -> String;
}

/// How a form brings its list up to date after a successful submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListRefresh {
    /// Fetch the whole collection again.
    Refetch,
    /// Replace or append the record returned by the backend.
    Patch,
}

/// A record type that has a create/edit form.
pub trait Resource: Record {
    /// Human readable name used in alerts ("Committee created successfully!").
    const NAME: &'static str;

    const REFRESH: ListRefresh = ListRefresh::Refetch;

    /// Alert shown after any successful submit, instead of "<NAME> created/updated".
    const SAVED_MESSAGE: Option<&'static str> = None;

    /// Payload sent on create and update; also the form's editable state.
    type Draft: Serialize + DeserializeOwned + Default + Clone + Send + Sync + 'static;

    /// Explicit field mapping used when an existing record is loaded for editing.
    fn to_draft(&self) -> Self::Draft;

    /// Field table: labels, kinds and validation rules.
    fn fields() -> &'static [FieldSpec<Self::Draft>];

    /// Last-moment adjustments before the payload is sent.
    fn prepare(draft: Self::Draft, _session: Option<&Session>) -> Self::Draft {
        draft
    }
}

/// Resolve a foreign key against an already fetched list.
pub fn find_by_id<R: Record>(records: &[R], id: RecordId) -> Option<&R> {
    records.iter().find(|r| r.id() == id)
}
