//! Form state machines.
//!
//! A `ResourceForm` holds everything one list/edit screen needs: the fetched list, the draft
//! being edited, the editing id, the active tab and the bulk selection. User prompts go
//! through the `Interaction` trait so the same forms run under the CLI and in tests.

pub mod cascade;
pub mod fields;

mod city;
mod event;
mod student;

pub use cascade::{CascadingSelector, Level, SelectOption};
pub use city::CityForm;
pub use event::EventForm;
pub use fields::{FieldError, FieldKind, FieldSpec};
pub use student::StudentInfoForm;

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::api::{RequestClient, ResourceClient};
use crate::errors::ClientError;
use crate::models::{find_by_id, ListRefresh, RecordId, Resource};

/// Blocking prompts shown to the user.
pub trait Interaction: Send + Sync {
    /// Ask a yes/no question.
    fn confirm(&self, message: &str) -> bool;

    fn alert(&self, message: &str);

    /// Leave the current screen for the login view.
    fn redirect_to_login(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Create,
    View,
}

/// Whether a submit creates a new record or updates an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(RecordId),
}

/// List, create, edit and delete screen for one resource.
pub struct ResourceForm<R: Resource> {
    api: ResourceClient<R>,
    ui: Arc<dyn Interaction>,
    records: Vec<R>,
    draft: R::Draft,
    editing_id: Option<RecordId>,
    tab: Tab,
    selected: BTreeSet<RecordId>,
}

impl<R: Resource> ResourceForm<R> {
    pub fn new(client: RequestClient, ui: Arc<dyn Interaction>) -> Self {
        Self {
            api: ResourceClient::new(client),
            ui,
            records: Vec::new(),
            draft: R::Draft::default(),
            editing_id: None,
            tab: Tab::Create,
            selected: BTreeSet::new(),
        }
    }

    pub fn api(&self) -> &ResourceClient<R> {
        &self.api
    }

    pub fn interaction(&self) -> &Arc<dyn Interaction> {
        &self.ui
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn draft(&self) -> &R::Draft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut R::Draft {
        &mut self.draft
    }

    pub fn set_draft(&mut self, draft: R::Draft) {
        self.draft = draft;
    }

    pub fn editing_id(&self) -> Option<RecordId> {
        self.editing_id
    }

    pub fn mode(&self) -> FormMode {
        match self.editing_id {
            Some(id) => FormMode::Edit(id),
            None => FormMode::Create,
        }
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    /// Switch to the view tab and fetch the list.
    pub async fn activate_view(&mut self) -> Result<(), ClientError> {
        self.tab = Tab::View;
        self.refresh().await
    }

    /// Fetch the whole collection. Failures are logged, not alerted.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        match self.api.list().await {
            Ok(records) => {
                tracing::debug!("Fetched {} {} record(s)", records.len(), R::NAME);
                self.set_records(records);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Error fetching {} list: {}", R::NAME, e);
                if e.requires_login() {
                    self.ui.redirect_to_login();
                }
                Err(e)
            }
        }
    }

    /// Load a listed record into the draft and switch to the create tab in edit mode.
    pub fn begin_edit(&mut self, id: RecordId) -> Result<(), ClientError> {
        let record = find_by_id(&self.records, id)
            .ok_or_else(|| ClientError::NotFound(format!("{} {} is not in the list", R::NAME, id)))?;

        self.draft = record.to_draft();
        self.editing_id = Some(id);
        self.tab = Tab::Create;
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.draft = R::Draft::default();
        self.editing_id = None;
    }

    pub fn validate(&self) -> Vec<FieldError> {
        fields::validate(R::fields(), &self.draft)
    }

    /// Validate and send the draft.
    ///
    /// Nothing is sent when validation fails. On success the draft is reset, the list is
    /// brought up to date and the view tab is shown; on failure the draft is kept.
    pub async fn submit(&mut self) -> Result<R, ClientError> {
        let saved = self.save().await?;

        match R::REFRESH {
            ListRefresh::Refetch => {
                // Failures are already logged by refresh.
                let _ = self.refresh().await;
            }
            ListRefresh::Patch => self.patch(saved.clone()),
        }

        Ok(saved)
    }

    /// `submit` without bringing the list up to date, for forms that reload it themselves.
    pub(crate) async fn save(&mut self) -> Result<R, ClientError> {
        let errors = self.validate();
        if !errors.is_empty() {
            tracing::warn!("{} form has {} invalid field(s)", R::NAME, errors.len());
            return Err(ClientError::Validation(errors));
        }

        let session = self.api.client().session().current().await;
        let payload = R::prepare(self.draft.clone(), session.as_ref());

        let (result, verb) = match self.editing_id {
            Some(id) => (self.api.update(id, &payload).await, "updated"),
            None => (self.api.create(&payload).await, "created"),
        };

        let saved = match result {
            Ok(saved) => saved,
            Err(e) => {
                tracing::error!("Error saving {}: {}", R::NAME, e);
                self.report(&e);
                return Err(e);
            }
        };

        let message = match R::SAVED_MESSAGE {
            Some(message) => message.to_string(),
            None => format!("{} {} successfully!", R::NAME, verb),
        };
        self.ui.alert(&message);
        self.cancel_edit();
        self.tab = Tab::View;

        Ok(saved)
    }

    /// Replace the listed record with the same id, or append it.
    fn patch(&mut self, record: R) {
        match self.records.iter_mut().find(|r| r.id() == record.id()) {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
    }

    /// Delete one record after confirmation. Returns `false` if the user declined.
    pub async fn delete(&mut self, id: RecordId) -> Result<bool, ClientError> {
        let question = format!(
            "Are you sure you want to delete this {}?",
            R::NAME.to_lowercase()
        );
        if !self.ui.confirm(&question) {
            return Ok(false);
        }

        if let Err(e) = self.api.delete(id).await {
            tracing::error!("Error deleting {} {}: {}", R::NAME, id, e);
            self.report(&e);
            return Err(e);
        }

        self.forget(&[id]);
        self.ui.alert(&format!("{} deleted successfully!", R::NAME));
        Ok(true)
    }

    pub fn selected(&self) -> &BTreeSet<RecordId> {
        &self.selected
    }

    pub fn toggle_selected(&mut self, id: RecordId) {
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
    }

    /// Select every listed record, or clear the selection if all are already selected.
    pub fn select_all(&mut self) {
        if !self.records.is_empty() && self.selected.len() == self.records.len() {
            self.selected.clear();
        } else {
            self.selected = self.records.iter().map(|r| r.id()).collect();
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Delete every selected record after one confirmation.
    ///
    /// Records whose delete succeeded are removed locally even when others failed.
    pub async fn delete_selected(&mut self) -> Result<Vec<RecordId>, ClientError> {
        if self.selected.is_empty() {
            return Ok(Vec::new());
        }

        let question = format!(
            "Are you sure you want to delete {} selected record(s)?",
            self.selected.len()
        );
        if !self.ui.confirm(&question) {
            return Ok(Vec::new());
        }

        let ids: Vec<RecordId> = self.selected.iter().copied().collect();
        let report = self.api.delete_many(&ids).await;
        let deleted = report.deleted.clone();
        self.forget(&deleted);

        if let Some(e) = report.into_error() {
            tracing::error!("Bulk delete of {} failed: {}", R::NAME, e);
            self.report(&e);
            return Err(e);
        }

        self.ui.alert("Selected records deleted successfully!");
        Ok(deleted)
    }

    /// Replace the list with records fetched elsewhere.
    pub fn set_records(&mut self, records: Vec<R>) {
        self.records = records;
        self.selected.retain(|id| self.records.iter().any(|r| r.id() == *id));
    }

    /// Drop records from the list without refetching.
    fn forget(&mut self, ids: &[RecordId]) {
        self.records.retain(|r| !ids.contains(&r.id()));
        for id in ids {
            self.selected.remove(id);
        }
        if self.editing_id.is_some_and(|id| ids.contains(&id)) {
            self.cancel_edit();
        }
    }

    /// Send login-class errors to the login view and alert everything else.
    ///
    /// A partial bulk delete is alerted first so the user sees what was removed.
    fn report(&self, error: &ClientError) {
        if matches!(error, ClientError::PartialDelete { .. }) || !error.requires_login() {
            self.ui.alert(&error.message());
        }
        if error.requires_login() {
            self.ui.redirect_to_login();
        }
    }
}
