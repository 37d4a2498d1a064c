//! Event form with its event type and committee lookups.

use std::sync::Arc;

use super::{Interaction, ResourceForm, SelectOption};
use crate::api::{RequestClient, ResourceClient};
use crate::errors::ClientError;
use crate::models::{find_by_id, Committee, Event, EventType, Record};

pub struct EventForm {
    form: ResourceForm<Event>,
    event_types: Vec<EventType>,
    committees: Vec<Committee>,
}

impl EventForm {
    pub fn new(client: RequestClient, ui: Arc<dyn Interaction>) -> Self {
        Self {
            form: ResourceForm::new(client, ui),
            event_types: Vec::new(),
            committees: Vec::new(),
        }
    }

    pub fn form(&self) -> &ResourceForm<Event> {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ResourceForm<Event> {
        &mut self.form
    }

    /// Fetch event types, committees and events concurrently.
    ///
    /// Nothing is replaced unless all three fetches succeed.
    pub async fn load(&mut self) -> Result<(), ClientError> {
        let client = self.form.api().client().clone();
        let types = ResourceClient::<EventType>::new(client.clone());
        let committees = ResourceClient::<Committee>::new(client);

        let fetched = tokio::try_join!(types.list(), committees.list(), self.form.api().list());

        match fetched {
            Ok((event_types, committees, events)) => {
                self.event_types = event_types;
                self.committees = committees;
                self.form.set_records(events);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Error fetching event data: {}", e);
                if e.requires_login() {
                    self.form.interaction().redirect_to_login();
                }
                Err(e)
            }
        }
    }

    pub fn event_types(&self) -> &[EventType] {
        &self.event_types
    }

    pub fn committees(&self) -> &[Committee] {
        &self.committees
    }

    pub fn type_options(&self) -> Vec<SelectOption> {
        self.event_types.iter().map(SelectOption::from_record).collect()
    }

    pub fn committee_options(&self) -> Vec<SelectOption> {
        self.committees.iter().map(SelectOption::from_record).collect()
    }

    /// Name of the committee organizing `event`, if it is in the committee list.
    pub fn organizer_name(&self, event: &Event) -> Option<&str> {
        find_by_id(&self.committees, event.organized_by).map(|c| c.com_name.as_str())
    }

    /// "MAIN - SUB" label of the event's type, if it is in the type list.
    pub fn event_type_label(&self, event: &Event) -> Option<String> {
        find_by_id(&self.event_types, event.event_type).map(|t| t.label())
    }

    /// Submit the event draft; on success the whole form is reloaded.
    pub async fn submit(&mut self) -> Result<Event, ClientError> {
        let saved = self.form.save().await?;
        // Failures are logged by load.
        let _ = self.load().await;
        Ok(saved)
    }
}
