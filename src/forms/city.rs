//! City entry form.

use std::sync::Arc;

use super::{Interaction, ResourceForm, SelectOption};
use crate::api::{RequestClient, ResourceClient};
use crate::errors::ClientError;
use crate::models::{find_by_id, City, State};

pub struct CityForm {
    form: ResourceForm<City>,
    states: Vec<State>,
}

impl CityForm {
    pub fn new(client: RequestClient, ui: Arc<dyn Interaction>) -> Self {
        Self {
            form: ResourceForm::new(client, ui),
            states: Vec::new(),
        }
    }

    pub fn form(&self) -> &ResourceForm<City> {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ResourceForm<City> {
        &mut self.form
    }

    /// Open the form: without a session go straight to login, otherwise load the states.
    pub async fn mount(&mut self) -> Result<(), ClientError> {
        let client = self.form.api().client().clone();
        if !client.session().is_active().await {
            tracing::warn!("City form opened without a session");
            self.form.interaction().redirect_to_login();
            return Err(ClientError::MissingAuth);
        }

        match ResourceClient::<State>::new(client).list().await {
            Ok(states) => {
                self.states = states;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Error fetching states: {}", e);
                if e.requires_login() {
                    self.form.interaction().redirect_to_login();
                }
                Err(e)
            }
        }
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn state_options(&self) -> Vec<SelectOption> {
        self.states.iter().map(SelectOption::from_record).collect()
    }

    pub fn state_name(&self, city: &City) -> Option<&str> {
        find_by_id(&self.states, city.state).map(|s| s.name.as_str())
    }

    pub async fn submit(&mut self) -> Result<City, ClientError> {
        self.form.submit().await
    }
}
