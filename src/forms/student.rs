//! Student information form.
//!
//! The cascading selector picks institute and branch; academic year, admission category and
//! quota come from flat lookups. Selections are copied into the draft as the backend
//! expects them: institute and category by code, academic year by label, branch and quota
//! by id.

use std::sync::Arc;

use super::{CascadingSelector, Interaction, Level, ResourceForm, SelectOption};
use crate::api::{RequestClient, ResourceClient};
use crate::errors::ClientError;
use crate::models::{AcademicYear, Category, Quota, Record, RecordId, Student};

pub struct StudentInfoForm {
    form: ResourceForm<Student>,
    cascade: CascadingSelector,
    academic_years: Vec<SelectOption>,
    categories: Vec<SelectOption>,
    quotas: Vec<SelectOption>,
}

impl StudentInfoForm {
    pub fn new(client: RequestClient, ui: Arc<dyn Interaction>) -> Self {
        Self {
            form: ResourceForm::new(client, ui),
            cascade: CascadingSelector::new(),
            academic_years: Vec::new(),
            categories: Vec::new(),
            quotas: Vec::new(),
        }
    }

    pub fn form(&self) -> &ResourceForm<Student> {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ResourceForm<Student> {
        &mut self.form
    }

    pub fn cascade(&self) -> &CascadingSelector {
        &self.cascade
    }

    pub fn academic_years(&self) -> &[SelectOption] {
        &self.academic_years
    }

    pub fn categories(&self) -> &[SelectOption] {
        &self.categories
    }

    pub fn quotas(&self) -> &[SelectOption] {
        &self.quotas
    }

    fn client(&self) -> RequestClient {
        self.form.api().client().clone()
    }

    /// Load universities and the flat lookups.
    pub async fn mount(&mut self) -> Result<(), ClientError> {
        let client = self.client();
        if !client.session().is_active().await {
            tracing::warn!("Student form opened without a session");
            self.form.interaction().redirect_to_login();
            return Err(ClientError::MissingAuth);
        }

        let loaded = tokio::try_join!(
            lookup::<AcademicYear>(&client),
            lookup::<Category>(&client),
            lookup::<Quota>(&client),
        );
        let result = match loaded {
            Ok((academic_years, categories, quotas)) => {
                self.academic_years = academic_years;
                self.categories = categories;
                self.quotas = quotas;
                self.cascade.load_universities(&client).await
            }
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            tracing::error!("Error loading student form lookups: {}", e);
            if e.requires_login() {
                self.form.interaction().redirect_to_login();
            }
        }
        self.sync_cascade();
        result
    }

    /// Select a cascade value and load the next level.
    pub async fn choose(&mut self, level: Level, id: RecordId) -> Result<(), ClientError> {
        let client = self.client();
        let result = self.cascade.choose(&client, level, id).await;
        self.sync_cascade();

        if let Err(e) = &result {
            tracing::error!("Error loading options after {} {}: {}", level.label(), id, e);
            if e.requires_login() {
                self.form.interaction().redirect_to_login();
            }
        }
        result
    }

    pub fn select_academic_year(&mut self, id: RecordId) -> Result<(), ClientError> {
        let label = pick(&self.academic_years, id, "Academic year")?;
        self.form.draft_mut().academic_year = label;
        Ok(())
    }

    pub fn select_category(&mut self, id: RecordId) -> Result<(), ClientError> {
        let code = pick(&self.categories, id, "Admission category")?;
        self.form.draft_mut().admission_category = code;
        Ok(())
    }

    pub fn select_quota(&mut self, id: RecordId) -> Result<(), ClientError> {
        pick(&self.quotas, id, "Admission quota")?;
        self.form.draft_mut().admn_quota_id = Some(id);
        Ok(())
    }

    /// Copy the institute code and branch id from the cascade into the draft.
    fn sync_cascade(&mut self) {
        let institute = self
            .cascade
            .selected_option(Level::Institute)
            .map(|o| o.label.clone())
            .unwrap_or_default();
        let branch = self.cascade.selected(Level::Branch);

        let draft = self.form.draft_mut();
        draft.institute = institute;
        draft.branch_id = branch;
    }

    /// Save the student. On success the cascade starts over from the university list.
    pub async fn submit(&mut self) -> Result<Student, ClientError> {
        let saved = self.form.submit().await?;
        let client = self.client();
        if let Err(e) = self.cascade.load_universities(&client).await {
            tracing::warn!("Failed to reload universities: {}", e);
        }
        self.sync_cascade();
        Ok(saved)
    }
}

async fn lookup<R: Record>(client: &RequestClient) -> Result<Vec<SelectOption>, ClientError> {
    let records = ResourceClient::<R>::new(client.clone()).list().await?;
    Ok(records.iter().map(SelectOption::from_record).collect())
}

fn pick(options: &[SelectOption], id: RecordId, what: &str) -> Result<String, ClientError> {
    options
        .iter()
        .find(|o| o.id == id)
        .map(|o| o.label.clone())
        .ok_or_else(|| {
            ClientError::InvalidSelection(format!(
                "{} {} is not one of the offered options",
                what, id
            ))
        })
}
