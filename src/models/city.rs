//! City model and its state lookup.

use serde::{Deserialize, Serialize};

use super::{Record, RecordId, Resource};
use crate::auth::Session;
use crate::forms::fields::{flag, number, text};
use crate::forms::{FieldKind, FieldSpec};

/// A state, offered as the parent of a city.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct State {
    pub state_id: RecordId,
    pub name: String,
}

impl Record for State {
    const COLLECTION: &'static str = "/api/master/states/";

    fn id(&self) -> RecordId {
        self.state_id
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct City {
    pub city_id: RecordId,
    /// References `State::state_id`
    pub state: RecordId,
    pub name: String,
    pub code: String,
    pub is_active: bool,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub updated_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct CityDraft {
    #[serde(default)]
    pub state: Option<RecordId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

fn default_active() -> bool {
    true
}

impl Default for CityDraft {
    fn default() -> Self {
        Self {
            state: None,
            name: String::new(),
            code: String::new(),
            is_active: true,
            created_by: None,
            updated_by: None,
        }
    }
}

const FIELDS: &[FieldSpec<CityDraft>] = &[
    FieldSpec::required("STATE", "State", FieldKind::Select, |d: &CityDraft| number(&d.state)),
    FieldSpec::required("NAME", "City Name", FieldKind::Text, |d: &CityDraft| {
        text(&d.name)
    })
    .max_len(100),
    FieldSpec::required("CODE", "City Code", FieldKind::Text, |d: &CityDraft| {
        text(&d.code)
    })
    .max_len(5),
    FieldSpec::optional("IS_ACTIVE", "Is Active", FieldKind::Checkbox, |d: &CityDraft| {
        flag(d.is_active)
    }),
];

impl Record for City {
    const COLLECTION: &'static str = "/api/master/cities/";

    fn id(&self) -> RecordId {
        self.city_id
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}

impl Resource for City {
    const NAME: &'static str = "City";

    type Draft = CityDraft;

    fn to_draft(&self) -> CityDraft {
        CityDraft {
            state: Some(self.state),
            name: self.name.clone(),
            code: self.code.clone(),
            is_active: self.is_active,
            created_by: self.created_by.clone(),
            updated_by: self.updated_by.clone(),
        }
    }

    fn fields() -> &'static [FieldSpec<CityDraft>] {
        FIELDS
    }

    /// City codes are stored upper-case and stamped with the acting user.
    fn prepare(mut draft: CityDraft, session: Option<&Session>) -> CityDraft {
        draft.code = draft.code.trim().to_uppercase();
        if let Some(session) = session {
            if draft.created_by.is_none() {
                draft.created_by = Some(session.username.clone());
            }
            draft.updated_by = Some(session.username.clone());
        }
        draft
    }
}
