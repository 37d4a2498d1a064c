//! Program (course) model.

use serde::{Deserialize, Serialize};

use super::{ListRefresh, Record, RecordId, Resource};
use crate::forms::fields::text;
use crate::forms::{FieldKind, FieldSpec};

/// An academic program offered by an institute.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Program {
    pub program_id: RecordId,
    pub name: String,
    pub code: String,
    pub level: String,
    #[serde(rename = "TYPE")]
    pub program_type: String,
    /// Owning institute; used to filter programs in the cascading selector.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institute: Option<RecordId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ProgramDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub level: String,
    #[serde(default, rename = "TYPE")]
    pub program_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institute: Option<RecordId>,
}

const FIELDS: &[FieldSpec<ProgramDraft>] = &[
    FieldSpec::required("NAME", "Name", FieldKind::Text, |d: &ProgramDraft| {
        text(&d.name)
    }),
    FieldSpec::required("CODE", "Program Code", FieldKind::Text, |d: &ProgramDraft| {
        text(&d.code)
    }),
    FieldSpec::required("LEVEL", "Level", FieldKind::Text, |d: &ProgramDraft| {
        text(&d.level)
    }),
    FieldSpec::required("TYPE", "Type", FieldKind::Text, |d: &ProgramDraft| {
        text(&d.program_type)
    }),
];

impl Record for Program {
    const COLLECTION: &'static str = "/api/master/program/";

    fn id(&self) -> RecordId {
        self.program_id
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}

impl Resource for Program {
    const NAME: &'static str = "Program";

    // The program table patches edits in place instead of refetching.
    const REFRESH: ListRefresh = ListRefresh::Patch;

    type Draft = ProgramDraft;

    fn to_draft(&self) -> ProgramDraft {
        ProgramDraft {
            name: self.name.clone(),
            code: self.code.clone(),
            level: self.level.clone(),
            program_type: self.program_type.clone(),
            institute: self.institute,
        }
    }

    fn fields() -> &'static [FieldSpec<ProgramDraft>] {
        FIELDS
    }
}
