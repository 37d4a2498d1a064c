//! Committee model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Record, RecordId, Resource};
use crate::forms::fields::{date, opt_text, text};
use crate::forms::{FieldKind, FieldSpec};

/// A committee that can organize events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Committee {
    pub record_id: RecordId,
    pub com_name: String,
    pub com_formation_date: NaiveDate,
    /// "Y" or "N"
    pub active: String,
    pub level1: String,
    #[serde(default)]
    pub remarks: Option<String>,
}

/// Editable committee fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct CommitteeDraft {
    #[serde(default)]
    pub com_name: String,
    #[serde(default)]
    pub com_formation_date: Option<NaiveDate>,
    #[serde(default)]
    pub active: String,
    #[serde(default)]
    pub level1: String,
    #[serde(default)]
    pub remarks: Option<String>,
}

const FIELDS: &[FieldSpec<CommitteeDraft>] = &[
    FieldSpec::required(
        "COM_NAME",
        "Committee Name",
        FieldKind::Text,
        |d: &CommitteeDraft| text(&d.com_name),
    ),
    FieldSpec::required(
        "COM_FORMATION_DATE",
        "Formation Date",
        FieldKind::Date,
        |d: &CommitteeDraft| date(&d.com_formation_date),
    ),
    FieldSpec::required("ACTIVE", "Active", FieldKind::Select, |d: &CommitteeDraft| {
        text(&d.active)
    }),
    FieldSpec::required("LEVEL1", "Level", FieldKind::Text, |d: &CommitteeDraft| {
        text(&d.level1)
    }),
    FieldSpec::optional(
        "REMARKS",
        "Remarks",
        FieldKind::TextArea,
        |d: &CommitteeDraft| opt_text(&d.remarks),
    ),
];

impl Record for Committee {
    const COLLECTION: &'static str = "/api/master/committees/";

    fn id(&self) -> RecordId {
        self.record_id
    }

    fn label(&self) -> String {
        self.com_name.clone()
    }
}

impl Resource for Committee {
    const NAME: &'static str = "Committee";

    type Draft = CommitteeDraft;

    fn to_draft(&self) -> CommitteeDraft {
        CommitteeDraft {
            com_name: self.com_name.clone(),
            com_formation_date: Some(self.com_formation_date),
            active: self.active.clone(),
            level1: self.level1.clone(),
            remarks: self.remarks.clone(),
        }
    }

    fn fields() -> &'static [FieldSpec<CommitteeDraft>] {
        FIELDS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let committee: Committee = serde_json::from_str(
            r#"{"RECORD_ID":4,"COM_NAME":"Senate","COM_FORMATION_DATE":"2024-01-01","ACTIVE":"Y","LEVEL1":"1"}"#,
        )
        .unwrap();
        assert_eq!(committee.remarks, None);

        let draft = committee.to_draft();
        assert_eq!(draft.com_formation_date, NaiveDate::from_ymd_opt(2024, 1, 1));

        let body = serde_json::to_value(&draft).unwrap();
        assert_eq!(body["COM_NAME"], "Senate");
        assert_eq!(body["COM_FORMATION_DATE"], "2024-01-01");
        assert!(body.get("RECORD_ID").is_none());
    }
}
