//! Event and event type models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Record, RecordId, Resource};
use crate::forms::fields::{date, number, opt_text, text};
use crate::forms::{FieldKind, FieldSpec};

/// Main types offered by the event type form.
pub const MAIN_TYPES: &[&str] = &["Educational", "Non Educational"];

/// Classification of events, e.g. "Educational - Seminar".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct EventType {
    pub record_id: RecordId,
    pub main_type: String,
    pub sub_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct EventTypeDraft {
    #[serde(default)]
    pub main_type: String,
    #[serde(default)]
    pub sub_type: String,
}

const EVENT_TYPE_FIELDS: &[FieldSpec<EventTypeDraft>] = &[
    FieldSpec::required(
        "MAIN_TYPE",
        "Main Type",
        FieldKind::Select,
        |d: &EventTypeDraft| text(&d.main_type),
    )
    .one_of(MAIN_TYPES),
    FieldSpec::required(
        "SUB_TYPE",
        "Sub Type",
        FieldKind::Text,
        |d: &EventTypeDraft| text(&d.sub_type),
    ),
];

impl Record for EventType {
    const COLLECTION: &'static str = "/api/master/event-types/";

    fn id(&self) -> RecordId {
        self.record_id
    }

    fn label(&self) -> String {
        format!("{} - {}", self.main_type, self.sub_type)
    }
}

impl Resource for EventType {
    const NAME: &'static str = "Event Type";

    type Draft = EventTypeDraft;

    fn to_draft(&self) -> EventTypeDraft {
        EventTypeDraft {
            main_type: self.main_type.clone(),
            sub_type: self.sub_type.clone(),
        }
    }

    fn fields() -> &'static [FieldSpec<EventTypeDraft>] {
        EVENT_TYPE_FIELDS
    }
}

/// An event organized by a committee.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Event {
    pub record_id: RecordId,
    /// References `EventType::record_id`
    pub event_type: RecordId,
    pub event_name: String,
    /// References `Committee::record_id`
    pub organized_by: RecordId,
    pub event_start_dt: NaiveDate,
    pub event_end_dt: NaiveDate,
    #[serde(default)]
    pub event_purpose: Option<String>,
    #[serde(default)]
    pub event_remarks: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct EventDraft {
    #[serde(default)]
    pub event_type: Option<RecordId>,
    #[serde(default)]
    pub event_name: String,
    #[serde(default)]
    pub organized_by: Option<RecordId>,
    #[serde(default)]
    pub event_start_dt: Option<NaiveDate>,
    #[serde(default)]
    pub event_end_dt: Option<NaiveDate>,
    #[serde(default)]
    pub event_purpose: Option<String>,
    #[serde(default)]
    pub event_remarks: Option<String>,
}

const EVENT_FIELDS: &[FieldSpec<EventDraft>] = &[
    FieldSpec::required("EVENT_TYPE", "Event Type", FieldKind::Select, |d: &EventDraft| {
        number(&d.event_type)
    }),
    FieldSpec::required(
        "ORGANIZED_BY",
        "Organized By",
        FieldKind::Select,
        |d: &EventDraft| number(&d.organized_by),
    ),
    FieldSpec::required("EVENT_NAME", "Event Name", FieldKind::Text, |d: &EventDraft| {
        text(&d.event_name)
    }),
    FieldSpec::required(
        "EVENT_START_DT",
        "Start Date",
        FieldKind::Date,
        |d: &EventDraft| date(&d.event_start_dt),
    ),
    FieldSpec::required("EVENT_END_DT", "End Date", FieldKind::Date, |d: &EventDraft| {
        date(&d.event_end_dt)
    }),
    FieldSpec::optional(
        "EVENT_PURPOSE",
        "Event Purpose",
        FieldKind::TextArea,
        |d: &EventDraft| opt_text(&d.event_purpose),
    ),
    FieldSpec::optional(
        "EVENT_REMARKS",
        "Event Remarks",
        FieldKind::TextArea,
        |d: &EventDraft| opt_text(&d.event_remarks),
    ),
];

impl Record for Event {
    const COLLECTION: &'static str = "/api/master/events/";

    fn id(&self) -> RecordId {
        self.record_id
    }

    fn label(&self) -> String {
        self.event_name.clone()
    }
}

impl Resource for Event {
    const NAME: &'static str = "Event";

    type Draft = EventDraft;

    fn to_draft(&self) -> EventDraft {
        EventDraft {
            event_type: Some(self.event_type),
            event_name: self.event_name.clone(),
            organized_by: Some(self.organized_by),
            event_start_dt: Some(self.event_start_dt),
            event_end_dt: Some(self.event_end_dt),
            event_purpose: self.event_purpose.clone(),
            event_remarks: self.event_remarks.clone(),
        }
    }

    fn fields() -> &'static [FieldSpec<EventDraft>] {
        EVENT_FIELDS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::fields::validate;

    #[test]
    fn test_event_type_main_type_must_be_offered() {
        let draft = EventTypeDraft {
            main_type: "Cultural".to_string(),
            sub_type: "Dance".to_string(),
        };
        let errors = validate(EventType::fields(), &draft);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "Main Type must be one of: Educational, Non Educational"
        );

        let draft = EventTypeDraft {
            main_type: "Non Educational".to_string(),
            ..draft
        };
        assert!(validate(EventType::fields(), &draft).is_empty());
    }

    #[test]
    fn test_event_type_label() {
        let event_type = EventType {
            record_id: 1,
            main_type: "Educational".to_string(),
            sub_type: "Seminar".to_string(),
        };
        assert_eq!(event_type.label(), "Educational - Seminar");
    }
}
