//! Student master record (basic student info).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Record, RecordId, Resource};
use crate::auth::Session;
use crate::forms::fields::{date, number, text};
use crate::forms::{FieldKind, FieldSpec};

/// Gender values accepted by the backend.
pub const GENDERS: &[&str] = &["male", "female", "other"];

/// A saved student. `STUDENT_ID` is generated by the backend from program, batch and a
/// running number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Student {
    pub record_id: RecordId,
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub academic_year: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub institute: String,
    pub branch_id: RecordId,
    #[serde(default)]
    pub admission_category: String,
    #[serde(default)]
    pub admn_quota_id: Option<RecordId>,
    #[serde(default)]
    pub batch: String,
    #[serde(default)]
    pub form_no: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub father_name: String,
    pub surname: String,
    #[serde(default)]
    pub name_on_certificate: String,
    #[serde(default)]
    pub email_id: String,
    #[serde(default)]
    pub gender: String,
    pub dob: NaiveDate,
    #[serde(default)]
    pub mob_no: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct StudentDraft {
    #[serde(default)]
    pub academic_year: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub institute: String,
    #[serde(default)]
    pub branch_id: Option<RecordId>,
    #[serde(default)]
    pub admission_category: String,
    #[serde(default)]
    pub admn_quota_id: Option<RecordId>,
    #[serde(default)]
    pub batch: String,
    #[serde(default)]
    pub form_no: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub father_name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub name_on_certificate: String,
    #[serde(default)]
    pub email_id: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub dob: Option<NaiveDate>,
    #[serde(default)]
    pub mob_no: String,
}

impl Default for StudentDraft {
    fn default() -> Self {
        Self {
            academic_year: String::new(),
            status: "Active".to_string(),
            institute: String::new(),
            branch_id: None,
            admission_category: String::new(),
            admn_quota_id: None,
            batch: String::new(),
            form_no: None,
            name: String::new(),
            father_name: String::new(),
            surname: String::new(),
            name_on_certificate: String::new(),
            email_id: String::new(),
            gender: "male".to_string(),
            dob: None,
            mob_no: String::new(),
        }
    }
}

const FIELDS: &[FieldSpec<StudentDraft>] = &[
    FieldSpec::optional(
        "ACADEMIC_YEAR",
        "Academic Year",
        FieldKind::Select,
        |d: &StudentDraft| text(&d.academic_year),
    ),
    FieldSpec::optional("INSTITUTE", "Institute", FieldKind::Select, |d: &StudentDraft| {
        text(&d.institute)
    }),
    FieldSpec::required("BRANCH_ID", "Branch", FieldKind::Select, |d: &StudentDraft| {
        number(&d.branch_id)
    }),
    FieldSpec::optional(
        "ADMISSION_CATEGORY",
        "Admission Category",
        FieldKind::Select,
        |d: &StudentDraft| text(&d.admission_category),
    ),
    FieldSpec::optional(
        "ADMN_QUOTA_ID",
        "Admission Quota",
        FieldKind::Select,
        |d: &StudentDraft| number(&d.admn_quota_id),
    ),
    FieldSpec::optional("BATCH", "Batch", FieldKind::Text, |d: &StudentDraft| {
        text(&d.batch)
    })
    .max_len(4),
    FieldSpec::optional("FORM_NO", "Form No", FieldKind::Number, |d: &StudentDraft| {
        number(&d.form_no)
    }),
    FieldSpec::required("NAME", "Name", FieldKind::Text, |d: &StudentDraft| {
        text(&d.name)
    })
    .max_len(100),
    FieldSpec::required("FATHER_NAME", "Father", FieldKind::Text, |d: &StudentDraft| {
        text(&d.father_name)
    })
    .max_len(100),
    FieldSpec::required("SURNAME", "Surname", FieldKind::Text, |d: &StudentDraft| {
        text(&d.surname)
    })
    .max_len(100),
    FieldSpec::optional("GENDER", "Gender", FieldKind::Select, |d: &StudentDraft| {
        text(&d.gender)
    })
    .one_of(GENDERS),
    FieldSpec::required("DOB", "Date of Birth", FieldKind::Date, |d: &StudentDraft| {
        date(&d.dob)
    }),
    FieldSpec::optional(
        "NAME_ON_CERTIFICATE",
        "Name on Certificate",
        FieldKind::Text,
        |d: &StudentDraft| text(&d.name_on_certificate),
    )
    .max_len(100),
    FieldSpec::required("MOB_NO", "Mobile No", FieldKind::Text, |d: &StudentDraft| {
        text(&d.mob_no)
    })
    .max_len(15),
    FieldSpec::optional("EMAIL_ID", "Email Id", FieldKind::Text, |d: &StudentDraft| {
        text(&d.email_id)
    }),
    FieldSpec::optional("STATUS", "Status", FieldKind::Select, |d: &StudentDraft| {
        text(&d.status)
    }),
];

impl Record for Student {
    const COLLECTION: &'static str = "/api/studentMaster/student/";

    fn id(&self) -> RecordId {
        self.record_id
    }

    fn label(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }
}

impl Resource for Student {
    const NAME: &'static str = "Student Information";

    const SAVED_MESSAGE: Option<&'static str> = Some("Student Information Saved Successfully");

    type Draft = StudentDraft;

    fn to_draft(&self) -> StudentDraft {
        StudentDraft {
            academic_year: self.academic_year.clone(),
            status: self.status.clone(),
            institute: self.institute.clone(),
            branch_id: Some(self.branch_id),
            admission_category: self.admission_category.clone(),
            admn_quota_id: self.admn_quota_id,
            batch: self.batch.clone(),
            form_no: self.form_no,
            name: self.name.clone(),
            father_name: self.father_name.clone(),
            surname: self.surname.clone(),
            name_on_certificate: self.name_on_certificate.clone(),
            email_id: self.email_id.clone(),
            gender: self.gender.clone(),
            dob: Some(self.dob),
            mob_no: self.mob_no.clone(),
        }
    }

    fn fields() -> &'static [FieldSpec<StudentDraft>] {
        FIELDS
    }

    /// Defaults the certificate name to "NAME SURNAME".
    fn prepare(mut draft: StudentDraft, _session: Option<&Session>) -> StudentDraft {
        if draft.name_on_certificate.trim().is_empty() {
            draft.name_on_certificate = format!("{} {}", draft.name.trim(), draft.surname.trim())
                .trim()
                .to_string();
        }
        draft
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_fills_certificate_name() {
        let draft = StudentDraft {
            name: "Asha ".to_string(),
            surname: "Patil".to_string(),
            ..StudentDraft::default()
        };
        let prepared = Student::prepare(draft, None);
        assert_eq!(prepared.name_on_certificate, "Asha Patil");

        let draft = StudentDraft {
            name: "Asha".to_string(),
            surname: "Patil".to_string(),
            name_on_certificate: "Asha R. Patil".to_string(),
            ..StudentDraft::default()
        };
        assert_eq!(Student::prepare(draft, None).name_on_certificate, "Asha R. Patil");
    }

    #[test]
    fn test_draft_defaults() {
        let draft = StudentDraft::default();
        assert_eq!(draft.status, "Active");
        assert!(GENDERS.contains(&draft.gender.as_str()));
    }

    #[test]
    fn test_unknown_gender_is_rejected() {
        let draft = StudentDraft {
            gender: "unknown".to_string(),
            ..StudentDraft::default()
        };
        let errors = crate::forms::fields::validate(Student::fields(), &draft);
        assert!(errors.iter().any(|e| e.field() == "GENDER"));

        let errors = crate::forms::fields::validate(Student::fields(), &StudentDraft::default());
        assert!(errors.iter().all(|e| e.field() != "GENDER"));
    }
}
