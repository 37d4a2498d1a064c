//! Read-only lookup collections used to fill dropdowns.

use serde::{Deserialize, Serialize};

use super::{Record, RecordId};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct University {
    pub university_id: RecordId,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
}

impl Record for University {
    const COLLECTION: &'static str = "/api/master/universities/";

    fn id(&self) -> RecordId {
        self.university_id
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Institute {
    pub institute_id: RecordId,
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub university: Option<RecordId>,
}

impl Record for Institute {
    const COLLECTION: &'static str = "/api/master/institutes/";

    fn id(&self) -> RecordId {
        self.institute_id
    }

    fn label(&self) -> String {
        self.code.clone()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Branch {
    pub branch_id: RecordId,
    pub name: String,
    #[serde(default)]
    pub program: Option<RecordId>,
}

impl Record for Branch {
    const COLLECTION: &'static str = "/api/master/branch/";

    fn id(&self) -> RecordId {
        self.branch_id
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}

/// Year of study within a branch ("First Year", ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Year {
    pub year_id: RecordId,
    pub year: String,
    #[serde(default)]
    pub branch: Option<RecordId>,
}

impl Record for Year {
    const COLLECTION: &'static str = "/api/master/year/";

    fn id(&self) -> RecordId {
        self.year_id
    }

    fn label(&self) -> String {
        self.year.clone()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AcademicYear {
    pub academic_year_id: RecordId,
    /// e.g. "2024-25"
    pub academic_year: String,
}

impl Record for AcademicYear {
    const COLLECTION: &'static str = "/api/master/academic-years/";

    fn id(&self) -> RecordId {
        self.academic_year_id
    }

    fn label(&self) -> String {
        self.academic_year.clone()
    }
}

/// Admission category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Category {
    pub category_id: RecordId,
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl Record for Category {
    const COLLECTION: &'static str = "/api/master/categories/";

    fn id(&self) -> RecordId {
        self.category_id
    }

    fn label(&self) -> String {
        self.code.clone()
    }
}

/// Admission quota.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Quota {
    pub quota_id: RecordId,
    pub name: String,
}

impl Record for Quota {
    const COLLECTION: &'static str = "/api/master/quota/";

    fn id(&self) -> RecordId {
        self.quota_id
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}
