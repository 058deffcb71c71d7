use super::{clean_optional, double_option};
use chrono::NaiveDate;
use medicard_types::{Mrn, NonEmptyText};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Patient {
    pub id: i64,
    pub mrn: String,
    pub first_name: String,
    pub last_name: String,
    pub dob: NaiveDate,
    pub sex: Option<String>,
    pub location_bed: Option<String>,
    pub primary_diagnosis_summary: Option<String>,
    pub code_status: Option<String>,
    pub isolation_status: Option<String>,
    pub attending_id: Option<i64>,
}

impl Patient {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Body of `POST /api/patients`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewPatient {
    #[schema(value_type = String, example = "MRN-100")]
    pub mrn: Mrn,
    #[schema(value_type = String)]
    pub first_name: NonEmptyText,
    #[schema(value_type = String)]
    pub last_name: NonEmptyText,
    pub dob: NaiveDate,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub location_bed: Option<String>,
    #[serde(default)]
    pub primary_diagnosis_summary: Option<String>,
    #[serde(default)]
    pub code_status: Option<String>,
    #[serde(default)]
    pub isolation_status: Option<String>,
    #[serde(default)]
    pub attending_id: Option<i64>,
}

impl NewPatient {
    pub(crate) fn normalised(mut self) -> Self {
        self.sex = clean_optional(self.sex);
        self.location_bed = clean_optional(self.location_bed);
        self.primary_diagnosis_summary = clean_optional(self.primary_diagnosis_summary);
        self.code_status = clean_optional(self.code_status);
        self.isolation_status = clean_optional(self.isolation_status);
        self
    }
}

/// Body of `PUT /api/patients/{mrn}`. Absent fields are left unchanged; `null` clears an
/// optional field. The MRN itself cannot be changed.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PatientUpdate {
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub first_name: Option<NonEmptyText>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub last_name: Option<NonEmptyText>,
    #[serde(default)]
    pub dob: Option<NaiveDate>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub sex: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub location_bed: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub primary_diagnosis_summary: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub code_status: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub isolation_status: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i64>, nullable)]
    pub attending_id: Option<Option<i64>>,
}

impl PatientUpdate {
    pub(crate) fn apply(self, patient: &mut Patient) {
        if let Some(first_name) = self.first_name {
            patient.first_name = first_name.into_inner();
        }
        if let Some(last_name) = self.last_name {
            patient.last_name = last_name.into_inner();
        }
        if let Some(dob) = self.dob {
            patient.dob = dob;
        }
        if let Some(sex) = self.sex {
            patient.sex = clean_optional(sex);
        }
        if let Some(location_bed) = self.location_bed {
            patient.location_bed = clean_optional(location_bed);
        }
        if let Some(summary) = self.primary_diagnosis_summary {
            patient.primary_diagnosis_summary = clean_optional(summary);
        }
        if let Some(code_status) = self.code_status {
            patient.code_status = clean_optional(code_status);
        }
        if let Some(isolation_status) = self.isolation_status {
            patient.isolation_status = clean_optional(isolation_status);
        }
        if let Some(attending_id) = self.attending_id {
            patient.attending_id = attending_id;
        }
    }
}
