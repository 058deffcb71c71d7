use super::{clean_optional, double_option};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Admission {
    pub id: i64,
    pub patient_id: i64,
    pub admitting_physician_id: Option<i64>,
    pub admitted_at: DateTime<Utc>,
    /// Null while the patient is still admitted.
    pub discharged_at: Option<DateTime<Utc>>,
    pub reason: Option<String>,
    pub location: Option<String>,
}

impl Admission {
    pub fn is_active(&self) -> bool {
        self.discharged_at.is_none()
    }
}

/// Body of `POST /api/admissions`. `admitted_at` defaults to the time of the request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewAdmission {
    pub patient_id: i64,
    #[serde(default)]
    pub admitting_physician_id: Option<i64>,
    #[serde(default)]
    pub admitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl NewAdmission {
    pub(crate) fn normalised(mut self) -> Self {
        self.reason = clean_optional(self.reason);
        self.location = clean_optional(self.location);
        self
    }
}

/// Body of `PUT /api/admissions/{id}`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AdmissionUpdate {
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i64>, nullable)]
    pub admitting_physician_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, format = DateTime, nullable)]
    pub discharged_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub reason: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub location: Option<Option<String>>,
}

impl AdmissionUpdate {
    pub(crate) fn apply(self, admission: &mut Admission) {
        if let Some(physician) = self.admitting_physician_id {
            admission.admitting_physician_id = physician;
        }
        if let Some(discharged_at) = self.discharged_at {
            admission.discharged_at = discharged_at;
        }
        if let Some(reason) = self.reason {
            admission.reason = clean_optional(reason);
        }
        if let Some(location) = self.location {
            admission.location = clean_optional(location);
        }
    }
}
