use chrono::{DateTime, Utc};
use medicard_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A laboratory result recorded against an admission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, FromRow)]
pub struct LabResult {
    pub id: i64,
    pub admission_id: i64,
    pub test_name: String,
    pub value: String,
    pub is_critical: bool,
    pub recorded_at: DateTime<Utc>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub acknowledged_by_id: Option<i64>,
}

/// Body of `POST /api/results`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewLabResult {
    pub admission_id: i64,
    #[schema(value_type = String, example = "Potassium")]
    pub test_name: NonEmptyText,
    #[schema(value_type = String, example = "6.8 mmol/L")]
    pub value: NonEmptyText,
    #[serde(default)]
    pub is_critical: bool,
    #[serde(default)]
    pub recorded_at: Option<DateTime<Utc>>,
}

/// Body of `PUT /api/results/{id}`.
///
/// Acknowledgement is not part of the body; it only moves forward through the acknowledge
/// endpoint.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct LabResultUpdate {
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub test_name: Option<NonEmptyText>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub value: Option<NonEmptyText>,
    #[serde(default)]
    pub is_critical: Option<bool>,
    #[serde(default)]
    pub recorded_at: Option<DateTime<Utc>>,
}

impl LabResultUpdate {
    pub(crate) fn apply(self, result: &mut LabResult) {
        if let Some(test_name) = self.test_name {
            result.test_name = test_name.into_inner();
        }
        if let Some(value) = self.value {
            result.value = value.into_inner();
        }
        if let Some(is_critical) = self.is_critical {
            result.is_critical = is_critical;
        }
        if let Some(recorded_at) = self.recorded_at {
            result.recorded_at = recorded_at;
        }
    }
}
