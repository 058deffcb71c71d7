use super::clean_optional;
use chrono::{DateTime, Utc};
use medicard_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, FromRow)]
pub struct ImagingStudy {
    pub id: i64,
    pub admission_id: i64,
    pub modality: String,
    pub report: Option<String>,
    pub is_critical: bool,
    pub recorded_at: DateTime<Utc>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub acknowledged_by_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewImagingStudy {
    pub admission_id: i64,
    #[schema(value_type = String, example = "CT")]
    pub modality: NonEmptyText,
    #[serde(default)]
    pub report: Option<String>,
    #[serde(default)]
    pub is_critical: bool,
    #[serde(default)]
    pub recorded_at: Option<DateTime<Utc>>,
}

impl NewImagingStudy {
    pub(crate) fn normalised(mut self) -> Self {
        self.report = clean_optional(self.report);
        self
    }
}
