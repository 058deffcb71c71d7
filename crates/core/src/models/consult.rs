use super::{clean_optional, double_option};
use chrono::{DateTime, Utc};
use medicard_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema, sqlx::Type,
)]
pub enum ConsultStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

impl ConsultStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ConsultStatus::Pending => "Pending",
            ConsultStatus::Completed => "Completed",
            ConsultStatus::Cancelled => "Cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Consult {
    pub id: i64,
    pub admission_id: i64,
    pub consultant_name: String,
    pub notes: Option<String>,
    pub assigned_physician_id: Option<i64>,
    pub status: ConsultStatus,
    /// Set once by the assigned physician; never cleared.
    pub read_at: Option<DateTime<Utc>>,
    pub requested_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewConsult {
    pub admission_id: i64,
    #[schema(value_type = String, example = "Cardiology")]
    pub consultant_name: NonEmptyText,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub assigned_physician_id: Option<i64>,
}

impl NewConsult {
    pub(crate) fn normalised(mut self) -> Self {
        self.notes = clean_optional(self.notes);
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ConsultUpdate {
    #[serde(default)]
    pub status: Option<ConsultStatus>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i64>, nullable)]
    pub assigned_physician_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub notes: Option<Option<String>>,
}

impl ConsultUpdate {
    pub(crate) fn apply(self, consult: &mut Consult) {
        if let Some(status) = self.status {
            consult.status = status;
        }
        if let Some(physician) = self.assigned_physician_id {
            consult.assigned_physician_id = physician;
        }
        if let Some(notes) = self.notes {
            consult.notes = clean_optional(notes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_status_does_not_deserialise() {
        assert!(serde_json::from_str::<ConsultStatus>("\"Done\"").is_err());
        assert_eq!(
            serde_json::from_str::<ConsultStatus>("\"Completed\"").unwrap(),
            ConsultStatus::Completed
        );
    }
}
