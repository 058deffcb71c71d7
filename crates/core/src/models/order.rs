use super::{clean_optional, double_option};
use chrono::{DateTime, Utc};
use medicard_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema, sqlx::Type,
)]
pub enum OrderStatus {
    #[default]
    Pending,
    /// Waiting for the responsible attending to sign.
    PendingSignature,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::PendingSignature => "PendingSignature",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Order {
    pub id: i64,
    pub admission_id: i64,
    pub order_type: String,
    pub order_name: String,
    pub details: Option<String>,
    pub status: OrderStatus,
    pub responsible_attending_id: Option<i64>,
    pub ordered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewOrder {
    pub admission_id: i64,
    #[schema(value_type = String, example = "Medication")]
    pub order_type: NonEmptyText,
    #[schema(value_type = String, example = "Aspirin 81mg")]
    pub order_name: NonEmptyText,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub responsible_attending_id: Option<i64>,
}

impl NewOrder {
    pub(crate) fn normalised(mut self) -> Self {
        self.details = clean_optional(self.details);
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct OrderUpdate {
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub details: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i64>, nullable)]
    pub responsible_attending_id: Option<Option<i64>>,
}

impl OrderUpdate {
    pub(crate) fn apply(self, order: &mut Order) {
        if let Some(status) = self.status {
            order.status = status;
        }
        if let Some(details) = self.details {
            order.details = clean_optional(details);
        }
        if let Some(attending) = self.responsible_attending_id {
            order.responsible_attending_id = attending;
        }
    }
}
