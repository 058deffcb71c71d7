//! # API Shared
//!
//! Shared wire types and utilities for the MEDICARD APIs.
//!
//! Contains:
//! - Dashboard request/response types (`dashboard` module)
//! - Pagination metadata used by every list endpoint
//! - Shared services like `HealthService`
//! - Authentication header utilities
//!
//! Used by `medicard-core` (which fills these types) and `api-rest` (which serves them).

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod pagination;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use dashboard::{DashboardPatient, PatientListParams, PatientListRes, StatusIndicators};
pub use health::{HealthRes, HealthService};
pub use pagination::Pagination;

/// Plain acknowledgement body, e.g. for logout or delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageRes {
    pub message: String,
}

impl MessageRes {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error body returned by every endpoint on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    /// Short category, e.g. "Validation Error" or "Not Found".
    pub error: String,
    /// Human-readable detail.
    pub message: String,
}
