use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health check response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Simple health service used by the REST API and the CLI.
///
/// This service provides a standardised way to check the health status of MEDICARD.
/// The store check itself lives in `medicard-core`; this type only shapes the response.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Static method to check health without creating an instance
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is healthy.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "MEDICARD is alive".into(),
        }
    }

    /// Health response for a service whose store could not be reached.
    pub fn store_unavailable(detail: impl std::fmt::Display) -> HealthRes {
        HealthRes {
            ok: false,
            message: format!("Database connection error: {detail}"),
        }
    }
}
