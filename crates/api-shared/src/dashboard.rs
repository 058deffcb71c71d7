//! Wire types for the dashboard patient list.

use crate::Pagination;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query string accepted by `GET /api/dashboard/patient-list`.
///
/// Values are kept close to the raw request; `medicard-core` turns them into a validated
/// query and rejects what it cannot interpret.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PatientListParams {
    /// Case-insensitive substring matched against the patient's location/bed.
    pub unit: Option<String>,
    /// Status filter. Supported: `new_admission_24`.
    pub status: Option<String>,
    /// `name_asc` (default) or `location_asc`. Unknown values fall back to `name_asc`.
    pub sort_by: Option<String>,
    /// 1-based page number (default 1).
    pub page: Option<i64>,
    /// Page size (default 20, capped at 100).
    pub limit: Option<i64>,
}

/// Five actionable-item flags computed per patient.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusIndicators {
    pub has_critical_lab: bool,
    pub has_critical_imaging: bool,
    pub has_unread_consult: bool,
    pub has_pending_orders: bool,
    pub has_abnormal_vitals: bool,
}

/// One row of the dashboard patient list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DashboardPatient {
    pub id: i64,
    pub mrn: String,
    /// "first last"
    pub name: String,
    pub dob: NaiveDate,
    pub sex: Option<String>,
    pub location_bed: Option<String>,
    pub primary_diagnosis_summary: Option<String>,
    /// Username of the attending physician, if one is assigned.
    pub attending_name: Option<String>,
    pub code_status: Option<String>,
    pub isolation_status: Option<String>,
    pub status_indicators: StatusIndicators,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PatientListRes {
    pub patients: Vec<DashboardPatient>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_uses_camel_case_keys() {
        let res = PatientListRes {
            patients: vec![],
            pagination: Pagination {
                current_page: 2,
                per_page: 10,
                total_pages: 1,
                total_items: 5,
            },
        };

        let value = serde_json::to_value(&res).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "patients": [],
                "pagination": {
                    "currentPage": 2,
                    "perPage": 10,
                    "totalPages": 1,
                    "totalItems": 5
                }
            })
        );
    }

    #[test]
    fn params_read_sort_by_in_camel_case() {
        let params: PatientListParams =
            serde_json::from_value(serde_json::json!({ "sortBy": "location_asc", "page": 3 }))
                .unwrap();
        assert_eq!(params.sort_by.as_deref(), Some("location_asc"));
        assert_eq!(params.page, Some(3));
        assert_eq!(params.limit, None);
    }
}
