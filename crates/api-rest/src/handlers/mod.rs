//! HTTP handlers, one module per resource.
//!
//! Every handler takes its extractors as `Result`s so that malformed paths, query strings and
//! bodies are reported as `400` in the common error shape instead of axum's plain-text
//! rejections.

pub mod admissions;
pub mod auth;
pub mod consults;
pub mod dashboard;
pub mod health;
pub mod imaging;
pub mod orders;
pub mod patients;
pub mod results;
pub mod vitals;

use crate::error::ApiResult;
use api_shared::Pagination;
use medicard_core::models::{
    Admission, Consult, ImagingStudy, LabResult, Order, Patient, VitalSignView,
};
use medicard_core::{Page, PageRequest};
use serde::Serialize;
use utoipa::ToSchema;

/// List envelope shared by every collection endpoint.
#[derive(Debug, Serialize, ToSchema)]
#[aliases(
    PatientPage = Paged<Patient>,
    AdmissionPage = Paged<Admission>,
    LabResultPage = Paged<LabResult>,
    ImagingPage = Paged<ImagingStudy>,
    ConsultPage = Paged<Consult>,
    OrderPage = Paged<Order>,
    VitalSignPage = Paged<VitalSignView>,
)]
pub struct Paged<T> {
    pub results: Vec<T>,
    pub pagination: Pagination,
}

impl<T> From<Page<T>> for Paged<T> {
    fn from(page: Page<T>) -> Self {
        Self {
            pagination: page.pagination(),
            results: page.items,
        }
    }
}

/// Validate `page`/`per_page` query values.
pub(crate) fn page_request(page: Option<i64>, per_page: Option<i64>) -> ApiResult<PageRequest> {
    Ok(PageRequest::new(page, per_page)?)
}
