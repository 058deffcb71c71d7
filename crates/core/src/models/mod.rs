//! Domain rows and the request bodies that create or amend them.
//!
//! Row structs derive `sqlx::FromRow` and are serialised as-is by the REST layer. Input
//! structs carry validated value types from `medicard-types`, so a body that deserialises has
//! already passed field-level validation.

pub mod admission;
pub mod consult;
pub mod imaging;
pub mod lab_result;
pub mod order;
pub mod patient;
pub mod user;
pub mod vitals;

pub use admission::{Admission, AdmissionUpdate, NewAdmission};
pub use consult::{Consult, ConsultStatus, ConsultUpdate, NewConsult};
pub use imaging::{ImagingStudy, NewImagingStudy};
pub use lab_result::{LabResult, LabResultUpdate, NewLabResult};
pub use order::{NewOrder, Order, OrderStatus, OrderUpdate};
pub use patient::{NewPatient, Patient, PatientUpdate};
pub use user::{NewUser, User};
pub use vitals::{NewVitalSign, VitalSign, VitalSignView, VitalThresholds, ABNORMAL_VITALS};

use serde::{Deserialize, Deserializer};

/// Distinguishes "field absent" (`None`) from "field set to null" (`Some(None)`) in
/// partial-update bodies. Use with `#[serde(default, deserialize_with = "double_option")]`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Trim an optional free-text field; blank strings become `None`.
pub(crate) fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
