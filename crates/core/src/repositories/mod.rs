//! Store-backed services, one per aggregate.
//!
//! Each service wraps a cloned [`Database`](crate::db::Database) handle and is cheap to build
//! per request.

mod helpers;

pub mod admissions;
pub mod consults;
pub mod imaging;
pub mod orders;
pub mod patients;
pub mod results;
pub mod users;
pub mod vitals;

pub(crate) use helpers::contains_pattern;

pub use admissions::AdmissionService;
pub use consults::ConsultService;
pub use imaging::ImagingService;
pub use orders::OrderService;
pub use patients::PatientService;
pub use results::{ClinicalFilter, ResultService};
pub use users::UserService;
pub use vitals::VitalsService;
