//! User roles and the role sets that gate each kind of operation.
//!
//! Handlers call a capability check with one of the sets below at the top of the handler; the
//! sets are the single place where "who may do what" is written down.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema, sqlx::Type,
)]
pub enum Role {
    Admin,
    Doctor,
    Resident,
    Nurse,
    LabTech,
    Radiologist,
    Pharmacist,
    #[default]
    User,
}

impl Role {
    pub const ALL: [Role; 8] = [
        Role::Admin,
        Role::Doctor,
        Role::Resident,
        Role::Nurse,
        Role::LabTech,
        Role::Radiologist,
        Role::Pharmacist,
        Role::User,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Doctor => "Doctor",
            Role::Resident => "Resident",
            Role::Nurse => "Nurse",
            Role::LabTech => "LabTech",
            Role::Radiologist => "Radiologist",
            Role::Pharmacist => "Pharmacist",
            Role::User => "User",
        }
    }

    /// True if this role appears in `allowed`.
    pub fn is_any_of(self, allowed: &[Role]) -> bool {
        allowed.contains(&self)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown role {s:?}"))
    }
}

/// Create and update patients and admissions; read consults and vitals.
pub const WARD_STAFF: &[Role] = &[Role::Admin, Role::Doctor, Role::Resident, Role::Nurse];

/// Request consults and place or amend orders.
pub const CLINICIANS: &[Role] = &[Role::Admin, Role::Doctor, Role::Resident];

pub const RESULT_WRITERS: &[Role] = &[Role::Admin, Role::LabTech];

pub const RESULT_READERS: &[Role] = &[
    Role::Admin,
    Role::Doctor,
    Role::Resident,
    Role::Nurse,
    Role::LabTech,
];

pub const IMAGING_WRITERS: &[Role] = &[Role::Admin, Role::Radiologist, Role::LabTech];

pub const IMAGING_READERS: &[Role] = &[
    Role::Admin,
    Role::Doctor,
    Role::Resident,
    Role::Nurse,
    Role::Radiologist,
];

pub const ORDER_READERS: &[Role] = &[
    Role::Admin,
    Role::Doctor,
    Role::Resident,
    Role::Nurse,
    Role::Pharmacist,
];

pub const VITALS_WRITERS: &[Role] = &[Role::Nurse, Role::Doctor, Role::Resident];

/// Deletes are an administrative override.
pub const ADMIN_ONLY: &[Role] = &[Role::Admin];
