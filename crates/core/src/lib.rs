//! # MEDICARD Core
//!
//! Business logic for the MEDICARD hospital management backend.
//!
//! This crate owns the store and everything that reads or writes it:
//! - Configuration resolved at startup ([`CoreConfig`])
//! - The SQLite pool and embedded migrations ([`Database`])
//! - Password hashing, access tokens and role sets ([`auth`], [`roles`])
//! - One service per aggregate ([`repositories`])
//! - The dashboard patient list and its status indicators ([`dashboard`])
//!
//! **No API concerns**: HTTP routing, extractors and status codes belong in `api-rest`.

pub mod auth;
pub mod config;
pub mod constants;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod models;
pub mod pagination;
pub mod repositories;
pub mod roles;

pub use config::CoreConfig;
pub use dashboard::{DashboardService, PatientListQuery, SortKey, StatusFilter};
pub use db::Database;
pub use error::{MedicardError, MedicardResult};
pub use pagination::{Page, PageRequest};
pub use roles::Role;
