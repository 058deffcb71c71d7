//! Patient registry.
//!
//! Patients are addressed externally by MRN. The internal id is only used to link admissions
//! and for the dashboard.

use super::helpers::{conflict_on_unique, contains_pattern, ensure_reference, fetch_page};
use crate::db::Database;
use crate::models::{NewPatient, Patient, PatientUpdate};
use crate::pagination::{Page, PageRequest};
use crate::{MedicardError, MedicardResult};
use medicard_types::Mrn;
use sqlx::{QueryBuilder, Sqlite};

#[derive(Clone, Debug)]
pub struct PatientService {
    db: Database,
}

impl PatientService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Register a patient.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the MRN is already in use.
    /// - `InvalidInput` if `attending_id` names a user that does not exist.
    pub async fn create(&self, new: NewPatient) -> MedicardResult<Patient> {
        let new = new.normalised();
        ensure_reference(self.db.pool(), "users", "attending_id", new.attending_id).await?;

        let mrn = new.mrn.as_str().to_owned();
        let patient = sqlx::query_as::<_, Patient>(
            "INSERT INTO patients (mrn, first_name, last_name, dob, sex, location_bed, \
             primary_diagnosis_summary, code_status, isolation_status, attending_id) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(new.mrn.as_str())
        .bind(new.first_name.as_str())
        .bind(new.last_name.as_str())
        .bind(new.dob)
        .bind(&new.sex)
        .bind(&new.location_bed)
        .bind(&new.primary_diagnosis_summary)
        .bind(&new.code_status)
        .bind(&new.isolation_status)
        .bind(new.attending_id)
        .fetch_one(self.db.pool())
        .await
        .map_err(|e| conflict_on_unique(e, || format!("patient with MRN {mrn} already exists")))?;

        tracing::info!("created patient {} ({})", patient.id, patient.mrn);
        Ok(patient)
    }

    pub async fn get(&self, id: i64) -> MedicardResult<Patient> {
        sqlx::query_as::<_, Patient>("SELECT * FROM patients WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| MedicardError::not_found("patient", id))
    }

    /// Look up a patient by MRN. The MRN is normalised first, so lookups are case-insensitive;
    /// a string that cannot be an MRN is simply not found.
    pub async fn get_by_mrn(&self, mrn: &str) -> MedicardResult<Patient> {
        let Ok(parsed) = Mrn::parse(mrn) else {
            return Err(MedicardError::not_found("patient", mrn));
        };
        sqlx::query_as::<_, Patient>("SELECT * FROM patients WHERE mrn = ?")
            .bind(parsed.as_str())
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| MedicardError::not_found("patient", parsed))
    }

    /// List patients ordered by name, optionally filtered by a case-insensitive substring of
    /// the MRN, first name or last name.
    pub async fn list(&self, search: Option<&str>, request: PageRequest) -> MedicardResult<Page<Patient>> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(contains_pattern);

        fetch_page(
            self.db.pool(),
            "*",
            "FROM patients",
            "last_name, first_name, id",
            request,
            |qb: &mut QueryBuilder<'_, Sqlite>| {
                if let Some(pattern) = &pattern {
                    qb.push(" AND (mrn LIKE ")
                        .push_bind(pattern.clone())
                        .push(" ESCAPE '\\' OR first_name LIKE ")
                        .push_bind(pattern.clone())
                        .push(" ESCAPE '\\' OR last_name LIKE ")
                        .push_bind(pattern.clone())
                        .push(" ESCAPE '\\')");
                }
            },
        )
        .await
    }

    /// Apply a partial update. The MRN cannot change.
    pub async fn update(&self, mrn: &str, update: PatientUpdate) -> MedicardResult<Patient> {
        let mut patient = self.get_by_mrn(mrn).await?;
        if let Some(attending_id) = update.attending_id {
            ensure_reference(self.db.pool(), "users", "attending_id", attending_id).await?;
        }
        update.apply(&mut patient);

        let patient = sqlx::query_as::<_, Patient>(
            "UPDATE patients SET first_name = ?, last_name = ?, dob = ?, sex = ?, \
             location_bed = ?, primary_diagnosis_summary = ?, code_status = ?, \
             isolation_status = ?, attending_id = ? WHERE id = ? RETURNING *",
        )
        .bind(&patient.first_name)
        .bind(&patient.last_name)
        .bind(patient.dob)
        .bind(&patient.sex)
        .bind(&patient.location_bed)
        .bind(&patient.primary_diagnosis_summary)
        .bind(&patient.code_status)
        .bind(&patient.isolation_status)
        .bind(patient.attending_id)
        .bind(patient.id)
        .fetch_one(self.db.pool())
        .await?;

        tracing::info!("updated patient {}", patient.mrn);
        Ok(patient)
    }

    /// Delete a patient and, by cascade, every admission and clinical record under it.
    pub async fn delete(&self, mrn: &str) -> MedicardResult<()> {
        let patient = self.get_by_mrn(mrn).await?;
        sqlx::query("DELETE FROM patients WHERE id = ?")
            .bind(patient.id)
            .execute(self.db.pool())
            .await?;
        tracing::warn!("deleted patient {} and all linked records", patient.mrn);
        Ok(())
    }
}
