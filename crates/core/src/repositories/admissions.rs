use super::helpers::{ensure_reference, fetch_page};
use crate::db::Database;
use crate::models::{Admission, AdmissionUpdate, NewAdmission};
use crate::pagination::{Page, PageRequest};
use crate::{MedicardError, MedicardResult};
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite};

#[derive(Clone, Debug)]
pub struct AdmissionService {
    db: Database,
}

impl AdmissionService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Admit a patient. `admitted_at` defaults to `now`.
    pub async fn create(&self, new: NewAdmission, now: DateTime<Utc>) -> MedicardResult<Admission> {
        let new = new.normalised();
        ensure_reference(self.db.pool(), "patients", "patient_id", Some(new.patient_id)).await?;
        ensure_reference(
            self.db.pool(),
            "users",
            "admitting_physician_id",
            new.admitting_physician_id,
        )
        .await?;

        let admission = sqlx::query_as::<_, Admission>(
            "INSERT INTO admissions (patient_id, admitting_physician_id, admitted_at, reason, location) \
             VALUES (?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(new.patient_id)
        .bind(new.admitting_physician_id)
        .bind(new.admitted_at.unwrap_or(now))
        .bind(&new.reason)
        .bind(&new.location)
        .fetch_one(self.db.pool())
        .await?;

        tracing::info!(
            "admitted patient {} as admission {}",
            admission.patient_id,
            admission.id
        );
        Ok(admission)
    }

    pub async fn get(&self, id: i64) -> MedicardResult<Admission> {
        sqlx::query_as::<_, Admission>("SELECT * FROM admissions WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| MedicardError::not_found("admission", id))
    }

    /// Most recent admissions first.
    pub async fn list(&self, patient_id: Option<i64>, request: PageRequest) -> MedicardResult<Page<Admission>> {
        fetch_page(
            self.db.pool(),
            "*",
            "FROM admissions",
            "admitted_at DESC, id DESC",
            request,
            |qb: &mut QueryBuilder<'_, Sqlite>| {
                if let Some(patient_id) = patient_id {
                    qb.push(" AND patient_id = ").push_bind(patient_id);
                }
            },
        )
        .await
    }

    /// Apply a partial update, e.g. to discharge a patient.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the discharge time would precede the admission time.
    pub async fn update(&self, id: i64, update: AdmissionUpdate) -> MedicardResult<Admission> {
        let mut admission = self.get(id).await?;
        if let Some(physician) = update.admitting_physician_id {
            ensure_reference(self.db.pool(), "users", "admitting_physician_id", physician).await?;
        }
        update.apply(&mut admission);

        if admission
            .discharged_at
            .is_some_and(|discharged| discharged < admission.admitted_at)
        {
            return Err(MedicardError::InvalidInput(
                "discharged_at must not be before admitted_at".into(),
            ));
        }

        let admission = sqlx::query_as::<_, Admission>(
            "UPDATE admissions SET admitting_physician_id = ?, discharged_at = ?, reason = ?, \
             location = ? WHERE id = ? RETURNING *",
        )
        .bind(admission.admitting_physician_id)
        .bind(admission.discharged_at)
        .bind(&admission.reason)
        .bind(&admission.location)
        .bind(admission.id)
        .fetch_one(self.db.pool())
        .await?;
        Ok(admission)
    }

    pub async fn delete(&self, id: i64) -> MedicardResult<()> {
        let result = sqlx::query("DELETE FROM admissions WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(MedicardError::not_found("admission", id));
        }
        tracing::warn!("deleted admission {} and its clinical records", id);
        Ok(())
    }
}
