//! Consult requests and read receipts.

use super::helpers::{ensure_reference, fetch_page};
use crate::db::Database;
use crate::models::{Consult, ConsultStatus, ConsultUpdate, NewConsult};
use crate::pagination::{Page, PageRequest};
use crate::{MedicardError, MedicardResult};
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite};

#[derive(Clone, Debug)]
pub struct ConsultService {
    db: Database,
}

impl ConsultService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Request a consult. New consults always start as `Pending`.
    pub async fn create(&self, new: NewConsult, now: DateTime<Utc>) -> MedicardResult<Consult> {
        let new = new.normalised();
        ensure_reference(self.db.pool(), "admissions", "admission_id", Some(new.admission_id)).await?;
        ensure_reference(
            self.db.pool(),
            "users",
            "assigned_physician_id",
            new.assigned_physician_id,
        )
        .await?;

        let consult = sqlx::query_as::<_, Consult>(
            "INSERT INTO consults (admission_id, consultant_name, notes, assigned_physician_id, \
             status, requested_at) VALUES (?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(new.admission_id)
        .bind(new.consultant_name.as_str())
        .bind(&new.notes)
        .bind(new.assigned_physician_id)
        .bind(ConsultStatus::Pending)
        .bind(now)
        .fetch_one(self.db.pool())
        .await?;
        Ok(consult)
    }

    pub async fn get(&self, id: i64) -> MedicardResult<Consult> {
        sqlx::query_as::<_, Consult>("SELECT * FROM consults WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| MedicardError::not_found("consult", id))
    }

    pub async fn list(
        &self,
        patient_id: Option<i64>,
        status: Option<ConsultStatus>,
        request: PageRequest,
    ) -> MedicardResult<Page<Consult>> {
        fetch_page(
            self.db.pool(),
            "c.*",
            "FROM consults c JOIN admissions a ON a.id = c.admission_id",
            "c.requested_at DESC, c.id DESC",
            request,
            |qb: &mut QueryBuilder<'_, Sqlite>| {
                if let Some(patient_id) = patient_id {
                    qb.push(" AND a.patient_id = ").push_bind(patient_id);
                }
                if let Some(status) = status {
                    qb.push(" AND c.status = ").push_bind(status);
                }
            },
        )
        .await
    }

    pub async fn update(&self, id: i64, update: ConsultUpdate) -> MedicardResult<Consult> {
        let mut consult = self.get(id).await?;
        if let Some(physician) = update.assigned_physician_id {
            ensure_reference(self.db.pool(), "users", "assigned_physician_id", physician).await?;
        }
        update.apply(&mut consult);

        let consult = sqlx::query_as::<_, Consult>(
            "UPDATE consults SET status = ?, assigned_physician_id = ?, notes = ? \
             WHERE id = ? RETURNING *",
        )
        .bind(consult.status)
        .bind(consult.assigned_physician_id)
        .bind(&consult.notes)
        .bind(consult.id)
        .fetch_one(self.db.pool())
        .await?;

        tracing::info!("consult {} is now {}", consult.id, consult.status.as_str());
        Ok(consult)
    }

    /// Mark a consult read by its assigned physician.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the consult does not exist.
    /// - `Forbidden` if `user_id` is not the assigned physician.
    ///
    /// Marking an already-read consult keeps the first read time.
    pub async fn mark_read(&self, id: i64, user_id: i64, now: DateTime<Utc>) -> MedicardResult<Consult> {
        let consult = self.get(id).await?;
        if consult.assigned_physician_id != Some(user_id) {
            return Err(MedicardError::Forbidden(
                "only the assigned physician may mark a consult as read".into(),
            ));
        }

        let consult = sqlx::query_as::<_, Consult>(
            "UPDATE consults SET read_at = COALESCE(read_at, ?) WHERE id = ? RETURNING *",
        )
        .bind(now)
        .bind(id)
        .fetch_one(self.db.pool())
        .await?;
        Ok(consult)
    }

    pub async fn delete(&self, id: i64) -> MedicardResult<()> {
        let done = sqlx::query("DELETE FROM consults WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        if done.rows_affected() == 0 {
            return Err(MedicardError::not_found("consult", id));
        }
        Ok(())
    }
}
