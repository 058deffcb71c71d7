//! Laboratory results and their acknowledgement.

use super::helpers::{ensure_reference, fetch_page};
use crate::db::Database;
use crate::models::{LabResult, LabResultUpdate, NewLabResult};
use crate::pagination::{Page, PageRequest};
use crate::{MedicardError, MedicardResult};
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite};

/// Filters for listing lab results or imaging studies. The patient filter goes through the
/// admission, since clinical rows only reference their admission.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClinicalFilter {
    pub patient_id: Option<i64>,
    pub admission_id: Option<i64>,
}

impl ClinicalFilter {
    pub(crate) fn push(&self, qb: &mut QueryBuilder<'_, Sqlite>, alias: &str) {
        if let Some(patient_id) = self.patient_id {
            qb.push(" AND a.patient_id = ").push_bind(patient_id);
        }
        if let Some(admission_id) = self.admission_id {
            qb.push(format!(" AND {alias}.admission_id = "))
                .push_bind(admission_id);
        }
    }
}

#[derive(Clone, Debug)]
pub struct ResultService {
    db: Database,
}

impl ResultService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create(&self, new: NewLabResult, now: DateTime<Utc>) -> MedicardResult<LabResult> {
        ensure_reference(self.db.pool(), "admissions", "admission_id", Some(new.admission_id)).await?;

        let result = sqlx::query_as::<_, LabResult>(
            "INSERT INTO results (admission_id, test_name, value, is_critical, recorded_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(new.admission_id)
        .bind(new.test_name.as_str())
        .bind(new.value.as_str())
        .bind(new.is_critical)
        .bind(new.recorded_at.unwrap_or(now))
        .fetch_one(self.db.pool())
        .await?;

        if result.is_critical {
            tracing::warn!(
                "critical result {} recorded for admission {}",
                result.id,
                result.admission_id
            );
        }
        Ok(result)
    }

    pub async fn get(&self, id: i64) -> MedicardResult<LabResult> {
        sqlx::query_as::<_, LabResult>("SELECT * FROM results WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| MedicardError::not_found("result", id))
    }

    /// Most recently recorded first.
    pub async fn list(&self, filter: ClinicalFilter, request: PageRequest) -> MedicardResult<Page<LabResult>> {
        fetch_page(
            self.db.pool(),
            "r.*",
            "FROM results r JOIN admissions a ON a.id = r.admission_id",
            "r.recorded_at DESC, r.id DESC",
            request,
            |qb: &mut QueryBuilder<'_, Sqlite>| filter.push(qb, "r"),
        )
        .await
    }

    /// Amend the recorded values of a result. Acknowledgement columns are left untouched.
    pub async fn update(&self, id: i64, update: LabResultUpdate) -> MedicardResult<LabResult> {
        let mut result = self.get(id).await?;
        update.apply(&mut result);

        let result = sqlx::query_as::<_, LabResult>(
            "UPDATE results SET test_name = ?, value = ?, is_critical = ?, recorded_at = ? \
             WHERE id = ? RETURNING *",
        )
        .bind(&result.test_name)
        .bind(&result.value)
        .bind(result.is_critical)
        .bind(result.recorded_at)
        .bind(result.id)
        .fetch_one(self.db.pool())
        .await?;

        tracing::info!("result {} updated", result.id);
        Ok(result)
    }

    /// Acknowledge a result on behalf of `user_id`.
    ///
    /// Acknowledgement is one-way: acknowledging again keeps the original timestamp and
    /// acknowledging user.
    pub async fn acknowledge(&self, id: i64, user_id: i64, now: DateTime<Utc>) -> MedicardResult<LabResult> {
        let result = sqlx::query_as::<_, LabResult>(
            "UPDATE results SET \
             acknowledged_by_id = CASE WHEN acknowledged_at IS NULL THEN ? ELSE acknowledged_by_id END, \
             acknowledged_at = COALESCE(acknowledged_at, ?) \
             WHERE id = ? RETURNING *",
        )
        .bind(user_id)
        .bind(now)
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?
        .ok_or_else(|| MedicardError::not_found("result", id))?;

        tracing::info!("result {} acknowledged by user {}", id, user_id);
        Ok(result)
    }

    pub async fn delete(&self, id: i64) -> MedicardResult<()> {
        let done = sqlx::query("DELETE FROM results WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        if done.rows_affected() == 0 {
            return Err(MedicardError::not_found("result", id));
        }
        Ok(())
    }
}
