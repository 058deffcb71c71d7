use super::helpers::{ensure_reference, fetch_page};
use super::results::ClinicalFilter;
use crate::db::Database;
use crate::models::{ImagingStudy, NewImagingStudy};
use crate::pagination::{Page, PageRequest};
use crate::{MedicardError, MedicardResult};
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite};

#[derive(Clone, Debug)]
pub struct ImagingService {
    db: Database,
}

impl ImagingService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create(&self, new: NewImagingStudy, now: DateTime<Utc>) -> MedicardResult<ImagingStudy> {
        let new = new.normalised();
        ensure_reference(self.db.pool(), "admissions", "admission_id", Some(new.admission_id)).await?;

        let study = sqlx::query_as::<_, ImagingStudy>(
            "INSERT INTO imaging_studies (admission_id, modality, report, is_critical, recorded_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(new.admission_id)
        .bind(new.modality.as_str())
        .bind(&new.report)
        .bind(new.is_critical)
        .bind(new.recorded_at.unwrap_or(now))
        .fetch_one(self.db.pool())
        .await?;

        if study.is_critical {
            tracing::warn!(
                "critical {} study {} recorded for admission {}",
                study.modality,
                study.id,
                study.admission_id
            );
        }
        Ok(study)
    }

    pub async fn get(&self, id: i64) -> MedicardResult<ImagingStudy> {
        sqlx::query_as::<_, ImagingStudy>("SELECT * FROM imaging_studies WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| MedicardError::not_found("imaging study", id))
    }

    pub async fn list(&self, filter: ClinicalFilter, request: PageRequest) -> MedicardResult<Page<ImagingStudy>> {
        fetch_page(
            self.db.pool(),
            "i.*",
            "FROM imaging_studies i JOIN admissions a ON a.id = i.admission_id",
            "i.recorded_at DESC, i.id DESC",
            request,
            |qb: &mut QueryBuilder<'_, Sqlite>| filter.push(qb, "i"),
        )
        .await
    }

    /// One-way, like result acknowledgement.
    pub async fn acknowledge(&self, id: i64, user_id: i64, now: DateTime<Utc>) -> MedicardResult<ImagingStudy> {
        let study = sqlx::query_as::<_, ImagingStudy>(
            "UPDATE imaging_studies SET \
             acknowledged_by_id = CASE WHEN acknowledged_at IS NULL THEN ? ELSE acknowledged_by_id END, \
             acknowledged_at = COALESCE(acknowledged_at, ?) \
             WHERE id = ? RETURNING *",
        )
        .bind(user_id)
        .bind(now)
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?
        .ok_or_else(|| MedicardError::not_found("imaging study", id))?;

        tracing::info!("imaging study {} acknowledged by user {}", id, user_id);
        Ok(study)
    }
}
