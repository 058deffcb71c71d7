use super::helpers::{fetch_page, row_exists};
use crate::db::Database;
use crate::models::{NewVitalSign, VitalSign, VitalSignView};
use crate::pagination::{Page, PageRequest};
use crate::{MedicardError, MedicardResult};
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite};

#[derive(Clone, Debug)]
pub struct VitalsService {
    db: Database,
}

impl VitalsService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    async fn ensure_admission(&self, admission_id: i64) -> MedicardResult<()> {
        if !row_exists(self.db.pool(), "admissions", admission_id).await? {
            return Err(MedicardError::not_found("admission", admission_id));
        }
        Ok(())
    }

    /// Record a set of observations against an admission, attributed to `recorded_by`.
    pub async fn record(
        &self,
        admission_id: i64,
        recorded_by: i64,
        new: NewVitalSign,
        now: DateTime<Utc>,
    ) -> MedicardResult<VitalSignView> {
        new.validate()?;
        self.ensure_admission(admission_id).await?;

        let notes = new.notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        let vital = sqlx::query_as::<_, VitalSign>(
            "INSERT INTO vital_signs (admission_id, recorded_by_id, recorded_at, heart_rate, \
             systolic_bp, diastolic_bp, respiratory_rate, temperature, oxygen_saturation, \
             pain_score, blood_glucose, notes) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(admission_id)
        .bind(recorded_by)
        .bind(new.recorded_at.unwrap_or(now))
        .bind(new.heart_rate)
        .bind(new.systolic_bp)
        .bind(new.diastolic_bp)
        .bind(new.respiratory_rate)
        .bind(new.temperature)
        .bind(new.oxygen_saturation)
        .bind(new.pain_score)
        .bind(new.blood_glucose)
        .bind(notes)
        .fetch_one(self.db.pool())
        .await?;

        let view = VitalSignView::from(vital);
        if view.is_abnormal {
            tracing::warn!(
                "abnormal vitals {} recorded for admission {}",
                view.vital.id,
                admission_id
            );
        }
        Ok(view)
    }

    /// Observations for one admission, newest first, optionally bounded by an inclusive time
    /// range.
    pub async fn list(
        &self,
        admission_id: i64,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        request: PageRequest,
    ) -> MedicardResult<Page<VitalSignView>> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(MedicardError::InvalidInput(
                    "start_time must not be after end_time".into(),
                ));
            }
        }
        self.ensure_admission(admission_id).await?;

        let page = fetch_page::<VitalSign, _>(
            self.db.pool(),
            "*",
            "FROM vital_signs",
            "recorded_at DESC, id DESC",
            request,
            |qb: &mut QueryBuilder<'_, Sqlite>| {
                qb.push(" AND admission_id = ").push_bind(admission_id);
                if let Some(start) = start {
                    qb.push(" AND recorded_at >= ").push_bind(start);
                }
                if let Some(end) = end {
                    qb.push(" AND recorded_at <= ").push_bind(end);
                }
            },
        )
        .await?;
        Ok(page.map(VitalSignView::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::Role;
    use crate::test_support::{memory_db, Seed};
    use chrono::Duration;

    #[tokio::test]
    async fn record_flags_abnormal_rows() {
        let db = memory_db().await;
        let seed = Seed::new(db.clone());
        let nurse = seed.user("nurse", Role::Nurse).await;
        let patient = seed.patient("MRN-1", "A", "B", None).await;
        let admission = seed.admission(patient.id, Utc::now()).await;

        let svc = VitalsService::new(db);
        let view = svc
            .record(
                admission.id,
                nurse.id,
                NewVitalSign {
                    heart_rate: Some(132),
                    temperature: Some(37.0),
                    ..Default::default()
                },
                Utc::now(),
            )
            .await
            .unwrap();
        assert!(view.is_abnormal);
        assert_eq!(view.vital.recorded_by_id, Some(nurse.id));
    }

    #[tokio::test]
    async fn record_against_missing_admission_is_not_found() {
        let svc = VitalsService::new(memory_db().await);
        let err = svc
            .record(
                5,
                1,
                NewVitalSign {
                    heart_rate: Some(80),
                    ..Default::default()
                },
                Utc::now(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, MedicardError::NotFound { .. }));
    }

    #[tokio::test]
    async fn list_honours_time_range() {
        let db = memory_db().await;
        let seed = Seed::new(db.clone());
        let patient = seed.patient("MRN-1", "A", "B", None).await;
        let admission = seed.admission(patient.id, Utc::now()).await;
        let now = Utc::now();
        for hours_ago in [1, 5, 30] {
            seed.vital(admission.id, now - Duration::hours(hours_ago), Some(80)).await;
        }

        let svc = VitalsService::new(db);
        let page = svc
            .list(
                admission.id,
                Some(now - Duration::hours(6)),
                Some(now),
                PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(page.total_items, 2);
        assert!(page.items[0].vital.recorded_at > page.items[1].vital.recorded_at);

        assert!(matches!(
            svc.list(admission.id, Some(now), Some(now - Duration::hours(1)), PageRequest::default())
                .await,
            Err(MedicardError::InvalidInput(_))
        ));
    }
}
