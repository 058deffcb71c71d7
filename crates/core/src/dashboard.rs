//! Dashboard patient list with per-patient status indicators.
//!
//! A request is served in two steps, both inside one read transaction:
//!
//! 1. **Roster**: one count query and one page query over `patients`, with the location and
//!    status filters applied and a total order so that pages never overlap.
//! 2. **Indicators**: for the ids on that page only, one `SELECT DISTINCT patient_id` query per
//!    indicator, each resolving the patient through `admissions`. The result of each is a set;
//!    assembling a row is five set lookups.
//!
//! The number of queries is therefore fixed (two plus five) whatever the page size, and any
//! failure fails the whole request; a row is never returned with some indicators missing.
//!
//! | Indicator | Table | Condition |
//! |---|---|---|
//! | `has_critical_lab` | `results` | critical, unacknowledged, recorded within the window |
//! | `has_critical_imaging` | `imaging_studies` | critical, unacknowledged, recorded within the window |
//! | `has_unread_consult` | `consults` | assigned to the viewer, `Completed`, unread |
//! | `has_pending_orders` | `orders` | `PendingSignature`, viewer is responsible attending |
//! | `has_abnormal_vitals` | `vital_signs` | recorded within the window, outside [`ABNORMAL_VITALS`] |

use crate::config::CoreConfig;
use crate::db::Database;
use crate::models::{ConsultStatus, OrderStatus, ABNORMAL_VITALS};
use crate::pagination::{Page, PageRequest};
use crate::repositories::contains_pattern;
use crate::{MedicardError, MedicardResult};
use api_shared::{DashboardPatient, PatientListParams, PatientListRes, StatusIndicators};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection};
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

// ============================================================================
// QUERY
// ============================================================================

/// Roster status filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    /// At least one admission within the last 24 hours.
    NewAdmission24,
}

impl FromStr for StatusFilter {
    type Err = MedicardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new_admission_24" => Ok(StatusFilter::NewAdmission24),
            other => Err(MedicardError::InvalidInput(format!(
                "unknown status filter {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Last name, then first name.
    #[default]
    NameAsc,
    /// Location/bed; patients without a location sort last.
    LocationAsc,
}

impl SortKey {
    /// Unrecognised or missing keys fall back to [`SortKey::NameAsc`].
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("location_asc") => SortKey::LocationAsc,
            Some("name_asc") | Some("") | None => SortKey::NameAsc,
            Some(other) => {
                tracing::debug!("unknown sortBy {:?}, using name_asc", other);
                SortKey::NameAsc
            }
        }
    }

    fn order_by(self) -> &'static str {
        match self {
            SortKey::NameAsc => "p.last_name, p.first_name, p.id",
            SortKey::LocationAsc => "p.location_bed IS NULL, p.location_bed, p.id",
        }
    }
}

/// A validated dashboard request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PatientListQuery {
    /// Substring of `location_bed`; `None` means no location filter.
    pub unit: Option<String>,
    pub status: Option<StatusFilter>,
    pub sort: SortKey,
    pub page: PageRequest,
}

impl PatientListQuery {
    /// Validate raw query-string values.
    ///
    /// Blank `unit` and `status` mean "no filter". An unknown `sortBy` falls back to name
    /// order.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a non-positive `page`/`limit` or an unknown `status`.
    pub fn from_params(params: &PatientListParams) -> MedicardResult<Self> {
        let page = PageRequest::new(params.page, params.limit)?;
        let unit = params
            .unit
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_owned);
        let status = params
            .status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(StatusFilter::from_str)
            .transpose()?;

        Ok(Self {
            unit,
            status,
            sort: SortKey::from_param(params.sort_by.as_deref()),
            page,
        })
    }

    fn push_filters(&self, qb: &mut QueryBuilder<'_, Sqlite>, new_admission_cutoff: DateTime<Utc>) {
        if let Some(unit) = &self.unit {
            qb.push(" AND p.location_bed LIKE ")
                .push_bind(contains_pattern(unit))
                .push(" ESCAPE '\\'");
        }
        if let Some(StatusFilter::NewAdmission24) = self.status {
            qb.push(
                " AND EXISTS (SELECT 1 FROM admissions na \
                 WHERE na.patient_id = p.id AND na.admitted_at >= ",
            )
            .push_bind(new_admission_cutoff)
            .push(")");
        }
    }
}

// ============================================================================
// INDICATORS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Indicator {
    CriticalLab,
    CriticalImaging,
    UnreadConsult,
    PendingOrders,
    AbnormalVitals,
}

impl Indicator {
    const ALL: [Indicator; 5] = [
        Indicator::CriticalLab,
        Indicator::CriticalImaging,
        Indicator::UnreadConsult,
        Indicator::PendingOrders,
        Indicator::AbnormalVitals,
    ];

    fn table(self) -> &'static str {
        match self {
            Indicator::CriticalLab => "results",
            Indicator::CriticalImaging => "imaging_studies",
            Indicator::UnreadConsult => "consults",
            Indicator::PendingOrders => "orders",
            Indicator::AbnormalVitals => "vital_signs",
        }
    }

    /// Append this indicator's condition on alias `x`.
    fn push_condition(self, qb: &mut QueryBuilder<'_, Sqlite>, viewer_id: i64, window_start: DateTime<Utc>) {
        match self {
            Indicator::CriticalLab | Indicator::CriticalImaging => {
                qb.push(" AND x.is_critical = 1 AND x.acknowledged_at IS NULL AND x.recorded_at > ")
                    .push_bind(window_start);
            }
            Indicator::UnreadConsult => {
                qb.push(" AND x.assigned_physician_id = ")
                    .push_bind(viewer_id)
                    .push(" AND x.status = ")
                    .push_bind(ConsultStatus::Completed)
                    .push(" AND x.read_at IS NULL");
            }
            Indicator::PendingOrders => {
                qb.push(" AND x.responsible_attending_id = ")
                    .push_bind(viewer_id)
                    .push(" AND x.status = ")
                    .push_bind(OrderStatus::PendingSignature);
            }
            Indicator::AbnormalVitals => {
                qb.push(" AND x.recorded_at > ")
                    .push_bind(window_start)
                    .push(" AND ")
                    .push(ABNORMAL_VITALS.sql_predicate("x"));
            }
        }
    }

    /// Ids among `patient_ids` that have at least one matching record.
    async fn matching_patients(
        self,
        conn: &mut SqliteConnection,
        patient_ids: &[i64],
        viewer_id: i64,
        window_start: DateTime<Utc>,
    ) -> MedicardResult<HashSet<i64>> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT DISTINCT a.patient_id FROM ");
        qb.push(self.table())
            .push(" x JOIN admissions a ON a.id = x.admission_id WHERE a.patient_id IN (");
        let mut ids = qb.separated(", ");
        for id in patient_ids {
            ids.push_bind(*id);
        }
        ids.push_unseparated(")");
        self.push_condition(&mut qb, viewer_id, window_start);

        let rows: Vec<i64> = qb.build_query_scalar().fetch_all(&mut *conn).await?;
        Ok(rows.into_iter().collect())
    }
}

/// The five per-indicator patient sets for one page.
#[derive(Debug, Default)]
struct IndicatorSets {
    critical_lab: HashSet<i64>,
    critical_imaging: HashSet<i64>,
    unread_consult: HashSet<i64>,
    pending_orders: HashSet<i64>,
    abnormal_vitals: HashSet<i64>,
}

impl IndicatorSets {
    async fn load(
        conn: &mut SqliteConnection,
        patient_ids: &[i64],
        viewer_id: i64,
        window_start: DateTime<Utc>,
    ) -> MedicardResult<Self> {
        let mut sets = IndicatorSets::default();
        if patient_ids.is_empty() {
            return Ok(sets);
        }

        for indicator in Indicator::ALL {
            let found = indicator
                .matching_patients(conn, patient_ids, viewer_id, window_start)
                .await?;
            match indicator {
                Indicator::CriticalLab => sets.critical_lab = found,
                Indicator::CriticalImaging => sets.critical_imaging = found,
                Indicator::UnreadConsult => sets.unread_consult = found,
                Indicator::PendingOrders => sets.pending_orders = found,
                Indicator::AbnormalVitals => sets.abnormal_vitals = found,
            }
        }
        Ok(sets)
    }

    fn for_patient(&self, id: i64) -> StatusIndicators {
        StatusIndicators {
            has_critical_lab: self.critical_lab.contains(&id),
            has_critical_imaging: self.critical_imaging.contains(&id),
            has_unread_consult: self.unread_consult.contains(&id),
            has_pending_orders: self.pending_orders.contains(&id),
            has_abnormal_vitals: self.abnormal_vitals.contains(&id),
        }
    }
}

// ============================================================================
// SERVICE
// ============================================================================

#[derive(Debug, FromRow)]
struct RosterRow {
    id: i64,
    mrn: String,
    first_name: String,
    last_name: String,
    dob: NaiveDate,
    sex: Option<String>,
    location_bed: Option<String>,
    primary_diagnosis_summary: Option<String>,
    code_status: Option<String>,
    isolation_status: Option<String>,
    attending_name: Option<String>,
}

impl RosterRow {
    fn into_dashboard_patient(self, status_indicators: StatusIndicators) -> DashboardPatient {
        DashboardPatient {
            id: self.id,
            mrn: self.mrn,
            name: format!("{} {}", self.first_name, self.last_name),
            dob: self.dob,
            sex: self.sex,
            location_bed: self.location_bed,
            primary_diagnosis_summary: self.primary_diagnosis_summary,
            attending_name: self.attending_name,
            code_status: self.code_status,
            isolation_status: self.isolation_status,
            status_indicators,
        }
    }
}

const ROSTER_FROM: &str = "FROM patients p LEFT JOIN users u ON u.id = p.attending_id";

const ROSTER_COLUMNS: &str = "p.id, p.mrn, p.first_name, p.last_name, p.dob, p.sex, \
     p.location_bed, p.primary_diagnosis_summary, p.code_status, p.isolation_status, \
     u.username AS attending_name";

/// Builds the dashboard patient list.
///
/// Read-only; every call recomputes from the store.
#[derive(Clone, Debug)]
pub struct DashboardService {
    db: Database,
    cfg: Arc<CoreConfig>,
}

impl DashboardService {
    pub fn new(db: Database, cfg: Arc<CoreConfig>) -> Self {
        Self { db, cfg }
    }

    /// One page of the roster for `viewer_id`, with indicators evaluated as of `now`.
    ///
    /// The consult and order indicators depend on who is asking, so two users may see
    /// different flags for the same patient.
    ///
    /// # Errors
    ///
    /// Any store failure; nothing is returned partially.
    pub async fn patient_list(
        &self,
        viewer_id: i64,
        query: &PatientListQuery,
        now: DateTime<Utc>,
    ) -> MedicardResult<PatientListRes> {
        let window_start = now - self.cfg.indicator_window();
        let new_admission_cutoff = now - self.cfg.new_admission_window();

        let mut tx = self.db.pool().begin().await?;

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) ");
        count.push(ROSTER_FROM).push(" WHERE 1 = 1");
        query.push_filters(&mut count, new_admission_cutoff);
        let total_items: i64 = count.build_query_scalar().fetch_one(&mut *tx).await?;

        let mut select = QueryBuilder::<Sqlite>::new("SELECT ");
        select
            .push(ROSTER_COLUMNS)
            .push(" ")
            .push(ROSTER_FROM)
            .push(" WHERE 1 = 1");
        query.push_filters(&mut select, new_admission_cutoff);
        select
            .push(" ORDER BY ")
            .push(query.sort.order_by())
            .push(" LIMIT ")
            .push_bind(query.page.per_page())
            .push(" OFFSET ")
            .push_bind(query.page.offset());
        let rows: Vec<RosterRow> = select.build_query_as().fetch_all(&mut *tx).await?;

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let sets = IndicatorSets::load(&mut *tx, &ids, viewer_id, window_start).await?;
        tx.commit().await?;

        tracing::debug!(
            "dashboard page {} for user {}: {} of {} patients",
            query.page.page(),
            viewer_id,
            rows.len(),
            total_items
        );

        let page = Page {
            items: rows,
            request: query.page,
            total_items,
        }
        .map(|row| {
            let indicators = sets.for_patient(row.id);
            row.into_dashboard_patient(indicators)
        });

        Ok(PatientListRes {
            pagination: page.pagination(),
            patients: page.items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::Role;
    use crate::test_support::{memory_db, test_config, Seed};
    use chrono::Duration;

    fn params(unit: Option<&str>, status: Option<&str>, sort_by: Option<&str>, page: i64, limit: i64) -> PatientListQuery {
        PatientListQuery::from_params(&PatientListParams {
            unit: unit.map(Into::into),
            status: status.map(Into::into),
            sort_by: sort_by.map(Into::into),
            page: Some(page),
            limit: Some(limit),
        })
        .unwrap()
    }

    fn service(db: Database) -> DashboardService {
        DashboardService::new(db, Arc::new(test_config()))
    }

    fn mrns(res: &PatientListRes) -> Vec<&str> {
        res.patients.iter().map(|p| p.mrn.as_str()).collect()
    }

    #[test]
    fn query_validation() {
        let q = PatientListQuery::from_params(&PatientListParams::default()).unwrap();
        assert_eq!(q, PatientListQuery::default());

        let q = params(Some("  "), Some(""), Some("bogus"), 1, 20);
        assert_eq!(q.unit, None);
        assert_eq!(q.status, None);
        assert_eq!(q.sort, SortKey::NameAsc);

        for (page, limit) in [(0, 20), (1, 0), (-2, 5)] {
            let raw = PatientListParams {
                page: Some(page),
                limit: Some(limit),
                ..Default::default()
            };
            assert!(matches!(
                PatientListQuery::from_params(&raw),
                Err(MedicardError::InvalidInput(_))
            ));
        }

        let raw = PatientListParams {
            status: Some("discharged_today".into()),
            ..Default::default()
        };
        assert!(PatientListQuery::from_params(&raw).is_err());

        let raw = PatientListParams {
            limit: Some(1000),
            ..Default::default()
        };
        assert_eq!(PatientListQuery::from_params(&raw).unwrap().page.per_page(), 100);
    }

    #[tokio::test]
    async fn mrn_100_scenario() {
        let db = memory_db().await;
        let seed = Seed::new(db.clone());
        let now = Utc::now();
        // Ids are assigned in insertion order; user 7 is the seventh account.
        let mut viewer = None;
        for i in 1..=7 {
            viewer = Some(seed.user(&format!("user{i}"), Role::Doctor).await);
        }
        let viewer = viewer.unwrap();
        assert_eq!(viewer.id, 7);

        let patient = seed.patient("MRN-100", "Irakli", "Gelashvili", Some("ICU-4")).await;
        let admission = seed.admission(patient.id, now - Duration::days(3)).await;
        seed.result(admission.id, true, now - Duration::hours(2)).await;
        seed.order(admission.id, OrderStatus::PendingSignature, Some(7)).await;

        let res = service(db)
            .patient_list(7, &params(Some(""), None, None, 1, 20), now)
            .await
            .unwrap();

        assert_eq!(res.patients.len(), 1);
        let row = &res.patients[0];
        assert_eq!(row.mrn, "MRN-100");
        assert_eq!(row.name, "Irakli Gelashvili");
        assert_eq!(
            row.status_indicators,
            StatusIndicators {
                has_critical_lab: true,
                has_critical_imaging: false,
                has_unread_consult: false,
                has_pending_orders: true,
                has_abnormal_vitals: false,
            }
        );
    }

    #[tokio::test]
    async fn indicator_query_failure_fails_the_whole_page() {
        let db = memory_db().await;
        let seed = Seed::new(db.clone());
        let now = Utc::now();
        let patient = seed.patient("MRN-1", "A", "B", None).await;
        seed.admission(patient.id, now - Duration::days(1)).await;
        sqlx::query("DROP TABLE vital_signs")
            .execute(db.pool())
            .await
            .unwrap();

        let res = service(db)
            .patient_list(1, &PatientListQuery::default(), now)
            .await;
        assert!(res.is_err());
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty_with_totals() {
        let db = memory_db().await;
        let seed = Seed::new(db.clone());
        for i in 0..5 {
            seed.patient(&format!("MRN-{i}"), "P", &format!("Patient{i}"), None).await;
        }

        let res = service(db)
            .patient_list(1, &params(None, None, None, 2, 10), Utc::now())
            .await
            .unwrap();
        assert!(res.patients.is_empty());
        assert_eq!(res.pagination.total_items, 5);
        assert_eq!(res.pagination.total_pages, 1);
        assert_eq!(res.pagination.current_page, 2);
        assert_eq!(res.pagination.per_page, 10);
    }

    #[tokio::test]
    async fn empty_roster_has_zero_pages() {
        let res = service(memory_db().await)
            .patient_list(1, &PatientListQuery::default(), Utc::now())
            .await
            .unwrap();
        assert!(res.patients.is_empty());
        assert_eq!(res.pagination.total_items, 0);
        assert_eq!(res.pagination.total_pages, 0);
    }

    #[tokio::test]
    async fn new_admission_filter_uses_24_hour_cutoff() {
        let db = memory_db().await;
        let seed = Seed::new(db.clone());
        let now = Utc::now();
        let fresh = seed.patient("MRN-FRESH", "A", "Fresh", None).await;
        let stale = seed.patient("MRN-STALE", "B", "Stale", None).await;
        let both = seed.patient("MRN-BOTH", "C", "Both", None).await;
        seed.admission(fresh.id, now - Duration::hours(23)).await;
        seed.admission(stale.id, now - Duration::hours(25)).await;
        seed.admission(both.id, now - Duration::days(10)).await;
        seed.admission(both.id, now - Duration::hours(1)).await;
        seed.admission(both.id, now - Duration::hours(2)).await;

        let res = service(db)
            .patient_list(1, &params(None, Some("new_admission_24"), None, 1, 20), now)
            .await
            .unwrap();
        assert_eq!(mrns(&res), vec!["MRN-BOTH", "MRN-FRESH"]);
        assert_eq!(res.pagination.total_items, 2);
    }

    #[tokio::test]
    async fn pages_concatenate_to_the_full_filtered_set() {
        let db = memory_db().await;
        let seed = Seed::new(db.clone());
        // Duplicate names force the id tiebreak to matter.
        for i in 0..23 {
            let last = format!("Name{}", i % 4);
            let bed = format!("{}-{i}", if i % 3 == 0 { "ICU" } else { "WARD" });
            seed.patient(&format!("MRN-{i:02}"), "Same", &last, Some(bed.as_str()))
                .await;
        }
        let svc = service(db);
        let now = Utc::now();

        for unit in [None, Some("icu")] {
            let full = svc
                .patient_list(1, &params(unit, None, None, 1, 100), now)
                .await
                .unwrap();
            for per_page in [1, 4, 7, 23, 100] {
                let mut seen = Vec::new();
                let mut page = 1;
                loop {
                    let res = svc
                        .patient_list(1, &params(unit, None, None, page, per_page), now)
                        .await
                        .unwrap();
                    if res.patients.is_empty() {
                        break;
                    }
                    assert_eq!(res.pagination.total_items, full.pagination.total_items);
                    seen.extend(res.patients.into_iter().map(|p| p.id));
                    page += 1;
                }
                let expected: Vec<i64> = full.patients.iter().map(|p| p.id).collect();
                assert_eq!(seen, expected, "per_page={per_page} unit={unit:?}");
            }
        }
    }

    #[tokio::test]
    async fn sort_orders() {
        let db = memory_db().await;
        let seed = Seed::new(db.clone());
        seed.patient("MRN-1", "Zurab", "Abuladze", Some("B-2")).await;
        seed.patient("MRN-2", "Ana", "Abuladze", Some("A-9")).await;
        seed.patient("MRN-3", "Lika", "Tsereteli", None).await;
        seed.patient("MRN-4", "Dato", "Kobakhidze", Some("A-1")).await;
        let svc = service(db);
        let now = Utc::now();

        let by_name = svc
            .patient_list(1, &params(None, None, Some("name_asc"), 1, 20), now)
            .await
            .unwrap();
        assert_eq!(mrns(&by_name), vec!["MRN-2", "MRN-1", "MRN-4", "MRN-3"]);

        let fallback = svc
            .patient_list(1, &params(None, None, Some("age_desc"), 1, 20), now)
            .await
            .unwrap();
        assert_eq!(mrns(&fallback), mrns(&by_name));

        let by_location = svc
            .patient_list(1, &params(None, None, Some("location_asc"), 1, 20), now)
            .await
            .unwrap();
        assert_eq!(mrns(&by_location), vec!["MRN-4", "MRN-2", "MRN-1", "MRN-3"]);
    }

    #[tokio::test]
    async fn unit_filter_is_case_insensitive_substring() {
        let db = memory_db().await;
        let seed = Seed::new(db.clone());
        seed.patient("MRN-1", "A", "A", Some("Cardiology-3B")).await;
        seed.patient("MRN-2", "B", "B", Some("ICU-1")).await;
        seed.patient("MRN-3", "C", "C", None).await;

        let res = service(db)
            .patient_list(1, &params(Some("CARDIO"), None, None, 1, 20), Utc::now())
            .await
            .unwrap();
        assert_eq!(mrns(&res), vec!["MRN-1"]);
    }

    #[tokio::test]
    async fn acknowledging_clears_critical_lab() {
        let db = memory_db().await;
        let seed = Seed::new(db.clone());
        let lab = seed.user("lab", Role::LabTech).await;
        let patient = seed.patient("MRN-1", "A", "A", None).await;
        let admission = seed.admission(patient.id, Utc::now()).await;
        let result = seed.result(admission.id, true, Utc::now() - Duration::hours(1)).await;
        let svc = service(db.clone());

        let before = svc
            .patient_list(lab.id, &PatientListQuery::default(), Utc::now())
            .await
            .unwrap();
        assert!(before.patients[0].status_indicators.has_critical_lab);

        crate::repositories::ResultService::new(db)
            .acknowledge(result.id, lab.id, Utc::now())
            .await
            .unwrap();

        let after = svc
            .patient_list(lab.id, &PatientListQuery::default(), Utc::now())
            .await
            .unwrap();
        assert!(!after.patients[0].status_indicators.has_critical_lab);
    }

    #[tokio::test]
    async fn time_window_is_strict_and_applies_to_labs_imaging_and_vitals() {
        let db = memory_db().await;
        let seed = Seed::new(db.clone());
        let now = Utc::now();
        let window = Duration::hours(48);

        let inside = seed.patient("MRN-IN", "A", "Inside", None).await;
        let edge = seed.patient("MRN-EDGE", "B", "Edge", None).await;
        let adm_in = seed.admission(inside.id, now - Duration::days(5)).await;
        let adm_edge = seed.admission(edge.id, now - Duration::days(5)).await;

        let just_inside = now - window + Duration::seconds(1);
        seed.result(adm_in.id, true, just_inside).await;
        seed.imaging(adm_in.id, true, just_inside).await;
        seed.vital(adm_in.id, just_inside, Some(130)).await;

        let boundary = now - window;
        seed.result(adm_edge.id, true, boundary).await;
        seed.imaging(adm_edge.id, true, boundary).await;
        seed.vital(adm_edge.id, boundary, Some(130)).await;

        let res = service(db)
            .patient_list(1, &PatientListQuery::default(), now)
            .await
            .unwrap();
        let by_mrn = |mrn: &str| {
            res.patients
                .iter()
                .find(|p| p.mrn == mrn)
                .map(|p| p.status_indicators)
                .unwrap()
        };

        let flags = by_mrn("MRN-IN");
        assert!(flags.has_critical_lab && flags.has_critical_imaging && flags.has_abnormal_vitals);
        assert_eq!(by_mrn("MRN-EDGE"), StatusIndicators::default());
    }

    #[tokio::test]
    async fn non_critical_and_normal_records_do_not_flag() {
        let db = memory_db().await;
        let seed = Seed::new(db.clone());
        let now = Utc::now();
        let patient = seed.patient("MRN-1", "A", "A", None).await;
        let admission = seed.admission(patient.id, now).await;
        seed.result(admission.id, false, now).await;
        seed.imaging(admission.id, false, now).await;
        seed.vital(admission.id, now, Some(80)).await;
        seed.vital(admission.id, now, None).await;

        let res = service(db)
            .patient_list(1, &PatientListQuery::default(), now)
            .await
            .unwrap();
        assert_eq!(res.patients[0].status_indicators, StatusIndicators::default());
    }

    #[tokio::test]
    async fn consult_and_order_flags_depend_on_the_viewer() {
        let db = memory_db().await;
        let seed = Seed::new(db.clone());
        let first = seed.user("first", Role::Doctor).await;
        let second = seed.user("second", Role::Doctor).await;
        let patient = seed.patient("MRN-1", "A", "A", None).await;
        let admission = seed.admission(patient.id, Utc::now()).await;
        seed.consult(admission.id, Some(first.id), ConsultStatus::Completed).await;
        seed.consult(admission.id, Some(second.id), ConsultStatus::Pending).await;
        seed.order(admission.id, OrderStatus::PendingSignature, Some(second.id)).await;
        seed.order(admission.id, OrderStatus::Pending, Some(first.id)).await;
        let svc = service(db);

        let for_first = svc
            .patient_list(first.id, &PatientListQuery::default(), Utc::now())
            .await
            .unwrap();
        let flags = for_first.patients[0].status_indicators;
        assert!(flags.has_unread_consult);
        assert!(!flags.has_pending_orders);

        let for_second = svc
            .patient_list(second.id, &PatientListQuery::default(), Utc::now())
            .await
            .unwrap();
        let flags = for_second.patients[0].status_indicators;
        assert!(!flags.has_unread_consult);
        assert!(flags.has_pending_orders);
    }

    #[tokio::test]
    async fn read_consult_no_longer_flags() {
        let db = memory_db().await;
        let seed = Seed::new(db.clone());
        let doc = seed.user("doc", Role::Doctor).await;
        let patient = seed.patient("MRN-1", "A", "A", None).await;
        let admission = seed.admission(patient.id, Utc::now()).await;
        let consult = seed
            .consult(admission.id, Some(doc.id), ConsultStatus::Completed)
            .await;

        crate::repositories::ConsultService::new(db.clone())
            .mark_read(consult.id, doc.id, Utc::now())
            .await
            .unwrap();

        let res = service(db)
            .patient_list(doc.id, &PatientListQuery::default(), Utc::now())
            .await
            .unwrap();
        assert!(!res.patients[0].status_indicators.has_unread_consult);
    }

    #[tokio::test]
    async fn indicators_resolve_through_every_admission_without_duplicate_rows() {
        let db = memory_db().await;
        let seed = Seed::new(db.clone());
        let now = Utc::now();
        let patient = seed.patient("MRN-1", "A", "A", None).await;
        let other = seed.patient("MRN-2", "B", "B", None).await;
        let old = seed.admission(patient.id, now - Duration::days(30)).await;
        let current = seed.admission(patient.id, now - Duration::hours(2)).await;
        seed.admission(other.id, now - Duration::hours(3)).await;
        seed.result(old.id, true, now - Duration::hours(1)).await;
        seed.result(current.id, true, now - Duration::hours(1)).await;
        seed.vital(current.id, now, Some(40)).await;

        let res = service(db)
            .patient_list(1, &params(None, Some("new_admission_24"), None, 1, 20), now)
            .await
            .unwrap();
        assert_eq!(mrns(&res), vec!["MRN-1", "MRN-2"]);
        let flags = res.patients[0].status_indicators;
        assert!(flags.has_critical_lab && flags.has_abnormal_vitals);
        assert_eq!(res.patients[1].status_indicators, StatusIndicators::default());
    }

    #[tokio::test]
    async fn attending_name_is_resolved() {
        let db = memory_db().await;
        let seed = Seed::new(db.clone());
        let doc = seed.user("dr.chikovani", Role::Doctor).await;
        let mut body = crate::test_support::new_patient("MRN-1", "A", "A");
        body.attending_id = Some(doc.id);
        crate::repositories::PatientService::new(db.clone())
            .create(body)
            .await
            .unwrap();
        seed.patient("MRN-2", "B", "B", None).await;

        let res = service(db)
            .patient_list(doc.id, &PatientListQuery::default(), Utc::now())
            .await
            .unwrap();
        assert_eq!(res.patients[0].attending_name.as_deref(), Some("dr.chikovani"));
        assert_eq!(res.patients[1].attending_name, None);
    }

    #[tokio::test]
    async fn configured_window_is_honoured() {
        let db = memory_db().await;
        let seed = Seed::new(db.clone());
        let now = Utc::now();
        let patient = seed.patient("MRN-1", "A", "A", None).await;
        let admission = seed.admission(patient.id, now - Duration::days(2)).await;
        seed.result(admission.id, true, now - Duration::hours(10)).await;

        let cfg = CoreConfig::new(
            "test-secret-key-0123456789".into(),
            Duration::hours(1),
            Duration::hours(6),
        )
        .unwrap();
        let res = DashboardService::new(db, Arc::new(cfg))
            .patient_list(1, &PatientListQuery::default(), now)
            .await
            .unwrap();
        assert!(!res.patients[0].status_indicators.has_critical_lab);
    }
}
