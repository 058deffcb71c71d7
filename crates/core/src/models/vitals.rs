//! Vital-sign observations and the fixed thresholds that make one "abnormal".
//!
//! The same [`ABNORMAL_VITALS`] value drives both the per-row `is_abnormal` flag returned by
//! the vitals endpoints and the SQL predicate used by the dashboard indicator, so the two can
//! never disagree.

use crate::{MedicardError, MedicardResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, FromRow)]
pub struct VitalSign {
    pub id: i64,
    pub admission_id: i64,
    pub recorded_by_id: Option<i64>,
    pub recorded_at: DateTime<Utc>,
    pub heart_rate: Option<i64>,
    pub systolic_bp: Option<i64>,
    pub diastolic_bp: Option<i64>,
    pub respiratory_rate: Option<i64>,
    pub temperature: Option<f64>,
    pub oxygen_saturation: Option<f64>,
    pub pain_score: Option<i64>,
    pub blood_glucose: Option<f64>,
    pub notes: Option<String>,
}

/// A vital-sign row as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct VitalSignView {
    #[serde(flatten)]
    pub vital: VitalSign,
    pub is_abnormal: bool,
}

impl From<VitalSign> for VitalSignView {
    fn from(vital: VitalSign) -> Self {
        let is_abnormal = ABNORMAL_VITALS.is_abnormal(&vital);
        Self { vital, is_abnormal }
    }
}

/// Body of `POST /api/admissions/{id}/vitals`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct NewVitalSign {
    #[serde(default)]
    pub recorded_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub heart_rate: Option<i64>,
    #[serde(default)]
    pub systolic_bp: Option<i64>,
    #[serde(default)]
    pub diastolic_bp: Option<i64>,
    #[serde(default)]
    pub respiratory_rate: Option<i64>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub oxygen_saturation: Option<f64>,
    #[serde(default)]
    pub pain_score: Option<i64>,
    #[serde(default)]
    pub blood_glucose: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewVitalSign {
    /// Reject bodies with no measurement at all, negative measurements, or a pain score
    /// outside 0..=10.
    pub fn validate(&self) -> MedicardResult<()> {
        let integers = [
            ("heart_rate", self.heart_rate),
            ("systolic_bp", self.systolic_bp),
            ("diastolic_bp", self.diastolic_bp),
            ("respiratory_rate", self.respiratory_rate),
            ("pain_score", self.pain_score),
        ];
        let reals = [
            ("temperature", self.temperature),
            ("oxygen_saturation", self.oxygen_saturation),
            ("blood_glucose", self.blood_glucose),
        ];

        if integers.iter().all(|(_, v)| v.is_none()) && reals.iter().all(|(_, v)| v.is_none()) {
            return Err(MedicardError::InvalidInput(
                "at least one measurement is required".into(),
            ));
        }
        for (name, value) in integers {
            if value.is_some_and(|v| v < 0) {
                return Err(MedicardError::InvalidInput(format!("{name} must not be negative")));
            }
        }
        for (name, value) in reals {
            if value.is_some_and(|v| !v.is_finite() || v < 0.0) {
                return Err(MedicardError::InvalidInput(format!(
                    "{name} must be a non-negative number"
                )));
            }
        }
        if self.pain_score.is_some_and(|v| v > 10) {
            return Err(MedicardError::InvalidInput(
                "pain_score must be between 0 and 10".into(),
            ));
        }
        if self.oxygen_saturation.is_some_and(|v| v > 100.0) {
            return Err(MedicardError::InvalidInput(
                "oxygen_saturation must be a percentage".into(),
            ));
        }
        Ok(())
    }
}

/// Physiological limits outside which a measurement counts as abnormal. All bounds are strict.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VitalThresholds {
    pub heart_rate_high: i64,
    pub heart_rate_low: i64,
    pub systolic_high: i64,
    pub systolic_low: i64,
    pub spo2_low: f64,
    pub temperature_high: f64,
    pub respiratory_rate_high: i64,
}

pub const ABNORMAL_VITALS: VitalThresholds = VitalThresholds {
    heart_rate_high: 120,
    heart_rate_low: 50,
    systolic_high: 180,
    systolic_low: 90,
    spo2_low: 92.0,
    temperature_high: 38.5,
    respiratory_rate_high: 24,
};

impl VitalThresholds {
    /// Missing measurements never make a row abnormal.
    pub fn is_abnormal(&self, v: &VitalSign) -> bool {
        v.heart_rate
            .is_some_and(|hr| hr > self.heart_rate_high || hr < self.heart_rate_low)
            || v.systolic_bp
                .is_some_and(|sbp| sbp > self.systolic_high || sbp < self.systolic_low)
            || v.oxygen_saturation.is_some_and(|spo2| spo2 < self.spo2_low)
            || v.temperature.is_some_and(|t| t > self.temperature_high)
            || v.respiratory_rate
                .is_some_and(|rr| rr > self.respiratory_rate_high)
    }

    /// The same test as [`Self::is_abnormal`] as a SQL boolean expression over the
    /// `vital_signs` columns of `alias`. Comparisons against NULL are never true, matching the
    /// Rust side.
    pub fn sql_predicate(&self, alias: &str) -> String {
        format!(
            "({a}.heart_rate > {hr_hi} OR {a}.heart_rate < {hr_lo} \
             OR {a}.systolic_bp > {sbp_hi} OR {a}.systolic_bp < {sbp_lo} \
             OR {a}.oxygen_saturation < {spo2:.1} \
             OR {a}.temperature > {temp:.1} \
             OR {a}.respiratory_rate > {rr})",
            a = alias,
            hr_hi = self.heart_rate_high,
            hr_lo = self.heart_rate_low,
            sbp_hi = self.systolic_high,
            sbp_lo = self.systolic_low,
            spo2 = self.spo2_low,
            temp = self.temperature_high,
            rr = self.respiratory_rate_high,
        )
    }
}
