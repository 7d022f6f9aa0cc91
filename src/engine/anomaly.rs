use chrono::NaiveDate;
use serde::Serialize;
use strum_macros::Display;
use utoipa::ToSchema;

use super::scoring::round1;
use crate::config::EngineConfig;
use crate::model::WorkerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Display, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Notable,
    Significant,
    Critical,
}

#[derive(Debug, Clone, Copy)]
pub struct AnomalyThresholds {
    pub notable: f64,
    pub significant: f64,
    pub critical: f64,
    pub min_history: usize,
}

impl AnomalyThresholds {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            notable: config.anomaly_notable_drop,
            significant: config.anomaly_significant_drop,
            critical: config.anomaly_critical_drop,
            min_history: config.anomaly_min_history,
        }
    }

    pub fn classify_drop(&self, drop: f64) -> Option<Severity> {
        if drop >= self.critical {
            Some(Severity::Critical)
        } else if drop >= self.significant {
            Some(Severity::Significant)
        } else if drop >= self.notable {
            Some(Severity::Notable)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Anomaly {
    pub worker_id: WorkerId,
    #[schema(example = "2025-01-13", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = 50.0)]
    pub today_score: f64,
    #[schema(example = 82.0)]
    pub baseline_mean: f64,
    #[schema(example = 32.0)]
    pub drop: f64,
    pub severity: Severity,
    /// Number of historical check-ins behind the baseline.
    pub sample_size: usize,
}

/// Compares one worker's score on `date` to the mean of their prior scores.
/// Too little history never flags.
pub fn evaluate_worker(
    worker_id: WorkerId,
    date: NaiveDate,
    today_score: f64,
    history: &[f64],
    thresholds: &AnomalyThresholds,
) -> Option<Anomaly> {
    if history.len() < thresholds.min_history {
        tracing::debug!(worker_id, samples = history.len(), "baseline too small, skipping");
        return None;
    }
    let baseline = history.iter().sum::<f64>() / history.len() as f64;
    let drop = baseline - today_score;
    let severity = thresholds.classify_drop(drop)?;

    Some(Anomaly {
        worker_id,
        date,
        today_score,
        baseline_mean: round1(baseline),
        drop: round1(drop),
        severity,
        sample_size: history.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> AnomalyThresholds {
        AnomalyThresholds::from_config(&EngineConfig::default())
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 13).unwrap()
    }

    #[test]
    fn severity_tiers() {
        let t = thresholds();
        assert_eq!(t.classify_drop(9.9), None);
        assert_eq!(t.classify_drop(10.0), Some(Severity::Notable));
        assert_eq!(t.classify_drop(20.0), Some(Severity::Significant));
        assert_eq!(t.classify_drop(29.9), Some(Severity::Significant));
        assert_eq!(t.classify_drop(30.0), Some(Severity::Critical));
        assert_eq!(t.classify_drop(-15.0), None);
    }

    #[test]
    fn drop_of_thirty_two_is_critical() {
        let history = [80.0, 84.0, 82.0, 81.0, 83.0, 82.0, 82.0];
        let anomaly = evaluate_worker(5, today(), 50.0, &history, &thresholds()).unwrap();
        assert_eq!(anomaly.baseline_mean, 82.0);
        assert_eq!(anomaly.drop, 32.0);
        assert_eq!(anomaly.severity, Severity::Critical);
        assert_eq!(anomaly.sample_size, 7);
    }

    #[test]
    fn short_history_is_never_flagged() {
        assert_eq!(evaluate_worker(5, today(), 10.0, &[90.0, 95.0], &thresholds()), None);
        assert!(evaluate_worker(5, today(), 10.0, &[90.0, 95.0, 92.0], &thresholds()).is_some());
    }

    #[test]
    fn improvement_is_not_an_anomaly() {
        assert_eq!(evaluate_worker(5, today(), 95.0, &[60.0, 62.0, 64.0], &thresholds()), None);
    }
}
