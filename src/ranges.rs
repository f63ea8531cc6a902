//! Ideal range computation and classification
//!
//! Each metric's ideal interval comes from one of four sources:
//! - a fixed reference (BMI)
//! - the client's gender (body fat, waist)
//! - the client's height (weight, from the healthy BMI interval)
//! - the client's own history (other girth metrics, ±10% of the mean)

use crate::config::{EngineConfig, RangeConfig};
use crate::metric::{Metric, MetricKind, RangeSource};
use crate::types::{Classification, Gender, IdealRange, IdealRanges, Measurement};
use std::collections::BTreeMap;

/// Classifier for ideal ranges against a client's measurement history
#[derive(Debug, Clone, Default)]
pub struct RangeClassifier {
    config: RangeConfig,
}

impl RangeClassifier {
    pub fn new(config: RangeConfig) -> Self {
        Self { config }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.ranges.clone())
    }

    /// Ideal range for a single metric.
    ///
    /// `history` must be ordered newest first; the latest entry supplies
    /// the height for the weight range. Returns `None` when no range can
    /// be defined.
    pub fn ideal_range(
        &self,
        metric: Metric,
        gender: Gender,
        history: &[Measurement],
    ) -> Option<IdealRange> {
        match metric.definition().range_source {
            RangeSource::Static => Some(IdealRange::between(
                self.config.bmi.min,
                self.config.bmi.max,
            )),
            RangeSource::Gender => match metric {
                Metric::WaistCircumference => {
                    Some(IdealRange::at_most(self.config.waist_max(gender)))
                }
                _ => {
                    let bounds = self.config.body_fat(gender);
                    Some(IdealRange::between(bounds.min, bounds.max))
                }
            },
            RangeSource::Height => history
                .first()
                .map(|latest| self.weight_range(latest.height())),
            RangeSource::History => self.history_range(metric, history),
        }
    }

    /// Ideal ranges for every metric that has one
    pub fn ideal_ranges(&self, gender: Gender, history: &[Measurement]) -> IdealRanges {
        Metric::ALL
            .iter()
            .filter_map(|metric| {
                self.ideal_range(*metric, gender, history)
                    .map(|range| (*metric, range))
            })
            .collect()
    }

    /// Healthy weight interval for a height, in whole kilograms
    pub fn weight_range(&self, height_cm: f64) -> IdealRange {
        let height_m = height_cm / 100.0;
        let squared = height_m * height_m;
        IdealRange::between(
            (self.config.bmi.min * squared).round(),
            (self.config.bmi.max * squared).round(),
        )
    }

    /// Band around the historical mean of a metric
    fn history_range(&self, metric: Metric, history: &[Measurement]) -> Option<IdealRange> {
        let avg = average(history.iter().filter_map(|m| m.value(metric)))?;
        let band = self.config.history_band;
        Some(IdealRange::between(
            (avg * band.min).round(),
            (avg * band.max).round(),
        ))
    }

    /// Classify every metric present on the latest measurement
    pub fn classify_latest(
        &self,
        gender: Gender,
        history: &[Measurement],
    ) -> BTreeMap<Metric, Classification> {
        let Some(latest) = history.first() else {
            return BTreeMap::new();
        };
        let ranges = self.ideal_ranges(gender, history);

        Metric::ALL
            .iter()
            .filter_map(|metric| {
                latest.value(*metric).map(|value| {
                    (
                        *metric,
                        classify(value, ranges.get(metric), metric.kind()),
                    )
                })
            })
            .collect()
    }
}

/// Classify a value against an optional ideal range
pub fn classify(value: f64, range: Option<&IdealRange>, kind: MetricKind) -> Classification {
    let Some(range) = range else {
        return Classification::Normal;
    };

    if matches!(range.max, Some(max) if value > max) {
        return Classification::High;
    }

    match kind {
        MetricKind::TwoSided if matches!(range.min, Some(min) if value < min) => {
            Classification::Low
        }
        _ => Classification::Ideal,
    }
}

/// Mean of a sequence, `None` when empty
fn average(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        return None;
    }
    Some(sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MeasurementExtras;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn measurement(day: u32, weight: f64, height: f64, extras: MeasurementExtras) -> Measurement {
        Measurement::new(
            NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
            weight,
            height,
            extras,
        )
        .unwrap()
    }

    fn with_hip(hip: f64) -> MeasurementExtras {
        MeasurementExtras {
            hip_circumference: Some(hip),
            ..Default::default()
        }
    }

    #[test]
    fn test_weight_range_from_height() {
        let range = RangeClassifier::default().weight_range(170.0);
        assert_eq!(range, IdealRange::between(53.0, 72.0));
    }

    #[test]
    fn test_static_and_gendered_ranges() {
        let classifier = RangeClassifier::default();
        let history = vec![measurement(1, 70.0, 170.0, MeasurementExtras::default())];

        assert_eq!(
            classifier.ideal_range(Metric::Bmi, Gender::Male, &history),
            Some(IdealRange::between(18.5, 24.9))
        );
        assert_eq!(
            classifier.ideal_range(Metric::BodyFatPercentage, Gender::Male, &history),
            Some(IdealRange::between(10.0, 20.0))
        );
        assert_eq!(
            classifier.ideal_range(Metric::BodyFatPercentage, Gender::Female, &history),
            Some(IdealRange::between(18.0, 28.0))
        );
        assert_eq!(
            classifier.ideal_range(Metric::WaistCircumference, Gender::Male, &history),
            Some(IdealRange::at_most(94.0))
        );
        assert_eq!(
            classifier.ideal_range(Metric::WaistCircumference, Gender::Female, &history),
            Some(IdealRange::at_most(80.0))
        );
    }

    #[test]
    fn test_history_range_uses_mean_of_all_entries() {
        let classifier = RangeClassifier::default();
        let history = vec![
            measurement(3, 70.0, 170.0, with_hip(100.0)),
            measurement(2, 70.0, 170.0, MeasurementExtras::default()),
            measurement(1, 70.0, 170.0, with_hip(96.0)),
        ];

        // mean 98 -> [88.2, 107.8] rounded
        assert_eq!(
            classifier.ideal_range(Metric::HipCircumference, Gender::Female, &history),
            Some(IdealRange::between(88.0, 108.0))
        );
        assert_eq!(
            classifier.ideal_range(Metric::CalfCircumference, Gender::Female, &history),
            None
        );
    }

    #[test]
    fn test_no_history_means_no_derived_ranges() {
        let ranges = RangeClassifier::default().ideal_ranges(Gender::Male, &[]);
        assert!(!ranges.contains_key(&Metric::Weight));
        assert!(!ranges.contains_key(&Metric::HipCircumference));
        assert!(ranges.contains_key(&Metric::Bmi));
    }

    #[test]
    fn test_classify_two_sided() {
        let range = IdealRange::between(18.5, 24.9);
        assert_eq!(classify(17.0, Some(&range), MetricKind::TwoSided), Classification::Low);
        assert_eq!(classify(18.5, Some(&range), MetricKind::TwoSided), Classification::Ideal);
        assert_eq!(classify(24.9, Some(&range), MetricKind::TwoSided), Classification::Ideal);
        assert_eq!(classify(26.0, Some(&range), MetricKind::TwoSided), Classification::High);
    }

    #[test]
    fn test_classify_upper_bound_never_low() {
        let waist = IdealRange::at_most(80.0);
        assert_eq!(classify(85.0, Some(&waist), MetricKind::UpperBound), Classification::High);
        assert_eq!(classify(60.0, Some(&waist), MetricKind::UpperBound), Classification::Ideal);

        let hip = IdealRange::between(88.0, 108.0);
        assert_eq!(classify(50.0, Some(&hip), MetricKind::UpperBound), Classification::Ideal);
        assert_eq!(classify(110.0, Some(&hip), MetricKind::UpperBound), Classification::High);
    }

    #[test]
    fn test_classify_without_range() {
        assert_eq!(classify(42.0, None, MetricKind::TwoSided), Classification::Normal);
        assert_eq!(classify(42.0, None, MetricKind::UpperBound), Classification::Normal);
    }

    #[test]
    fn test_classify_latest() {
        let classifier = RangeClassifier::default();
        let latest = MeasurementExtras {
            body_fat_percentage: Some(31.0),
            waist_circumference: Some(78.0),
            ..Default::default()
        };
        let history = vec![
            measurement(2, 80.0, 170.0, latest),
            measurement(1, 82.0, 170.0, MeasurementExtras::default()),
        ];

        let result = classifier.classify_latest(Gender::Female, &history);
        assert_eq!(result[&Metric::Weight], Classification::High);
        assert_eq!(result[&Metric::Bmi], Classification::High);
        assert_eq!(result[&Metric::BodyFatPercentage], Classification::High);
        assert_eq!(result[&Metric::WaistCircumference], Classification::Ideal);
        assert!(!result.contains_key(&Metric::HipCircumference));
    }
}
