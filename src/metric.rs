//! Metric identifiers and their classification tags
//!
//! Every tracked body metric carries an explicit definition: how its ideal
//! range is bounded and which direction of change counts as an improvement.
//! Behavior is selected from these tags, never from display names.

use serde::{Deserialize, Serialize};

/// A tracked body metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    Weight,
    Bmi,
    BodyFatPercentage,
    WaistCircumference,
    HipCircumference,
    ChestCircumference,
    ArmCircumference,
    ThighCircumference,
    CalfCircumference,
}

/// How a metric's ideal interval is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Values below `min` are low, above `max` are high
    TwoSided,
    /// Only values above `max` are flagged
    UpperBound,
}

/// Which direction of change counts as progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    LowerIsBetter,
    /// Direction carries no verdict (girth measurements other than waist)
    Neutral,
}

/// Where a metric's ideal range comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeSource {
    /// Fixed reference interval
    Static,
    /// Depends on the client's gender
    Gender,
    /// Derived from the client's height
    Height,
    /// Band around the client's own historical mean
    History,
}

/// Static description of a metric
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricDefinition {
    pub metric: Metric,
    pub label: &'static str,
    pub unit: &'static str,
    pub kind: MetricKind,
    pub polarity: Polarity,
    pub range_source: RangeSource,
}

impl Metric {
    /// All tracked metrics in display order
    pub const ALL: [Metric; 9] = [
        Metric::Weight,
        Metric::Bmi,
        Metric::BodyFatPercentage,
        Metric::WaistCircumference,
        Metric::HipCircumference,
        Metric::ChestCircumference,
        Metric::ArmCircumference,
        Metric::ThighCircumference,
        Metric::CalfCircumference,
    ];

    /// Stable identifier used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Weight => "weight",
            Metric::Bmi => "bmi",
            Metric::BodyFatPercentage => "bodyFatPercentage",
            Metric::WaistCircumference => "waistCircumference",
            Metric::HipCircumference => "hipCircumference",
            Metric::ChestCircumference => "chestCircumference",
            Metric::ArmCircumference => "armCircumference",
            Metric::ThighCircumference => "thighCircumference",
            Metric::CalfCircumference => "calfCircumference",
        }
    }

    pub fn definition(&self) -> MetricDefinition {
        let (label, unit, kind, polarity, range_source) = match self {
            Metric::Weight => (
                "Weight",
                "kg",
                MetricKind::TwoSided,
                Polarity::LowerIsBetter,
                RangeSource::Height,
            ),
            Metric::Bmi => (
                "BMI",
                "kg/m²",
                MetricKind::TwoSided,
                Polarity::LowerIsBetter,
                RangeSource::Static,
            ),
            Metric::BodyFatPercentage => (
                "Body fat",
                "%",
                MetricKind::TwoSided,
                Polarity::LowerIsBetter,
                RangeSource::Gender,
            ),
            Metric::WaistCircumference => (
                "Waist",
                "cm",
                MetricKind::UpperBound,
                Polarity::LowerIsBetter,
                RangeSource::Gender,
            ),
            Metric::HipCircumference => (
                "Hip",
                "cm",
                MetricKind::UpperBound,
                Polarity::Neutral,
                RangeSource::History,
            ),
            Metric::ChestCircumference => (
                "Chest",
                "cm",
                MetricKind::UpperBound,
                Polarity::Neutral,
                RangeSource::History,
            ),
            Metric::ArmCircumference => (
                "Arm",
                "cm",
                MetricKind::UpperBound,
                Polarity::Neutral,
                RangeSource::History,
            ),
            Metric::ThighCircumference => (
                "Thigh",
                "cm",
                MetricKind::UpperBound,
                Polarity::Neutral,
                RangeSource::History,
            ),
            Metric::CalfCircumference => (
                "Calf",
                "cm",
                MetricKind::UpperBound,
                Polarity::Neutral,
                RangeSource::History,
            ),
        };

        MetricDefinition {
            metric: *self,
            label,
            unit,
            kind,
            polarity,
            range_source,
        }
    }

    pub fn kind(&self) -> MetricKind {
        self.definition().kind
    }

    pub fn polarity(&self) -> Polarity {
        self.definition().polarity
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circumferences_are_upper_bound() {
        for metric in Metric::ALL {
            let is_girth = metric.as_str().ends_with("Circumference");
            assert_eq!(
                metric.kind() == MetricKind::UpperBound,
                is_girth,
                "unexpected kind for {metric}"
            );
        }
    }

    #[test]
    fn test_lower_is_better_metrics() {
        let lower: Vec<Metric> = Metric::ALL
            .into_iter()
            .filter(|m| m.polarity() == Polarity::LowerIsBetter)
            .collect();
        assert_eq!(
            lower,
            vec![
                Metric::Weight,
                Metric::Bmi,
                Metric::BodyFatPercentage,
                Metric::WaistCircumference
            ]
        );
    }

    #[test]
    fn test_serde_identifier_matches_as_str() {
        for metric in Metric::ALL {
            let json = serde_json::to_string(&metric).unwrap();
            assert_eq!(json, format!("\"{}\"", metric.as_str()));
        }
    }
}
