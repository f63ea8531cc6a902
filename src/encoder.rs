//! Report encoding
//!
//! Wraps a client assessment in a report envelope carrying producer
//! metadata and the computation timestamp, and serializes it to JSON.

use crate::error::{EngineError, Result};
use crate::types::{AssessmentReport, ClientAssessment, ReportProducer};
use crate::{ENGINE_VERSION, PRODUCER_NAME};
use chrono::Utc;
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Encoder for assessment reports
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Wrap an assessment in a report envelope
    pub fn encode(&self, assessment: ClientAssessment) -> AssessmentReport {
        let computed_at = Utc::now();
        tracing::trace!(instance_id = %self.instance_id, "encoding assessment report");

        AssessmentReport {
            report_version: REPORT_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: ENGINE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: computed_at.to_rfc3339(),
            assessment,
        }
    }

    /// Encode to a pretty-printed JSON string
    pub fn encode_to_json(&self, assessment: ClientAssessment) -> Result<String> {
        let report = self.encode(assessment);
        serde_json::to_string_pretty(&report).map_err(EngineError::JsonError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        BmiCategory, HealthMetrics, IdealRanges, MacroGrams, MacroPlan, MacroSplit, TrendResult,
    };
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn sample_assessment() -> ClientAssessment {
        ClientAssessment {
            measured_on: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            metrics: HealthMetrics {
                bmr: 1695.7,
                tdee: 2628.3,
                bmi: 22.9,
                bmi_category: BmiCategory::Normal,
                target_calories: 2102.6,
            },
            ideal_ranges: IdealRanges::new(),
            classifications: BTreeMap::new(),
            trend: TrendResult::InsufficientData { measurements: 1 },
            macro_plan: MacroPlan {
                split: MacroSplit::default(),
                grams: MacroGrams {
                    protein_g: 157.7,
                    carbs_g: 210.3,
                    fat_g: 70.1,
                },
            },
        }
    }

    #[test]
    fn test_encode_envelope() {
        let encoder = ReportEncoder::with_instance_id("test-instance".to_string());
        let report = encoder.encode(sample_assessment());

        assert_eq!(report.report_version, REPORT_VERSION);
        assert_eq!(report.producer.name, PRODUCER_NAME);
        assert_eq!(report.producer.version, ENGINE_VERSION);
        assert_eq!(report.producer.instance_id, "test-instance");
        assert!(chrono::DateTime::parse_from_rfc3339(&report.computed_at_utc).is_ok());
    }

    #[test]
    fn test_encode_to_json_shape() {
        let json = ReportEncoder::new()
            .encode_to_json(sample_assessment())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["assessment"]["measuredOn"], "2024-01-15");
        assert_eq!(value["assessment"]["metrics"]["bmiCategory"], "normal");
        assert_eq!(value["assessment"]["trend"]["status"], "insufficient_data");
        assert_eq!(value["assessment"]["macroPlan"]["split"]["protein"], 30);
    }

    #[test]
    fn test_unique_instance_ids() {
        assert_ne!(
            ReportEncoder::new().instance_id(),
            ReportEncoder::new().instance_id()
        );
    }
}
