//! Assessment orchestration
//!
//! This module provides the public entry points that sequence the four
//! compute components for one client: metrics from the latest measurement,
//! ideal ranges and classifications from the history, the trend between
//! the last two measurements, and the macro plan for the calorie target.

use serde::{Deserialize, Serialize};

use crate::calculator::MetricCalculator;
use crate::config::EngineConfig;
use crate::encoder::ReportEncoder;
use crate::error::{EngineError, Result};
use crate::macros::MacroAllocator;
use crate::normalizer::{Normalizer, RawMeasurement, RawProfile};
use crate::ranges::RangeClassifier;
use crate::trend::TrendAnalyzer;
use crate::types::{ClientAssessment, Macro, MacroPlan, MacroSplit, Measurement, PersonProfile};

/// A pending single-field macro edit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroEdit {
    pub field: Macro,
    pub value: f64,
}

/// JSON request accepted by [`assess_json`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRequest {
    pub profile: RawProfile,
    /// Newest first
    pub measurements: Vec<RawMeasurement>,
    #[serde(default)]
    pub macro_split: Option<MacroSplit>,
    #[serde(default)]
    pub macro_edit: Option<MacroEdit>,
}

/// Assess a client from a JSON request and return the JSON report.
///
/// # Example
/// ```ignore
/// let report = assess_json(r#"{
///     "profile": { "gender": "male", "age": 30, "activityLevel": "moderate", "goal": "lose" },
///     "measurements": [ { "date": "2024-05-01", "weight": 70, "height": 175 } ]
/// }"#.to_string())?;
/// ```
pub fn assess_json(request_json: String) -> Result<String> {
    HealthEngine::new().assess_json(&request_json)
}

/// Engine bundling the compute components under one configuration
#[derive(Debug, Clone)]
pub struct HealthEngine {
    config: EngineConfig,
    calculator: MetricCalculator,
    classifier: RangeClassifier,
    analyzer: TrendAnalyzer,
}

impl Default for HealthEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthEngine {
    /// Create an engine with default settings
    pub fn new() -> Self {
        Self::build(EngineConfig::default())
    }

    /// Create an engine from a validated configuration
    pub fn with_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EngineConfig) -> Self {
        Self {
            calculator: MetricCalculator::from_config(&config),
            classifier: RangeClassifier::from_config(&config),
            analyzer: TrendAnalyzer::from_config(&config),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn calculator(&self) -> &MetricCalculator {
        &self.calculator
    }

    pub fn classifier(&self) -> &RangeClassifier {
        &self.classifier
    }

    pub fn analyzer(&self) -> &TrendAnalyzer {
        &self.analyzer
    }

    /// Apply one interactive macro edit
    pub fn apply_macro_edit(&self, current: MacroSplit, field: Macro, value: f64) -> MacroSplit {
        MacroAllocator::apply_edit(current, field, value)
    }

    /// Assess a client from a newest-first measurement history.
    ///
    /// `split` is the client's current macro split; the configured default
    /// is used when absent. Fails when the history is empty or out of
    /// order, or when the latest measurement cannot produce metrics.
    pub fn assess(
        &self,
        profile: &PersonProfile,
        history: &[Measurement],
        split: Option<MacroSplit>,
    ) -> Result<ClientAssessment> {
        let latest = history.first().ok_or_else(|| {
            EngineError::InsufficientData("at least one measurement is required".to_string())
        })?;
        Normalizer::check_order(history)?;

        tracing::debug!(
            measurements = history.len(),
            measured_on = %latest.date(),
            "assessing client"
        );

        let metrics = self.calculator.compute(latest, profile)?;
        let ideal_ranges = self.classifier.ideal_ranges(profile.gender, history);
        let classifications = self.classifier.classify_latest(profile.gender, history);
        let trend = self.analyzer.analyze_for_goal(history, profile.goal);

        let split = MacroAllocator::normalize(split.unwrap_or(self.config.macros.default_split));
        let grams = MacroAllocator::grams(split, metrics.target_calories, &self.config.macros);

        Ok(ClientAssessment {
            measured_on: latest.date(),
            metrics,
            ideal_ranges,
            classifications,
            trend,
            macro_plan: MacroPlan { split, grams },
        })
    }

    /// Assess a client from a JSON request and return the encoded report
    pub fn assess_json(&self, request_json: &str) -> Result<String> {
        let request: AssessmentRequest = serde_json::from_str(request_json)?;
        let assessment = self.assess_request(&request)?;
        ReportEncoder::new().encode_to_json(assessment)
    }

    /// Assess a parsed request, applying its pending macro edit if any
    pub fn assess_request(&self, request: &AssessmentRequest) -> Result<ClientAssessment> {
        let profile = Normalizer::profile(&request.profile)?;
        let history = Normalizer::history(&request.measurements)?;

        let split = match (request.macro_split, request.macro_edit) {
            (current, Some(edit)) => Some(self.apply_macro_edit(
                current.unwrap_or(self.config.macros.default_split),
                edit.field,
                edit.value,
            )),
            (current, None) => current,
        };

        self.assess(&profile, &history, split)
    }
}
