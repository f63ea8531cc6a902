//! Core types for the Nutri Engine
//!
//! This module defines the values that flow into and out of the four
//! compute components: client profile and measurements on the way in;
//! health metrics, macro splits, ideal ranges and trends on the way out.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::metric::Metric;
use crate::normalizer::RawMeasurement;

/// Biological sex used by the energy equations and gendered ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl TryFrom<String> for Gender {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for Gender {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            _ => Err(ValidationError::UnknownGender(s.to_string())),
        }
    }
}

/// Habitual activity level, used to scale basal expenditure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::Light,
        ActivityLevel::Moderate,
        ActivityLevel::Active,
        ActivityLevel::VeryActive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
            ActivityLevel::VeryActive => "very_active",
        }
    }
}

impl TryFrom<String> for ActivityLevel {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for ActivityLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "light" | "lightly_active" => Ok(ActivityLevel::Light),
            "moderate" | "moderately_active" => Ok(ActivityLevel::Moderate),
            "active" => Ok(ActivityLevel::Active),
            "very_active" | "veryactive" | "extra_active" => Ok(ActivityLevel::VeryActive),
            _ => Err(ValidationError::UnknownActivityLevel(s.to_string())),
        }
    }
}

/// Weight goal, used to adjust the calorie target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Goal {
    Lose,
    Maintain,
    Gain,
}

impl Goal {
    pub const ALL: [Goal; 3] = [Goal::Lose, Goal::Maintain, Goal::Gain];

    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::Lose => "lose",
            Goal::Maintain => "maintain",
            Goal::Gain => "gain",
        }
    }
}

impl TryFrom<String> for Goal {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for Goal {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "lose" | "lose_weight" | "weight_loss" => Ok(Goal::Lose),
            "maintain" | "maintenance" => Ok(Goal::Maintain),
            "gain" | "gain_weight" | "weight_gain" => Ok(Goal::Gain),
            _ => Err(ValidationError::UnknownGoal(s.to_string())),
        }
    }
}

/// Client profile supplied per computation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonProfile {
    pub gender: Gender,
    /// Age in years
    pub age: u32,
    pub activity_level: ActivityLevel,
    pub goal: Goal,
}

/// A single dated body measurement.
///
/// Construction always goes through [`Measurement::new`] (directly or via
/// deserialization of a [`RawMeasurement`]), so every present value is
/// finite and positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawMeasurement")]
pub struct Measurement {
    date: NaiveDate,
    /// kg
    weight: f64,
    /// cm
    height: f64,
    body_fat_percentage: Option<f64>,
    waist_circumference: Option<f64>,
    hip_circumference: Option<f64>,
    chest_circumference: Option<f64>,
    arm_circumference: Option<f64>,
    thigh_circumference: Option<f64>,
    calf_circumference: Option<f64>,
    /// Pre-computed BMI recorded alongside the measurement
    bmi: Option<f64>,
}

/// Optional measurement fields, all in their natural units
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeasurementExtras {
    pub body_fat_percentage: Option<f64>,
    pub waist_circumference: Option<f64>,
    pub hip_circumference: Option<f64>,
    pub chest_circumference: Option<f64>,
    pub arm_circumference: Option<f64>,
    pub thigh_circumference: Option<f64>,
    pub calf_circumference: Option<f64>,
    pub bmi: Option<f64>,
}

impl Measurement {
    /// Validated constructor
    pub fn new(
        date: NaiveDate,
        weight: f64,
        height: f64,
        extras: MeasurementExtras,
    ) -> Result<Self, ValidationError> {
        let optional = |field: &'static str, value: Option<f64>| {
            value
                .map(|v| ValidationError::check_positive(field, v))
                .transpose()
        };

        Ok(Self {
            date,
            weight: ValidationError::check_positive("weight", weight)?,
            height: ValidationError::check_positive("height", height)?,
            body_fat_percentage: optional("bodyFatPercentage", extras.body_fat_percentage)?,
            waist_circumference: optional("waistCircumference", extras.waist_circumference)?,
            hip_circumference: optional("hipCircumference", extras.hip_circumference)?,
            chest_circumference: optional("chestCircumference", extras.chest_circumference)?,
            arm_circumference: optional("armCircumference", extras.arm_circumference)?,
            thigh_circumference: optional("thighCircumference", extras.thigh_circumference)?,
            calf_circumference: optional("calfCircumference", extras.calf_circumference)?,
            bmi: optional("bmi", extras.bmi)?,
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn body_fat_percentage(&self) -> Option<f64> {
        self.body_fat_percentage
    }

    pub fn waist_circumference(&self) -> Option<f64> {
        self.waist_circumference
    }

    /// The recorded BMI, if the measurement carried one
    pub fn recorded_bmi(&self) -> Option<f64> {
        self.bmi
    }

    /// Recorded BMI, falling back to weight / height_m²
    pub fn bmi(&self) -> f64 {
        self.bmi.unwrap_or_else(|| {
            let height_m = self.height / 100.0;
            self.weight / (height_m * height_m)
        })
    }

    /// Value of a tracked metric, if present on this measurement
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Weight => Some(self.weight),
            Metric::Bmi => Some(self.bmi()),
            Metric::BodyFatPercentage => self.body_fat_percentage,
            Metric::WaistCircumference => self.waist_circumference,
            Metric::HipCircumference => self.hip_circumference,
            Metric::ChestCircumference => self.chest_circumference,
            Metric::ArmCircumference => self.arm_circumference,
            Metric::ThighCircumference => self.thigh_circumference,
            Metric::CalfCircumference => self.calf_circumference,
        }
    }
}

/// BMI classification bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "underweight",
            BmiCategory::Normal => "normal",
            BmiCategory::Overweight => "overweight",
            BmiCategory::Obese => "obese",
        }
    }
}

/// Energy and body-mass figures for one measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthMetrics {
    /// Basal energy expenditure (kcal/day)
    pub bmr: f64,
    /// Total daily energy expenditure (kcal/day)
    pub tdee: f64,
    pub bmi: f64,
    pub bmi_category: BmiCategory,
    /// Goal-adjusted daily calorie target (kcal/day)
    pub target_calories: f64,
}

/// One of the three macronutrients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Macro {
    Protein,
    Carbs,
    Fat,
}

impl Macro {
    pub const ALL: [Macro; 3] = [Macro::Protein, Macro::Carbs, Macro::Fat];

    pub fn as_str(&self) -> &'static str {
        match self {
            Macro::Protein => "protein",
            Macro::Carbs => "carbs",
            Macro::Fat => "fat",
        }
    }

    /// Position within the protein/carbs/fat triple
    pub(crate) fn index(&self) -> usize {
        match self {
            Macro::Protein => 0,
            Macro::Carbs => 1,
            Macro::Fat => 2,
        }
    }
}

impl FromStr for Macro {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "protein" | "proteins" => Ok(Macro::Protein),
            "carbs" | "carb" | "carbohydrates" => Ok(Macro::Carbs),
            "fat" | "fats" => Ok(Macro::Fat),
            _ => Err(ValidationError::UnknownMacro(s.to_string())),
        }
    }
}

/// Percentage of daily calories from each macronutrient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MacroSplit {
    pub protein: i32,
    pub carbs: i32,
    pub fat: i32,
}

impl MacroSplit {
    /// Build a split, rejecting values outside [0, 100] or a total other than 100
    pub fn new(protein: i32, carbs: i32, fat: i32) -> Result<Self, ValidationError> {
        let split = Self {
            protein,
            carbs,
            fat,
        };
        let in_range = split.as_array().iter().all(|v| (0..=100).contains(v));
        if !in_range || split.total() != 100 {
            return Err(ValidationError::InvalidSplit {
                sum: i64::from(protein) + i64::from(carbs) + i64::from(fat),
            });
        }
        Ok(split)
    }

    pub fn get(&self, field: Macro) -> i32 {
        self.as_array()[field.index()]
    }

    pub fn total(&self) -> i32 {
        self.protein
            .saturating_add(self.carbs)
            .saturating_add(self.fat)
    }

    pub(crate) fn as_array(&self) -> [i32; 3] {
        [self.protein, self.carbs, self.fat]
    }

    pub(crate) fn from_array(values: [i32; 3]) -> Self {
        Self {
            protein: values[0],
            carbs: values[1],
            fat: values[2],
        }
    }
}

impl Default for MacroSplit {
    fn default() -> Self {
        Self {
            protein: 30,
            carbs: 40,
            fat: 30,
        }
    }
}

/// Daily macronutrient targets in grams
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroGrams {
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

/// Ideal interval for a metric; either bound may be absent
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IdealRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl IdealRange {
    pub fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn at_most(max: f64) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }
}

/// Ideal ranges keyed by metric
pub type IdealRanges = BTreeMap<Metric, IdealRange>;

/// Result of comparing a value against its ideal range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Low,
    Ideal,
    High,
    /// No ideal range is defined for the metric
    Normal,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Low => "low",
            Classification::Ideal => "ideal",
            Classification::High => "high",
            Classification::Normal => "normal",
        }
    }
}

/// Direction of change between two measurements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increased,
    Decreased,
    /// Change smaller than the stability threshold
    Stable,
}

/// Change of one metric between the previous and the latest measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendEntry {
    pub delta: f64,
    /// Omitted when the previous value is zero
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage_change: Option<f64>,
    pub direction: TrendDirection,
    pub improved: bool,
}

/// Trend across the two most recent measurements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrendResult {
    /// Fewer than two measurements were available
    InsufficientData { measurements: usize },
    Computed {
        latest_date: NaiveDate,
        previous_date: NaiveDate,
        metrics: BTreeMap<Metric, TrendEntry>,
    },
}

impl TrendResult {
    pub fn is_insufficient(&self) -> bool {
        matches!(self, TrendResult::InsufficientData { .. })
    }

    pub fn get(&self, metric: Metric) -> Option<&TrendEntry> {
        match self {
            TrendResult::Computed { metrics, .. } => metrics.get(&metric),
            TrendResult::InsufficientData { .. } => None,
        }
    }
}

/// Chosen macro split with its gram equivalents for the calorie target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroPlan {
    pub split: MacroSplit,
    pub grams: MacroGrams,
}

/// Everything the engine derives for one client at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientAssessment {
    /// Date of the measurement the metrics were computed from
    pub measured_on: NaiveDate,
    pub metrics: HealthMetrics,
    pub ideal_ranges: IdealRanges,
    pub classifications: BTreeMap<Metric, Classification>,
    pub trend: TrendResult,
    pub macro_plan: MacroPlan,
}

/// Report producer metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Encoded assessment report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub computed_at_utc: String,
    pub assessment: ClientAssessment,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_measurement_rejects_non_positive() {
        let err = Measurement::new(date("2024-03-01"), 0.0, 170.0, MeasurementExtras::default())
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::NonPositive {
                field: "weight",
                value: 0.0
            }
        );

        let extras = MeasurementExtras {
            waist_circumference: Some(-3.0),
            ..Default::default()
        };
        let err = Measurement::new(date("2024-03-01"), 70.0, 170.0, extras).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::NonPositive {
                field: "waistCircumference",
                ..
            }
        ));
    }

    #[test]
    fn test_bmi_falls_back_to_computed() {
        let m = Measurement::new(date("2024-03-01"), 70.0, 175.0, MeasurementExtras::default())
            .unwrap();
        assert!((m.bmi() - 22.857).abs() < 0.01);
        assert_eq!(m.recorded_bmi(), None);

        let extras = MeasurementExtras {
            bmi: Some(23.1),
            ..Default::default()
        };
        let m = Measurement::new(date("2024-03-01"), 70.0, 175.0, extras).unwrap();
        assert_eq!(m.value(Metric::Bmi), Some(23.1));
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("Very Active".parse::<ActivityLevel>(), Ok(ActivityLevel::VeryActive));
        assert_eq!("lightly_active".parse::<ActivityLevel>(), Ok(ActivityLevel::Light));
        assert_eq!("gain".parse::<Goal>(), Ok(Goal::Gain));
        assert_eq!("F".parse::<Gender>(), Ok(Gender::Female));
        assert!(matches!(
            "couch".parse::<ActivityLevel>(),
            Err(ValidationError::UnknownActivityLevel(_))
        ));
        assert!(matches!(
            "bulk".parse::<Goal>(),
            Err(ValidationError::UnknownGoal(_))
        ));
    }

    #[test]
    fn test_unknown_values_keep_raw_input() {
        assert_eq!(
            " Other ".parse::<Gender>(),
            Err(ValidationError::UnknownGender(" Other ".to_string()))
        );
        assert_eq!(
            " Couch ".parse::<ActivityLevel>(),
            Err(ValidationError::UnknownActivityLevel(" Couch ".to_string()))
        );
        assert_eq!(
            " Bulk ".parse::<Goal>(),
            Err(ValidationError::UnknownGoal(" Bulk ".to_string()))
        );
    }

    #[test]
    fn test_enum_serde_round_trip_uses_canonical_names() {
        let level: ActivityLevel = serde_json::from_str("\"extra_active\"").unwrap();
        assert_eq!(level, ActivityLevel::VeryActive);
        assert_eq!(serde_json::to_string(&level).unwrap(), "\"very_active\"");

        let gender: Gender = serde_json::from_str("\"M\"").unwrap();
        assert_eq!(serde_json::to_string(&gender).unwrap(), "\"male\"");
    }

    #[test]
    fn test_macro_split_new() {
        assert!(MacroSplit::new(30, 40, 30).is_ok());
        assert_eq!(
            MacroSplit::new(30, 40, 40),
            Err(ValidationError::InvalidSplit { sum: 110 })
        );
        assert!(MacroSplit::new(-10, 80, 30).is_err());
    }

    #[test]
    fn test_trend_result_serialization() {
        let result = TrendResult::InsufficientData { measurements: 1 };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "insufficient_data");
        assert_eq!(json["measurements"], 1);
    }
}
