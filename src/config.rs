//! Engine configuration
//!
//! Factor tables and thresholds used by the compute components. Every
//! field has a default, so a partial JSON document only overrides what it
//! names.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::types::{ActivityLevel, Gender, Goal, MacroSplit};

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub activity_factors: ActivityFactors,

    #[serde(default)]
    pub goal_factors: GoalFactors,

    #[serde(default)]
    pub ranges: RangeConfig,

    #[serde(default)]
    pub trend: TrendConfig,

    #[serde(default)]
    pub macros: MacroConfig,
}

/// TDEE multipliers per activity level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityFactors {
    pub sedentary: f64,
    pub light: f64,
    pub moderate: f64,
    pub active: f64,
    pub very_active: f64,
}

impl Default for ActivityFactors {
    fn default() -> Self {
        Self {
            sedentary: 1.2,
            light: 1.375,
            moderate: 1.55,
            active: 1.725,
            very_active: 1.9,
        }
    }
}

impl ActivityFactors {
    pub fn factor(&self, level: ActivityLevel) -> f64 {
        match level {
            ActivityLevel::Sedentary => self.sedentary,
            ActivityLevel::Light => self.light,
            ActivityLevel::Moderate => self.moderate,
            ActivityLevel::Active => self.active,
            ActivityLevel::VeryActive => self.very_active,
        }
    }
}

/// Calorie target multipliers per goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalFactors {
    pub lose: f64,
    pub maintain: f64,
    pub gain: f64,
}

impl Default for GoalFactors {
    fn default() -> Self {
        Self {
            lose: 0.8,
            maintain: 1.0,
            gain: 1.2,
        }
    }
}

impl GoalFactors {
    pub fn factor(&self, goal: Goal) -> f64 {
        match goal {
            Goal::Lose => self.lose,
            Goal::Maintain => self.maintain,
            Goal::Gain => self.gain,
        }
    }
}

/// A closed numeric interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Reference values for ideal range computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeConfig {
    /// Healthy BMI interval, also used to derive the weight range
    pub bmi: Bounds,
    pub body_fat_male: Bounds,
    pub body_fat_female: Bounds,
    pub waist_max_male: f64,
    pub waist_max_female: f64,
    /// Multipliers applied to the historical mean for girth metrics
    pub history_band: Bounds,
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            bmi: Bounds::new(18.5, 24.9),
            body_fat_male: Bounds::new(10.0, 20.0),
            body_fat_female: Bounds::new(18.0, 28.0),
            waist_max_male: 94.0,
            waist_max_female: 80.0,
            history_band: Bounds::new(0.9, 1.1),
        }
    }
}

impl RangeConfig {
    pub fn body_fat(&self, gender: Gender) -> Bounds {
        match gender {
            Gender::Male => self.body_fat_male,
            Gender::Female => self.body_fat_female,
        }
    }

    pub fn waist_max(&self, gender: Gender) -> f64 {
        match gender {
            Gender::Male => self.waist_max_male,
            Gender::Female => self.waist_max_female,
        }
    }
}

/// How the trend verdict treats the direction of change
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendPolarityMode {
    /// A decrease in weight, BMI, body fat or waist always counts as improvement
    #[default]
    Fixed,
    /// Clients gaining weight improve when weight and BMI go up
    GoalAware,
}

/// Trend analysis settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    /// Absolute change below which a metric is reported stable
    pub stable_threshold: f64,
    pub polarity: TrendPolarityMode,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            stable_threshold: 0.5,
            polarity: TrendPolarityMode::Fixed,
        }
    }
}

/// Macro split defaults and energy densities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacroConfig {
    pub default_split: MacroSplit,
    pub protein_kcal_per_g: f64,
    pub carbs_kcal_per_g: f64,
    pub fat_kcal_per_g: f64,
}

impl Default for MacroConfig {
    fn default() -> Self {
        Self {
            default_split: MacroSplit::default(),
            protein_kcal_per_g: 4.0,
            carbs_kcal_per_g: 4.0,
            fat_kcal_per_g: 9.0,
        }
    }
}

impl EngineConfig {
    /// Load configuration from JSON, then validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject factor tables and bounds that would produce nonsense
    pub fn validate(&self) -> Result<()> {
        for level in ActivityLevel::ALL {
            check_factor(
                &format!("activity_factors.{}", level.as_str()),
                self.activity_factors.factor(level),
            )?;
        }
        for goal in Goal::ALL {
            check_factor(
                &format!("goal_factors.{}", goal.as_str()),
                self.goal_factors.factor(goal),
            )?;
        }

        check_bounds("ranges.bmi", self.ranges.bmi)?;
        check_bounds("ranges.body_fat_male", self.ranges.body_fat_male)?;
        check_bounds("ranges.body_fat_female", self.ranges.body_fat_female)?;
        check_bounds("ranges.history_band", self.ranges.history_band)?;
        check_factor("ranges.waist_max_male", self.ranges.waist_max_male)?;
        check_factor("ranges.waist_max_female", self.ranges.waist_max_female)?;

        if !self.trend.stable_threshold.is_finite() || self.trend.stable_threshold < 0.0 {
            return Err(EngineError::Config(
                "trend.stable_threshold must be a non-negative number".to_string(),
            ));
        }

        check_factor("macros.protein_kcal_per_g", self.macros.protein_kcal_per_g)?;
        check_factor("macros.carbs_kcal_per_g", self.macros.carbs_kcal_per_g)?;
        check_factor("macros.fat_kcal_per_g", self.macros.fat_kcal_per_g)?;
        let split = self.macros.default_split;
        MacroSplit::new(split.protein, split.carbs, split.fat)
            .map_err(|e| EngineError::Config(format!("macros.default_split: {e}")))?;

        Ok(())
    }
}

fn check_factor(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(EngineError::Config(format!(
            "{name} must be a positive number, got {value}"
        )))
    }
}

fn check_bounds(name: &str, bounds: Bounds) -> Result<()> {
    check_factor(&format!("{name}.min"), bounds.min)?;
    check_factor(&format!("{name}.max"), bounds.max)?;
    if bounds.min > bounds.max {
        return Err(EngineError::Config(format!(
            "{name}: min {} exceeds max {}",
            bounds.min, bounds.max
        )));
    }
    Ok(())
}
