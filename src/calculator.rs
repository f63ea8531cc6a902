//! Health metric calculation
//!
//! Converts a measurement and a client profile into energy figures:
//! - BMI and its category band
//! - Basal energy expenditure (revised Harris-Benedict, Roza & Shizgal 1984)
//! - Total daily energy expenditure via activity factors
//! - Goal-adjusted calorie target

use crate::config::{ActivityFactors, EngineConfig, GoalFactors};
use crate::error::ValidationError;
use crate::types::{
    ActivityLevel, BmiCategory, Gender, Goal, HealthMetrics, Measurement, PersonProfile,
};

/// Calculator for BMI, BMR, TDEE and calorie targets
#[derive(Debug, Clone, Default)]
pub struct MetricCalculator {
    activity_factors: ActivityFactors,
    goal_factors: GoalFactors,
}

impl MetricCalculator {
    pub fn new(activity_factors: ActivityFactors, goal_factors: GoalFactors) -> Self {
        Self {
            activity_factors,
            goal_factors,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.activity_factors.clone(), config.goal_factors.clone())
    }

    /// Body mass index: weight / height_m²
    pub fn bmi(&self, weight_kg: f64, height_cm: f64) -> Result<f64, ValidationError> {
        let weight = ValidationError::check_positive("weight", weight_kg)?;
        let height_m = ValidationError::check_positive("height", height_cm)? / 100.0;
        Ok(weight / (height_m * height_m))
    }

    /// Basal energy expenditure in kcal/day (revised Harris-Benedict)
    ///
    /// - Men: 88.362 + 13.397 x weight + 4.799 x height - 5.677 x age
    /// - Women: 447.593 + 9.247 x weight + 3.098 x height - 4.330 x age
    pub fn basal_energy_expenditure(
        &self,
        weight_kg: f64,
        height_cm: f64,
        age: u32,
        gender: Gender,
    ) -> Result<f64, ValidationError> {
        let weight = ValidationError::check_positive("weight", weight_kg)?;
        let height = ValidationError::check_positive("height", height_cm)?;
        let age = ValidationError::check_positive("age", f64::from(age))?;

        let bee = match gender {
            Gender::Male => 88.362 + 13.397 * weight + 4.799 * height - 5.677 * age,
            Gender::Female => 447.593 + 9.247 * weight + 3.098 * height - 4.330 * age,
        };
        // Only the age term is negative, so a non-positive result is charged to age.
        if bee <= 0.0 {
            return Err(ValidationError::NonPositive { field: "age", value: age });
        }
        Ok(bee)
    }

    /// Total daily energy expenditure: BEE x activity factor
    pub fn total_daily_expenditure(
        &self,
        bee: f64,
        activity_level: ActivityLevel,
    ) -> Result<f64, ValidationError> {
        let bee = ValidationError::check_positive("bee", bee)?;
        Ok(bee * self.activity_factors.factor(activity_level))
    }

    /// Calorie target: TDEE x goal factor
    pub fn target_calories(&self, tdee: f64, goal: Goal) -> Result<f64, ValidationError> {
        let tdee = ValidationError::check_positive("tdee", tdee)?;
        Ok(tdee * self.goal_factors.factor(goal))
    }

    /// All energy figures for a measurement
    pub fn compute(
        &self,
        measurement: &Measurement,
        profile: &PersonProfile,
    ) -> Result<HealthMetrics, ValidationError> {
        let bmr = self.basal_energy_expenditure(
            measurement.weight(),
            measurement.height(),
            profile.age,
            profile.gender,
        )?;
        let tdee = self.total_daily_expenditure(bmr, profile.activity_level)?;
        let target_calories = self.target_calories(tdee, profile.goal)?;
        let bmi = self.bmi(measurement.weight(), measurement.height())?;

        Ok(HealthMetrics {
            bmr,
            tdee,
            bmi,
            bmi_category: bmi_category(bmi),
            target_calories,
        })
    }
}

/// WHO BMI band for a BMI value
pub fn bmi_category(bmi: f64) -> BmiCategory {
    if bmi < 18.5 {
        BmiCategory::Underweight
    } else if bmi < 25.0 {
        BmiCategory::Normal
    } else if bmi < 30.0 {
        BmiCategory::Overweight
    } else {
        BmiCategory::Obese
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MeasurementExtras;
    use chrono::NaiveDate;

    fn calculator() -> MetricCalculator {
        MetricCalculator::default()
    }

    #[test]
    fn test_bmi() {
        let bmi = calculator().bmi(70.0, 175.0).unwrap();
        assert!((bmi - 70.0 / (1.75 * 1.75)).abs() < 1e-9);
        assert!((bmi - 22.86).abs() < 0.01);
    }

    #[test]
    fn test_bmi_rejects_invalid_input() {
        let calc = calculator();
        assert!(calc.bmi(0.0, 175.0).is_err());
        assert!(calc.bmi(70.0, -1.0).is_err());
        assert!(calc.bmi(f64::NAN, 175.0).is_err());
        assert!(calc.bmi(70.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_basal_energy_expenditure_male() {
        let bee = calculator()
            .basal_energy_expenditure(70.0, 175.0, 30, Gender::Male)
            .unwrap();
        let expected = 88.362 + 13.397 * 70.0 + 4.799 * 175.0 - 5.677 * 30.0;
        assert!((bee - expected).abs() < 1e-9);
        assert!((bee - 1695.67).abs() < 0.5);
    }

    #[test]
    fn test_basal_energy_expenditure_female() {
        let bee = calculator()
            .basal_energy_expenditure(60.0, 165.0, 40, Gender::Female)
            .unwrap();
        let expected = 447.593 + 9.247 * 60.0 + 3.098 * 165.0 - 4.330 * 40.0;
        assert!((bee - expected).abs() < 1e-9);
    }

    #[test]
    fn test_basal_energy_expenditure_rejects_zero_age() {
        let err = calculator()
            .basal_energy_expenditure(70.0, 175.0, 0, Gender::Male)
            .unwrap_err();
        assert!(matches!(err, ValidationError::NonPositive { field: "age", .. }));
    }

    #[test]
    fn test_negative_basal_expenditure_is_charged_to_age() {
        let measurement = Measurement::new(
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            2.0,
            40.0,
            MeasurementExtras::default(),
        )
        .unwrap();
        let profile = PersonProfile {
            gender: Gender::Male,
            age: 110,
            activity_level: ActivityLevel::Sedentary,
            goal: Goal::Maintain,
        };

        let err = calculator().compute(&measurement, &profile).unwrap_err();
        assert_eq!(
            err,
            ValidationError::NonPositive {
                field: "age",
                value: 110.0
            }
        );
    }

    #[test]
    fn test_tdee_monotonic_in_activity() {
        let calc = calculator();
        let values: Vec<f64> = ActivityLevel::ALL
            .iter()
            .map(|level| calc.total_daily_expenditure(1600.0, *level).unwrap())
            .collect();

        assert!((values[0] - 1920.0).abs() < 1e-9);
        assert!(values.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_target_calories_monotonic_in_goal() {
        let calc = calculator();
        let lose = calc.target_calories(2000.0, Goal::Lose).unwrap();
        let maintain = calc.target_calories(2000.0, Goal::Maintain).unwrap();
        let gain = calc.target_calories(2000.0, Goal::Gain).unwrap();

        assert!((lose - 1600.0).abs() < 1e-9);
        assert!((maintain - 2000.0).abs() < 1e-9);
        assert!((gain - 2400.0).abs() < 1e-9);
    }

    #[test]
    fn test_bmi_category_bands() {
        assert_eq!(bmi_category(17.0), BmiCategory::Underweight);
        assert_eq!(bmi_category(18.5), BmiCategory::Normal);
        assert_eq!(bmi_category(24.9), BmiCategory::Normal);
        assert_eq!(bmi_category(25.0), BmiCategory::Overweight);
        assert_eq!(bmi_category(29.9), BmiCategory::Overweight);
        assert_eq!(bmi_category(30.0), BmiCategory::Obese);
    }

    #[test]
    fn test_compute_from_measurement() {
        let measurement = Measurement::new(
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            70.0,
            175.0,
            MeasurementExtras::default(),
        )
        .unwrap();
        let profile = PersonProfile {
            gender: Gender::Male,
            age: 30,
            activity_level: ActivityLevel::Moderate,
            goal: Goal::Lose,
        };

        let metrics = calculator().compute(&measurement, &profile).unwrap();
        assert!((metrics.tdee - metrics.bmr * 1.55).abs() < 1e-9);
        assert!((metrics.target_calories - metrics.tdee * 0.8).abs() < 1e-9);
        assert_eq!(metrics.bmi_category, BmiCategory::Normal);
    }
}
