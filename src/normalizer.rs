//! Measurement normalization
//!
//! This module turns loosely-typed measurement records (as submitted by
//! host forms and stored rows) into validated [`Measurement`] values.
//! - Numbers may arrive as JSON numbers or numeric strings
//! - Blank optional fields are treated as absent
//! - Dates accept `YYYY-MM-DD` or a full RFC 3339 timestamp
//! - History ordering is checked, never repaired
//! - Profile enums accept the same aliases as their `FromStr` parsers

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::types::{ActivityLevel, Gender, Goal, Measurement, MeasurementExtras, PersonProfile};

/// A numeric field that may have been submitted as text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
}

/// Measurement record before validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMeasurement {
    pub date: Option<String>,
    pub weight: Option<RawNumber>,
    pub height: Option<RawNumber>,
    pub body_fat_percentage: Option<RawNumber>,
    pub waist_circumference: Option<RawNumber>,
    pub hip_circumference: Option<RawNumber>,
    pub chest_circumference: Option<RawNumber>,
    pub arm_circumference: Option<RawNumber>,
    pub thigh_circumference: Option<RawNumber>,
    pub calf_circumference: Option<RawNumber>,
    pub bmi: Option<RawNumber>,
}

impl TryFrom<RawMeasurement> for Measurement {
    type Error = ValidationError;

    fn try_from(raw: RawMeasurement) -> Result<Self, Self::Error> {
        Normalizer::measurement(&raw)
    }
}

/// Client profile before validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProfile {
    pub gender: Option<String>,
    pub age: Option<RawNumber>,
    pub activity_level: Option<String>,
    pub goal: Option<String>,
}

impl TryFrom<RawProfile> for PersonProfile {
    type Error = ValidationError;

    fn try_from(raw: RawProfile) -> Result<Self, Self::Error> {
        Normalizer::profile(&raw)
    }
}

/// Normalizer for converting raw records into validated measurements
pub struct Normalizer;

impl Normalizer {
    /// Validate a single raw record
    pub fn measurement(raw: &RawMeasurement) -> Result<Measurement, ValidationError> {
        let date = match raw.date.as_deref() {
            Some(text) => parse_date(text)?,
            None => return Err(ValidationError::MissingField("date")),
        };

        let weight = required_number("weight", raw.weight.as_ref())?;
        let height = required_number("height", raw.height.as_ref())?;

        let extras = MeasurementExtras {
            body_fat_percentage: optional_number(
                "bodyFatPercentage",
                raw.body_fat_percentage.as_ref(),
            )?,
            waist_circumference: optional_number(
                "waistCircumference",
                raw.waist_circumference.as_ref(),
            )?,
            hip_circumference: optional_number("hipCircumference", raw.hip_circumference.as_ref())?,
            chest_circumference: optional_number(
                "chestCircumference",
                raw.chest_circumference.as_ref(),
            )?,
            arm_circumference: optional_number("armCircumference", raw.arm_circumference.as_ref())?,
            thigh_circumference: optional_number(
                "thighCircumference",
                raw.thigh_circumference.as_ref(),
            )?,
            calf_circumference: optional_number(
                "calfCircumference",
                raw.calf_circumference.as_ref(),
            )?,
            bmi: optional_number("bmi", raw.bmi.as_ref())?,
        };

        Measurement::new(date, weight, height, extras)
    }

    /// Validate a raw profile, resolving enum aliases
    pub fn profile(raw: &RawProfile) -> Result<PersonProfile, ValidationError> {
        let gender = required_text("gender", raw.gender.as_deref())?.parse::<Gender>()?;
        let age = required_number("age", raw.age.as_ref())?;
        let age = ValidationError::check_positive("age", age)?;
        let activity_level = required_text("activityLevel", raw.activity_level.as_deref())?
            .parse::<ActivityLevel>()?;
        let goal = required_text("goal", raw.goal.as_deref())?.parse::<Goal>()?;

        Ok(PersonProfile {
            gender,
            age: age.round() as u32,
            activity_level,
            goal,
        })
    }

    /// Validate a list of raw records as a newest-first history
    pub fn history(raws: &[RawMeasurement]) -> Result<Vec<Measurement>, ValidationError> {
        let measurements = raws
            .iter()
            .map(Self::measurement)
            .collect::<Result<Vec<_>, _>>()?;
        Self::check_order(&measurements)?;
        Ok(measurements)
    }

    /// Ensure dates never increase along the sequence
    pub fn check_order(history: &[Measurement]) -> Result<(), ValidationError> {
        match history
            .windows(2)
            .position(|pair| pair[1].date() > pair[0].date())
        {
            Some(pos) => Err(ValidationError::UnsortedHistory { index: pos + 1 }),
            None => Ok(()),
        }
    }
}

fn parse_date(text: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.date_naive())
        .map_err(|_| ValidationError::InvalidDate(text.to_string()))
}

fn required_text<'a>(
    field: &'static str,
    raw: Option<&'a str>,
) -> Result<&'a str, ValidationError> {
    raw.filter(|text| !text.trim().is_empty())
        .ok_or(ValidationError::MissingField(field))
}

fn required_number(field: &'static str, raw: Option<&RawNumber>) -> Result<f64, ValidationError> {
    optional_number(field, raw)?.ok_or(ValidationError::MissingField(field))
}

/// Parse an optional numeric field; blank text counts as absent
fn optional_number(
    field: &'static str,
    raw: Option<&RawNumber>,
) -> Result<Option<f64>, ValidationError> {
    match raw {
        None => Ok(None),
        Some(RawNumber::Number(n)) => Ok(Some(*n)),
        Some(RawNumber::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<f64>()
                .map(Some)
                .map_err(|_| ValidationError::NotANumber {
                    field,
                    raw: text.clone(),
                })
        }
    }
}
