//! Body-mass-index calculator shown in the sidebar
//!
//! Independent of the prediction path; it only shares the page.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_HEIGHT_M: f64 = 2.50;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BmiError {
    #[error("Please enter a value for your height!")]
    MissingHeight,
    #[error("Please enter a value for your weight!")]
    MissingWeight,
    #[error("Please enter a value for your height and weight!")]
    MissingBoth,
    #[error("Please enter a valid number for your {0}!")]
    InvalidNumber(&'static str),
    #[error("Your {0} cannot be negative!")]
    Negative(&'static str),
    #[error("Height cannot exceed 2.50 m!")]
    HeightTooLarge,
}

impl BmiError {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::MissingHeight => "missing_height",
            Self::MissingWeight => "missing_weight",
            Self::MissingBoth => "missing_both",
            Self::InvalidNumber(_) => "invalid_number",
            Self::Negative(_) => "negative",
            Self::HeightTooLarge => "height_too_large",
        }
    }
}

/// Calculated BMI, displayed to three decimals
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bmi(pub f64);

impl Bmi {
    pub fn rounded(&self) -> f64 {
        (self.0 * 1000.0).round() / 1000.0
    }
}

impl fmt::Display for Bmi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Your BMI is: {:.3}", self.rounded())
    }
}

/// Weight in kilograms divided by the square of height in meters
pub fn calculate_bmi(weight_kg: f64, height_m: f64) -> Result<Bmi, BmiError> {
    if weight_kg < 0.0 {
        return Err(BmiError::Negative("weight"));
    }
    if height_m < 0.0 {
        return Err(BmiError::Negative("height"));
    }
    if height_m > MAX_HEIGHT_M {
        return Err(BmiError::HeightTooLarge);
    }

    match (weight_kg == 0.0, height_m == 0.0) {
        (true, true) => Err(BmiError::MissingBoth),
        (false, true) => Err(BmiError::MissingHeight),
        (true, false) => Err(BmiError::MissingWeight),
        (false, false) => Ok(Bmi(weight_kg / (height_m * height_m))),
    }
}

/// Raw calculator form; empty inputs count as zero like the widget default
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BmiForm {
    pub weight: String,
    pub height: String,
}

impl BmiForm {
    pub fn calculate(&self) -> Result<Bmi, BmiError> {
        let weight = parse_measure(&self.weight, "weight")?;
        let height = parse_measure(&self.height, "height")?;
        calculate_bmi(weight, height)
    }
}

fn parse_measure(value: &str, field: &'static str) -> Result<f64, BmiError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(0.0);
    }
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(BmiError::InvalidNumber(field)),
    }
}
