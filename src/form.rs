//! Prediction form validation
//!
//! The browser posts every field as a string; selects start on an empty
//! choice. Validation turns that into a [`PredictionRequest`] or a message
//! for the user, and nothing downstream ever sees an unvalidated request.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

use crate::config::CategoryPolicy;
use crate::features::{PredictionRequest, Region, Sex, Smoker, UnknownCategory};

pub const MIN_AGE: u8 = 1;
pub const MAX_AGE: u8 = 100;
pub const MIN_BMI: f64 = 1.0;

pub const REQUIRED_FIELDS_MESSAGE: &str =
    "Please kindly fill up all the required fields before submitting it.";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{}", REQUIRED_FIELDS_MESSAGE)]
    MissingFields(Vec<&'static str>),
    #[error("{}", REQUIRED_FIELDS_MESSAGE)]
    BmiBelowMinimum(f64),
    #[error("Age must be between 1 and 100.")]
    AgeOutOfRange,
    #[error("Please enter a valid number for {field}.")]
    InvalidNumber { field: &'static str },
    #[error("Unrecognized {} value. Please pick one of the listed options.", .0.field)]
    UnrecognizedChoice(#[from] UnknownCategory),
}

impl ValidationError {
    /// Short label for metrics and logs
    pub fn reason(&self) -> &'static str {
        match self {
            Self::MissingFields(_) => "missing_fields",
            Self::BmiBelowMinimum(_) => "bmi_below_minimum",
            Self::AgeOutOfRange => "age_out_of_range",
            Self::InvalidNumber { .. } => "invalid_number",
            Self::UnrecognizedChoice(_) => "unrecognized_choice",
        }
    }
}

/// Raw prediction form as submitted
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PredictionForm {
    pub age: String,
    pub sex: String,
    pub bmi: String,
    pub smoker: String,
    pub region: String,
    pub children: String,
}

impl PredictionForm {
    pub fn validate(&self, policy: CategoryPolicy) -> Result<PredictionRequest, ValidationError> {
        let missing: Vec<&'static str> = [
            ("age", &self.age),
            ("sex", &self.sex),
            ("bmi", &self.bmi),
            ("smoker", &self.smoker),
            ("region", &self.region),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        let bmi = parse_number::<f64>(&self.bmi, "bmi")?;
        if !bmi.is_finite() {
            return Err(ValidationError::InvalidNumber { field: "bmi" });
        }
        if bmi < MIN_BMI {
            return Err(ValidationError::BmiBelowMinimum(bmi));
        }

        let age = parse_number::<u8>(&self.age, "age").map_err(|_| ValidationError::AgeOutOfRange)?;
        if !(MIN_AGE..=MAX_AGE).contains(&age) {
            return Err(ValidationError::AgeOutOfRange);
        }

        let children = if self.children.trim().is_empty() {
            0
        } else {
            parse_number::<u32>(&self.children, "children")?
        };

        Ok(PredictionRequest {
            age,
            sex: parse_choice(&self.sex, policy, Sex::Male)?,
            bmi,
            smoker: parse_choice(&self.smoker, policy, Smoker::Yes)?,
            region: parse_choice(&self.region, policy, Region::Southeast)?,
            children,
        })
    }
}

fn parse_number<T: FromStr>(value: &str, field: &'static str) -> Result<T, ValidationError> {
    value
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidNumber { field })
}

fn parse_choice<T>(value: &str, policy: CategoryPolicy, fallback: T) -> Result<T, ValidationError>
where
    T: FromStr<Err = UnknownCategory> + std::fmt::Display,
{
    match value.trim().parse::<T>() {
        Ok(choice) => Ok(choice),
        Err(err) => match policy {
            CategoryPolicy::Strict => Err(err.into()),
            CategoryPolicy::Lenient => {
                warn!(field = err.field, value = %err.value, fallback = %fallback, "Unrecognized choice, using fallback");
                Ok(fallback)
            }
        },
    }
}
