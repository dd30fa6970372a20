//! Feature encoding
//!
//! Turns a validated [`PredictionRequest`] into the fixed-order numeric vector
//! the scaler and the model were fitted on:
//! `[age, sex, bmi, smoker, region, children]`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of features the model consumes
pub const N_FEATURES: usize = 6;

/// Feature names in encoding order
pub const FEATURE_NAMES: [&str; N_FEATURES] = ["age", "sex", "bmi", "smoker", "region", "children"];

/// Raised when a categorical form value is not one of the known choices
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized {field} value: {value:?}")]
pub struct UnknownCategory {
    pub field: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    pub const CHOICES: [Sex; 2] = [Sex::Male, Sex::Female];

    pub fn code(self) -> f64 {
        match self {
            Sex::Female => 0.0,
            Sex::Male => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Sex::Female => "Female",
            Sex::Male => "Male",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Smoker {
    No,
    Yes,
}

impl Smoker {
    pub const CHOICES: [Smoker; 2] = [Smoker::Yes, Smoker::No];

    pub fn code(self) -> f64 {
        match self {
            Smoker::No => 0.0,
            Smoker::Yes => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Smoker::No => "No",
            Smoker::Yes => "Yes",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Region {
    Northwest,
    Northeast,
    Southwest,
    Southeast,
}

impl Region {
    pub const CHOICES: [Region; 4] = [
        Region::Northwest,
        Region::Northeast,
        Region::Southwest,
        Region::Southeast,
    ];

    pub fn code(self) -> f64 {
        match self {
            Region::Northwest => 0.0,
            Region::Northeast => 1.0,
            Region::Southwest => 2.0,
            Region::Southeast => 3.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Region::Northwest => "Northwest",
            Region::Northeast => "Northeast",
            Region::Southwest => "Southwest",
            Region::Southeast => "Southeast",
        }
    }
}

macro_rules! impl_choice {
    ($ty:ty, $field:literal) => {
        impl FromStr for $ty {
            type Err = UnknownCategory;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty>::CHOICES
                    .into_iter()
                    .find(|choice| choice.as_str() == s)
                    .ok_or_else(|| UnknownCategory {
                        field: $field,
                        value: s.to_string(),
                    })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

impl_choice!(Sex, "sex");
impl_choice!(Smoker, "smoker");
impl_choice!(Region, "region");

/// One validated prediction request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub age: u8,
    pub sex: Sex,
    pub bmi: f64,
    pub smoker: Smoker,
    pub region: Region,
    pub children: u32,
}

/// Encoded, unscaled feature vector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector(pub [f64; N_FEATURES]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl PredictionRequest {
    pub fn encode(&self) -> FeatureVector {
        FeatureVector([
            f64::from(self.age),
            self.sex.code(),
            self.bmi,
            self.smoker.code(),
            self.region.code(),
            f64::from(self.children),
        ])
    }
}
