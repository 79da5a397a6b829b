//! Raw form inputs and their coercion into a typed feature vector

use crate::error::{Error, Result};
use crate::features::{Feature, FeatureSpec, ValueType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A loosely-typed scalar as submitted by a form or API client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
    /// Anything else JSON can carry (booleans, null, arrays, objects)
    Other(serde_json::Value),
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{:?}", s),
            Self::Other(v) => write!(f, "{}", v),
        }
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// The ten form fields, each optional until coercion
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawInputs {
    pub company_code: Option<RawValue>,
    pub model_code: Option<RawValue>,
    pub engine_code: Option<RawValue>,
    pub cc_battery: Option<RawValue>,
    pub horsepower: Option<RawValue>,
    pub top_speed: Option<RawValue>,
    pub perf_0_100: Option<RawValue>,
    pub fuel_type_code: Option<RawValue>,
    pub seats: Option<RawValue>,
    pub torque: Option<RawValue>,
}

impl RawInputs {
    /// Build inputs from ten numbers in submission order
    pub fn from_values(values: [f64; 10]) -> Self {
        let mut inputs = Self::default();
        for (feature, value) in Feature::ALL.into_iter().zip(values) {
            inputs.set(feature, RawValue::Number(value));
        }
        inputs
    }

    /// Get the raw value for a feature
    pub fn get(&self, feature: Feature) -> Option<&RawValue> {
        self.slot(feature).as_ref()
    }

    /// Set the raw value for a feature
    pub fn set(&mut self, feature: Feature, value: impl Into<RawValue>) {
        *self.slot_mut(feature) = Some(value.into());
    }

    /// Builder-style variant of [`RawInputs::set`]
    pub fn with(mut self, feature: Feature, value: impl Into<RawValue>) -> Self {
        self.set(feature, value);
        self
    }

    fn slot(&self, feature: Feature) -> &Option<RawValue> {
        match feature {
            Feature::CompanyCode => &self.company_code,
            Feature::ModelCode => &self.model_code,
            Feature::EngineCode => &self.engine_code,
            Feature::CcBattery => &self.cc_battery,
            Feature::Horsepower => &self.horsepower,
            Feature::TopSpeed => &self.top_speed,
            Feature::Perf0To100 => &self.perf_0_100,
            Feature::FuelTypeCode => &self.fuel_type_code,
            Feature::Seats => &self.seats,
            Feature::Torque => &self.torque,
        }
    }

    fn slot_mut(&mut self, feature: Feature) -> &mut Option<RawValue> {
        match feature {
            Feature::CompanyCode => &mut self.company_code,
            Feature::ModelCode => &mut self.model_code,
            Feature::EngineCode => &mut self.engine_code,
            Feature::CcBattery => &mut self.cc_battery,
            Feature::Horsepower => &mut self.horsepower,
            Feature::TopSpeed => &mut self.top_speed,
            Feature::Perf0To100 => &mut self.perf_0_100,
            Feature::FuelTypeCode => &mut self.fuel_type_code,
            Feature::Seats => &mut self.seats,
            Feature::Torque => &mut self.torque,
        }
    }
}

/// A coerced feature value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue {
    Integer(i64),
    Float(f64),
}

impl FeatureValue {
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Integer(i) => i as f64,
            Self::Float(f) => f,
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(v) => write!(f, "{}", v),
        }
    }
}

/// Ten coerced values in submission order
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: [FeatureValue; 10],
}

impl FeatureVector {
    /// Coerce every raw input to its column's declared type.
    ///
    /// Fails on the first field (in submission order) that is missing or
    /// not numeric.
    pub fn coerce(inputs: &RawInputs) -> Result<Self> {
        let mut values = [FeatureValue::Integer(0); 10];
        for feature in Feature::ALL {
            let spec = feature.spec();
            let raw = inputs
                .get(feature)
                .ok_or_else(|| Error::missing_input(spec.column))?;
            values[feature as usize] = coerce_value(spec, raw)?;
        }
        Ok(Self { values })
    }

    /// Value of a single feature
    pub fn get(&self, feature: Feature) -> FeatureValue {
        self.values[feature as usize]
    }

    /// Iterate features with their values in submission order
    pub fn iter(&self) -> impl Iterator<Item = (Feature, FeatureValue)> + '_ {
        Feature::ALL.into_iter().zip(self.values.iter().copied())
    }

    /// Features whose values fall outside the slider bounds
    pub fn out_of_range(&self) -> Vec<Feature> {
        self.iter()
            .filter(|(feature, value)| !feature.spec().in_range(value.as_f64()))
            .map(|(feature, _)| feature)
            .collect()
    }
}

fn coerce_value(spec: &FeatureSpec, raw: &RawValue) -> Result<FeatureValue> {
    let fail = |reason: &str| Error::input_conversion(spec.column, raw.to_string(), reason);

    match (spec.value_type, raw) {
        (ValueType::Integer, RawValue::Number(n)) => {
            if !n.is_finite() {
                return Err(fail("cannot convert a non-finite number to an integer"));
            }
            let truncated = n.trunc();
            // i64::MAX as f64 rounds up to 2^63, which does not fit
            if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
                return Err(fail("integer out of range"));
            }
            Ok(FeatureValue::Integer(truncated as i64))
        }
        (ValueType::Integer, RawValue::Text(s)) => strip_digit_separators(s)
            .and_then(|digits| digits.parse::<i64>().ok())
            .map(FeatureValue::Integer)
            .ok_or_else(|| fail("not an integer")),
        (ValueType::Float, RawValue::Number(n)) => Ok(FeatureValue::Float(*n)),
        (ValueType::Float, RawValue::Text(s)) => strip_digit_separators(s)
            .and_then(|digits| digits.parse::<f64>().ok())
            .map(FeatureValue::Float)
            .ok_or_else(|| fail("not a number")),
        (_, RawValue::Other(_)) => Err(fail("expected a number or numeric string")),
    }
}

/// Trim surrounding whitespace and drop `_` digit separators.
///
/// An underscore is only accepted between two ASCII digits, so `1_000` and
/// `1_000.5` pass while `_5`, `5_` and `1__0` are rejected.
fn strip_digit_separators(text: &str) -> Option<String> {
    let text = text.trim();
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());

    for (i, c) in text.char_indices() {
        if c == '_' {
            let before = i.checked_sub(1).map(|j| bytes[j]);
            let after = bytes.get(i + 1).copied();
            match (before, after) {
                (Some(b), Some(a)) if b.is_ascii_digit() && a.is_ascii_digit() => continue,
                _ => return None,
            }
        }
        out.push(c);
    }
    Some(out)
}
