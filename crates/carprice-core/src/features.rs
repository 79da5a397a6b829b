//! Feature schema of the pricing model
//!
//! The column names must match the training frame byte for byte; the model
//! resolves inputs by name, not by position.

use serde::Serialize;

/// One of the ten vehicle attributes the model consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    CompanyCode,
    ModelCode,
    EngineCode,
    CcBattery,
    Horsepower,
    TopSpeed,
    Perf0To100,
    FuelTypeCode,
    Seats,
    Torque,
}

impl Feature {
    /// All features in submission order
    pub const ALL: [Feature; 10] = [
        Feature::CompanyCode,
        Feature::ModelCode,
        Feature::EngineCode,
        Feature::CcBattery,
        Feature::Horsepower,
        Feature::TopSpeed,
        Feature::Perf0To100,
        Feature::FuelTypeCode,
        Feature::Seats,
        Feature::Torque,
    ];

    /// Schema entry for this feature
    pub fn spec(self) -> &'static FeatureSpec {
        &FEATURES[self as usize]
    }

    /// Form field key
    pub fn key(self) -> &'static str {
        self.spec().key
    }

    /// Training column name
    pub fn column(self) -> &'static str {
        self.spec().column
    }

    /// Look up a feature by its form field key
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }
}

/// How the model treats a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Ordered quantity compared against split thresholds
    Continuous,
    /// Discrete code compared by level membership
    Categorical,
}

/// Numeric type a raw input is coerced to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Integer,
    Float,
}

/// Static description of a feature: column name, type and UI slider bounds
#[derive(Debug, Clone, Serialize)]
pub struct FeatureSpec {
    /// Form field key
    pub key: &'static str,

    /// Column name in the training frame
    pub column: &'static str,

    /// Human-readable slider label
    pub label: &'static str,

    pub kind: ColumnKind,

    pub value_type: ValueType,

    /// Slider minimum
    pub min: f64,

    /// Slider maximum
    pub max: f64,

    /// Slider step
    pub step: f64,
}

impl FeatureSpec {
    /// Whether `value` lies within the slider bounds
    pub fn in_range(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Slider default: the midpoint snapped down to the step grid
    pub fn default_value(&self) -> f64 {
        let mid = (self.min + self.max) / 2.0;
        let steps = ((mid - self.min) / self.step).floor();
        // Round away float noise from fractional steps like 0.1
        ((self.min + steps * self.step) * 1e6).round() / 1e6
    }
}

/// Feature schema in submission order. Indexed by `Feature as usize`.
pub const FEATURES: [FeatureSpec; 10] = [
    FeatureSpec {
        key: "company_code",
        column: "Car Company Names",
        label: "Car Company (encoded)",
        kind: ColumnKind::Continuous,
        value_type: ValueType::Integer,
        min: 0.0,
        max: 15.0,
        step: 1.0,
    },
    FeatureSpec {
        key: "model_code",
        column: "Cars Names",
        label: "Car Model (encoded)",
        kind: ColumnKind::Continuous,
        value_type: ValueType::Integer,
        min: 0.0,
        max: 1000.0,
        step: 1.0,
    },
    FeatureSpec {
        key: "engine_code",
        column: "Engines",
        label: "Engine Type (encoded)",
        kind: ColumnKind::Categorical,
        value_type: ValueType::Integer,
        min: 0.0,
        max: 20.0,
        step: 1.0,
    },
    FeatureSpec {
        key: "cc_battery",
        column: "CC/Battery Capacity",
        label: "CC/Battery Capacity (cc/kWh)",
        kind: ColumnKind::Continuous,
        value_type: ValueType::Float,
        min: 0.0,
        max: 7000.0,
        step: 10.0,
    },
    FeatureSpec {
        key: "horsepower",
        column: "HorsePower",
        label: "HorsePower (HP)",
        kind: ColumnKind::Continuous,
        value_type: ValueType::Float,
        min: 0.0,
        max: 1200.0,
        step: 1.0,
    },
    FeatureSpec {
        key: "top_speed",
        column: "Total Speed",
        label: "Top Speed (km/h)",
        kind: ColumnKind::Continuous,
        value_type: ValueType::Float,
        min: 0.0,
        max: 350.0,
        step: 1.0,
    },
    FeatureSpec {
        key: "perf_0_100",
        column: "Performance(0 - 100 )KM/H",
        label: "0-100 km/h (seconds)",
        kind: ColumnKind::Continuous,
        value_type: ValueType::Float,
        min: 0.0,
        max: 20.0,
        step: 0.1,
    },
    FeatureSpec {
        key: "fuel_type_code",
        column: "Fuel Types",
        label: "Fuel Type (encoded)",
        kind: ColumnKind::Categorical,
        value_type: ValueType::Integer,
        min: 0.0,
        max: 5.0,
        step: 1.0,
    },
    FeatureSpec {
        key: "seats",
        column: "Seats",
        label: "Number of Seats",
        kind: ColumnKind::Continuous,
        value_type: ValueType::Integer,
        min: 1.0,
        max: 8.0,
        step: 1.0,
    },
    FeatureSpec {
        key: "torque",
        column: "Torque",
        label: "Torque (Nm)",
        kind: ColumnKind::Continuous,
        value_type: ValueType::Float,
        min: 0.0,
        max: 1500.0,
        step: 1.0,
    },
];
