//! Data
//!
//! Feature values, labeled points and the schema every point must follow.
use crate::errors::TreeError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Type of a feature column, inferred once at load time and fixed thereafter.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum FeatureType {
    /// Two valued column, stored as `Value::Categorical(0)` or `Value::Categorical(1)`.
    Boolean,
    /// Symbolic column, each symbol interned to a `u32`.
    Categorical,
    /// Real valued column.
    Numeric,
}

/// A single feature value.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Debug)]
pub enum Value {
    Numeric(f64),
    Categorical(u32),
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Numeric(v) => Some(*v),
            Value::Categorical(_) => None,
        }
    }

    pub fn as_category(&self) -> Option<u32> {
        match self {
            Value::Categorical(c) => Some(*c),
            Value::Numeric(_) => None,
        }
    }

    /// Check if the value can be stored in a column of type `feature_type`.
    pub fn conforms_to(&self, feature_type: FeatureType) -> bool {
        match (self, feature_type) {
            (Value::Numeric(v), FeatureType::Numeric) => !v.is_nan(),
            (Value::Categorical(c), FeatureType::Boolean) => *c <= 1,
            (Value::Categorical(_), FeatureType::Categorical) => true,
            _ => false,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Numeric(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Categorical(u32::from(v))
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Numeric(v) => write!(f, "{}", v),
            Value::Categorical(c) => write!(f, "#{}", c),
        }
    }
}

/// Identity of a point inside a `PointCollection`.
///
/// Identity is by handle, never by value: two points with identical
/// features get distinct ids.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct PointId(pub usize);

impl Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// An immutable labeled feature vector.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct Point {
    pub features: Vec<Value>,
    pub label: bool,
}

impl Point {
    pub fn new(features: Vec<Value>, label: bool) -> Self {
        Point { features, label }
    }

    /// Convenience constructor for all numeric points.
    pub fn numeric(features: &[f64], label: bool) -> Self {
        Point {
            features: features.iter().map(|v| Value::Numeric(*v)).collect(),
            label,
        }
    }
}

/// The fixed column types of a point collection.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct Schema {
    pub types: Vec<FeatureType>,
}

impl Schema {
    pub fn new(types: Vec<FeatureType>) -> Self {
        Schema { types }
    }

    /// A schema of `n_features` numeric columns.
    pub fn numeric(n_features: usize) -> Self {
        Schema {
            types: vec![FeatureType::Numeric; n_features],
        }
    }

    pub fn n_features(&self) -> usize {
        self.types.len()
    }

    pub fn feature_type(&self, feature: usize) -> Option<FeatureType> {
        self.types.get(feature).copied()
    }

    /// Check a feature vector against the schema.
    pub fn validate(&self, features: &[Value]) -> Result<(), TreeError> {
        if features.len() != self.types.len() {
            return Err(TreeError::SchemaMismatch(format!(
                "expected {} features, found {}",
                self.types.len(),
                features.len()
            )));
        }
        for (i, (value, feature_type)) in features.iter().zip(self.types.iter()).enumerate() {
            if !value.conforms_to(*feature_type) {
                return Err(TreeError::SchemaMismatch(format!(
                    "feature {} holds {:?}, which is not a valid {:?} value",
                    i, value, feature_type
                )));
            }
        }
        Ok(())
    }
}
