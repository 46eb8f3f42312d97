//! Point Collection
//!
//! An indexed, mutable container of labeled points. Besides the points
//! themselves, it keeps a value histogram per feature column, so split
//! candidates over the whole collection can be enumerated without rescanning.
use crate::data::{FeatureType, Point, PointId, Schema, Value};
use crate::errors::TreeError;
use hashbrown::HashMap;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Total order over numeric values, so they can key a `BTreeMap`.
#[derive(Clone, Copy, Debug)]
struct SortKey(f64);

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey {}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Value -> count histogram of a single feature column.
#[derive(Clone, Debug, Default)]
pub struct FeatureSummary {
    numeric: BTreeMap<SortKey, usize>,
    categorical: HashMap<u32, usize>,
}

impl FeatureSummary {
    fn add(&mut self, value: Value) {
        match value {
            // Adding 0.0 folds -0.0 into 0.0.
            Value::Numeric(v) => *self.numeric.entry(SortKey(v + 0.0)).or_insert(0) += 1,
            Value::Categorical(c) => *self.categorical.entry(c).or_insert(0) += 1,
        }
    }

    fn remove(&mut self, value: Value) {
        match value {
            Value::Numeric(v) => {
                let key = SortKey(v + 0.0);
                if let Some(c) = self.numeric.get_mut(&key) {
                    *c -= 1;
                    if *c == 0 {
                        self.numeric.remove(&key);
                    }
                }
            }
            Value::Categorical(cat) => {
                if let Some(c) = self.categorical.get_mut(&cat) {
                    *c -= 1;
                    if *c == 0 {
                        self.categorical.remove(&cat);
                    }
                }
            }
        }
    }

    /// Number of points holding `value` in this column.
    pub fn count(&self, value: Value) -> usize {
        match value {
            Value::Numeric(v) => self.numeric.get(&SortKey(v + 0.0)).copied().unwrap_or(0),
            Value::Categorical(c) => self.categorical.get(&c).copied().unwrap_or(0),
        }
    }

    pub fn distinct_count(&self) -> usize {
        self.numeric.len() + self.categorical.len()
    }

    /// Distinct numeric values, ascending.
    pub fn numeric_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.numeric.keys().map(|k| k.0)
    }

    /// Distinct categories, ascending.
    pub fn categories(&self) -> Vec<u32> {
        let mut cats: Vec<u32> = self.categorical.keys().copied().collect();
        cats.sort_unstable();
        cats
    }
}

/// Midpoint of two consecutive distinct values, kept strictly below `b`.
fn midpoint(a: f64, b: f64) -> f64 {
    let mid = a / 2.0 + b / 2.0;
    if mid < b {
        mid
    } else {
        a
    }
}

/// Mutable set of labeled points with stable identities.
#[derive(Clone, Debug)]
pub struct PointCollection {
    schema: Schema,
    points: HashMap<PointId, Point>,
    summaries: Vec<FeatureSummary>,
    next_id: usize,
}

impl PointCollection {
    pub fn new(schema: Schema) -> Self {
        let summaries = vec![FeatureSummary::default(); schema.n_features()];
        PointCollection {
            schema,
            points: HashMap::new(),
            summaries,
            next_id: 0,
        }
    }

    /// Create a collection and insert every point, in order.
    pub fn from_points<I>(schema: Schema, points: I) -> Result<Self, TreeError>
    where
        I: IntoIterator<Item = Point>,
    {
        let mut collection = PointCollection::new(schema);
        for point in points {
            collection.insert(point)?;
        }
        Ok(collection)
    }

    /// Add a point, returning its new identity.
    pub fn insert(&mut self, point: Point) -> Result<PointId, TreeError> {
        self.schema.validate(&point.features)?;
        for (summary, value) in self.summaries.iter_mut().zip(point.features.iter()) {
            summary.add(*value);
        }
        let id = PointId(self.next_id);
        self.next_id += 1;
        self.points.insert(id, point);
        Ok(id)
    }

    /// Remove a point, handing it back to the caller.
    pub fn remove(&mut self, id: PointId) -> Result<Point, TreeError> {
        let point = self.points.remove(&id).ok_or(TreeError::NotFound(id))?;
        for (summary, value) in self.summaries.iter_mut().zip(point.features.iter()) {
            summary.remove(*value);
        }
        Ok(point)
    }

    pub fn get(&self, id: PointId) -> Option<&Point> {
        self.points.get(&id)
    }

    pub fn contains(&self, id: PointId) -> bool {
        self.points.contains_key(&id)
    }

    pub fn feature_value(&self, id: PointId, feature: usize) -> Option<Value> {
        self.points.get(&id).and_then(|p| p.features.get(feature).copied())
    }

    pub fn label(&self, id: PointId) -> Option<bool> {
        self.points.get(&id).map(|p| p.label)
    }

    /// All live ids, ascending.
    pub fn ids(&self) -> Vec<PointId> {
        let mut ids: Vec<PointId> = self.points.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn summary(&self, feature: usize) -> Option<&FeatureSummary> {
        self.summaries.get(feature)
    }

    /// Sorted midpoints between consecutive distinct values of a numeric
    /// feature, restricted to `subset`. Non numeric features have none.
    ///
    /// `subset` is expected to hold distinct ids; when it covers the whole
    /// collection the column histogram is used instead of a scan.
    pub fn candidate_thresholds(&self, feature: usize, subset: &[PointId]) -> Vec<f64> {
        if self.schema.feature_type(feature) != Some(FeatureType::Numeric) {
            return Vec::new();
        }
        let values: Vec<f64> = if subset.len() == self.points.len() {
            self.summaries[feature].numeric_values().collect()
        } else {
            let mut values: Vec<f64> = subset
                .iter()
                .filter_map(|id| self.feature_value(*id, feature))
                .filter_map(|v| v.as_f64())
                .map(|v| v + 0.0)
                .collect();
            values.sort_by(|a, b| a.total_cmp(b));
            values.dedup();
            values
        };
        values.windows(2).map(|w| midpoint(w[0], w[1])).collect()
    }

    /// Distinct categories of a categorical or boolean feature within
    /// `subset`, ascending.
    pub fn candidate_categories(&self, feature: usize, subset: &[PointId]) -> Vec<u32> {
        match self.schema.feature_type(feature) {
            Some(FeatureType::Categorical) | Some(FeatureType::Boolean) => (),
            _ => return Vec::new(),
        }
        if subset.len() == self.points.len() {
            return self.summaries[feature].categories();
        }
        let mut cats: Vec<u32> = subset
            .iter()
            .filter_map(|id| self.feature_value(*id, feature))
            .filter_map(|v| v.as_category())
            .collect();
        cats.sort_unstable();
        cats.dedup();
        cats
    }
}
