//! Splitter
//!
//! Gini impurity bookkeeping and the greedy search for the best univariate
//! split over a set of points.
use crate::collection::PointCollection;
use crate::constants::GAIN_EPSILON;
use crate::data::{FeatureType, PointId, Value};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::ops::Sub;

/// Number of positive and negative labels routed to a node.
#[derive(Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct LabelCounts {
    pub positive: usize,
    pub negative: usize,
}

impl LabelCounts {
    pub fn new(positive: usize, negative: usize) -> Self {
        LabelCounts { positive, negative }
    }

    pub fn from_labels<I: IntoIterator<Item = bool>>(labels: I) -> Self {
        let mut counts = LabelCounts::default();
        labels.into_iter().for_each(|l| counts.add(l));
        counts
    }

    #[inline]
    pub fn add(&mut self, label: bool) {
        if label {
            self.positive += 1;
        } else {
            self.negative += 1;
        }
    }

    #[inline]
    pub fn remove(&mut self, label: bool) {
        if label {
            self.positive -= 1;
        } else {
            self.negative -= 1;
        }
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.positive + self.negative
    }

    /// Majority label, ties go to the negative label.
    #[inline]
    pub fn majority(&self) -> bool {
        self.positive > self.negative
    }

    /// At most one label is present. Empty counts are pure.
    #[inline]
    pub fn is_pure(&self) -> bool {
        self.positive == 0 || self.negative == 0
    }

    /// `1 - p_pos² - p_neg²`, zero for empty counts.
    pub fn gini(&self) -> f64 {
        let n = self.total();
        if n == 0 {
            return 0.0;
        }
        let p = self.positive as f64 / n as f64;
        let q = self.negative as f64 / n as f64;
        1.0 - p * p - q * q
    }
}

impl Sub for LabelCounts {
    type Output = LabelCounts;

    fn sub(self, rhs: LabelCounts) -> LabelCounts {
        LabelCounts {
            positive: self.positive - rhs.positive,
            negative: self.negative - rhs.negative,
        }
    }
}

/// Weighted Gini reduction of splitting `parent` into `left` and `right`.
pub fn gini_gain(parent: &LabelCounts, left: &LabelCounts, right: &LabelCounts) -> f64 {
    let n = parent.total() as f64;
    if n == 0.0 {
        return 0.0;
    }
    parent.gini() - (left.total() as f64 / n) * left.gini() - (right.total() as f64 / n) * right.gini()
}

/// Test applied to a single feature.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Debug)]
pub enum SplitKind {
    /// Left if `value <= threshold`.
    Numeric(f64),
    /// Left if `value == category`.
    Categorical(u32),
}

/// Rule at an internal node routing a point left or right.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Debug)]
pub struct Split {
    pub feature: usize,
    pub kind: SplitKind,
}

impl Split {
    pub fn numeric(feature: usize, threshold: f64) -> Self {
        Split {
            feature,
            kind: SplitKind::Numeric(threshold),
        }
    }

    pub fn categorical(feature: usize, category: u32) -> Self {
        Split {
            feature,
            kind: SplitKind::Categorical(category),
        }
    }

    /// Whether a feature vector routes left. Missing features, values of the
    /// wrong type and unseen categories all route right.
    #[inline]
    pub fn goes_left(&self, features: &[Value]) -> bool {
        match (self.kind, features.get(self.feature)) {
            (SplitKind::Numeric(threshold), Some(Value::Numeric(v))) => *v <= threshold,
            (SplitKind::Categorical(category), Some(Value::Categorical(c))) => *c == category,
            _ => false,
        }
    }
}

impl Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            SplitKind::Numeric(threshold) => write!(f, "x{} <= {}", self.feature, threshold),
            SplitKind::Categorical(category) => write!(f, "x{} == #{}", self.feature, category),
        }
    }
}

/// Best split found for a set of points, with the label counts of each side.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitInfo {
    pub split: Split,
    pub split_gain: f64,
    pub left_counts: LabelCounts,
    pub right_counts: LabelCounts,
}

/// Exhaustive Gini split search over every feature.
#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
pub struct GiniSplitter {
    /// Minimum number of points on each side of a split.
    pub min_split_points: usize,
}

impl GiniSplitter {
    pub fn new(min_split_points: usize) -> Self {
        GiniSplitter { min_split_points }
    }

    /// Find the split maximizing the Gini reduction over `subset`.
    ///
    /// Only strictly better candidates replace the current best, and
    /// candidates are scanned by ascending feature then ascending value, so
    /// ties resolve to the lowest feature index and lowest threshold.
    /// Returns `None` when no split leaves `min_split_points` on each side
    /// with a positive gain.
    pub fn best_split(&self, points: &PointCollection, subset: &[PointId]) -> Option<SplitInfo> {
        let mut best: Option<SplitInfo> = None;
        for feature in 0..points.schema().n_features() {
            let candidate = match points.schema().feature_type(feature) {
                Some(FeatureType::Numeric) => self.best_numeric_split(points, subset, feature),
                Some(FeatureType::Boolean) | Some(FeatureType::Categorical) => {
                    self.best_categorical_split(points, subset, feature)
                }
                None => None,
            };
            if let Some(c) = candidate {
                if best.as_ref().map_or(true, |b| c.split_gain > b.split_gain + GAIN_EPSILON) {
                    best = Some(c);
                }
            }
        }
        best
    }

    #[inline]
    fn is_admissible(&self, left: &LabelCounts, right: &LabelCounts) -> bool {
        left.total() >= self.min_split_points && right.total() >= self.min_split_points
    }

    fn consider(&self, best: &mut Option<SplitInfo>, split: Split, parent: &LabelCounts, left: LabelCounts) {
        let right = *parent - left;
        if !self.is_admissible(&left, &right) {
            return;
        }
        let split_gain = gini_gain(parent, &left, &right);
        let threshold = best.as_ref().map_or(GAIN_EPSILON, |b| b.split_gain + GAIN_EPSILON);
        if split_gain > threshold {
            *best = Some(SplitInfo {
                split,
                split_gain,
                left_counts: left,
                right_counts: right,
            });
        }
    }

    fn best_numeric_split(&self, points: &PointCollection, subset: &[PointId], feature: usize) -> Option<SplitInfo> {
        let thresholds = points.candidate_thresholds(feature, subset);
        if thresholds.is_empty() {
            return None;
        }
        let mut values: Vec<(f64, bool)> = subset
            .iter()
            .filter_map(|id| points.get(*id))
            .filter_map(|p| p.features[feature].as_f64().map(|v| (v, p.label)))
            .collect();
        values.sort_by(|a, b| a.0.total_cmp(&b.0));
        let parent = LabelCounts::from_labels(values.iter().map(|(_, l)| *l));

        // Sweep the sorted values once, moving points left as the threshold grows.
        let mut best = None;
        let mut left = LabelCounts::default();
        let mut cursor = 0;
        for threshold in thresholds {
            while cursor < values.len() && values[cursor].0 <= threshold {
                left.add(values[cursor].1);
                cursor += 1;
            }
            self.consider(&mut best, Split::numeric(feature, threshold), &parent, left);
        }
        best
    }

    fn best_categorical_split(
        &self,
        points: &PointCollection,
        subset: &[PointId],
        feature: usize,
    ) -> Option<SplitInfo> {
        let mut per_category: HashMap<u32, LabelCounts> = HashMap::new();
        let mut parent = LabelCounts::default();
        for p in subset.iter().filter_map(|id| points.get(*id)) {
            if let Some(c) = p.features[feature].as_category() {
                per_category.entry(c).or_default().add(p.label);
                parent.add(p.label);
            }
        }
        let mut categories = points.candidate_categories(feature, subset);
        // Both sides of a boolean split are the same partition, test `== 1` only.
        if points.schema().feature_type(feature) == Some(FeatureType::Boolean) {
            categories.retain(|c| *c == 1);
        }

        let mut best = None;
        for category in categories {
            let left = per_category.get(&category).copied().unwrap_or_default();
            self.consider(&mut best, Split::categorical(feature, category), &parent, left);
        }
        best
    }
}
