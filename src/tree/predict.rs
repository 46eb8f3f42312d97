//! Tree Prediction Methods
//!
//! Read-only root to leaf walks. Any number of predictions may run at once,
//! but never alongside `insert` or `remove`.
use super::tree::DynamicTree;
use crate::data::Value;
use crate::node::NodeId;
use rayon::prelude::*;

impl DynamicTree {
    /// Majority label of the leaf the features route to.
    ///
    /// Never fails: a feature that is missing, of the wrong type, or an
    /// unseen category routes right.
    pub fn predict(&self, features: &[Value]) -> bool {
        self.nodes[&self.predict_leaf(features)].label()
    }

    /// Leaf the features route to.
    pub fn predict_leaf(&self, features: &[Value]) -> NodeId {
        self.walk(features).last().unwrap_or(self.root)
    }

    /// Predict every row, optionally on the rayon thread pool.
    pub fn predict_batch(&self, rows: &[Vec<Value>], parallel: bool) -> Vec<bool> {
        if parallel {
            rows.par_iter().map(|row| self.predict(row)).collect()
        } else {
            rows.iter().map(|row| self.predict(row)).collect()
        }
    }
}
