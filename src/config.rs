//! Tree Configuration
//!
//! Options recognized by the tree and the experiment driver, their defaults,
//! validation, and JSON persistence of the configuration itself.
use crate::constants::{
    DEFAULT_HEIGHT, DEFAULT_INITIAL_PROPORTION, DEFAULT_MIN_SPLIT_POINTS, DEFAULT_TREE_SIZE_PROPORTION,
};
use crate::errors::TreeError;
use crate::utils::{validate_int_parameter, validate_positive_float_parameter, validate_proportion_parameter};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_height() -> usize {
    DEFAULT_HEIGHT
}
fn default_min_split_points() -> usize {
    DEFAULT_MIN_SPLIT_POINTS
}
fn default_tree_size_proportion() -> f64 {
    DEFAULT_TREE_SIZE_PROPORTION
}
fn default_initial_proportion() -> f64 {
    DEFAULT_INITIAL_PROPORTION
}

/// Configuration for a `DynamicTree` and the experiment driving it.
#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
pub struct TreeConfig {
    /// Maximum depth of any node, the root has depth 0.
    #[serde(default = "default_height")]
    pub height: usize,
    /// Minimum number of points on each side of a split.
    /// Nodes with fewer than twice this many points are leaves.
    #[serde(default = "default_min_split_points")]
    pub min_split_points: usize,
    /// Fraction of the loaded points used to build and update the tree.
    #[serde(default = "default_tree_size_proportion")]
    pub tree_size_proportion: f64,
    /// Build on a prefix of the training points, then insert the rest one at a time.
    #[serde(default)]
    pub dynamic_mode: bool,
    /// Fraction of the training points used by the initial build in dynamic mode.
    #[serde(default = "default_initial_proportion")]
    pub initial_proportion: f64,
    /// In dynamic mode, predict each test point, insert it, then remove the
    /// oldest live point.
    #[serde(default)]
    pub sliding_window: bool,
    /// Rebuild an internal node once `dirty_count >= rebuild_ratio * point_count`.
    #[serde(default)]
    pub rebuild_ratio: Option<f64>,
    /// Shuffle the rows with this seed before splitting train and test.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig {
            height: DEFAULT_HEIGHT,
            min_split_points: DEFAULT_MIN_SPLIT_POINTS,
            tree_size_proportion: DEFAULT_TREE_SIZE_PROPORTION,
            dynamic_mode: false,
            initial_proportion: DEFAULT_INITIAL_PROPORTION,
            sliding_window: false,
            rebuild_ratio: None,
            seed: None,
        }
    }
}

impl TreeConfig {
    /// Reject any value outside its documented range.
    pub fn validate(&self) -> Result<(), TreeError> {
        validate_int_parameter(self.height, 1, "height")?;
        validate_int_parameter(self.min_split_points, 1, "min_split_points")?;
        validate_proportion_parameter(self.tree_size_proportion, "tree_size_proportion")?;
        validate_proportion_parameter(self.initial_proportion, "initial_proportion")?;
        if let Some(ratio) = self.rebuild_ratio {
            validate_positive_float_parameter(ratio, "rebuild_ratio")?;
        }
        Ok(())
    }

    // Set methods for parameters

    /// Set the maximum height of the tree.
    pub fn set_height(mut self, height: usize) -> Self {
        self.height = height;
        self
    }

    /// Set the minimum number of points on each side of a split.
    pub fn set_min_split_points(mut self, min_split_points: usize) -> Self {
        self.min_split_points = min_split_points;
        self
    }

    /// Set the fraction of points used for training.
    pub fn set_tree_size_proportion(mut self, tree_size_proportion: f64) -> Self {
        self.tree_size_proportion = tree_size_proportion;
        self
    }

    /// Set whether training points are replayed through `insert`.
    pub fn set_dynamic_mode(mut self, dynamic_mode: bool) -> Self {
        self.dynamic_mode = dynamic_mode;
        self
    }

    /// Set the fraction of training points used by the initial build.
    pub fn set_initial_proportion(mut self, initial_proportion: f64) -> Self {
        self.initial_proportion = initial_proportion;
        self
    }

    /// Set the sliding window evaluation loop.
    pub fn set_sliding_window(mut self, sliding_window: bool) -> Self {
        self.sliding_window = sliding_window;
        self
    }

    /// Set the dirty counter ratio triggering a subtree rebuild.
    pub fn set_rebuild_ratio(mut self, rebuild_ratio: Option<f64>) -> Self {
        self.rebuild_ratio = rebuild_ratio;
        self
    }

    /// Set the shuffling seed.
    pub fn set_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
}

/// IO
pub trait ConfigIO: Serialize + DeserializeOwned + Sized {
    /// Save a configuration as a json object to a file.
    ///
    /// * `path` - Path to save the configuration.
    fn save_config<P: AsRef<Path>>(&self, path: P) -> Result<(), TreeError> {
        fs::write(path, self.json_dump()?).map_err(|e| TreeError::UnableToWrite(e.to_string()))
    }

    /// Dump a configuration as a json object.
    fn json_dump(&self) -> Result<String, TreeError> {
        serde_json::to_string(self).map_err(|e| TreeError::UnableToWrite(e.to_string()))
    }

    /// Load a configuration from a json string.
    fn from_json(json_str: &str) -> Result<Self, TreeError> {
        serde_json::from_str::<Self>(json_str).map_err(|e| TreeError::UnableToRead(e.to_string()))
    }

    /// Load a configuration from a path to a json file.
    fn load_config<P: AsRef<Path>>(path: P) -> Result<Self, TreeError> {
        let json_str = fs::read_to_string(path).map_err(|e| TreeError::UnableToRead(e.to_string()))?;
        Self::from_json(&json_str)
    }
}

impl ConfigIO for TreeConfig {}
