// Modules
pub mod collection;
pub mod config;
pub mod constants;
pub mod data;
pub mod errors;
pub mod experiment;
pub mod node;
pub mod splitter;
pub mod tree;
pub mod utils;

// Individual classes, and functions
pub use collection::PointCollection;
pub use config::{ConfigIO, TreeConfig};
pub use data::{FeatureType, Point, PointId, Schema, Value};
pub use errors::TreeError;
pub use experiment::{run_experiment, Dataset, Evaluation};
pub use tree::{DynamicTree, UpdateCost};
