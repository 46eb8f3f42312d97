pub const DEFAULT_HEIGHT: usize = 5;
pub const DEFAULT_MIN_SPLIT_POINTS: usize = 3;
pub const DEFAULT_TREE_SIZE_PROPORTION: f64 = 0.8;
pub const DEFAULT_INITIAL_PROPORTION: f64 = 0.5;
/// Gains below this are treated as no improvement.
pub const GAIN_EPSILON: f64 = 1e-12;
/// Indentation used per depth level in the structural dump.
pub const DUMP_INDENT: &str = "      ";
