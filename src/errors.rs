//! Errors
//!
//! Custom error types used throughout the `fudyadt` crate.
use crate::data::PointId;
use thiserror::Error;

/// Errors that can occur while maintaining a dynamic tree.
#[derive(Debug, Error, PartialEq)]
pub enum TreeError {
    /// Feature vector arity or type disagrees with the collection's schema.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),
    /// The point is unknown, or was already removed.
    #[error("Point {0} is not present in the tree.")]
    NotFound(PointId),
    /// First value is the name of the parameter, second is expected, third is what was passed.
    #[error("Invalid parameter value passed for {0}, expected {1} but {2} provided.")]
    InvalidConfiguration(String, String, String),
    /// Unable to write configuration to file.
    #[error("Unable to write configuration to file: {0}")]
    UnableToWrite(String),
    /// Unable to read configuration from file.
    #[error("Unable to read configuration from a file {0}")]
    UnableToRead(String),
}
