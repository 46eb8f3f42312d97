use crate::errors::TreeError;

// Validation
pub fn validate_proportion_parameter(value: f64, parameter: &str) -> Result<(), TreeError> {
    validate_float_parameter(value, 0.0, 1.0, parameter)
}

pub fn validate_positive_float_parameter(value: f64, parameter: &str) -> Result<(), TreeError> {
    validate_float_parameter(value, 0.0, f64::INFINITY, parameter)
}

/// Check that `value` lies in the half open range `(min, max]`.
pub fn validate_float_parameter(value: f64, min: f64, max: f64, parameter: &str) -> Result<(), TreeError> {
    if value.is_nan() || value <= min || max < value {
        let ex_msg = format!("real value within range ({}, {}]", min, max);
        Err(TreeError::InvalidConfiguration(
            parameter.to_string(),
            ex_msg,
            value.to_string(),
        ))
    } else {
        Ok(())
    }
}

pub fn validate_int_parameter(value: usize, min: usize, parameter: &str) -> Result<(), TreeError> {
    if value < min {
        Err(TreeError::InvalidConfiguration(
            parameter.to_string(),
            format!("integer greater than or equal to {}", min),
            value.to_string(),
        ))
    } else {
        Ok(())
    }
}
