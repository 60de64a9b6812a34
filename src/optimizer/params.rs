//! Parameter value checks.
//!
//! Parameters arrive as `f64` (from configuration maps or grid search) and
//! are narrowed here. Each helper returns
//! [`ScheduleError::InvalidParameter`] on a value the algorithm cannot use.

use crate::error::{Result, ScheduleError};

/// Finite value in `[0, 1]`.
pub(crate) fn unit_interval(key: &str, value: f64) -> Result<f64> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ScheduleError::invalid_parameter(key, value, "must lie in [0, 1]"))
    }
}

/// Finite value `>= 0`.
pub(crate) fn non_negative(key: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ScheduleError::invalid_parameter(key, value, "must be finite and non-negative"))
    }
}

/// Finite value `> 0`.
pub(crate) fn positive(key: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ScheduleError::invalid_parameter(key, value, "must be finite and positive"))
    }
}

pub(crate) fn finite(key: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ScheduleError::invalid_parameter(key, value, "must be finite"))
    }
}

/// Non-negative integral value that fits in `u32`.
pub(crate) fn count(key: &str, value: f64) -> Result<u32> {
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64 {
        Ok(value as u32)
    } else {
        Err(ScheduleError::invalid_parameter(key, value, "must be a non-negative integer"))
    }
}

/// Integral value `>= 1`.
pub(crate) fn positive_count(key: &str, value: f64) -> Result<u32> {
    match count(key, value)? {
        0 => Err(ScheduleError::invalid_parameter(key, value, "must be at least 1")),
        n => Ok(n),
    }
}

/// Random seed: a non-negative integer exactly representable as `f64`.
pub(crate) fn seed(key: &str, value: f64) -> Result<u64> {
    const MAX_EXACT: f64 = (1u64 << 53) as f64;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= MAX_EXACT {
        Ok(value as u64)
    } else {
        Err(ScheduleError::invalid_parameter(key, value, "must be a non-negative integer seed"))
    }
}
