//! Location fixes reported by the device

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// Most recent location reported by the platform's location provider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
    /// Horizontal accuracy in meters
    pub accuracy: f64,
    /// When the fix was taken, in milliseconds since the Unix epoch
    pub time_ms: i64,
}

impl LocationFix {
    /// Creates a fix, rejecting coordinates outside the valid ranges
    pub fn new(
        latitude: f64,
        longitude: f64,
        accuracy: f64,
        time_ms: i64,
    ) -> Result<Self, DomainError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(DomainError::ValidationFailed(format!(
                "latitude out of range: {latitude}"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(DomainError::ValidationFailed(format!(
                "longitude out of range: {longitude}"
            )));
        }
        if accuracy.is_nan() || accuracy < 0.0 {
            return Err(DomainError::ValidationFailed(format!(
                "accuracy must be non-negative: {accuracy}"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
            accuracy,
            time_ms,
        })
    }

    /// True if the fix is no older than `max_age_ms` at `now_ms`
    pub fn is_fresh(&self, now_ms: i64, max_age_ms: i64) -> bool {
        now_ms - self.time_ms <= max_age_ms
    }

    /// Latitude, longitude and accuracy as audit log field values
    pub fn to_coordinates(&self) -> (String, String, String) {
        (
            self.latitude.to_string(),
            self.longitude.to_string(),
            self.accuracy.to_string(),
        )
    }
}
