//! Geolocation: a one-shot position query that may be refused.
//!
//! The orchestrator spawns the lookup at mount and applies whatever comes
//! back when it arrives. A failed lookup never blocks identification.

use crate::error::PermissionError;
use std::fmt;
use std::future::Future;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Parse `"lat,lon"` or `"lat, lon"`.
    pub fn parse(raw: &str) -> Option<Self> {
        let (lat, lon) = raw.split_once(',')?;
        let latitude: f64 = lat.trim().parse().ok()?;
        let longitude: f64 = lon.trim().parse().ok()?;
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return None;
        }
        Some(Self {
            latitude,
            longitude,
        })
    }
}

/// Rendered the way it is sent to the model: `"lat, lon"`.
impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

pub trait GeolocationProvider {
    fn current_position(&self)
        -> impl Future<Output = Result<Coordinates, PermissionError>> + Send;
}

/// A position known up front (CLI flag or `NATUREID_LOCATION`).
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

impl GeolocationProvider for FixedLocation {
    async fn current_position(&self) -> Result<Coordinates, PermissionError> {
        Ok(self.0)
    }
}

/// No positioning source on this device.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsupported;

impl GeolocationProvider for Unsupported {
    async fn current_position(&self) -> Result<Coordinates, PermissionError> {
        Err(PermissionError::Unsupported("Geolocation"))
    }
}

/// Non-fatal advisory shown when the lookup fails.
pub fn advisory_for(error: &PermissionError) -> String {
    match error {
        PermissionError::Unsupported(_) => {
            "Geolocation is not supported on this device. Identification may be less accurate."
                .to_string()
        }
        other => format!(
            "Location error: {}. Identification may be less accurate.",
            other
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_and_without_space() {
        let c = Coordinates::parse("40.4,-3.7").unwrap();
        assert_eq!(c.latitude, 40.4);
        assert_eq!(c.longitude, -3.7);
        assert_eq!(Coordinates::parse("40.4, -3.7"), Some(c));
    }

    #[test]
    fn rejects_out_of_range_and_garbage() {
        assert!(Coordinates::parse("91,0").is_none());
        assert!(Coordinates::parse("0,181").is_none());
        assert!(Coordinates::parse("Madrid").is_none());
    }

    #[test]
    fn display_matches_prompt_format() {
        let c = Coordinates {
            latitude: 40.4,
            longitude: -3.7,
        };
        assert_eq!(c.to_string(), "40.4, -3.7");
    }

    #[tokio::test]
    async fn unsupported_provider_reports_error() {
        let err = Unsupported.current_position().await.unwrap_err();
        assert!(advisory_for(&err).contains("not supported"));
    }

    #[test]
    fn denial_advisory_names_reason() {
        let msg = advisory_for(&PermissionError::Geolocation("User denied Geolocation".into()));
        assert!(msg.contains("User denied Geolocation"));
    }
}
