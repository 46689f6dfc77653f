//! Domain primitives for searches and their owners.
//!
//! Newtype IDs keep search and user identifiers from being mixed up, and
//! [`Coordinate`] carries a latitude/longitude pair that has already been
//! range-checked.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Unique identifier of a stored search.
///
/// # Examples
///
/// ```rust
/// use landsat_explorer::domain::SearchId;
///
/// let id = SearchId::new(7);
/// assert_eq!(id.value(), 7);
/// assert_eq!(id.to_string(), "7");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SearchId(i32);

impl SearchId {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for SearchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for SearchId {
    fn from(id: i32) -> Self {
        Self::new(id)
    }
}

impl From<SearchId> for i32 {
    fn from(id: SearchId) -> Self {
        id.0
    }
}

/// Identifier of the user that owns searches.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(i32);

impl UserId {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for UserId {
    fn from(id: i32) -> Self {
        Self::new(id)
    }
}

impl From<UserId> for i32 {
    fn from(id: UserId) -> Self {
        id.0
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    #[error("Latitude must be a finite number between -90 and 90, got {0}")]
    Latitude(f64),

    #[error("Longitude must be a finite number between -180 and 180, got {0}")]
    Longitude(f64),
}

/// A WGS84 point with latitude in [-90, 90] and longitude in [-180, 180].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::Latitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::Longitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Axis-aligned box of `half_extent` degrees around the point, clamped to
    /// valid ranges. Returned as `(lower_left, upper_right)`.
    #[must_use]
    pub fn bounding_box(&self, half_extent: f64) -> (Self, Self) {
        let lower_left = Self {
            latitude: (self.latitude - half_extent).max(-90.0),
            longitude: (self.longitude - half_extent).max(-180.0),
        };
        let upper_right = Self {
            latitude: (self.latitude + half_extent).min(90.0),
            longitude: (self.longitude + half_extent).min(180.0),
        };
        (lower_left, upper_right)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_conversions() {
        let id = SearchId::new(42);
        assert_eq!(i32::from(id), 42);
        assert_eq!(SearchId::from(42), id);

        let user = UserId::new(3);
        assert_eq!(user.to_string(), "3");
        assert_eq!(serde_json::to_string(&user).unwrap(), "3");
    }

    #[test]
    fn coordinate_accepts_boundaries() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
        assert!(Coordinate::new(45.0, -93.0).is_ok());
    }

    #[test]
    fn coordinate_rejects_out_of_range_and_nan() {
        assert_eq!(
            Coordinate::new(90.5, 0.0),
            Err(CoordinateError::Latitude(90.5))
        );
        assert_eq!(
            Coordinate::new(0.0, -180.1),
            Err(CoordinateError::Longitude(-180.1))
        );
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn bounding_box_is_clamped() {
        let point = Coordinate::new(89.99, 179.99).unwrap();
        let (ll, ur) = point.bounding_box(0.05);
        assert!((ll.latitude() - 89.94).abs() < 1e-9);
        assert!((ur.latitude() - 90.0).abs() < f64::EPSILON);
        assert!((ur.longitude() - 180.0).abs() < f64::EPSILON);
    }
}
