//! Longitude/latitude bounding boxes.

use std::fmt;

use crate::error::GridError;

/// Closed longitude/latitude rectangle.
///
/// Longitudes are compared after wrapping into `[-180, 180)`, so a grid stored
/// in `0..360` selects the same cells as one stored in `-180..180`. The
/// [`Default`] box is the Southern Ocean sea-ice belt: longitude `[-180, 180]`,
/// latitude `[-80, -50]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    lon_min: f64,
    lon_max: f64,
    lat_min: f64,
    lat_max: f64,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            lon_min: -180.0,
            lon_max: 180.0,
            lat_min: -80.0,
            lat_max: -50.0,
        }
    }
}

impl BoundingBox {
    /// Create a bounding box.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidBoundingBox`] if a minimum exceeds its
    /// maximum, a limit is not finite, or a latitude lies outside `[-90, 90]`.
    pub fn new(lon_min: f64, lon_max: f64, lat_min: f64, lat_max: f64) -> Result<Self, GridError> {
        let limits = [lon_min, lon_max, lat_min, lat_max];
        if limits.iter().any(|v| !v.is_finite()) {
            return Err(GridError::InvalidBoundingBox {
                reason: "limits must be finite".to_string(),
            });
        }
        if lon_min > lon_max {
            return Err(GridError::InvalidBoundingBox {
                reason: format!("lon_min {lon_min} > lon_max {lon_max}"),
            });
        }
        if lat_min > lat_max {
            return Err(GridError::InvalidBoundingBox {
                reason: format!("lat_min {lat_min} > lat_max {lat_max}"),
            });
        }
        if lat_min < -90.0 || lat_max > 90.0 {
            return Err(GridError::InvalidBoundingBox {
                reason: format!("latitude range [{lat_min}, {lat_max}] exceeds [-90, 90]"),
            });
        }
        Ok(Self {
            lon_min,
            lon_max,
            lat_min,
            lat_max,
        })
    }

    /// Build from a `[lon_min, lon_max, lat_min, lat_max]` array.
    pub fn from_array(limits: [f64; 4]) -> Result<Self, GridError> {
        Self::new(limits[0], limits[1], limits[2], limits[3])
    }

    /// Whether the point lies inside the box (edges included).
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        if lon.is_nan() || lat.is_nan() {
            return false;
        }
        let lon = wrap_longitude(lon);
        let lon_ok = (self.lon_min <= lon && lon <= self.lon_max)
            || (self.lon_max >= 180.0 && lon + 360.0 <= self.lon_max);
        lon_ok && self.lat_min <= lat && lat <= self.lat_max
    }

    /// Minimum longitude.
    pub fn lon_min(&self) -> f64 {
        self.lon_min
    }

    /// Maximum longitude.
    pub fn lon_max(&self) -> f64 {
        self.lon_max
    }

    /// Minimum latitude.
    pub fn lat_min(&self) -> f64 {
        self.lat_min
    }

    /// Maximum latitude.
    pub fn lat_max(&self) -> f64 {
        self.lat_max
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lon [{}, {}] lat [{}, {}]",
            self.lon_min, self.lon_max, self.lat_min, self.lat_max
        )
    }
}

/// Wrap a longitude into `[-180, 180)`.
pub fn wrap_longitude(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_box() {
        let b = BoundingBox::default();
        assert_eq!(b.lon_min(), -180.0);
        assert_eq!(b.lat_max(), -50.0);
        assert!(b.contains(0.0, -65.0));
        assert!(!b.contains(0.0, -45.0));
        assert!(!b.contains(0.0, -85.0));
    }

    #[test]
    fn contains_wraps_longitude() {
        let b = BoundingBox::new(-30.0, 30.0, -90.0, 90.0).unwrap();
        assert!(b.contains(350.0, 0.0));
        assert!(!b.contains(180.0, 0.0));
    }

    #[test]
    fn full_circle_includes_dateline() {
        let b = BoundingBox::default();
        assert!(b.contains(180.0, -60.0));
        assert!(b.contains(-180.0, -60.0));
    }

    #[test]
    fn edges_are_inclusive() {
        let b = BoundingBox::default();
        assert!(b.contains(10.0, -80.0));
        assert!(b.contains(10.0, -50.0));
    }

    #[test]
    fn nan_is_outside() {
        assert!(!BoundingBox::default().contains(f64::NAN, -60.0));
    }

    #[test]
    fn rejects_inverted_limits() {
        assert!(BoundingBox::new(10.0, -10.0, -80.0, -50.0).is_err());
        assert!(BoundingBox::new(-10.0, 10.0, -40.0, -50.0).is_err());
        assert!(BoundingBox::new(-10.0, 10.0, -95.0, -50.0).is_err());
        assert!(BoundingBox::new(f64::NAN, 10.0, -80.0, -50.0).is_err());
    }

    #[test]
    fn from_array_goes_through_validation() {
        assert!(matches!(
            BoundingBox::from_array([180.0, -180.0, -80.0, -50.0]),
            Err(GridError::InvalidBoundingBox { .. })
        ));
        let b = BoundingBox::from_array([-180.0, 180.0, -80.0, -50.0]).unwrap();
        assert_eq!(b, BoundingBox::default());
    }

    #[test]
    fn wrap_longitude_range() {
        assert_eq!(wrap_longitude(190.0), -170.0);
        assert_eq!(wrap_longitude(-190.0), 170.0);
        assert_eq!(wrap_longitude(180.0), -180.0);
        assert_eq!(wrap_longitude(0.0), 0.0);
    }
}
