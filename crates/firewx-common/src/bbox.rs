//! Geographic bounding boxes.

use serde::{Deserialize, Serialize};

/// A geographic bounding box in degrees, longitudes in [-180, 180].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Create from a map extent given as (west, east, south, north).
    pub fn from_extent(west: f64, east: f64, south: f64, north: f64) -> Self {
        Self::new(west, south, east, north)
    }

    /// Parse "west,south,east,north".
    pub fn from_str_list(s: &str) -> Result<Self, BboxParseError> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(BboxParseError::InvalidFormat(s.to_string()));
        }

        let mut nums = [0.0f64; 4];
        for (slot, part) in nums.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| BboxParseError::InvalidNumber(part.to_string()))?;
        }

        let bbox = Self::new(nums[0], nums[1], nums[2], nums[3]);
        bbox.validate()?;
        Ok(bbox)
    }

    /// Reject inverted or out-of-range boxes.
    pub fn validate(&self) -> Result<(), BboxParseError> {
        if self.min_lat > self.max_lat || self.min_lon > self.max_lon {
            return Err(BboxParseError::Inverted(format!("{:?}", self)));
        }
        if self.min_lat < -90.0 || self.max_lat > 90.0 {
            return Err(BboxParseError::Inverted(format!(
                "latitude outside [-90, 90]: {:?}",
                self
            )));
        }
        Ok(())
    }

    /// Width in degrees.
    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Height in degrees.
    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Point containment. The longitude may use either the [-180, 180] or
    /// the [0, 360) convention.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        let lon = normalize_lon(lon);
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }

    pub fn contains_lat(&self, lat: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat
    }

    pub fn contains_lon(&self, lon: f64) -> bool {
        let lon = normalize_lon(lon);
        lon >= self.min_lon && lon <= self.max_lon
    }
}

/// Map a longitude into [-180, 180).
pub fn normalize_lon(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && lon > 0.0 {
        180.0
    } else {
        wrapped
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BboxParseError {
    #[error("Invalid bounding box format: {0}. Expected 'west,south,east,north'")]
    InvalidFormat(String),

    #[error("Invalid number in bounding box: {0}")]
    InvalidNumber(String),

    #[error("Invalid bounding box extent: {0}")]
    Inverted(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list() {
        let bbox = BoundingBox::from_str_list("-170.0, 51.0, -129.0, 72.0").unwrap();
        assert_eq!(bbox.min_lon, -170.0);
        assert_eq!(bbox.max_lat, 72.0);
        assert!(BoundingBox::from_str_list("1,2,3").is_err());
        assert!(BoundingBox::from_str_list("a,2,3,4").is_err());
        assert!(BoundingBox::from_str_list("10,10,5,5").is_err());
    }

    #[test]
    fn test_normalize_lon() {
        assert_eq!(normalize_lon(190.0), -170.0);
        assert_eq!(normalize_lon(-170.0), -170.0);
        assert_eq!(normalize_lon(360.0), 0.0);
        assert_eq!(normalize_lon(180.0), 180.0);
    }

    #[test]
    fn test_contains_handles_0_360() {
        let alaska = BoundingBox::from_extent(-170.0, -129.0, 51.0, 72.0);
        assert!(alaska.contains(210.0, 61.0));
        assert!(alaska.contains(-150.0, 61.0));
        assert!(!alaska.contains(100.0, 61.0));
        assert!(!alaska.contains(-150.0, 40.0));
    }
}
