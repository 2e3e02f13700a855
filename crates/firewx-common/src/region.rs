//! Named geographic regions loaded from configuration.
//!
//! Each region is a map extent `(west, east, south, north)`. Plot extents
//! live here as data rather than as one code path per region.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;
use crate::error::{FireWxError, FireWxResult};

/// Extent of one region in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionExtent {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

impl RegionExtent {
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::from_extent(self.west, self.east, self.south, self.north)
    }
}

/// Lookup table of region name to extent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegionTable {
    #[serde(default)]
    regions: BTreeMap<String, RegionExtent>,
}

impl RegionTable {
    /// Parse a YAML document with a top-level `regions:` mapping.
    pub fn from_yaml_str(yaml: &str) -> FireWxResult<Self> {
        let raw: RegionTable = serde_yaml::from_str(yaml)?;

        let mut regions = BTreeMap::new();
        for (name, extent) in raw.regions {
            extent
                .bbox()
                .validate()
                .map_err(|e| FireWxError::Config(format!("region '{}': {}", name, e)))?;
            regions.insert(name.to_ascii_lowercase(), extent);
        }

        Ok(Self { regions })
    }

    /// Load a region table from a YAML file.
    pub fn load(path: &Path) -> FireWxResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            FireWxError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Look up a region by case-insensitive name.
    pub fn get(&self, name: &str) -> FireWxResult<BoundingBox> {
        self.regions
            .get(&name.to_ascii_lowercase())
            .map(RegionExtent::bbox)
            .ok_or_else(|| FireWxError::Config(format!("Unknown region: {}", name)))
    }

    pub fn insert(&mut self, name: &str, extent: RegionExtent) {
        self.regions.insert(name.to_ascii_lowercase(), extent);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.regions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const YAML: &str = r#"
regions:
  Alaska:
    west: -170.0
    east: -128.0
    south: 51.0
    north: 72.0
  kodiak:
    west: -155.5
    east: -151.5
    south: 56.5
    north: 58.5
"#;

    #[test]
    fn test_parse_and_lookup() {
        let table = RegionTable::from_yaml_str(YAML).unwrap();
        assert_eq!(table.len(), 2);
        let bbox = table.get("ALASKA").unwrap();
        assert_eq!(bbox.min_lon, -170.0);
        assert_eq!(bbox.max_lat, 72.0);
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["alaska", "kodiak"]);
    }

    #[test]
    fn test_unknown_region() {
        let table = RegionTable::from_yaml_str(YAML).unwrap();
        assert!(matches!(table.get("hawaii"), Err(FireWxError::Config(_))));
    }

    #[test]
    fn test_inverted_region_rejected() {
        let yaml = "regions:\n  bad:\n    west: 10.0\n    east: 5.0\n    south: 0.0\n    north: 1.0\n";
        assert!(RegionTable::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(YAML.as_bytes()).unwrap();
        let table = RegionTable::load(file.path()).unwrap();
        assert!(table.get("kodiak").is_ok());
    }
}
