//! JSON summary printed after a product run.

use firewx_common::{AnalysisCycle, GridStats};
use grid_processor::{Product, ProductOutput};
use serde::Serialize;

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

#[derive(Debug, Serialize)]
pub struct Summary {
    pub product: String,
    pub region: String,
    pub valid_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_24h_ago: Option<String>,
    /// Hours between the two cycles of a change product
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_hours: Option<i64>,
    pub rows: usize,
    pub cols: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<GridStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flagged_points: Option<usize>,
}

fn timestamp(cycle: AnalysisCycle) -> String {
    cycle.valid_time().format(TIME_FORMAT).to_string()
}

impl Summary {
    pub fn new(product: Product, region: &str, output: &ProductOutput) -> Self {
        let (rows, cols) = output.shape();
        let grid = output.as_grid();
        Self {
            product: product.name().to_string(),
            region: region.to_string(),
            valid_time: timestamp(output.valid_now()),
            valid_24h_ago: output.valid_24h_ago().map(timestamp),
            offset_hours: grid
                .and_then(|g| g.actual_offset())
                .map(|d| d.num_hours()),
            rows,
            cols,
            units: grid.map(|g| g.units.symbol().to_string()),
            stats: output.stats(),
            flagged_points: output.as_mask().map(|m| m.count()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use firewx_common::{
        CriteriaMask, DerivationKind, DerivedGrid, GridCoords, LowRelativeHumidityThreshold,
        MaskCriteria, Units, VariableGrid,
    };

    fn cycle(day: u32, hour: u32) -> AnalysisCycle {
        AnalysisCycle::hourly(Utc.with_ymd_and_hms(2024, 6, day, hour, 0, 0).unwrap())
    }

    fn coords() -> Arc<GridCoords> {
        Arc::new(GridCoords::new(vec![60.0, 60.5], vec![210.0, 210.5, 211.0]))
    }

    #[test]
    fn test_change_product_summary() {
        let grid = VariableGrid::new(
            "tmp2m_24h_change",
            Units::Fahrenheit,
            cycle(15, 12),
            coords(),
            vec![1.0, 2.0, 3.0, 4.0, 5.0, f32::NAN],
        )
        .unwrap();
        let output = ProductOutput::Grid(DerivedGrid {
            grid,
            kind: DerivationKind::Delta24h,
            valid_now: cycle(15, 12),
            valid_24h_ago: Some(cycle(14, 10)),
        });

        let summary = Summary::new(Product::Temperature24hChange, "interior", &output);
        assert_eq!(summary.valid_time, "2024-06-15T12:00:00Z");
        assert_eq!(summary.valid_24h_ago.as_deref(), Some("2024-06-14T10:00:00Z"));
        assert_eq!(summary.offset_hours, Some(26));
        assert_eq!((summary.rows, summary.cols), (2, 3));
        let stats = summary.stats.unwrap();
        assert_eq!(stats.max, Some(5.0));
        assert_eq!(stats.missing_points, 1);

        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("flagged_points").is_none());
    }

    #[test]
    fn test_mask_summary() {
        let mask = CriteriaMask::new(
            cycle(15, 12),
            MaskCriteria::LowRelativeHumidity(LowRelativeHumidityThreshold::default()),
            coords(),
            vec![true, false, true, false, false, false],
        )
        .unwrap();
        let output = ProductOutput::Mask(mask);

        let summary = Summary::new(Product::LowRelativeHumidity, "alaska", &output);
        assert_eq!(summary.flagged_points, Some(2));
        assert!(summary.stats.is_none());
        assert!(summary.units.is_none());
        assert!(summary.valid_24h_ago.is_none());
    }
}
