//! Common types shared across the fire-weather workspace.

pub mod bbox;
pub mod error;
pub mod grid;
pub mod mask;
pub mod region;
pub mod time;
pub mod variable;

pub use bbox::BoundingBox;
pub use error::{FireWxError, FireWxResult};
pub use grid::{DerivationKind, DerivedGrid, GridCoords, GridStats, VariableGrid};
pub use mask::{CriteriaMask, HotDryWindyThresholds, LowRelativeHumidityThreshold, MaskCriteria};
pub use region::{RegionExtent, RegionTable};
pub use time::{AnalysisCycle, Cadence, Clock, FixedClock, SystemClock};
pub use variable::{Units, VariableName};
