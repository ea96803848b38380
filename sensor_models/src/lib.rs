//! UWB ranging models: anchor geometry, telemetry parsing,
//! two-anchor trilateration.

pub mod anchor;
pub mod telemetry;
pub mod trilateration;

pub use anchor::{AnchorPair, AnchorParams, AnchorRouting, AnchorSide};
pub use telemetry::{parse_range, TelemetryRecord, NO_READING};
pub use trilateration::locate;
