pub mod ladder;
pub mod record;

pub use ladder::{Award, distribute};
pub use record::record_value;

/// Minimum points awarded to the record holder of a map.
pub const MIN_RECORD_POINTS: f64 = 2.0;

/// Upper bound on the record value, whatever the playtime bumps add up to.
pub const MAX_RECORD_POINTS: f64 = 100.0;

/// 2nd place is capped at this fraction of 1st place.
pub const SECOND_PLACE_RATIO: f64 = 0.9;

/// Minimum points gap between consecutive ranks from 2nd place on.
pub const RANK_GAP: f64 = 2.0;

/// Number of fastest finish times averaged into the normalization baseline.
pub const BASELINE_SAMPLE: usize = 20;

/// Playtime thresholds (milliseconds) and the record bump each one grants.
pub const BUMPTIME_LOW: u64 = 600_000;
pub const BUMPTIME_MEDIUM: u64 = 1_800_000;
pub const BUMPTIME_HIGH: u64 = 3_600_000;

pub const BUMP_LOW: f64 = 2.0;
pub const BUMP_MEDIUM: f64 = 5.0;
pub const BUMP_HIGH: f64 = 10.0;

/// Two scores closer than this are treated as equal by the ledger.
pub const POINTS_TOLERANCE: f64 = 1e-6;

pub fn points_differ(a: f64, b: f64) -> bool {
    (a - b).abs() > POINTS_TOLERANCE
}
