use crate::model::Race;

use super::{
    BUMP_HIGH, BUMP_LOW, BUMP_MEDIUM, BUMPTIME_HIGH, BUMPTIME_LOW, BUMPTIME_MEDIUM,
    MAX_RECORD_POINTS, MIN_RECORD_POINTS,
};

/// Points awarded to the fastest race on a map.
///
/// Every other player with significant playtime on the map bumps the value,
/// so maps that many people grind are worth more to the record holder.
/// `races` must be sorted by playtime, longest first. The record holder's own
/// playtime is skipped: grinding a map never raises the value of one's own
/// record.
///
/// The result is always within `[MIN_RECORD_POINTS, MAX_RECORD_POINTS]`.
pub fn record_value(_completed: usize, races: &[Race], best: &Race) -> f64 {
    let mut points = MIN_RECORD_POINTS;

    for race in races {
        if race.id == best.id {
            continue;
        }

        let bump = if race.playtime > BUMPTIME_HIGH {
            BUMP_HIGH
        } else if race.playtime > BUMPTIME_MEDIUM {
            BUMP_MEDIUM
        } else if race.playtime > BUMPTIME_LOW {
            BUMP_LOW
        } else {
            // sorted by playtime: nothing after this can qualify
            break;
        };
        points += bump;
    }

    points.min(MAX_RECORD_POINTS)
}
