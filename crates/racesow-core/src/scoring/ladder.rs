use serde::{Deserialize, Serialize};

use crate::model::{Race, RaceId};

use super::{BASELINE_SAMPLE, RANK_GAP, SECOND_PLACE_RATIO};

/// Rank and points computed for one completed race.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Award {
    pub race_id: RaceId,
    pub rank: u32,
    pub points: f64,
}

/// Distribute points over the completed races of a map.
///
/// `races` must be sorted by finish time ascending with ties already broken;
/// races without a time are skipped. 1st place gets `record_points`. 2nd
/// place is capped at `min(record - 2, record * 0.9)` and pulled down by its
/// time gap to 1st, scaled by the mean of the fastest 20 times. Every later
/// rank is at least 2 points below the rank above it. No rank goes negative.
///
/// Awards are returned in rank order.
pub fn distribute(races: &[Race], record_points: f64) -> Vec<Award> {
    let timed: Vec<(RaceId, f64)> = races
        .iter()
        .filter_map(|race| race.time.map(|t| (race.id, t as f64)))
        .collect();

    let Some(&(best_id, first_time)) = timed.first() else {
        return Vec::new();
    };

    let mut awards = Vec::with_capacity(timed.len());
    awards.push(Award {
        race_id: best_id,
        rank: 1,
        points: record_points,
    });
    if timed.len() == 1 {
        return awards;
    }

    let sample = &timed[..timed.len().min(BASELINE_SAMPLE)];
    let baseline = sample.iter().map(|&(_, t)| t).sum::<f64>() / sample.len() as f64;
    let scale = baseline * 0.8;

    let cap = (record_points - RANK_GAP).min(record_points * SECOND_PLACE_RATIO);
    let slope = cap * (7.0 / 9.0);
    let by_gap = |time: f64| {
        if scale > 0.0 {
            cap - slope * ((time - first_time) / scale)
        } else {
            // degenerate baseline: award at the cap
            cap
        }
    };

    let (second_id, second_time) = timed[1];
    let mut points_above = cap.min(by_gap(second_time)).max(0.0);
    awards.push(Award {
        race_id: second_id,
        rank: 2,
        points: points_above,
    });

    for (rank, &(race_id, time)) in (3u32..).zip(&timed[2..]) {
        let points = (points_above - RANK_GAP).min(by_gap(time)).max(0.0);
        awards.push(Award {
            race_id,
            rank,
            points,
        });
        points_above = points;
    }

    awards
}
