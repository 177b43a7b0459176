use std::collections::HashMap;
use crate::types::funding_rate::FundingRateRecord;
use crate::types::timestamp::MS_PER_HOUR;

/// Payout cadence in whole hours, taken from the most frequent gap between
/// consecutive payouts. Equal counts go to the gap seen first. Returns `None`
/// with fewer than two records or when the gap rounds to zero hours.
pub fn detect_interval_hours(history: &[FundingRateRecord]) -> Option<u32> {
    if history.len() < 2 {
        return None;
    }

    let mut timestamps: Vec<i64> = history.iter().map(|r| r.timestamp).collect();
    timestamps.sort_unstable();

    let mut counts: HashMap<i64, (usize, usize)> = HashMap::new();  // gap -> (count, first seen)
    for (position, pair) in timestamps.windows(2).enumerate() {
        let gap = pair[1] - pair[0];
        counts.entry(gap).or_insert((0, position)).0 += 1;
    }

    let (modal_gap, _) = counts.into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })?;

    let hours = (modal_gap as f64 / MS_PER_HOUR as f64).round();
    if hours <= 0.0 {
        return None;
    }
    Some(hours as u32)
}
