use std::collections::HashMap;

use crate::types::{BucketKey, BucketRecord, Stats};

/// Derive the summary block from the windowed records plus the two
/// supplementary single-bucket lookups.
///
/// `ytd` and `today` come from the year- and day-granularity buckets,
/// fetched separately; they are never derived from the monthly series.
/// `current_month_key` is the start of the calendar month at query time;
/// month-to-date is only reported when that exact bucket holds a stored
/// record (an anchored window looking at the past simply has no mtd).
pub fn compute(
    window: &[BucketKey],
    records: &HashMap<BucketKey, BucketRecord>,
    current_month_key: BucketKey,
    ytd: Option<&BucketRecord>,
    today: Option<&BucketRecord>,
) -> Stats {
    let mut trips = 0u64;
    let mut total = 0.0f64;

    for key in window {
        if let Some(r) = records.get(key) {
            trips += r.trips;
            total += r.total;
        }
    }

    let average = (trips > 0).then(|| total / trips as f64);
    let mtd = records.get(&current_month_key).map(|r| r.total);

    Stats {
        trips,
        total,
        average,
        mtd,
        ytd: ytd.map(|r| r.total),
        today: today.map(|r| r.total),
    }
}
