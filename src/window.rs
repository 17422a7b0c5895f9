use chrono::{DateTime, Datelike, TimeZone, Utc};

use crate::error::{FaretabError, Result};
use crate::types::BucketKey;

/// Display window width. Short windows show half a year, long windows a
/// full year of month buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowWidth {
    Short,
    Long,
}

impl WindowWidth {
    pub fn bucket_count(self) -> usize {
        match self {
            WindowWidth::Short => 6,
            WindowWidth::Long => 12,
        }
    }

    /// Map the view layer's size-class vocabulary onto a window width.
    /// Total over the recognized values; anything else is fatal to the
    /// request.
    pub fn from_size_class(width: &str) -> Result<Self> {
        match width {
            "short" | "small" | "medium" => Ok(WindowWidth::Short),
            "long" | "large" | "full" => Ok(WindowWidth::Long),
            other => Err(FaretabError::InvalidWindowWidth(other.to_string())),
        }
    }
}

fn to_datetime(key: BucketKey) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(key).unwrap_or(DateTime::UNIX_EPOCH)
}

fn ymd_key(year: i32, month: u32, day: u32) -> BucketKey {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .unwrap()
        .timestamp_millis()
}

/// 00:00:00.000 UTC on the 1st of the instant's month.
pub fn month_start(key: BucketKey) -> BucketKey {
    let dt = to_datetime(key);
    ymd_key(dt.year(), dt.month(), 1)
}

/// 00:00:00.000 UTC on January 1st of the instant's year.
pub fn year_start(key: BucketKey) -> BucketKey {
    ymd_key(to_datetime(key).year(), 1, 1)
}

/// 00:00:00.000 UTC on the instant's calendar day.
pub fn day_start(key: BucketKey) -> BucketKey {
    let dt = to_datetime(key);
    ymd_key(dt.year(), dt.month(), dt.day())
}

/// The ordered month keys making up a display window.
///
/// The window ends at the month containing `anchor` when given, else at
/// the current calendar month. Keys are generated newest-first walking
/// backward one month at a time, then reversed so index 0 is oldest.
pub fn month_window(
    width: WindowWidth,
    anchor: Option<BucketKey>,
    now: DateTime<Utc>,
) -> Vec<BucketKey> {
    let end = to_datetime(match anchor {
        Some(key) => month_start(key),
        None => month_start(now.timestamp_millis()),
    });

    let count = width.bucket_count();
    let mut keys = Vec::with_capacity(count);
    let (mut year, mut month) = (end.year(), end.month());

    for _ in 0..count {
        keys.push(ymd_key(year, month, 1));
        if month == 1 {
            year -= 1;
            month = 12;
        } else {
            month -= 1;
        }
    }

    keys.reverse();
    keys
}

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Compact axis/table label for a month bucket, e.g. "Mar 2016".
pub fn month_label(key: BucketKey) -> String {
    let dt = to_datetime(key);
    format!("{} {}", MONTHS[dt.month0() as usize], dt.year())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, 30, 45).unwrap()
    }

    #[test]
    fn short_window_is_six_ascending_month_starts() {
        let keys = month_window(WindowWidth::Short, None, utc(2016, 3, 14, 9));
        assert_eq!(keys.len(), 6);
        for pair in keys.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        for &k in &keys {
            assert_eq!(k, month_start(k));
        }
        assert_eq!(*keys.last().unwrap(), ymd_key(2016, 3, 1));
        assert_eq!(keys[0], ymd_key(2015, 10, 1));
    }

    #[test]
    fn long_window_is_twelve_buckets() {
        let keys = month_window(WindowWidth::Long, None, utc(2016, 3, 14, 9));
        assert_eq!(keys.len(), 12);
        assert_eq!(keys[0], ymd_key(2015, 4, 1));
        assert_eq!(*keys.last().unwrap(), ymd_key(2016, 3, 1));
    }

    #[test]
    fn window_crosses_year_boundary() {
        let keys = month_window(WindowWidth::Short, None, utc(2016, 1, 2, 0));
        assert_eq!(keys[0], ymd_key(2015, 8, 1));
        assert_eq!(keys[5], ymd_key(2016, 1, 1));
    }

    #[test]
    fn anchor_moves_the_window_end() {
        let anchor = utc(2015, 11, 20, 18).timestamp_millis();
        let keys = month_window(WindowWidth::Short, Some(anchor), utc(2016, 3, 14, 9));
        assert_eq!(*keys.last().unwrap(), ymd_key(2015, 11, 1));
        assert_eq!(keys[0], ymd_key(2015, 6, 1));
    }

    #[test]
    fn keys_are_distinct() {
        let keys = month_window(WindowWidth::Long, None, utc(2016, 3, 1, 0));
        let mut deduped = keys.clone();
        deduped.dedup();
        assert_eq!(deduped, keys);
    }

    #[test]
    fn size_class_mapping_is_total_over_recognized_values() {
        for w in ["short", "small", "medium"] {
            assert_eq!(WindowWidth::from_size_class(w).unwrap(), WindowWidth::Short);
        }
        for w in ["long", "large", "full"] {
            assert_eq!(WindowWidth::from_size_class(w).unwrap(), WindowWidth::Long);
        }
    }

    #[test]
    fn unrecognized_width_is_rejected() {
        let err = WindowWidth::from_size_class("wide").unwrap_err();
        assert!(matches!(err, FaretabError::InvalidWindowWidth(_)));
    }

    #[test]
    fn period_starts_truncate_in_utc() {
        let instant = utc(2016, 7, 19, 23).timestamp_millis();
        assert_eq!(month_start(instant), ymd_key(2016, 7, 1));
        assert_eq!(year_start(instant), ymd_key(2016, 1, 1));
        assert_eq!(day_start(instant), ymd_key(2016, 7, 19));
    }

    #[test]
    fn month_start_is_idempotent() {
        let k = month_start(utc(2016, 2, 29, 12).timestamp_millis());
        assert_eq!(month_start(k), k);
    }

    #[test]
    fn month_label_names_the_bucket() {
        assert_eq!(month_label(ymd_key(2016, 3, 1)), "Mar 2016");
    }
}
