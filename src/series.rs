use std::collections::HashMap;

use crate::types::{BucketKey, BucketRecord, Highlight, LineRow, ProviderSet, SeriesData};

/// Merge decoded bucket records across a window into the line and pie
/// datasets the chart layer consumes.
///
/// Every window key produces a row, ascending, including months with no
/// stored record (all-zero row): the chart needs one entry per calendar
/// month for continuity. `pie` accumulates the decoded per-provider
/// values only; the highlight overlay runs after pie accumulation and
/// *replaces* the designated slot in its row, so a previewed in-flight
/// transaction shows up in the line without being double counted into
/// the window totals. A highlight pointing outside the window is dropped
/// silently, as it refers to a transaction the visible range doesn't
/// cover.
pub fn build_series(
    window: &[BucketKey],
    records: &HashMap<BucketKey, BucketRecord>,
    providers: &ProviderSet,
    highlight: Option<&Highlight>,
) -> SeriesData {
    let mut pie = vec![0.0; providers.len()];
    let mut lines = Vec::with_capacity(window.len());

    for &key in window {
        let mut values = vec![0.0; providers.slot_count()];

        if let Some(record) = records.get(&key) {
            for i in 0..providers.len() {
                let amount = record.companies.get(i).copied().unwrap_or(0.0);
                values[providers.value_slot(i)] = amount;
                pie[i] += amount;
            }
        }

        if let Some(h) = highlight {
            if h.bucket_key == key {
                if let Some(i) = providers.index_of(&h.provider) {
                    values[providers.value_slot(i)] = h.amount;
                }
            }
        }

        lines.push(LineRow {
            bucket_key: key,
            values,
        });
    }

    SeriesData { lines, pie }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn providers() -> ProviderSet {
        ProviderSet::default()
    }

    fn record(trips: u64, total: f64, companies: &[f64]) -> BucketRecord {
        BucketRecord {
            trips,
            total,
            companies: companies.to_vec(),
        }
    }

    /// Six month keys; only the newest bucket has data.
    fn one_active_month() -> (Vec<BucketKey>, HashMap<BucketKey, BucketRecord>) {
        let window: Vec<BucketKey> = (0..6).map(|i| 1_000 * i as i64).collect();
        let mut records = HashMap::new();
        records.insert(5_000, record(4, 120.0, &[100.0, 0.0, 20.0]));
        (window, records)
    }

    #[test]
    fn every_window_key_gets_a_row() {
        let (window, records) = one_active_month();
        let series = build_series(&window, &records, &providers(), None);

        assert_eq!(series.lines.len(), window.len());
        for (row, &key) in series.lines.iter().zip(&window) {
            assert_eq!(row.bucket_key, key);
            assert_eq!(row.values.len(), 6);
        }
        // Empty months are all-zero rows, not gaps.
        for row in &series.lines[..5] {
            assert!(row.values.iter().all(|&v| v == 0.0));
        }
    }

    #[test]
    fn provider_values_land_in_even_slots() {
        let (window, records) = one_active_month();
        let series = build_series(&window, &records, &providers(), None);

        let last = &series.lines[5];
        assert_eq!(last.values, vec![100.0, 0.0, 0.0, 0.0, 20.0, 0.0]);
    }

    #[test]
    fn pie_is_the_per_provider_column_sum() {
        let window: Vec<BucketKey> = vec![0, 1_000];
        let mut records = HashMap::new();
        records.insert(0, record(2, 35.0, &[10.0, 25.0, 0.0]));
        records.insert(1_000, record(1, 8.0, &[0.0, 8.0, 0.0]));

        let set = providers();
        let series = build_series(&window, &records, &set, None);
        assert_eq!(series.pie, vec![10.0, 33.0, 0.0]);

        // pie[i] == sum over rows of the provider's slot.
        for i in 0..set.len() {
            let column: f64 = series
                .lines
                .iter()
                .map(|row| row.values[set.value_slot(i)])
                .sum();
            assert_eq!(series.pie[i], column);
        }
    }

    #[test]
    fn highlight_replaces_the_slot_and_leaves_pie_alone() {
        let (window, records) = one_active_month();
        let set = providers();
        let plain = build_series(&window, &records, &set, None);

        let highlight = Highlight {
            bucket_key: 5_000,
            provider: "hailo".into(),
            amount: 999.0,
        };
        let overlaid = build_series(&window, &records, &set, Some(&highlight));

        assert_eq!(overlaid.lines[5].values[2], 999.0);
        assert_eq!(overlaid.pie, plain.pie);

        // Only the designated slot differs.
        for (row_p, row_h) in plain.lines.iter().zip(&overlaid.lines) {
            for (slot, (a, b)) in row_p.values.iter().zip(&row_h.values).enumerate() {
                if row_p.bucket_key == 5_000 && slot == 2 {
                    continue;
                }
                assert_eq!(a, b);
            }
        }
    }

    #[test]
    fn highlight_overwrites_an_existing_value_rather_than_adding() {
        let window = vec![0];
        let mut records = HashMap::new();
        records.insert(0, record(1, 50.0, &[50.0, 0.0, 0.0]));

        let highlight = Highlight {
            bucket_key: 0,
            provider: "uber".into(),
            amount: 12.0,
        };
        let series = build_series(&window, &records, &providers(), Some(&highlight));
        assert_eq!(series.lines[0].values[0], 12.0);
        assert_eq!(series.pie[0], 50.0);
    }

    #[test]
    fn out_of_window_highlight_is_a_no_op() {
        let (window, records) = one_active_month();
        let set = providers();
        let plain = build_series(&window, &records, &set, None);

        let highlight = Highlight {
            bucket_key: 99_000,
            provider: "uber".into(),
            amount: 7.0,
        };
        let overlaid = build_series(&window, &records, &set, Some(&highlight));
        assert_eq!(overlaid, plain);
    }

    #[test]
    fn unknown_highlight_provider_is_dropped() {
        let (window, records) = one_active_month();
        let set = providers();
        let plain = build_series(&window, &records, &set, None);

        let highlight = Highlight {
            bucket_key: 5_000,
            provider: "gett".into(),
            amount: 7.0,
        };
        let overlaid = build_series(&window, &records, &set, Some(&highlight));
        assert_eq!(overlaid, plain);
    }

    #[test]
    fn odd_slots_stay_zero_without_highlight() {
        let (window, records) = one_active_month();
        let series = build_series(&window, &records, &providers(), None);
        for row in &series.lines {
            for slot in (1..row.values.len()).step_by(2) {
                assert_eq!(row.values[slot], 0.0);
            }
        }
    }
}
