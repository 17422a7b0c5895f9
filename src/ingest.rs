use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde_json::Value;
use walkdir::WalkDir;

use crate::record;
use crate::storage::{BucketStore, Granularity, KeyValue};
use crate::types::{BucketKey, BucketRecord, ProviderSet};
use crate::window;

/// One parsed trip receipt.
#[derive(Debug, Clone)]
pub struct Trip {
    pub id: Option<String>,
    pub provider: String,
    pub timestamp: DateTime<Utc>,
    pub amount: f64,
}

#[derive(Debug, Default)]
pub struct ImportSummary {
    pub files: usize,
    pub trips: usize,
    pub duplicates: usize,
    pub unknown_provider: usize,
}

/// Import every `*.jsonl` trip file under `dir` into the bucket store.
///
/// Each trip lands in its UTC day, month, and year buckets, accumulated
/// on top of whatever those buckets already hold. Lines that don't parse
/// are skipped (receipts arrive from flaky exporters), duplicates are
/// dropped by trip identity, and trips naming a provider outside the
/// configured set are counted but not applied.
pub fn import_dir(
    dir: &Path,
    store: &mut dyn BucketStore,
    providers: &ProviderSet,
) -> Result<ImportSummary> {
    let files = discover_files(dir);
    let mut summary = ImportSummary {
        files: files.len(),
        ..Default::default()
    };

    let parsed: Vec<Vec<Trip>> = files.par_iter().map(|path| parse_trip_file(path)).collect();

    let mut seen = HashSet::new();
    let mut trips = Vec::new();
    for trip in parsed.into_iter().flatten() {
        if !seen.insert(trip_identity(&trip)) {
            summary.duplicates += 1;
            continue;
        }
        if providers.index_of(&trip.provider).is_none() {
            summary.unknown_provider += 1;
            continue;
        }
        trips.push(trip);
    }

    apply(&trips, store, providers)?;
    store.flush()?;

    summary.trips = trips.len();
    Ok(summary)
}

fn discover_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if entry.path().extension().is_some_and(|ext| ext == "jsonl") {
            files.push(entry.path().to_path_buf());
        }
    }
    files
}

fn parse_trip_file(path: &Path) -> Vec<Trip> {
    let file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(_) => return Vec::new(),
    };

    let reader = BufReader::new(file);
    let mut trips = Vec::new();

    for line in reader.lines() {
        let Ok(line) = line else { continue };
        let Ok(parsed) = serde_json::from_str::<Value>(&line) else {
            continue;
        };
        if let Some(trip) = extract_trip(&parsed) {
            trips.push(trip);
        }
    }

    trips
}

fn extract_trip(parsed: &Value) -> Option<Trip> {
    let provider = parsed.get("provider")?.as_str()?.to_string();
    let amount = parsed.get("amount")?.as_f64()?;

    // Exporters disagree on the timestamp encoding: RFC 3339 string or
    // epoch milliseconds.
    let ts = parsed.get("timestamp")?;
    let timestamp: DateTime<Utc> = if let Some(s) = ts.as_str() {
        s.parse().ok()?
    } else {
        DateTime::from_timestamp_millis(ts.as_i64()?)?
    };

    let id = parsed
        .get("id")
        .and_then(|v| v.as_str())
        .map(String::from);

    Some(Trip {
        id,
        provider,
        timestamp,
        amount,
    })
}

fn trip_identity(trip: &Trip) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    trip.provider.hash(&mut hasher);
    match &trip.id {
        Some(id) => id.hash(&mut hasher),
        None => {
            trip.timestamp.timestamp_millis().hash(&mut hasher);
            trip.amount.to_bits().hash(&mut hasher);
        }
    }
    hasher.finish()
}

fn bucket_key_for(granularity: Granularity, ts_ms: i64) -> BucketKey {
    match granularity {
        Granularity::Day => window::day_start(ts_ms),
        Granularity::Month => window::month_start(ts_ms),
        Granularity::Year => window::year_start(ts_ms),
    }
}

/// Accumulate trips into their buckets and write all three granularities
/// back, merging with any records already stored there.
fn apply(trips: &[Trip], store: &mut dyn BucketStore, providers: &ProviderSet) -> Result<()> {
    let n = providers.len();

    for granularity in Granularity::ALL {
        let mut deltas: HashMap<BucketKey, BucketRecord> = HashMap::new();
        for trip in trips {
            let key = bucket_key_for(granularity, trip.timestamp.timestamp_millis());
            let bucket = deltas.entry(key).or_insert_with(|| BucketRecord::zeroed(n));
            // Provider membership was checked during the dedup pass.
            if let Some(i) = providers.index_of(&trip.provider) {
                bucket.trips += 1;
                bucket.total += trip.amount;
                bucket.companies[i] += trip.amount;
            }
        }
        if deltas.is_empty() {
            continue;
        }

        let keys: Vec<String> = deltas.keys().map(|k| k.to_string()).collect();
        let existing = store.get(granularity, &keys)?;

        let mut updates = Vec::with_capacity(existing.len());
        for kv in existing {
            let key: BucketKey = kv.key.parse().unwrap_or_default();
            let mut merged = record::decode(kv.value.as_deref(), n);
            if let Some(delta) = deltas.get(&key) {
                merged.trips += delta.trips;
                merged.total += delta.total;
                for (slot, amount) in merged.companies.iter_mut().zip(&delta.companies) {
                    *slot += amount;
                }
            }
            updates.push(KeyValue {
                key: kv.key,
                value: Some(record::encode(&merged)),
            });
        }
        store.put(granularity, updates)?;
    }

    Ok(())
}

#[cfg(all(test, not(feature = "sqlite")))]
mod tests {
    use super::*;
    use std::io::Write;

    use crate::storage::file_store::FileStore;

    fn write_receipts(dir: &Path, name: &str, lines: &[&str]) {
        let mut file = std::fs::File::create(dir.join(name)).unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
    }

    fn fetch(store: &dyn BucketStore, granularity: Granularity, key: BucketKey) -> BucketRecord {
        let kvs = store.get(granularity, &[key.to_string()]).unwrap();
        record::decode(kvs[0].value.as_deref(), 3)
    }

    #[test]
    fn trips_land_in_all_three_granularities() {
        let receipts = tempfile::tempdir().unwrap();
        let data = tempfile::tempdir().unwrap();
        write_receipts(
            receipts.path(),
            "march.jsonl",
            &[
                r#"{"id":"a1","provider":"uber","timestamp":"2016-03-14T09:00:00Z","amount":12.5}"#,
                r#"{"id":"a2","provider":"addisonlee","timestamp":"2016-03-14T18:30:00Z","amount":30.0}"#,
                r#"{"id":"a3","provider":"uber","timestamp":"2016-02-02T08:00:00Z","amount":7.5}"#,
            ],
        );

        let mut store = FileStore::at(data.path().to_path_buf());
        let providers = ProviderSet::default();
        let summary = import_dir(receipts.path(), &mut store, &providers).unwrap();
        assert_eq!(summary.files, 1);
        assert_eq!(summary.trips, 3);

        let march_ms = chrono::DateTime::parse_from_rfc3339("2016-03-14T09:00:00Z")
            .unwrap()
            .timestamp_millis();

        let month = fetch(&store, Granularity::Month, window::month_start(march_ms));
        assert_eq!(month.trips, 2);
        assert_eq!(month.total, 42.5);
        assert_eq!(month.companies, vec![12.5, 0.0, 30.0]);

        let day = fetch(&store, Granularity::Day, window::day_start(march_ms));
        assert_eq!(day.trips, 2);

        // Both months share the 2016 year bucket.
        let year = fetch(&store, Granularity::Year, window::year_start(march_ms));
        assert_eq!(year.trips, 3);
        assert_eq!(year.total, 50.0);
    }

    #[test]
    fn merges_on_top_of_existing_buckets() {
        let receipts = tempfile::tempdir().unwrap();
        let data = tempfile::tempdir().unwrap();
        write_receipts(
            receipts.path(),
            "trips.jsonl",
            &[r#"{"id":"b1","provider":"hailo","timestamp":"2016-03-01T10:00:00Z","amount":20.0}"#],
        );

        let march_ms = chrono::DateTime::parse_from_rfc3339("2016-03-01T10:00:00Z")
            .unwrap()
            .timestamp_millis();
        let month_key = window::month_start(march_ms);

        let mut store = FileStore::at(data.path().to_path_buf());
        store
            .put(
                Granularity::Month,
                vec![KeyValue {
                    key: month_key.to_string(),
                    value: Some(r#"{"trips":1,"total":5.0,"companies":[5,0,0]}"#.into()),
                }],
            )
            .unwrap();

        let providers = ProviderSet::default();
        import_dir(receipts.path(), &mut store, &providers).unwrap();

        let month = fetch(&store, Granularity::Month, month_key);
        assert_eq!(month.trips, 2);
        assert_eq!(month.total, 25.0);
        assert_eq!(month.companies, vec![5.0, 20.0, 0.0]);
    }

    #[test]
    fn skips_garbage_duplicates_and_unknown_providers() {
        let receipts = tempfile::tempdir().unwrap();
        let data = tempfile::tempdir().unwrap();
        write_receipts(
            receipts.path(),
            "mixed.jsonl",
            &[
                r#"{"id":"c1","provider":"uber","timestamp":"2016-03-14T09:00:00Z","amount":10.0}"#,
                r#"{"id":"c1","provider":"uber","timestamp":"2016-03-14T09:00:00Z","amount":10.0}"#,
                r#"{"id":"c2","provider":"gett","timestamp":"2016-03-14T10:00:00Z","amount":9.0}"#,
                "not json at all",
                r#"{"provider":"uber","amount":3.0}"#,
            ],
        );

        let mut store = FileStore::at(data.path().to_path_buf());
        let providers = ProviderSet::default();
        let summary = import_dir(receipts.path(), &mut store, &providers).unwrap();

        assert_eq!(summary.trips, 1);
        assert_eq!(summary.duplicates, 1);
        assert_eq!(summary.unknown_provider, 1);

        let march_ms = chrono::DateTime::parse_from_rfc3339("2016-03-14T09:00:00Z")
            .unwrap()
            .timestamp_millis();
        let month = fetch(&store, Granularity::Month, window::month_start(march_ms));
        assert_eq!(month.trips, 1);
        assert_eq!(month.total, 10.0);
    }

    #[test]
    fn accepts_epoch_millisecond_timestamps() {
        let parsed: Value = serde_json::from_str(
            r#"{"provider":"uber","timestamp":1457946000000,"amount":4.2}"#,
        )
        .unwrap();
        let trip = extract_trip(&parsed).unwrap();
        assert_eq!(trip.timestamp.timestamp_millis(), 1_457_946_000_000);
        assert_eq!(trip.id, None);
    }
}
