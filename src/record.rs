use serde_json::Value;

use crate::types::BucketRecord;

/// Decode one stored bucket value into a normalized record.
///
/// This never fails. Stored data is sparse and historical: buckets with
/// no activity are null, records written before a provider was added
/// carry a short `companies` vector, and odd upstream payloads can hold
/// the wrong JSON type in a numeric field. All of those decode to zero
/// for the affected field rather than erroring, so one bad bucket can't
/// take down the whole window.
pub fn decode(raw: Option<&str>, provider_count: usize) -> BucketRecord {
    let Some(raw) = raw else {
        return BucketRecord::zeroed(provider_count);
    };
    match serde_json::from_str::<Value>(raw) {
        Ok(parsed) => decode_value(&parsed, provider_count),
        Err(_) => BucketRecord::zeroed(provider_count),
    }
}

fn decode_value(parsed: &Value, provider_count: usize) -> BucketRecord {
    let trips = parsed.get("trips").and_then(Value::as_u64).unwrap_or(0);
    let total = parsed.get("total").and_then(Value::as_f64).unwrap_or(0.0);

    // Normalize to one entry per provider index: pad short vectors
    // (record predates a provider), drop extras.
    let mut companies = vec![0.0; provider_count];
    if let Some(list) = parsed.get("companies").and_then(Value::as_array) {
        for (i, entry) in list.iter().take(provider_count).enumerate() {
            companies[i] = entry.as_f64().unwrap_or(0.0);
        }
    }

    BucketRecord {
        trips,
        total,
        companies,
    }
}

/// Encode a record back into its stored JSON form.
pub fn encode(record: &BucketRecord) -> String {
    serde_json::json!({
        "trips": record.trips,
        "total": record.total,
        "companies": record.companies,
    })
    .to_string()
}
