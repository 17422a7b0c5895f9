use serde::{Deserialize, Serialize};

/// Start-of-period instant for a day, month, or year bucket, in
/// milliseconds since the Unix epoch, UTC. A month key is always
/// 00:00:00.000 UTC on the 1st.
pub type BucketKey = i64;

pub const DEFAULT_PROVIDERS: &[&str] = &["uber", "hailo", "addisonlee"];

/// The fixed, ordered set of trip providers. Order is configuration, not
/// data: it determines series index assignment and must stay stable for
/// the process lifetime.
#[derive(Debug, Clone)]
pub struct ProviderSet {
    names: Vec<String>,
}

impl ProviderSet {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn index_of(&self, provider: &str) -> Option<usize> {
        self.names.iter().position(|n| n == provider)
    }

    /// Slot of provider `i` inside a `LineRow`. Each provider owns the
    /// even slot `2*i`; the odd slot next to it is a reserved legend
    /// placeholder the rendering layer expects, zero unless a highlight
    /// overwrites the provider's slot. All slot addressing goes through
    /// this function.
    pub fn value_slot(&self, i: usize) -> usize {
        2 * i
    }

    /// Row width: two slots per provider.
    pub fn slot_count(&self) -> usize {
        2 * self.names.len()
    }
}

impl Default for ProviderSet {
    fn default() -> Self {
        Self::new(DEFAULT_PROVIDERS.iter().map(|s| s.to_string()).collect())
    }
}

/// One stored bucket, decoded and normalized: `companies` always has one
/// entry per provider index. A bucket with no stored record decodes to
/// all zeros and contributes nothing to any aggregate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BucketRecord {
    pub trips: u64,
    pub total: f64,
    pub companies: Vec<f64>,
}

impl BucketRecord {
    pub fn zeroed(provider_count: usize) -> Self {
        Self {
            trips: 0,
            total: 0.0,
            companies: vec![0.0; provider_count],
        }
    }
}

/// A single caller-supplied transaction to overlay onto the windowed
/// series. Injected into the matching row's output only; never merged
/// into stored totals, never counted into the pie.
#[derive(Debug, Clone, PartialEq)]
pub struct Highlight {
    pub bucket_key: BucketKey,
    pub provider: String,
    pub amount: f64,
}

/// One chart row per month bucket, chronological ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRow {
    pub bucket_key: BucketKey,
    pub values: Vec<f64>,
}

/// Line rows plus the per-provider window totals feeding the pie.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesData {
    pub lines: Vec<LineRow>,
    pub pie: Vec<f64>,
}

/// Summary statistics for the window. `mtd`, `ytd`, and `today` are
/// absent when their backing bucket has no stored record; `average` is
/// absent when the window holds no trips.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Stats {
    pub trips: u64,
    pub total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtd: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ytd: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub today: Option<f64>,
}

/// Everything the view layer needs to draw the widget. `hcompany` echoes
/// the highlighted provider's name and is present only when a highlight
/// was supplied.
#[derive(Debug, Clone, Serialize)]
pub struct ChartPayload {
    pub lines: Vec<LineRow>,
    pub pie: Vec<f64>,
    pub stats: Stats,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hcompany: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_set_order_determines_index() {
        let set = ProviderSet::default();
        assert_eq!(set.len(), 3);
        assert_eq!(set.index_of("uber"), Some(0));
        assert_eq!(set.index_of("hailo"), Some(1));
        assert_eq!(set.index_of("addisonlee"), Some(2));
        assert_eq!(set.index_of("gett"), None);
    }

    #[test]
    fn slots_are_doubled_per_provider() {
        let set = ProviderSet::default();
        assert_eq!(set.slot_count(), 6);
        assert_eq!(set.value_slot(0), 0);
        assert_eq!(set.value_slot(1), 2);
        assert_eq!(set.value_slot(2), 4);
    }

    #[test]
    fn zeroed_record_matches_provider_count() {
        let r = BucketRecord::zeroed(3);
        assert_eq!(r.trips, 0);
        assert_eq!(r.total, 0.0);
        assert_eq!(r.companies, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn optional_stats_are_omitted_from_json() {
        let stats = Stats {
            trips: 0,
            total: 0.0,
            ..Default::default()
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert!(!json.contains("average"));
        assert!(!json.contains("mtd"));
    }
}
