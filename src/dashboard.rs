use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::record;
use crate::series;
use crate::stats;
use crate::storage::{BucketStore, Granularity, KeyValue, CURRENCY_KEY};
use crate::types::{BucketKey, BucketRecord, ChartPayload, Highlight, ProviderSet};
use crate::window::{self, WindowWidth};

/// A display-window request from the view layer.
#[derive(Debug, Clone, Default)]
pub struct ViewRequest {
    /// Size-class width vocabulary; validated by the window mapping.
    pub size_class_width: String,
    /// Optional transaction to overlay. When no explicit anchor is set,
    /// its bucket key anchors the window so the highlighted month is
    /// visible.
    pub detail: Option<Highlight>,
    /// Explicit anchor month; the window ends at the month containing
    /// this key.
    pub anchor: Option<BucketKey>,
    /// Currency override for this request; wins over the stored user
    /// preference.
    pub currency: Option<String>,
}

/// Assembles chart-ready data for one request. Pure given the fetched
/// inputs: owns no state beyond the injected collaborators, so separate
/// assemblies can run concurrently and a discarded result has no side
/// effects.
pub struct Dashboard<'a> {
    store: &'a dyn BucketStore,
    providers: &'a ProviderSet,
    fallback_currency: String,
}

impl<'a> Dashboard<'a> {
    pub fn new(
        store: &'a dyn BucketStore,
        providers: &'a ProviderSet,
        fallback_currency: String,
    ) -> Self {
        Self {
            store,
            providers,
            fallback_currency,
        }
    }

    /// Run one aggregation: resolve the window, fetch the three bucket
    /// ranges concurrently, decode, and assemble series + stats.
    ///
    /// The month-window, year-to-date, and today reads are independent
    /// and joined before stats are computed; store failures propagate
    /// unchanged and nothing is retried here. A window that decodes no
    /// data yields an all-zero payload rather than an error.
    pub fn assemble(&self, request: &ViewRequest, now: DateTime<Utc>) -> Result<ChartPayload> {
        let width = WindowWidth::from_size_class(&request.size_class_width)?;
        let anchor = request
            .anchor
            .or_else(|| request.detail.as_ref().map(|h| h.bucket_key));
        let window_keys = window::month_window(width, anchor, now);

        let month_keys: Vec<String> = window_keys.iter().map(|k| k.to_string()).collect();
        let now_ms = now.timestamp_millis();
        let ytd_key = window::year_start(now_ms).to_string();
        let today_key = window::day_start(now_ms).to_string();

        let store = self.store;
        let (months, (ytd, today)) = rayon::join(
            || store.get(Granularity::Month, &month_keys),
            || {
                rayon::join(
                    || store.get(Granularity::Year, std::slice::from_ref(&ytd_key)),
                    || store.get(Granularity::Day, std::slice::from_ref(&today_key)),
                )
            },
        );
        let (months, ytd, today) = (months?, ytd?, today?);

        // Only buckets with a stored record enter the map; everything
        // else reads as absent (and aggregates as zero).
        let n = self.providers.len();
        let mut records: HashMap<BucketKey, BucketRecord> = HashMap::new();
        for (&key, kv) in window_keys.iter().zip(&months) {
            if let Some(value) = kv.value.as_deref() {
                records.insert(key, record::decode(Some(value), n));
            }
        }

        let series = series::build_series(
            &window_keys,
            &records,
            self.providers,
            request.detail.as_ref(),
        );
        let stats = stats::compute(
            &window_keys,
            &records,
            window::month_start(now_ms),
            self.decode_single(&ytd).as_ref(),
            self.decode_single(&today).as_ref(),
        );

        let currency = self.preferred_currency(request.currency.as_deref())?;

        Ok(ChartPayload {
            lines: series.lines,
            pie: series.pie,
            stats,
            currency,
            hcompany: request.detail.as_ref().map(|h| h.provider.clone()),
        })
    }

    /// Currency code for labeling: request override, else the stored
    /// user preference, else the configured fallback.
    pub fn preferred_currency(&self, override_code: Option<&str>) -> Result<String> {
        if let Some(code) = override_code {
            return Ok(code.to_uppercase());
        }
        let kvs = self.store.get_user(&[CURRENCY_KEY.to_string()])?;
        let stored = kvs.into_iter().next().and_then(|kv| kv.value);
        Ok(stored.unwrap_or_else(|| self.fallback_currency.clone()))
    }

    fn decode_single(&self, kvs: &[KeyValue]) -> Option<BucketRecord> {
        let value = kvs.first().and_then(|kv| kv.value.as_deref())?;
        Some(record::decode(Some(value), self.providers.len()))
    }
}
