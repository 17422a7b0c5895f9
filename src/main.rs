mod chart;
mod cli;
mod config;
mod currency;
mod dashboard;
mod error;
mod ingest;
mod output;
mod record;
mod series;
mod stats;
mod storage;
mod types;
mod watch;
mod webhook;
mod window;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, TimeZone, Utc};
use clap::Parser;

use cli::{Cli, Command};
use dashboard::{Dashboard, ViewRequest};
use types::Highlight;

fn date_to_millis(date: NaiveDate) -> i64 {
    let midnight = date.and_hms_opt(0, 0, 0).unwrap();
    Utc.from_utc_datetime(&midnight).timestamp_millis()
}

fn parse_anchor_month(value: &str) -> Result<i64> {
    let date = NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d")
        .with_context(|| format!("invalid --month {value:?}, expected YYYY-MM"))?;
    Ok(date_to_millis(date))
}

fn view_request(cli: &Cli) -> Result<ViewRequest> {
    let detail = match (
        &cli.highlight_provider,
        cli.highlight_amount,
        cli.highlight_date,
    ) {
        (Some(provider), Some(amount), Some(date)) => Some(Highlight {
            // The overlay targets the transaction's month bucket.
            bucket_key: window::month_start(date_to_millis(date)),
            provider: provider.clone(),
            amount,
        }),
        (None, None, None) => None,
        _ => bail!("--highlight-provider, --highlight-amount and --highlight-date go together"),
    };

    let anchor = match &cli.month {
        Some(value) => Some(parse_anchor_month(value)?),
        None => None,
    };

    Ok(ViewRequest {
        size_class_width: cli.width.clone(),
        detail,
        anchor,
        currency: cli.currency.clone(),
    })
}

fn set_currency(code: &str, config: &config::Config) -> Result<()> {
    // Unknown codes are rejected here, before anything is written.
    let fmt = currency::CurrencyFormat::resolve(code)?;

    let mut store = storage::default_store();
    store.put_user(vec![storage::KeyValue {
        key: storage::CURRENCY_KEY.to_string(),
        value: Some(fmt.code.clone()),
    }])?;
    store.flush()?;

    if let Some(url) = &config.webhook_url {
        webhook::notify_currency_change(url, &fmt.code);
    }

    eprintln!("Currency preference set to {}", fmt.code);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load_config();
    let providers = config.provider_set();

    match cli.effective_command() {
        Command::Import { dir } => {
            let mut store = storage::default_store();
            let summary = ingest::import_dir(&dir, store.as_mut(), &providers)?;
            eprintln!(
                "Imported {} trips from {} files ({} duplicates, {} with unknown provider).",
                summary.trips, summary.files, summary.duplicates, summary.unknown_provider
            );
        }
        Command::Currency { code } => {
            set_currency(&code, &config)?;
        }
        Command::Watch { interval } => {
            let request = view_request(&cli)?;
            watch::run(&request, &config, interval)?;
        }
        Command::Show => {
            let request = view_request(&cli)?;
            let store = storage::default_store();
            let dashboard = Dashboard::new(store.as_ref(), &providers, config.default_currency());
            let payload = dashboard.assemble(&request, Utc::now())?;

            match cli.format {
                cli::OutputFormat::Json => output::print_json(&payload),
                cli::OutputFormat::Table => {
                    let fmt = output::currency_format_or_raw(&payload.currency);
                    output::print_table(&payload, &providers, &fmt);
                }
            }
        }
        Command::Plot => {
            let request = view_request(&cli)?;
            let store = storage::default_store();
            let dashboard = Dashboard::new(store.as_ref(), &providers, config.default_currency());
            let payload = dashboard.assemble(&request, Utc::now())?;
            chart::render(&payload, &providers)?;
        }
    }

    Ok(())
}
