use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "faretab",
    about = "Taxi fare dashboard: windowed per-provider spend, stats, and chart data"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Display width: short|small|medium (6 months) or long|large|full (12)
    #[arg(long, global = true, default_value = "full")]
    pub width: String,

    /// Anchor month (YYYY-MM); the window ends at this month
    #[arg(long, global = true)]
    pub month: Option<String>,

    /// Currency code (ISO 4217) for labels, e.g. GBP, EUR
    #[arg(long, global = true)]
    pub currency: Option<String>,

    /// Output format: table (default), json
    #[arg(long, global = true, default_value = "table")]
    pub format: OutputFormat,

    /// Provider of a transaction to overlay on the chart
    #[arg(
        long,
        global = true,
        requires = "highlight_amount",
        requires = "highlight_date"
    )]
    pub highlight_provider: Option<String>,

    /// Amount of the overlaid transaction
    #[arg(long, global = true, requires = "highlight_provider")]
    pub highlight_amount: Option<f64>,

    /// Date (YYYY-MM-DD) of the overlaid transaction
    #[arg(long, global = true, requires = "highlight_provider")]
    pub highlight_date: Option<NaiveDate>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Assemble and print the dashboard (default)
    Show,
    /// Render the window as a terminal bar chart
    Plot,
    /// Re-render whenever the bucket store changes
    Watch {
        /// Minimum seconds between refreshes (debounce)
        #[arg(long, default_value = "2")]
        interval: u64,
    },
    /// Import trip receipts (*.jsonl) into the bucket store
    Import {
        /// Directory to scan recursively
        dir: PathBuf,
    },
    /// Set the preferred currency and notify the settings webhook
    Currency {
        /// ISO 4217 code, e.g. GBP
        code: String,
    },
}

#[derive(ValueEnum, Debug, Clone, PartialEq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl Cli {
    pub fn effective_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Show)
    }
}
