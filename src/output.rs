use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};

use crate::currency::CurrencyFormat;
use crate::types::{ChartPayload, ProviderSet};
use crate::window;

/// Resolve a display format for a currency code. An unrecognized code is
/// surfaced as a warning and the raw code is used for labels; the
/// numeric payload is unaffected either way.
pub fn currency_format_or_raw(code: &str) -> CurrencyFormat {
    match CurrencyFormat::resolve(code) {
        Ok(fmt) => fmt,
        Err(e) => {
            eprintln!("Warning: {e}; labeling amounts with the raw code");
            CurrencyFormat::raw(code)
        }
    }
}

fn format_amount(fmt: &CurrencyFormat, amount: Option<f64>) -> String {
    match amount {
        Some(a) => fmt.format(a),
        None => "N/A".to_string(),
    }
}

fn provider_header(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

pub fn print_table(payload: &ChartPayload, providers: &ProviderSet, fmt: &CurrencyFormat) {
    let mut summary = Table::new();
    summary.load_preset(UTF8_FULL_CONDENSED);
    summary.set_content_arrangement(ContentArrangement::Dynamic);
    summary.set_header(vec![
        Cell::new("Trips"),
        Cell::new("Total"),
        Cell::new("Average"),
        Cell::new("This month"),
        Cell::new("This year"),
        Cell::new("Today"),
    ]);
    summary.add_row(vec![
        Cell::new(payload.stats.trips),
        Cell::new(fmt.format(payload.stats.total)),
        Cell::new(format_amount(fmt, payload.stats.average)),
        Cell::new(format_amount(fmt, payload.stats.mtd)),
        Cell::new(format_amount(fmt, payload.stats.ytd)),
        Cell::new(format_amount(fmt, payload.stats.today)),
    ]);
    println!("{summary}");

    let mut months = Table::new();
    months.load_preset(UTF8_FULL_CONDENSED);
    months.set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec![Cell::new("Month")];
    header.extend(
        providers
            .names()
            .iter()
            .map(|name| Cell::new(provider_header(name))),
    );
    months.set_header(header);

    for row in &payload.lines {
        let mut cells = vec![Cell::new(window::month_label(row.bucket_key))];
        for i in 0..providers.len() {
            cells.push(Cell::new(fmt.format(row.values[providers.value_slot(i)])));
        }
        months.add_row(cells);
    }

    let mut total_row = vec![Cell::new("TOTAL")];
    total_row.extend(payload.pie.iter().map(|&sum| Cell::new(fmt.format(sum))));
    months.add_row(total_row);

    println!("{months}");

    if let Some(hcompany) = &payload.hcompany {
        println!("Highlighted transaction: {hcompany}");
    }
}

pub fn print_json(payload: &ChartPayload) {
    match serde_json::to_string_pretty(payload) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("faretab: failed to serialize payload: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_code_falls_back_to_raw_labeling() {
        let fmt = currency_format_or_raw("ZZZ");
        assert_eq!(fmt.format(1.0), "ZZZ 1.00");

        let fmt = currency_format_or_raw("GBP");
        assert_eq!(fmt.format(1.0), "£1.00");
    }

    #[test]
    fn absent_amounts_render_as_na() {
        let fmt = CurrencyFormat::resolve("GBP").unwrap();
        assert_eq!(format_amount(&fmt, None), "N/A");
        assert_eq!(format_amount(&fmt, Some(2.5)), "£2.50");
    }

    #[test]
    fn provider_headers_are_capitalized() {
        assert_eq!(provider_header("uber"), "Uber");
        assert_eq!(provider_header(""), "");
    }
}
