use std::io::stdout;

use anyhow::Result;
use crossterm::execute;
use ratatui::{
    backend::CrosstermBackend,
    style::{Color, Style},
    widgets::{Bar, BarChart, BarGroup, Block},
    Terminal, TerminalOptions, Viewport,
};

use crate::types::{ChartPayload, ProviderSet};
use crate::window;

const SERIES_COLORS: [Color; 6] = [
    Color::Cyan,
    Color::Magenta,
    Color::Yellow,
    Color::Green,
    Color::Blue,
    Color::Red,
];

fn series_color(i: usize) -> Color {
    SERIES_COLORS[i % SERIES_COLORS.len()]
}

/// Render the assembled window as a grouped terminal bar chart: one
/// group per month bucket, one bar per provider. Amounts are rounded to
/// whole currency units for the bar scale.
pub fn render(payload: &ChartPayload, providers: &ProviderSet) -> Result<()> {
    if payload.lines.is_empty() {
        eprintln!("No month buckets to display.");
        return Ok(());
    }

    let groups: Vec<BarGroup> = payload
        .lines
        .iter()
        .map(|row| {
            let bars: Vec<Bar> = (0..providers.len())
                .map(|i| {
                    Bar::default()
                        .value(row.values[providers.value_slot(i)].round() as u64)
                        .style(Style::default().fg(series_color(i)))
                })
                .collect();
            BarGroup::default()
                .label(window::month_label(row.bucket_key).into())
                .bars(&bars)
        })
        .collect();

    let title = format!("Spend by month — {}", payload.currency);
    let mut chart = BarChart::default()
        .block(Block::bordered().title(title))
        .bar_width(4)
        .bar_gap(0)
        .group_gap(2)
        .value_style(Style::default().fg(Color::White))
        .label_style(Style::default().fg(Color::DarkGray));
    for group in groups {
        chart = chart.data(group);
    }

    let chart_height: u16 = 17; // 15 for bars + 2 for border

    let mut terminal = Terminal::with_options(
        CrosstermBackend::new(stdout()),
        TerminalOptions {
            viewport: Viewport::Inline(chart_height),
        },
    )?;

    terminal.draw(|frame| {
        frame.render_widget(chart, frame.area());
    })?;

    // Move cursor below the chart before the legend prints
    execute!(stdout(), crossterm::cursor::MoveDown(1))?;

    println!("Series: {}", providers.names().join(" / "));
    if let Some(hcompany) = &payload.hcompany {
        println!("Highlighted transaction: {hcompany}");
    }

    Ok(())
}
