use super::render::intensity_level;
use crate::error::Result;
use crate::model::{Category, ContributionSeries, SummaryStats, Window};
use chrono::Datelike;
use console::style;
use serde::Serialize;

#[derive(Serialize)]
struct StatsOutput<'a> {
    login: &'a str,
    window: Window,
    stats: &'a SummaryStats,
}

pub fn output_json(login: &str, series: &ContributionSeries, stats: &SummaryStats) -> Result<()> {
    let output = StatsOutput {
        login,
        window: series.window(),
        stats,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Coloured calendar preview for the terminal, one line per weekday.
pub fn output_heatmap(login: &str, series: &ContributionSeries, stats: &SummaryStats) -> Result<()> {
    let window = series.window();
    println!(
        "{} {} ({} to {})",
        style("Contribution Heatmap").bold(),
        style(login).cyan(),
        window.start,
        window.end
    );
    println!("{}", "─".repeat(50));

    let lead = window.start.weekday().num_days_from_monday() as usize;
    let mut rows: [String; 7] = Default::default();
    for row in rows.iter_mut().take(lead) {
        row.push(' ');
    }
    for day in series.days() {
        let row = day.date.weekday().num_days_from_monday() as usize;
        let glyph = match intensity_level(day.total, stats.max_day_total) {
            0 => style("·").dim(),
            1 => style("▪").green().dim(),
            2 => style("▪").green(),
            3 => style("■").green(),
            _ => style("■").green().bold(),
        };
        rows[row].push_str(&glyph.to_string());
    }
    for (label, row) in ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"].iter().zip(rows.iter()) {
        println!("{label} {row}");
    }

    println!("\n{}", style("Summary").bold());
    println!("  Total contributions: {}", style(stats.total).cyan());
    println!("  Active days: {}", style(stats.active_days).cyan());
    println!("  Current streak: {} days", style(stats.current_streak).green());
    println!("  Longest streak: {} days", style(stats.longest_streak).green());
    match stats.busiest_day {
        Some(day) => println!(
            "  Busiest day: {} ({})",
            style(day).yellow(),
            stats.max_day_total
        ),
        None => println!("  Busiest day: {}", style("none").dim()),
    }
    for category in Category::ALL {
        println!("  {:<14} {:>6}", category.label(), stats.category_total(category));
    }
    for (category, repositories) in &stats.top_repositories {
        if let Some(top) = repositories.first() {
            println!(
                "  Top {} repository: {} ({})",
                category.label(),
                style(&top.name).cyan(),
                top.count
            );
        }
    }

    Ok(())
}
