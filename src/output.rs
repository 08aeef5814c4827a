use crate::summary::SummaryReport;
use crate::util::format_int;
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Markdown table for `rows`, at most `max_rows` of them.
pub fn markdown_table<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

fn print_section<T>(title: &str, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}\n", title);
    println!("{}", markdown_table(rows, max_rows));
    if rows.len() > max_rows {
        println!("({} more rows not shown)", format_int((rows.len() - max_rows) as i64));
    }
    println!();
}

pub fn print_summary(report: &SummaryReport, max_rows: usize) {
    println!("Claims loaded: {}\n", format_int(report.rows as i64));
    print_section("Summary Cards", &report.cards.rows(), max_rows);
    print_section("Fraud by Age Group", &report.fraud_by_age_group, max_rows);
    println!(
        "Premium vs Tenure: {} points\n",
        format_int(report.premium_points as i64)
    );
    print_section("Fraud Incidents by Date", &report.daily_counts, max_rows);
    print_section("Police Report Available", &report.police_report, max_rows);
    print_section("Claim Breakdown by Auto Year", &report.claim_breakdown_by_year, max_rows);
    print_section("Claims by Auto Year", &report.claims_by_year, max_rows);
    print_section("Fraud by City", &report.fraud_by_city, max_rows);
    print_section("Claims by Hour of Day", &report.claims_by_hour, max_rows);
}
