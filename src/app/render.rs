//! Console output for the binary.

use colored::*;

use super::history::HistoryReport;
use super::locate::LocateReport;
use crate::geoip::GeoRecord;
use crate::history::HistoryEntry;
use crate::map::PopupContent;

/// Prints the current record, the map commands and the history size.
pub fn print_locate_report(report: &LocateReport) {
    match &report.current {
        Some(record) => print_record(record),
        None => println!("{}", "No location available".yellow()),
    }
    if let Some(error) = &report.error {
        println!("{} {}", "Error:".red().bold(), error);
    }

    if !report.map_commands.is_empty() {
        println!();
        println!("{}", "Map:".bold());
        for command in &report.map_commands {
            println!("  {command}");
        }
    }

    println!();
    println!("History: {} entr{}", report.history_len, plural(report.history_len));
    if let Some(warning) = &report.persistence_warning {
        println!("{} {}", "Warning:".yellow().bold(), warning);
    }
}

/// Prints history entries, newest first.
pub fn print_history(entries: &[HistoryEntry]) {
    if entries.is_empty() {
        println!("{}", "History is empty".dimmed());
        return;
    }
    for (index, entry) in entries.iter().enumerate() {
        let place = entry.data.place().unwrap_or_default();
        println!(
            "{:>3}. {:<39} {} {}",
            index + 1,
            entry.ip.as_str().bold(),
            entry.when.format("%Y-%m-%d %H:%M:%S UTC").to_string().as_str().dimmed(),
            place
        );
    }
}

/// Prints the outcome of a `history delete` or `history clear`.
pub fn print_history_report(report: &HistoryReport) {
    println!(
        "Removed {} entr{}, {} remaining",
        report.removed,
        plural(report.removed),
        report.remaining.len()
    );
    for address in &report.unknown {
        println!("{} {address} is not in history", "Skipped:".yellow());
    }
    if let Some(warning) = &report.persistence_warning {
        println!("{} {}", "Warning:".yellow().bold(), warning);
    }
}

fn print_record(record: &GeoRecord) {
    println!(
        "{} {}",
        "IP:".bold(),
        record.ip.as_deref().unwrap_or("unknown").green()
    );
    let popup = PopupContent::from_record(record);
    for line in popup.lines() {
        println!("{} {}", format!("{}:", line.label).as_str().bold(), line.value);
    }
    if let Some(loc) = &record.loc {
        println!("{} {}", "Loc:".bold(), loc);
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        "y"
    } else {
        "ies"
    }
}
