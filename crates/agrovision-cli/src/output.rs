//! Output renderers and formatting helpers for CLI commands.

use agrovision_api_models::{BatchRecord, BatchSummary, Identity, WeatherReport};
use agrovision_config::WeatherUnits;
use agrovision_core::{BatchView, TrackingEntry};
use anyhow::anyhow;
use serde::Serialize;
use serde_json::{Value, json};

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    println!("{text}");
    Ok(())
}

pub(crate) fn render_identity(identity: &Identity, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(identity)?,
        OutputFormat::Table => {
            println!("signed in as {}", identity.display_name());
            println!("user id: {}", identity.user_id);
            println!("email: {}", identity.email);
            println!("phone: {}", identity.phone_number);
            if let Some(location) = &identity.location {
                println!("location: {location}");
            }
        }
    }
    Ok(())
}

pub(crate) fn render_batch_list(batches: &[BatchSummary], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(batches)?,
        OutputFormat::Table => {
            for line in batch_list_lines(batches) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

fn batch_list_lines(batches: &[BatchSummary]) -> Vec<String> {
    if batches.is_empty() {
        return vec!["no batches yet".to_string()];
    }
    let mut lines = vec![format!("{:>6} {:<14} {:<16} NAME", "ID", "STATUS", "TYPE")];
    lines.extend(batches.iter().map(|summary| {
        format!(
            "{:>6} {:<14} {:<16} {}",
            summary.batch_id, summary.status, summary.kind, summary.name
        )
    }));
    lines
}

pub(crate) fn render_batch_record(record: &BatchRecord, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(record)?,
        OutputFormat::Table => {
            for line in record_lines(record) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

fn record_lines(record: &BatchRecord) -> Vec<String> {
    let mut lines = vec![
        format!("id: {}", record.batch_id),
        format!("name: {}", record.name),
        format!("type: {}", record.kind),
        format!("substrate: {}", record.substrate),
        format!("sown: {}", record.sowing_date),
    ];
    if let Some(harvest) = record.expected_harvest_date {
        lines.push(format!("expected harvest: {harvest}"));
    }
    lines.push(format!("status: {}", record.status));
    lines
}

pub(crate) fn render_batch_view(view: &BatchView, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&batch_view_json(view))?,
        OutputFormat::Table => {
            for line in batch_view_lines(view) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

fn batch_view_json(view: &BatchView) -> Value {
    let timeline: Vec<Value> = view.timeline().iter().map(timeline_json).collect();
    json!({
        "batch_id": view.batch_id(),
        "record": view.record(),
        "placeholder": view.placeholder(),
        "timeline": timeline,
    })
}

fn timeline_json(entry: &TrackingEntry) -> Value {
    match entry {
        TrackingEntry::Photo(photo) => json!({
            "kind": "photo",
            "sequence": photo.sequence,
            "uri": photo.uri,
        }),
        TrackingEntry::Irrigation(event) => json!({
            "kind": "irrigation",
            "sequence": event.sequence,
            "watered_at": event.watered_at,
        }),
        TrackingEntry::GrowthNote(note) => json!({
            "kind": "growth_note",
            "sequence": note.sequence,
            "text": note.text,
            "recorded_at": note.recorded_at,
        }),
    }
}

fn batch_view_lines(view: &BatchView) -> Vec<String> {
    let mut lines = match (view.record(), view.placeholder()) {
        (Some(record), _) => record_lines(record),
        (None, Some(placeholder)) => vec![placeholder.to_string()],
        (None, None) => Vec::new(),
    };
    let timeline = view.timeline();
    if !timeline.is_empty() {
        lines.push("tracking:".to_string());
        lines.extend(timeline.iter().map(|entry| match entry {
            TrackingEntry::Photo(photo) => format!("  #{} photo {}", photo.sequence, photo.uri),
            TrackingEntry::Irrigation(event) => format!(
                "  #{} watered {}",
                event.sequence,
                event.watered_at.format("%Y-%m-%d %H:%M")
            ),
            TrackingEntry::GrowthNote(note) => format!("  #{} note {}", note.sequence, note.text),
        }));
    }
    lines
}

pub(crate) fn render_weather(
    report: &WeatherReport,
    units: WeatherUnits,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(report)?,
        OutputFormat::Table => println!("{}", weather_line(report, units)),
    }
    Ok(())
}

fn weather_line(report: &WeatherReport, units: WeatherUnits) -> String {
    let place = report.name.as_deref().unwrap_or("current location");
    let mut line = format!(
        "{place}: {:.1}{} humidity {:.0}%",
        report.main.temp,
        units.temperature_suffix(),
        report.main.humidity
    );
    if let Some(description) = report.description() {
        line.push_str(", ");
        line.push_str(description);
    }
    line
}

pub(crate) fn render_answer(answer: &str, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&json!({ "response": answer }))?,
        OutputFormat::Table => println!("{answer}"),
    }
    Ok(())
}
