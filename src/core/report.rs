use crate::core::ranges::format_ranges;
use crate::domain::model::{RecordFields, SeriesReport};
use crate::utils::error::Result;
use chrono::Utc;
use serde_json::json;

pub const STATUS_OK: &str = "OK";
pub const STATUS_MISSING: &str = "Volumes missing";

/// Machine-readable report: series name → result object, preserving the
/// order series were configured in.
pub fn render_json(reports: &[SeriesReport]) -> Result<String> {
    let mut map = serde_json::Map::new();
    for report in reports {
        map.insert(
            report.name.clone(),
            json!({
                "url": report.url,
                "owned": report.owned,
                "existing": report.existing,
                "missing": report.missing,
                "missing_count": report.missing_count,
            }),
        );
    }
    Ok(serde_json::to_string_pretty(&serde_json::Value::Object(
        map,
    ))?)
}

/// Human-readable report, one section per series.
pub fn render_markdown(reports: &[SeriesReport]) -> String {
    let mut lines = vec!["# Volume Tracker\n".to_string()];
    for report in reports {
        lines.push(format!("## {}", report.name));
        lines.push(format!("- Owned: {}", join_volumes(&report.owned)));
        lines.push(format!("- On page: {}", join_volumes(&report.existing)));
        lines.push(format!(
            "- Missing ({}): {}\n",
            report.missing_count,
            format_ranges(&report.missing)
        ));
    }
    lines.join("\n")
}

/// Assembles the values pushed to the external record store for one series.
pub fn record_fields(report: &SeriesReport, checked_at: String) -> RecordFields {
    let status = if report.missing.is_empty() {
        STATUS_OK
    } else {
        STATUS_MISSING
    };

    RecordFields {
        url: report.url.clone(),
        missing_count: report.missing_count,
        missing_volumes: format_ranges(&report.missing),
        owned_volumes: join_volumes(&report.owned),
        existing_volumes: join_volumes(&report.existing),
        checked_at,
        status: status.to_string(),
    }
}

pub fn checked_at_timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M UTC").to_string()
}

fn join_volumes(values: &[u32]) -> String {
    values
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
