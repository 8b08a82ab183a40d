use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::engine::EngineConfig;
use crate::models::DerivedMetrics;

/// Renders the derived metrics as a markdown dashboard snapshot.
pub fn build_report(
    metrics: &DerivedMetrics,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# GridWatch Metrics Snapshot");
    let _ = writeln!(output, "Generated at {} UTC", now.format("%Y-%m-%d %H:%M"));
    let _ = writeln!(output);

    let _ = writeln!(output, "## Grid Status");
    let _ = writeln!(output, "- Total reports: {}", metrics.total);
    let _ = writeln!(
        output,
        "- Open: {} / Closed: {}",
        metrics.open_count, metrics.closed_count
    );
    let _ = writeln!(
        output,
        "- High severity open: {}",
        metrics.high_severity_open_count
    );
    let _ = writeln!(
        output,
        "- Breaching SLA (approx., >{}h): {}",
        config.sla_hours, metrics.breaching_count
    );
    let _ = writeln!(
        output,
        "- Filed in last 24h: {} ({} resolved)",
        metrics.new_last_24h, metrics.resolved_last_24h
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Severity Mix");
    if metrics.severity_counts.is_empty() {
        let _ = writeln!(output, "No reports in this snapshot.");
    } else {
        for entry in &metrics.severity_counts {
            let _ = writeln!(output, "- {}: {}", entry.severity.as_str(), entry.count);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Status Breakdown");
    if metrics.status_counts.is_empty() {
        let _ = writeln!(output, "No reports in this snapshot.");
    } else {
        for entry in &metrics.status_counts {
            let _ = writeln!(output, "- {}: {}", entry.status, entry.count);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Service Area Load");
    if metrics.group_load.is_empty() {
        let _ = writeln!(output, "No open reports; all queues clear.");
    } else {
        for group in &metrics.group_load {
            let _ = writeln!(
                output,
                "- {}: load {} ({} open, {} high severity, score {})",
                group.name, group.load_index, group.open_count, group.high_open, group.score
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Department View");
    if metrics.department_view.is_empty() {
        let _ = writeln!(output, "No departments under load.");
    } else {
        for dept in &metrics.department_view {
            let _ = writeln!(
                output,
                "- {}: {} (load {}, avg open age {:.1}h)",
                dept.name,
                dept.status.as_str(),
                dept.load_index,
                dept.avg_open_age_hours
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "## Daily Volume (last {} days)",
        config.volume_window_days
    );
    if metrics.daily_volume.is_empty() {
        let _ = writeln!(output, "No dated reports in the window.");
    } else {
        for day in &metrics.daily_volume {
            let _ = writeln!(output, "- {}: {}", day.date, day.count);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Activity Pulse");
    if metrics.activity_feed.is_empty() {
        let _ = writeln!(output, "No recent activity.");
    } else {
        for event in &metrics.activity_feed {
            let _ = writeln!(
                output,
                "- [{}] {} ({})",
                event.label.as_str(),
                event.detail,
                event.age
            );
        }
    }

    output
}
