use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};

use crate::classify;
use crate::engine::EngineConfig;
use crate::models::{Report, Severity, SeverityCount, StatusCount};

/// Raw per-group accumulation before normalization. Only open reports
/// contribute.
#[derive(Debug, Clone, Default)]
pub struct GroupAccumulator {
    pub open_count: usize,
    pub high_open: usize,
    pub score: u32,
    pub sum_open_age_hours: f64,
}

#[derive(Debug, Default)]
pub struct Aggregation {
    pub total: usize,
    pub open_count: usize,
    pub closed_count: usize,
    pub high_severity_open_count: usize,
    pub breaching_count: usize,
    pub new_last_24h: usize,
    pub resolved_last_24h: usize,
    pub severity_counts: Vec<SeverityCount>,
    pub status_counts: Vec<StatusCount>,
    pub groups: HashMap<String, GroupAccumulator>,
}

/// Crude SLA approximation, not a contractual deadline: open and older than
/// the configured threshold. Reports with no timestamp never breach.
pub fn is_breaching(report: &Report, now: DateTime<Utc>, sla_hours: i64) -> bool {
    if !classify::is_open(report.current_status.as_deref()) {
        return false;
    }
    match report.created_at {
        Some(created) => now.signed_duration_since(created) > Duration::hours(sla_hours),
        None => false,
    }
}

pub fn hours_since(created: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    now.signed_duration_since(created).num_minutes() as f64 / 60.0
}

/// Single pass over the collection. Never fails, whatever shape the
/// reports are in.
pub fn aggregate(reports: &[Report], now: DateTime<Utc>, config: &EngineConfig) -> Aggregation {
    let mut agg = Aggregation::default();
    let mut severity_counts: BTreeMap<Severity, usize> = BTreeMap::new();
    let mut status_rows: Vec<StatusCount> = Vec::new();

    for report in reports {
        let class = classify::classify(report);

        agg.total += 1;
        if class.open {
            agg.open_count += 1;
        } else {
            agg.closed_count += 1;
        }
        if class.open && class.severity == Severity::High {
            agg.high_severity_open_count += 1;
        }
        if is_breaching(report, now, config.sla_hours) {
            agg.breaching_count += 1;
        }

        *severity_counts.entry(class.severity).or_insert(0) += 1;

        let status_label = match report.current_status.as_deref() {
            Some(raw) if !raw.is_empty() => raw.to_uppercase(),
            _ => "UNKNOWN".to_string(),
        };
        match status_rows.iter_mut().find(|row| row.status == status_label) {
            Some(row) => row.count += 1,
            None => status_rows.push(StatusCount {
                status: status_label,
                count: 1,
            }),
        }

        if let Some(created) = report.created_at {
            let age = now.signed_duration_since(created);
            if age <= Duration::hours(config.pulse_window_hours) {
                agg.new_last_24h += 1;
                if !class.open {
                    agg.resolved_last_24h += 1;
                }
            }
        }

        if class.open {
            let entry = agg.groups.entry(class.group).or_default();
            entry.open_count += 1;
            if class.severity == Severity::High {
                entry.high_open += 1;
            }
            entry.score += class.severity.weight();
            if let Some(created) = report.created_at {
                entry.sum_open_age_hours += hours_since(created, now);
            }
        }
    }

    agg.severity_counts = severity_counts
        .into_iter()
        .map(|(severity, count)| SeverityCount { severity, count })
        .collect();

    // Descending by count; the sort is stable, so equal counts keep
    // first-seen order.
    status_rows.sort_by(|a, b| b.count.cmp(&a.count));
    agg.status_counts = status_rows;

    agg
}
