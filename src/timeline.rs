use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use crate::aggregate::is_breaching;
use crate::classify;
use crate::engine::EngineConfig;
use crate::models::{ActivityEvent, DayVolume, EventLabel, Report};

/// Sparse volume series: one bucket per UTC calendar day inside the trailing
/// window, ascending by date. Zero-count days are not emitted; reports with
/// no timestamp (or dated in the future) are skipped.
pub fn daily_volume(reports: &[Report], now: DateTime<Utc>, window_days: i64) -> Vec<DayVolume> {
    let mut buckets: BTreeMap<chrono::NaiveDate, usize> = BTreeMap::new();

    for report in reports {
        let Some(created) = report.created_at else {
            continue;
        };
        let age = now.signed_duration_since(created);
        if age < Duration::zero() || age > Duration::days(window_days) {
            continue;
        }
        *buckets.entry(created.date_naive()).or_insert(0) += 1;
    }

    buckets
        .into_iter()
        .map(|(date, count)| DayVolume { date, count })
        .collect()
}

/// Newest-first feed. Prefers reports from the last `activity_window_minutes`;
/// when that subset is empty falls back to the overall newest. Capped at
/// `activity_cap` entries.
pub fn recent_activity(
    reports: &[Report],
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> Vec<ActivityEvent> {
    let mut ordered: Vec<&Report> = reports.iter().collect();
    // Stable sort: ties and timestamp-less reports keep input order, with
    // the timestamp-less ones at the tail.
    ordered.sort_by(|a, b| match (a.created_at, b.created_at) {
        (Some(ta), Some(tb)) => tb.cmp(&ta),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    let window = Duration::minutes(config.activity_window_minutes);
    let recent: Vec<&Report> = ordered
        .iter()
        .copied()
        .filter(|report| {
            report
                .created_at
                .is_some_and(|created| now.signed_duration_since(created) <= window)
        })
        .collect();

    let chosen = if recent.is_empty() { &ordered } else { &recent };

    chosen
        .iter()
        .take(config.activity_cap)
        .map(|report| activity_event(report, now, config))
        .collect()
}

fn activity_event(report: &Report, now: DateTime<Utc>, config: &EngineConfig) -> ActivityEvent {
    let open = classify::is_open(report.current_status.as_deref());

    let label = if is_breaching(report, now, config.sla_hours) {
        EventLabel::SlaWarning
    } else if !open {
        EventLabel::Resolution
    } else {
        EventLabel::NewReport
    };

    let area = report
        .area_name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or("this area");

    let detail = match label {
        EventLabel::SlaWarning => format!("{} in {} is breaching its SLA.", report.title, area),
        EventLabel::Resolution => format!("{} in {} has been resolved.", report.title, area),
        EventLabel::NewReport => {
            let severity = report
                .severity_label
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(str::to_lowercase);
            match severity {
                Some(severity) => {
                    format!("{} reported in {} ({severity} severity).", report.title, area)
                }
                None => format!("{} reported in {}.", report.title, area),
            }
        }
    };

    ActivityEvent {
        report_id: report.report_id,
        label,
        detail,
        age: time_ago(report.created_at, now),
    }
}

/// Rough relative age: "just now", "N min ago", "N hr(s) ago", "N day(s) ago".
pub fn time_ago(created: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(created) = created else {
        return String::new();
    };
    let minutes = now.signed_duration_since(created).num_minutes();
    if minutes < 1 {
        return "just now".to_string();
    }
    if minutes < 60 {
        return format!("{minutes} min ago");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours} hr{} ago", if hours == 1 { "" } else { "s" });
    }
    let days = hours / 24;
    format!("{days} day{} ago", if days == 1 { "" } else { "s" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
    }

    fn report_aged(id: i64, minutes_ago: Option<i64>, status: &str) -> Report {
        Report {
            report_id: id,
            title: format!("Report {id}"),
            description: None,
            address: None,
            category_name: None,
            area_name: Some("Riverside".to_string()),
            severity_label: Some("Medium".to_string()),
            current_status: Some(status.to_string()),
            created_at: minutes_ago.map(|m| fixed_now() - Duration::minutes(m)),
            latitude: None,
            longitude: None,
        }
    }

    #[test]
    fn buckets_by_utc_day_ascending() {
        let reports = vec![
            report_aged(1, Some(60 * 24 * 3), "OPEN"),
            report_aged(2, Some(30), "OPEN"),
        ];
        let volume = daily_volume(&reports, fixed_now(), 30);
        assert_eq!(volume.len(), 2);
        assert!(volume[0].date < volume[1].date);
        assert_eq!(volume[0].count, 1);
        assert_eq!(volume[1].count, 1);
    }

    #[test]
    fn same_day_reports_share_a_bucket() {
        let reports = vec![
            report_aged(1, Some(10), "OPEN"),
            report_aged(2, Some(90), "OPEN"),
        ];
        let volume = daily_volume(&reports, fixed_now(), 30);
        assert_eq!(volume.len(), 1);
        assert_eq!(volume[0].count, 2);
    }

    #[test]
    fn volume_skips_out_of_window_and_undated_reports() {
        let reports = vec![
            report_aged(1, Some(60 * 24 * 45), "OPEN"),
            report_aged(2, None, "OPEN"),
            report_aged(3, Some(-60 * 24 * 2), "OPEN"),
            report_aged(4, Some(5), "OPEN"),
        ];
        let volume = daily_volume(&reports, fixed_now(), 30);
        assert_eq!(volume.len(), 1);
        for bucket in &volume {
            let age = fixed_now().date_naive() - bucket.date;
            assert!(age.num_days() >= 0 && age.num_days() <= 30);
        }
    }

    #[test]
    fn feed_is_newest_first_and_capped() {
        let reports: Vec<Report> = (0..15).map(|i| report_aged(i, Some(i + 1), "OPEN")).collect();
        let feed = recent_activity(&reports, fixed_now(), &EngineConfig::default());
        assert_eq!(feed.len(), 9);
        assert_eq!(feed[0].report_id, 0);
        assert_eq!(feed[8].report_id, 8);
    }

    #[test]
    fn feed_falls_back_to_newest_when_last_hour_is_quiet() {
        let reports = vec![
            report_aged(1, Some(60 * 5), "OPEN"),
            report_aged(2, Some(60 * 3), "OPEN"),
        ];
        let feed = recent_activity(&reports, fixed_now(), &EngineConfig::default());
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].report_id, 2);
    }

    #[test]
    fn feed_is_empty_for_empty_collection() {
        let feed = recent_activity(&[], fixed_now(), &EngineConfig::default());
        assert!(feed.is_empty());
    }

    #[test]
    fn undated_reports_sort_last_in_the_fallback_feed() {
        let reports = vec![
            report_aged(1, None, "OPEN"),
            report_aged(2, Some(60 * 2), "OPEN"),
        ];
        let feed = recent_activity(&reports, fixed_now(), &EngineConfig::default());
        assert_eq!(feed[0].report_id, 2);
        assert_eq!(feed[1].report_id, 1);
    }

    #[test]
    fn event_labels_follow_priority_order() {
        // all older than the hour window so the fallback keeps every report
        let breaching = report_aged(1, Some(60 * 50), "OPEN");
        let resolved = report_aged(2, Some(60 * 3), "RESOLVED");
        let fresh = report_aged(3, Some(60 * 2), "OPEN");

        let reports = vec![breaching, resolved, fresh];
        let feed = recent_activity(&reports, fixed_now(), &EngineConfig::default());

        let by_id = |id: i64| feed.iter().find(|e| e.report_id == id).unwrap();
        assert_eq!(by_id(1).label, EventLabel::SlaWarning);
        assert!(by_id(1).detail.contains("is breaching its SLA"));
        assert_eq!(by_id(2).label, EventLabel::Resolution);
        assert!(by_id(2).detail.contains("has been resolved"));
        assert_eq!(by_id(3).label, EventLabel::NewReport);
        assert!(by_id(3).detail.contains("(medium severity)"));
    }

    #[test]
    fn new_report_detail_defaults_area_and_omits_missing_severity() {
        let mut report = report_aged(1, Some(5), "OPEN");
        report.area_name = None;
        report.severity_label = None;
        let feed = recent_activity(&[report], fixed_now(), &EngineConfig::default());
        assert_eq!(feed[0].detail, "Report 1 reported in this area.");
    }

    #[test]
    fn time_ago_tiers() {
        let now = fixed_now();
        assert_eq!(time_ago(Some(now - Duration::seconds(20)), now), "just now");
        assert_eq!(time_ago(Some(now - Duration::minutes(5)), now), "5 min ago");
        assert_eq!(time_ago(Some(now - Duration::minutes(61)), now), "1 hr ago");
        assert_eq!(time_ago(Some(now - Duration::hours(3)), now), "3 hrs ago");
        assert_eq!(time_ago(Some(now - Duration::hours(25)), now), "1 day ago");
        assert_eq!(time_ago(Some(now - Duration::days(3)), now), "3 days ago");
        assert_eq!(time_ago(None, now), "");
    }
}
