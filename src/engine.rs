use chrono::{DateTime, Utc};

use crate::aggregate;
use crate::models::{DerivedMetrics, Report};
use crate::rank;
use crate::timeline;

/// Policy constants for the whole derivation. The SLA threshold and the
/// department status cutoffs are operational guesses carried over from the
/// dashboard, not contractual values, so they live here rather than inline.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Open reports older than this are flagged as (approximately) breaching.
    pub sla_hours: i64,
    pub volume_window_days: i64,
    pub activity_window_minutes: i64,
    pub activity_cap: usize,
    pub group_cap: usize,
    pub pulse_window_hours: i64,
    pub critical_load_index: u32,
    pub strain_load_index: u32,
    pub critical_breach_count: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sla_hours: 48,
            volume_window_days: 30,
            activity_window_minutes: 60,
            activity_cap: 9,
            group_cap: 10,
            pulse_window_hours: 24,
            critical_load_index: 80,
            strain_load_index: 50,
            critical_breach_count: 5,
        }
    }
}

/// The whole engine as one pure function: `Reports -> DerivedMetrics`.
///
/// `now` is sampled once by the caller and threaded through every stage, so
/// the SLA, volume, and activity windows all agree and the result is
/// reproducible under a fixed clock.
pub fn derive_metrics(
    reports: &[Report],
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> DerivedMetrics {
    let agg = aggregate::aggregate(reports, now, config);
    let group_load = rank::rank_groups(agg.groups, config.group_cap);
    let department_view = rank::department_view(&group_load, agg.breaching_count, config);
    let daily_volume = timeline::daily_volume(reports, now, config.volume_window_days);
    let activity_feed = timeline::recent_activity(reports, now, config);

    DerivedMetrics {
        total: agg.total,
        open_count: agg.open_count,
        closed_count: agg.closed_count,
        high_severity_open_count: agg.high_severity_open_count,
        breaching_count: agg.breaching_count,
        new_last_24h: agg.new_last_24h,
        resolved_last_24h: agg.resolved_last_24h,
        severity_counts: agg.severity_counts,
        status_counts: agg.status_counts,
        group_load,
        department_view,
        daily_volume,
        activity_feed,
    }
}
