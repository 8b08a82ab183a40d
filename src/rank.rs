use std::collections::HashMap;

use crate::aggregate::GroupAccumulator;
use crate::engine::EngineConfig;
use crate::models::{DepartmentView, GroupLoad, LoadStatus};

/// Scale a raw score so the busiest group lands at 100. The divisor is
/// floored at 1 so an all-zero result set stays at 0 instead of dividing
/// by zero.
pub fn normalize_load(score: u32, max_score: u32) -> u32 {
    let max = max_score.max(1) as f64;
    ((score as f64 / max) * 100.0).round() as u32
}

/// Turn raw accumulations into the ranked, capped load table. Order: load
/// index descending, open count descending, then name for determinism.
pub fn rank_groups(groups: HashMap<String, GroupAccumulator>, cap: usize) -> Vec<GroupLoad> {
    let max_score = groups.values().map(|acc| acc.score).max().unwrap_or(0);

    let mut rows: Vec<GroupLoad> = groups
        .into_iter()
        .map(|(name, acc)| GroupLoad {
            load_index: normalize_load(acc.score, max_score),
            avg_open_age_hours: if acc.open_count == 0 {
                0.0
            } else {
                acc.sum_open_age_hours / acc.open_count as f64
            },
            name,
            open_count: acc.open_count,
            high_open: acc.high_open,
            score: acc.score,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.load_index
            .cmp(&a.load_index)
            .then(b.open_count.cmp(&a.open_count))
            .then(a.name.cmp(&b.name))
    });
    rows.truncate(cap);
    rows
}

/// Qualitative queue health. The thresholds are policy knobs on
/// `EngineConfig`, not derived truths.
pub fn load_status(load_index: u32, breaching_count: usize, config: &EngineConfig) -> LoadStatus {
    if load_index > config.critical_load_index || breaching_count > config.critical_breach_count {
        LoadStatus::Critical
    } else if load_index > config.strain_load_index || breaching_count > 0 {
        LoadStatus::UnderStrain
    } else {
        LoadStatus::Stable
    }
}

pub fn department_view(
    group_load: &[GroupLoad],
    breaching_count: usize,
    config: &EngineConfig,
) -> Vec<DepartmentView> {
    group_load
        .iter()
        .map(|group| DepartmentView {
            name: group.name.clone(),
            load_index: group.load_index,
            open_count: group.open_count,
            avg_open_age_hours: group.avg_open_age_hours,
            status: load_status(group.load_index, breaching_count, config),
        })
        .collect()
}
