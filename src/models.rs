use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A civic-issue report as the store's list endpoint returns it.
///
/// Everything beyond the id is optional on the wire; downstream stages
/// default absent fields instead of failing.
#[derive(Debug, Clone, Deserialize)]
pub struct Report {
    pub report_id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub area_name: Option<String>,
    #[serde(default)]
    pub severity_label: Option<String>,
    #[serde(default)]
    pub current_status: Option<String>,
    #[serde(default, deserialize_with = "de_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Canonical severity. The raw label stays on the report for display; this
/// is what the counting and scoring logic keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    High,
    Medium,
    Low,
    Other,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
            Severity::Other => "OTHER",
        }
    }

    /// Queue-pressure weight used for the area load score.
    pub fn weight(self) -> u32 {
        match self {
            Severity::High => 3,
            Severity::Medium => 2,
            Severity::Low | Severity::Other => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeverityCount {
    pub severity: Severity,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: usize,
}

/// One ranked service-area queue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupLoad {
    pub name: String,
    pub open_count: usize,
    pub high_open: usize,
    pub score: u32,
    pub load_index: u32,
    pub avg_open_age_hours: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoadStatus {
    #[serde(rename = "Critical")]
    Critical,
    #[serde(rename = "Under strain")]
    UnderStrain,
    #[serde(rename = "Stable")]
    Stable,
}

impl LoadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LoadStatus::Critical => "Critical",
            LoadStatus::UnderStrain => "Under strain",
            LoadStatus::Stable => "Stable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentView {
    pub name: String,
    pub load_index: u32,
    pub open_count: usize,
    pub avg_open_age_hours: f64,
    pub status: LoadStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayVolume {
    pub date: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EventLabel {
    #[serde(rename = "SLA warning")]
    SlaWarning,
    #[serde(rename = "Resolution")]
    Resolution,
    #[serde(rename = "New report filed")]
    NewReport,
}

impl EventLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            EventLabel::SlaWarning => "SLA warning",
            EventLabel::Resolution => "Resolution",
            EventLabel::NewReport => "New report filed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityEvent {
    pub report_id: i64,
    pub label: EventLabel,
    pub detail: String,
    pub age: String,
}

/// Everything the dashboard needs, derived fresh from one report collection
/// and one sampled "now". Never cached, never mutated incrementally.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedMetrics {
    pub total: usize,
    pub open_count: usize,
    pub closed_count: usize,
    pub high_severity_open_count: usize,
    pub breaching_count: usize,
    pub new_last_24h: usize,
    pub resolved_last_24h: usize,
    pub severity_counts: Vec<SeverityCount>,
    pub status_counts: Vec<StatusCount>,
    pub group_load: Vec<GroupLoad>,
    pub department_view: Vec<DepartmentView>,
    pub daily_volume: Vec<DayVolume>,
    pub activity_feed: Vec<ActivityEvent>,
}

/// Body for `PUT /reports/{id}/status`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusChange {
    pub new_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub changed_by: i64,
}

// Detail payload for the single-report side channel. The engine never
// touches these; only the CLI `show` command does.

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAreaRef {
    pub area_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRef {
    pub category_id: i64,
    pub name: String,
    #[serde(default)]
    pub default_sla_hours: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeverityRef {
    pub severity_id: i64,
    pub label: String,
    pub weight: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default, deserialize_with = "de_timestamp")]
    pub changed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportDetail {
    pub report_id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub current_status: Option<String>,
    #[serde(default, deserialize_with = "de_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub service_area: Option<ServiceAreaRef>,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    #[serde(default)]
    pub severity: Option<SeverityRef>,
    #[serde(default)]
    pub status_history: Vec<StatusUpdate>,
}

/// The store emits RFC 3339 timestamps with an offset or bare ISO datetimes
/// without one; bare values are taken as UTC. Unparseable values become None.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    raw.parse::<NaiveDateTime>().ok().map(|naive| naive.and_utc())
}

fn de_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}
