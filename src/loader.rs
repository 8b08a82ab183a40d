use std::path::Path;

use anyhow::Context;

use crate::models::{parse_timestamp, Report};

/// Reads a report collection from a saved JSON list query, exactly as the
/// store returned it.
pub fn load_json(path: &Path) -> anyhow::Result<Vec<Report>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("invalid report snapshot in {}", path.display()))
}

#[derive(serde::Deserialize)]
struct CsvRow {
    report_id: i64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    category_name: Option<String>,
    #[serde(default)]
    area_name: Option<String>,
    #[serde(default)]
    severity_label: Option<String>,
    #[serde(default)]
    current_status: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    address: Option<String>,
}

impl From<CsvRow> for Report {
    fn from(row: CsvRow) -> Self {
        Report {
            report_id: row.report_id,
            title: row.title,
            description: None,
            address: row.address,
            category_name: row.category_name,
            area_name: row.area_name,
            severity_label: row.severity_label,
            current_status: row.current_status,
            created_at: row.created_at.as_deref().and_then(parse_timestamp),
            latitude: None,
            longitude: None,
        }
    }
}

/// Reads a CSV export of the report list. Unparseable timestamps degrade to
/// "no timestamp" rather than failing the load.
pub fn load_csv(path: &Path) -> anyhow::Result<Vec<Report>> {
    let reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    collect_rows(reader).with_context(|| format!("invalid CSV snapshot in {}", path.display()))
}

fn collect_rows<R: std::io::Read>(mut reader: csv::Reader<R>) -> anyhow::Result<Vec<Report>> {
    let mut reports = Vec::new();
    for result in reader.deserialize::<CsvRow>() {
        reports.push(result?.into());
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn csv_rows_become_reports() {
        let data = "\
report_id,title,category_name,area_name,severity_label,current_status,created_at,address
1,Pothole on 10th,Roadway,Downtown,HIGH,OPEN,2026-03-13T22:15:00,10th & Main
2,Dark alley light,,,,,,
";
        let reader = csv::Reader::from_reader(data.as_bytes());
        let reports = collect_rows(reader).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].area_name.as_deref(), Some("Downtown"));
        assert_eq!(
            reports[0].created_at.unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 13, 22, 15, 0).unwrap()
        );
        assert_eq!(reports[1].title, "Dark alley light");
        assert!(reports[1].created_at.is_none());
    }

    #[test]
    fn garbage_timestamp_degrades_to_none() {
        let data = "\
report_id,title,category_name,area_name,severity_label,current_status,created_at,address
3,Leaning pole,Utility,,LOW,OPEN,yesterday-ish,
";
        let reader = csv::Reader::from_reader(data.as_bytes());
        let reports = collect_rows(reader).unwrap();
        assert!(reports[0].created_at.is_none());
    }
}
