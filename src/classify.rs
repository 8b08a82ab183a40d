use crate::models::{Report, Severity};

/// Canonical per-report facts every other stage keys on.
#[derive(Debug, Clone)]
pub struct Classification {
    pub open: bool,
    pub severity: Severity,
    pub group: String,
}

/// Keyword fallback for reports with no explicit service area. Matched
/// against the lower-cased category name, first hit wins.
const KEYWORD_GROUPS: &[(&[&str], &str)] = &[
    (&["light", "sidewalk", "utility"], "Public Works"),
    (&["road", "pothole", "traffic"], "Transportation"),
    (&["park", "playground"], "Parks & Rec"),
    (&["trash", "sanitation", "waste"], "City Services"),
];

pub const FALLBACK_GROUP: &str = "Unassigned";

pub fn classify(report: &Report) -> Classification {
    Classification {
        open: is_open(report.current_status.as_deref()),
        severity: canonical_severity(report.severity_label.as_deref()),
        group: resolve_group(report),
    }
}

/// A report is open unless its status, upper-cased, is exactly RESOLVED or
/// CLOSED. An absent or empty status counts as closed, not open.
pub fn is_open(status: Option<&str>) -> bool {
    match status {
        None => false,
        Some(raw) if raw.is_empty() => false,
        Some(raw) => {
            let upper = raw.to_uppercase();
            upper != "RESOLVED" && upper != "CLOSED"
        }
    }
}

/// Substring heuristic over the upper-cased raw label, tested in order:
/// HIGH, then LOW, then MED. Anything else, including a missing label,
/// is Other.
pub fn canonical_severity(label: Option<&str>) -> Severity {
    let upper = label.unwrap_or("UNKNOWN").to_uppercase();
    if upper.contains("HIGH") {
        Severity::High
    } else if upper.contains("LOW") {
        Severity::Low
    } else if upper.contains("MED") {
        Severity::Medium
    } else {
        Severity::Other
    }
}

/// Total function: every report lands in exactly one group. An explicit
/// non-blank area name wins; otherwise the category keyword table; otherwise
/// the fallback group.
pub fn resolve_group(report: &Report) -> String {
    if let Some(area) = report.area_name.as_deref() {
        if !area.trim().is_empty() {
            return area.to_string();
        }
    }

    let category = report
        .category_name
        .as_deref()
        .unwrap_or("")
        .to_lowercase();

    for (keywords, group) in KEYWORD_GROUPS {
        if keywords.iter().any(|keyword| category.contains(keyword)) {
            return (*group).to_string();
        }
    }

    FALLBACK_GROUP.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_with(
        area: Option<&str>,
        category: Option<&str>,
        severity: Option<&str>,
        status: Option<&str>,
    ) -> Report {
        Report {
            report_id: 1,
            title: "Flickering streetlight".to_string(),
            description: None,
            address: None,
            category_name: category.map(str::to_string),
            area_name: area.map(str::to_string),
            severity_label: severity.map(str::to_string),
            current_status: status.map(str::to_string),
            created_at: None,
            latitude: None,
            longitude: None,
        }
    }

    #[test]
    fn open_unless_resolved_or_closed() {
        assert!(is_open(Some("IN_PROGRESS")));
        assert!(is_open(Some("SUBMITTED")));
        assert!(is_open(Some("on_hold")));
        assert!(!is_open(Some("RESOLVED")));
        assert!(!is_open(Some("closed")));
        assert!(!is_open(Some("Resolved")));
    }

    #[test]
    fn missing_or_empty_status_is_not_open() {
        assert!(!is_open(None));
        assert!(!is_open(Some("")));
    }

    #[test]
    fn severity_matches_by_substring_in_priority_order() {
        assert_eq!(canonical_severity(Some("HIGH")), Severity::High);
        assert_eq!(canonical_severity(Some("high priority")), Severity::High);
        assert_eq!(canonical_severity(Some("Low")), Severity::Low);
        assert_eq!(canonical_severity(Some("Medium")), Severity::Medium);
        assert_eq!(canonical_severity(Some("MED")), Severity::Medium);
        assert_eq!(canonical_severity(Some("urgent")), Severity::Other);
        assert_eq!(canonical_severity(None), Severity::Other);
    }

    #[test]
    fn explicit_area_name_wins_over_category() {
        let report = report_with(Some("Downtown"), Some("Pothole"), None, None);
        assert_eq!(resolve_group(&report), "Downtown");
    }

    #[test]
    fn blank_area_falls_through_to_category_keywords() {
        let report = report_with(Some("   "), Some("Streetlight outage"), None, None);
        assert_eq!(resolve_group(&report), "Public Works");
    }

    #[test]
    fn category_keywords_map_to_canonical_groups() {
        let cases = [
            ("Sidewalk damage", "Public Works"),
            ("Utility pole leaning", "Public Works"),
            ("Pothole on main", "Transportation"),
            ("Traffic signal stuck", "Transportation"),
            ("Playground equipment broken", "Parks & Rec"),
            ("Overflowing trash", "City Services"),
            ("Sanitation backlog", "City Services"),
        ];
        for (category, expected) in cases {
            let report = report_with(None, Some(category), None, None);
            assert_eq!(resolve_group(&report), expected, "category {category}");
        }
    }

    #[test]
    fn unmatched_category_resolves_to_fallback_group() {
        let report = report_with(None, Some("Noise complaint"), None, None);
        assert_eq!(resolve_group(&report), FALLBACK_GROUP);

        let no_category = report_with(None, None, None, None);
        assert_eq!(resolve_group(&no_category), FALLBACK_GROUP);
    }

    #[test]
    fn classify_combines_all_three_facts() {
        let report = report_with(None, Some("road closure"), Some("High"), Some("TRIAGED"));
        let class = classify(&report);
        assert!(class.open);
        assert_eq!(class.severity, Severity::High);
        assert_eq!(class.group, "Transportation");
    }
}
