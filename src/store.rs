use anyhow::Context;
use reqwest::Client;

use crate::models::{Report, ReportDetail, StatusChange};

/// Filters forwarded verbatim to the store's list endpoint. Their semantics
/// belong to the store; the engine sees only the resulting collection.
#[derive(Debug, Clone, Default)]
pub struct ReportQuery {
    pub search: Option<String>,
    pub area_id: Option<i64>,
    pub category_id: Option<i64>,
    pub status: Option<String>,
}

/// Thin client for the external report store. Fetching and the status/delete
/// side channel live here; the metrics engine never calls any of this.
pub struct ReportStore {
    client: Client,
    base_url: String,
}

impl ReportStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base.trim_end_matches('/').to_string(),
        }
    }

    pub async fn list_reports(&self, query: &ReportQuery) -> anyhow::Result<Vec<Report>> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(search) = &query.search {
            params.push(("search", search.clone()));
        }
        if let Some(area_id) = query.area_id {
            params.push(("area_id", area_id.to_string()));
        }
        if let Some(category_id) = query.category_id {
            params.push(("category_id", category_id.to_string()));
        }
        if let Some(status) = &query.status {
            params.push(("status", status.clone()));
        }

        let response = self
            .client
            .get(format!("{}/reports/", self.base_url))
            .query(&params)
            .send()
            .await
            .context("report store unreachable")?
            .error_for_status()
            .context("report list query rejected")?;

        response
            .json()
            .await
            .context("report list payload did not parse")
    }

    pub async fn get_report(&self, id: i64) -> anyhow::Result<ReportDetail> {
        let response = self
            .client
            .get(format!("{}/reports/{id}", self.base_url))
            .send()
            .await
            .context("report store unreachable")?
            .error_for_status()
            .with_context(|| format!("report {id} not found"))?;

        response
            .json()
            .await
            .context("report detail payload did not parse")
    }

    pub async fn list_statuses(&self) -> anyhow::Result<Vec<String>> {
        let response = self
            .client
            .get(format!("{}/statuses", self.base_url))
            .send()
            .await
            .context("report store unreachable")?
            .error_for_status()
            .context("status list query rejected")?;

        response
            .json()
            .await
            .context("status list payload did not parse")
    }

    pub async fn update_status(&self, id: i64, change: &StatusChange) -> anyhow::Result<()> {
        self.client
            .put(format!("{}/reports/{id}/status", self.base_url))
            .json(change)
            .send()
            .await
            .context("report store unreachable")?
            .error_for_status()
            .with_context(|| format!("status change for report {id} rejected"))?;
        Ok(())
    }

    pub async fn delete_report(&self, id: i64) -> anyhow::Result<()> {
        self.client
            .delete(format!("{}/reports/{id}", self.base_url))
            .send()
            .await
            .context("report store unreachable")?
            .error_for_status()
            .with_context(|| format!("delete of report {id} rejected"))?;
        Ok(())
    }
}
