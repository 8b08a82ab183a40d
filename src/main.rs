use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{ArgGroup, Args, Parser, Subcommand};

mod aggregate;
mod classify;
mod engine;
mod loader;
mod models;
mod rank;
mod report;
mod store;
mod timeline;

use engine::EngineConfig;
use models::{DerivedMetrics, Report, StatusChange};
use store::{ReportQuery, ReportStore};

#[derive(Parser)]
#[command(name = "gridwatch")]
#[command(about = "Live operational metrics for GridWatch civic reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where the report collection comes from: a saved snapshot, or the live
/// store at GRIDWATCH_API_URL. The filter flags only apply to the live store.
#[derive(Args)]
#[command(group(
    ArgGroup::new("snapshot")
        .args(["input", "csv"])
        .multiple(false)
))]
struct SourceArgs {
    /// JSON snapshot of a report list query
    #[arg(long)]
    input: Option<PathBuf>,
    /// CSV export of a report list query
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Title substring filter (live store only)
    #[arg(long)]
    search: Option<String>,
    #[arg(long)]
    area_id: Option<i64>,
    #[arg(long)]
    category_id: Option<i64>,
    /// Status filter (live store only)
    #[arg(long)]
    status: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive and print the full metrics snapshot
    Snapshot {
        #[command(flatten)]
        source: SourceArgs,
        /// Emit the metrics as JSON instead of a text summary
        #[arg(long)]
        json: bool,
    },
    /// Rank service areas by severity-weighted queue load
    Areas {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Show the recent-activity feed
    Feed {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Write a markdown metrics report
    Report {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Fetch a single report from the store
    Show {
        id: i64,
    },
    /// List the status values the store accepts
    Statuses,
    /// Submit a status transition for a report
    SetStatus {
        id: i64,
        #[arg(long)]
        status: String,
        #[arg(long)]
        note: Option<String>,
        #[arg(long)]
        changed_by: i64,
    },
    /// Delete a report from the store
    Delete {
        id: i64,
    },
}

fn store_from_env() -> anyhow::Result<ReportStore> {
    let base_url = std::env::var("GRIDWATCH_API_URL")
        .context("GRIDWATCH_API_URL must be set to the report store base URL")?;
    Ok(ReportStore::new(base_url))
}

async fn fetch_reports(source: &SourceArgs) -> anyhow::Result<Vec<Report>> {
    if let Some(path) = &source.input {
        return loader::load_json(path);
    }
    if let Some(path) = &source.csv {
        return loader::load_csv(path);
    }
    let store = store_from_env()?;
    let query = ReportQuery {
        search: source.search.clone(),
        area_id: source.area_id,
        category_id: source.category_id,
        status: source.status.clone(),
    };
    store.list_reports(&query).await
}

fn print_summary(metrics: &DerivedMetrics) {
    println!(
        "Grid snapshot: {} reports ({} open / {} closed)",
        metrics.total, metrics.open_count, metrics.closed_count
    );
    println!("High severity open: {}", metrics.high_severity_open_count);
    println!("Breaching SLA (approx.): {}", metrics.breaching_count);
    println!(
        "Filed in last 24h: {} ({} resolved)",
        metrics.new_last_24h, metrics.resolved_last_24h
    );

    if !metrics.severity_counts.is_empty() {
        println!("Severity mix:");
        for entry in &metrics.severity_counts {
            println!("- {}: {}", entry.severity.as_str(), entry.count);
        }
    }
    if !metrics.status_counts.is_empty() {
        println!("Status breakdown:");
        for entry in &metrics.status_counts {
            println!("- {}: {}", entry.status, entry.count);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Snapshot { source, json } => {
            let reports = fetch_reports(&source).await?;
            let now = Utc::now();
            let config = EngineConfig::default();
            let metrics = engine::derive_metrics(&reports, now, &config);
            if json {
                println!("{}", serde_json::to_string_pretty(&metrics)?);
            } else {
                print_summary(&metrics);
            }
        }
        Commands::Areas { source, limit } => {
            let reports = fetch_reports(&source).await?;
            let now = Utc::now();
            let config = EngineConfig {
                group_cap: limit,
                ..EngineConfig::default()
            };
            let metrics = engine::derive_metrics(&reports, now, &config);

            if metrics.department_view.is_empty() {
                println!("No open reports; all queues clear.");
                return Ok(());
            }

            println!("Service area load (top {limit}):");
            for dept in &metrics.department_view {
                println!(
                    "- {}: load {} [{}], {} open, avg open age {:.1}h",
                    dept.name,
                    dept.load_index,
                    dept.status.as_str(),
                    dept.open_count,
                    dept.avg_open_age_hours
                );
            }
        }
        Commands::Feed { source } => {
            let reports = fetch_reports(&source).await?;
            let now = Utc::now();
            let config = EngineConfig::default();
            let feed = timeline::recent_activity(&reports, now, &config);

            if feed.is_empty() {
                println!("No recent activity.");
                return Ok(());
            }
            for event in &feed {
                println!("- [{}] {} ({})", event.label.as_str(), event.detail, event.age);
            }
        }
        Commands::Report { source, out } => {
            let reports = fetch_reports(&source).await?;
            let now = Utc::now();
            let config = EngineConfig::default();
            let metrics = engine::derive_metrics(&reports, now, &config);
            let rendered = report::build_report(&metrics, now, &config);
            std::fs::write(&out, rendered)?;
            println!("Report written to {}.", out.display());
        }
        Commands::Show { id } => {
            let store = store_from_env()?;
            let detail = store.get_report(id).await?;
            println!("Report {}: {}", detail.report_id, detail.title);
            if let Some(status) = &detail.current_status {
                println!("Status: {status}");
            }
            if let Some(area) = &detail.service_area {
                println!("Area: {}", area.name);
            }
            if let Some(category) = &detail.category {
                println!("Category: {}", category.name);
            }
            if let Some(severity) = &detail.severity {
                println!("Severity: {}", severity.label);
            }
            if let Some(created) = detail.created_at {
                println!("Filed: {}", created.format("%Y-%m-%d %H:%M UTC"));
            }
            if let Some(address) = &detail.address {
                println!("Address: {address}");
            }
            if !detail.status_history.is_empty() {
                println!("Status history:");
                for update in &detail.status_history {
                    let changed = update
                        .changed_at
                        .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_default();
                    match &update.note {
                        Some(note) => println!("- {} at {changed}: {note}", update.status),
                        None => println!("- {} at {changed}", update.status),
                    }
                }
            }
        }
        Commands::Statuses => {
            let store = store_from_env()?;
            for status in store.list_statuses().await? {
                println!("{status}");
            }
        }
        Commands::SetStatus {
            id,
            status,
            note,
            changed_by,
        } => {
            let store = store_from_env()?;
            let change = StatusChange {
                new_status: status.clone(),
                note,
                changed_by,
            };
            store.update_status(id, &change).await?;
            println!("Report {id} moved to {status}.");
        }
        Commands::Delete { id } => {
            let store = store_from_env()?;
            store.delete_report(id).await?;
            println!("Report {id} deleted.");
        }
    }

    Ok(())
}
