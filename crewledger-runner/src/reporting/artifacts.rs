//! Artifact manager for persisting settlement plans.
//!
//! Each plan gets its own directory, named by the short plan hash, so
//! re-exporting an unchanged trip overwrites the same files:
//! - `manifest.json` — hashes, timestamp, counts
//! - `balances.csv` — one row per participant
//! - `settlements.csv` — one row per payment
//! - `plan.json` — the full `TripSettlement`
//! - `report.md` — optional Markdown report

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crewledger_core::domain::{PlanHash, SnapshotHash};

use super::format::display_name;
use crate::verify::VerificationReport;

/// Artifact paths returned after export.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub dir: PathBuf,
    pub manifest: PathBuf,
    pub balances_csv: PathBuf,
    pub settlements_csv: PathBuf,
    pub plan_json: PathBuf,
    pub report_markdown: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanManifest {
    pub trip_name: String,
    pub currency: String,
    pub snapshot_hash: SnapshotHash,
    pub plan_hash: PlanHash,
    pub generated_at: DateTime<Utc>,
    pub participants: usize,
    pub expenses: usize,
    pub settlements: usize,
    pub unsplit_expenses: usize,
    pub rejected_expenses: usize,
}

/// Manages writing all artifacts for a plan.
#[derive(Debug, Clone)]
pub struct ArtifactManager {
    output_dir: PathBuf,
}

impl ArtifactManager {
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir)
            .with_context(|| format!("failed to create output directory {}", output_dir.display()))?;
        Ok(Self { output_dir })
    }

    /// Save the artifact set. `markdown` is written as `report.md` when given.
    pub fn save_plan(
        &self,
        report: &VerificationReport,
        markdown: Option<&str>,
    ) -> Result<ArtifactPaths> {
        let plan_hash = report.settlement.fingerprint();
        let dir = self.output_dir.join(plan_hash.short());
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create plan directory {}", dir.display()))?;

        let manifest = dir.join("manifest.json");
        write_json(&manifest, &build_manifest(report, plan_hash))?;

        let balances_csv = dir.join("balances.csv");
        write_file(&balances_csv, &export_balances_csv(report)?)?;

        let settlements_csv = dir.join("settlements.csv");
        write_file(&settlements_csv, &export_settlements_csv(report)?)?;

        let plan_json = dir.join("plan.json");
        write_json(&plan_json, &report.settlement)?;

        let report_markdown = match markdown {
            Some(md) => {
                let path = dir.join("report.md");
                write_file(&path, md)?;
                Some(path)
            }
            None => None,
        };

        tracing::info!(dir = %dir.display(), "wrote plan artifacts");
        Ok(ArtifactPaths {
            dir,
            manifest,
            balances_csv,
            settlements_csv,
            plan_json,
            report_markdown,
        })
    }
}

fn build_manifest(report: &VerificationReport, plan_hash: PlanHash) -> PlanManifest {
    PlanManifest {
        trip_name: report.trip_name.clone(),
        currency: report.currency.clone(),
        snapshot_hash: report.snapshot_hash.clone(),
        plan_hash,
        generated_at: Utc::now(),
        participants: report.participants.len(),
        expenses: report.rows.len(),
        settlements: report.settlement.settlements.len(),
        unsplit_expenses: report.settlement.unsplit.len(),
        rejected_expenses: report.rejected.len(),
    }
}

#[derive(Serialize)]
struct BalanceRow<'a> {
    participant_id: &'a str,
    name: &'a str,
    total_paid: i64,
    total_owed: i64,
    net_position: i64,
}

#[derive(Serialize)]
struct SettlementRow<'a> {
    from: &'a str,
    from_name: &'a str,
    to: &'a str,
    to_name: &'a str,
    amount_minor: i64,
}

/// Balances as CSV: amounts in minor units.
pub fn export_balances_csv(report: &VerificationReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for b in &report.settlement.balances {
        wtr.serialize(BalanceRow {
            participant_id: b.participant_id.as_str(),
            name: display_name(&report.participants, b.participant_id.as_str()),
            total_paid: b.total_paid,
            total_owed: b.total_owed,
            net_position: b.net_position,
        })?;
    }
    if report.settlement.balances.is_empty() {
        wtr.write_record(["participant_id", "name", "total_paid", "total_owed", "net_position"])?;
    }
    finish_csv(wtr)
}

/// Payments as CSV, in plan order.
pub fn export_settlements_csv(report: &VerificationReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for s in &report.settlement.settlements {
        wtr.serialize(SettlementRow {
            from: s.from.as_str(),
            from_name: display_name(&report.participants, s.from.as_str()),
            to: s.to.as_str(),
            to_name: display_name(&report.participants, s.to.as_str()),
            amount_minor: s.amount_minor,
        })?;
    }
    // serialize() only emits the header with the first row.
    if report.settlement.settlements.is_empty() {
        wtr.write_record(["from", "from_name", "to", "to_name", "amount_minor"])?;
    }
    finish_csv(wtr)
}

fn finish_csv(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("failed to serialize {}", path.display()))?;
    write_file(path, &json)
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("failed to write {}", path.display()))
}
