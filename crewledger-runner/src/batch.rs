//! Batch verification — discover trip exports and verify them in parallel.

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::RunnerConfig;
use crate::trip_file::load_trip;
use crate::verify::{verify_trip, VerificationReport};

/// Outcome for one discovered file.
#[derive(Debug)]
pub struct BatchItem {
    pub path: PathBuf,
    pub outcome: Result<VerificationReport>,
}

impl BatchItem {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Expand inputs into trip files.
///
/// Files are taken as-is; directories contribute their `<prefix>*.json`
/// entries (not recursive). The result is deduplicated and sorted.
pub fn discover_trip_files(inputs: &[PathBuf], file_prefix: &str) -> Result<Vec<PathBuf>> {
    let mut found = BTreeSet::new();
    for input in inputs {
        if input.is_dir() {
            let entries = std::fs::read_dir(input)
                .with_context(|| format!("failed to list directory {}", input.display()))?;
            for entry in entries {
                let path = entry
                    .with_context(|| format!("failed to read entry in {}", input.display()))?
                    .path();
                if path.is_file() && is_trip_export(&path, file_prefix) {
                    found.insert(path);
                }
            }
        } else {
            found.insert(input.clone());
        }
    }
    Ok(found.into_iter().collect())
}

fn is_trip_export(path: &Path, file_prefix: &str) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.starts_with(file_prefix) && name.ends_with(".json")
}

/// Verify one file: load, then run the lenient settlement.
pub fn verify_file(path: &Path, config: &RunnerConfig) -> Result<VerificationReport> {
    let trip = load_trip(path, &config.currency.code)
        .with_context(|| format!("failed to load {}", path.display()))?;
    let report = verify_trip(&trip)
        .with_context(|| format!("failed to settle {}", path.display()))?;
    Ok(report)
}

/// Verify every file in parallel. Results come back in input order.
pub fn verify_all(paths: &[PathBuf], config: &RunnerConfig) -> Vec<BatchItem> {
    info!(files = paths.len(), "verifying trip files");
    paths
        .par_iter()
        .map(|path| {
            let outcome = verify_file(path, config);
            if let Err(err) = &outcome {
                warn!(path = %path.display(), error = %format!("{err:#}"), "trip file failed");
            }
            BatchItem {
                path: path.clone(),
                outcome,
            }
        })
        .collect()
}
