use crate::error::{Error, Result};
use crate::loader::{decode_bill_bytes, write_bill_file, BillCorpus};
use serde_json::{Map, Value};
use std::path::Path;

const NUM_CHARACTERS: &str = "num_characters";

/// Counts from a migration run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationSummary {
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
}

/// Set `num_characters` from `text` when absent; returns whether it was added
fn fill_num_characters(object: &mut Map<String, Value>) -> bool {
    if object.contains_key(NUM_CHARACTERS) {
        return false;
    }
    match object.get("text").and_then(Value::as_str) {
        Some(text) => {
            let count = text.chars().count();
            object.insert(NUM_CHARACTERS.to_string(), Value::from(count));
            true
        }
        None => false,
    }
}

/// Add `num_characters` to a bill and each of its sections
///
/// Returns whether anything changed.
pub fn add_num_characters(bill: &mut Value) -> Result<bool> {
    let object = bill
        .as_object_mut()
        .ok_or_else(|| Error::UnknownFormat("bill is not a JSON object".to_string()))?;

    let mut changed = fill_num_characters(object);
    if let Some(Value::Array(sections)) = object.get_mut("sections") {
        for section in sections.iter_mut().filter_map(Value::as_object_mut) {
            changed |= fill_num_characters(section);
        }
    }
    Ok(changed)
}

/// Migrate one bill file in place, keeping its on-disk format
pub fn migrate_file(path: &Path) -> Result<bool> {
    let (format, json) = decode_bill_bytes(std::fs::read(path)?)?;
    let mut bill: Value = serde_json::from_slice(&json)?;

    if !add_num_characters(&mut bill)? {
        return Ok(false);
    }
    write_bill_file(path, &bill, format)?;
    Ok(true)
}

/// Add missing `num_characters` fields across the whole corpus
pub async fn migrate_num_characters(bills_dir: &Path) -> Result<MigrationSummary> {
    let corpus = BillCorpus::new(bills_dir);
    let files = tokio::task::spawn_blocking(move || corpus.discover())
        .await
        .map_err(|e| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Task join error: {}", e),
            ))
        })??;

    let mut summary = MigrationSummary::default();
    for file in files {
        match migrate_file(&file.path) {
            Ok(true) => {
                tracing::info!("Added num_characters to {}", file.relative_path);
                summary.updated += 1;
            }
            Ok(false) => summary.unchanged += 1,
            Err(e) => {
                tracing::error!("Error migrating {}: {}", file.path.display(), e);
                summary.failed += 1;
            }
        }
    }

    tracing::info!(
        "Migration complete: {} updated, {} unchanged, {} failed",
        summary.updated,
        summary.unchanged,
        summary.failed
    );
    Ok(summary)
}
