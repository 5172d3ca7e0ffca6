use chrono::Utc;
use std::collections::HashMap;
use tracing::{info, warn};

use crate::models::{Translation, TranslationKeyUpdate};
use crate::store::SupabaseStore;

/// Merge per-language edits into existing records, best-effort.
///
/// For each record id: fetch the current record, overlay the supplied
/// language values (every touched language stamped with one wall-clock
/// timestamp per record and the editor's identity), and persist just the
/// `translations` column. Languages not named in the input are preserved
/// as-is.
///
/// Per-record failures (id not found, fetch failure, persist failure) are
/// logged as warnings and skipped; one bad id never aborts the rest of the
/// batch. Returns true iff at least one record was persisted.
pub async fn bulk_update_translations(
    store: &SupabaseStore,
    updates: &HashMap<String, HashMap<String, String>>,
    updated_by: &str,
) -> bool {
    let mut successful = 0usize;

    for (id, languages) in updates {
        let current = match store.get(id).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                warn!("Translation key {id} not found for bulk update");
                continue;
            }
            Err(err) => {
                warn!("Skipping translation key {id} in bulk update: {err}");
                continue;
            }
        };

        // One timestamp per record: every language touched in this record
        // carries the same updated_at.
        let stamp = Utc::now();
        let mut merged = current.translations;
        for (lang, value) in languages {
            merged.insert(
                lang.clone(),
                Translation {
                    value: value.clone(),
                    updated_at: stamp,
                    updated_by: updated_by.to_string(),
                },
            );
        }

        let patch = TranslationKeyUpdate {
            translations: Some(merged),
            ..Default::default()
        };

        match store.update(id, patch).await {
            Ok(Some(_)) => successful += 1,
            Ok(None) => warn!("Failed to update translations for key {id} during bulk update"),
            Err(err) => {
                warn!("Failed to update translations for key {id} during bulk update: {err}")
            }
        }
    }

    info!(
        "Bulk update: {successful}/{} translation keys updated",
        updates.len()
    );
    successful > 0
}
