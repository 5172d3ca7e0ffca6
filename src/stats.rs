use std::collections::HashMap;

use crate::error::StoreError;
use crate::models::Translation;
use crate::store::SupabaseStore;

/// Percentage of records carrying a non-empty value, per language code
/// observed anywhere in the table.
///
/// One projection read of every record's `translations` column (full-table
/// scan; acceptable at this table's scale). A record counts as translated
/// for a language only when the entry exists and its value is non-empty.
pub async fn completion_stats(
    store: &SupabaseStore,
) -> Result<HashMap<String, f64>, StoreError> {
    let columns = store.fetch_translation_columns().await?;
    Ok(percentages(&columns))
}

fn percentages(rows: &[HashMap<String, Translation>]) -> HashMap<String, f64> {
    let total = rows.len();
    if total == 0 {
        return HashMap::new();
    }

    // Language universe: every code appearing as a key in any record,
    // whether or not it holds a usable value.
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for row in rows {
        for lang in row.keys() {
            counts.entry(lang).or_insert(0);
        }
    }
    if counts.is_empty() {
        return HashMap::new();
    }

    for row in rows {
        for (lang, translation) in row {
            if !translation.value.is_empty() {
                *counts.get_mut(lang.as_str()).expect("seeded above") += 1;
            }
        }
    }

    counts
        .into_iter()
        .map(|(lang, translated)| {
            (lang.to_string(), translated as f64 / total as f64 * 100.0)
        })
        .collect()
}
