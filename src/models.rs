use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One translated value for a single language, stamped with who wrote it and
/// when. Replaced wholesale by the bulk merge operator, never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    pub value: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

/// A translation key record as stored in the `translation_keys` table.
///
/// `id` is assigned by the store and absent until the record is persisted.
/// `translations` maps language codes ("en", "fr", ...) to their values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub key: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub translations: HashMap<String, Translation>,
}

/// Draft for creating a record. `translations` is optional and defaults to an
/// empty mapping at insert time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationKeyCreate {
    pub key: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translations: Option<HashMap<String, Translation>>,
}

/// Partial update. Fields left as `None` are skipped during serialization so
/// the PATCH only touches the columns the caller provided.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslationKeyUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translations: Option<HashMap<String, Translation>>,
}

impl TranslationKeyUpdate {
    /// True when no field was provided; PATCHing with this leaves the record
    /// unchanged.
    pub fn is_empty(&self) -> bool {
        self.key.is_none()
            && self.category.is_none()
            && self.description.is_none()
            && self.translations.is_none()
    }
}

/// Request body for the bulk merge endpoint:
/// `{record-id: {language-code: raw value}}` plus the editor's identity.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkTranslationUpdate {
    pub translations: HashMap<String, HashMap<String, String>>,
    pub updated_by: String,
}
