use anyhow::anyhow;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::config::Config;
use crate::error::StoreError;
use crate::models::{Translation, TranslationKey, TranslationKeyCreate, TranslationKeyUpdate};
use crate::timestamp;

const TABLE: &str = "translation_keys";

/// Handle on the `translation_keys` table behind Supabase's REST interface.
///
/// Cheap to clone (shares one `reqwest::Client`) and passed explicitly to
/// every operation, so tests can point it at a mock server.
#[derive(Clone)]
pub struct SupabaseStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SupabaseStore {
    pub fn new(config: &Config) -> Self {
        Self::with_base_url(config.supabase_url.clone(), config.supabase_key.clone())
    }

    pub fn with_base_url(base_url: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    fn table_request(&self, method: Method) -> RequestBuilder {
        let url = format!("{}/rest/v1/{}", self.base_url, TABLE);
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Fetch one record by identifier. `None` if no row matches.
    pub async fn get(&self, id: &str) -> Result<Option<TranslationKey>, StoreError> {
        let id_filter = format!("eq.{id}");
        let response = self
            .table_request(Method::GET)
            .query(&[("select", "*"), ("id", id_filter.as_str())])
            .send()
            .await
            .map_err(StoreError::infra)?;

        let response = check_status(response).await?;
        let mut rows: Vec<TranslationKey> = decoded_rows(response).await?;

        if rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rows.remove(0)))
        }
    }

    /// List records, filtered by exact category and case-insensitive key
    /// substring. `limit` and `offset` are validated at the HTTP boundary and
    /// applied verbatim here.
    pub async fn list(
        &self,
        category: Option<&str>,
        search: Option<&str>,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<TranslationKey>, StoreError> {
        let mut params: Vec<(&str, String)> = vec![("select", "*".to_string())];
        if let Some(category) = category {
            params.push(("category", format!("eq.{category}")));
        }
        if let Some(search) = search {
            params.push(("key", format!("ilike.*{search}*")));
        }
        params.push(("limit", limit.to_string()));
        params.push(("offset", offset.to_string()));

        let response = self
            .table_request(Method::GET)
            .query(&params)
            .send()
            .await
            .map_err(StoreError::infra)?;

        let response = check_status(response).await?;
        decoded_rows(response).await
    }

    /// Insert a new record. The `translations` column is forced to an empty
    /// mapping when the draft does not carry one. A duplicate `key` surfaces
    /// as `Conflict` (the REST layer reports the unique-constraint violation,
    /// Postgres code 23505, as HTTP 409).
    pub async fn create(
        &self,
        draft: TranslationKeyCreate,
    ) -> Result<TranslationKey, StoreError> {
        let key = draft.key.clone();

        let mut payload = serde_json::to_value(&draft).map_err(StoreError::infra)?;
        if payload.get("translations").is_none() {
            payload["translations"] = Value::Object(Default::default());
        }
        timestamp::encode(&mut payload);

        let response = self
            .table_request(Method::POST)
            .header("Prefer", "return=representation")
            .json(&payload)
            .send()
            .await
            .map_err(StoreError::infra)?;

        if response.status() == StatusCode::CONFLICT {
            return Err(StoreError::Conflict(key));
        }

        let response = check_status(response).await?;
        let rows: Vec<TranslationKey> = decoded_rows(response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::infra(anyhow!("insert returned no rows")))
    }

    /// Patch only the fields present in `update`; absent fields are untouched.
    /// `None` if no row matched the id; the caller decides whether that is
    /// "not found" or a no-op.
    pub async fn update(
        &self,
        id: &str,
        update: TranslationKeyUpdate,
    ) -> Result<Option<TranslationKey>, StoreError> {
        // An empty partial would be rejected by the REST layer; it changes
        // nothing, so answer with the current record instead.
        if update.is_empty() {
            return self.get(id).await;
        }

        let mut payload = serde_json::to_value(&update).map_err(StoreError::infra)?;
        timestamp::encode(&mut payload);

        let id_filter = format!("eq.{id}");
        let response = self
            .table_request(Method::PATCH)
            .query(&[("id", id_filter.as_str())])
            .header("Prefer", "return=representation")
            .json(&payload)
            .send()
            .await
            .map_err(StoreError::infra)?;

        let response = check_status(response).await?;
        let mut rows: Vec<TranslationKey> = decoded_rows(response).await?;

        if rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rows.remove(0)))
        }
    }

    /// Delete by identifier. `NotFound` when no row matched: the store is
    /// asked to return the deleted rows, and an empty set means there was
    /// nothing to delete.
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let id_filter = format!("eq.{id}");
        let response = self
            .table_request(Method::DELETE)
            .query(&[("id", id_filter.as_str())])
            .header("Prefer", "return=representation")
            .send()
            .await
            .map_err(StoreError::infra)?;

        let response = check_status(response).await?;
        let rows: Vec<TranslationKey> = decoded_rows(response).await?;

        if rows.is_empty() {
            Err(StoreError::NotFound)
        } else {
            debug!("Deleted translation key {id}");
            Ok(())
        }
    }

    /// Projection of the `translations` column across the whole table, for
    /// the completion aggregator. Reads every row; fine at this table's
    /// scale, revisit before the key count grows past memory.
    pub async fn fetch_translation_columns(
        &self,
    ) -> Result<Vec<HashMap<String, Translation>>, StoreError> {
        #[derive(Deserialize)]
        struct TranslationsRow {
            #[serde(default)]
            translations: Option<HashMap<String, Translation>>,
        }

        let response = self
            .table_request(Method::GET)
            .query(&[("select", "translations")])
            .send()
            .await
            .map_err(StoreError::infra)?;

        let response = check_status(response).await?;
        let rows: Vec<TranslationsRow> = decoded_rows(response).await?;

        Ok(rows
            .into_iter()
            .map(|row| row.translations.unwrap_or_default())
            .collect())
    }

    /// Flat `key -> value` map for one locale across all records. Keys
    /// without an entry for the locale are omitted.
    pub async fn fetch_locale_values(
        &self,
        locale: &str,
    ) -> Result<HashMap<String, String>, StoreError> {
        #[derive(Deserialize)]
        struct KeyTranslationsRow {
            key: String,
            #[serde(default)]
            translations: Option<HashMap<String, Translation>>,
        }

        let response = self
            .table_request(Method::GET)
            .query(&[("select", "key,translations")])
            .send()
            .await
            .map_err(StoreError::infra)?;

        let response = check_status(response).await?;
        let rows: Vec<KeyTranslationsRow> = decoded_rows(response).await?;

        Ok(rows
            .into_iter()
            .filter_map(|mut row| {
                row.translations
                    .as_mut()
                    .and_then(|translations| translations.remove(locale))
                    .map(|translation| (row.key, translation.value))
            })
            .collect())
    }
}

async fn check_status(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::infra(anyhow!(
        "Supabase error ({status}): {body}"
    )))
}

/// Parse a row-set response, normalizing timestamp strings before
/// deserializing into typed rows.
async fn decoded_rows<T>(response: Response) -> Result<Vec<T>, StoreError>
where
    T: serde::de::DeserializeOwned,
{
    let mut body: Value = response.json().await.map_err(StoreError::infra)?;
    timestamp::decode(&mut body);
    serde_json::from_value(body).map_err(StoreError::infra)
}
