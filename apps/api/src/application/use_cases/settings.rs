use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::app_error::AppResult;
use crate::application::use_cases::notification::EmailProviderConfig;
use crate::domain::entities::setting::{MASKED_VALUE, SettingCategory, SettingWrite, is_sensitive_key};
use crate::infra::crypto::SettingsCipher;

// ============================================================================
// Repository Trait
// ============================================================================

#[async_trait]
pub trait SettingsRepo: Send + Sync {
    async fn get(&self, category: &str, key: &str) -> AppResult<Option<StoredSetting>>;

    async fn list_by_category(&self, category: &str) -> AppResult<Vec<StoredSetting>>;

    /// Insert or overwrite the row for `(category, key)`, stamping actor and time.
    async fn upsert(
        &self,
        category: &str,
        key: &str,
        value: Option<&str>,
        is_encrypted: bool,
        updated_by: Option<&str>,
    ) -> AppResult<()>;

    async fn delete_category(&self, category: &str) -> AppResult<u64>;
}

/// Raw row as persisted; `value` is ciphertext when `is_encrypted` is set.
#[derive(Debug, Clone)]
pub struct StoredSetting {
    pub category: String,
    pub key: String,
    pub value: Option<String>,
    pub is_encrypted: bool,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<String>,
}

pub type SettingsMap = BTreeMap<String, String>;

// ============================================================================
// Use Cases
// ============================================================================

/// Category-scoped key/value store with field-level encryption of sensitive keys.
///
/// Reads always go to the repository so changes made through the admin API are
/// visible to the next request without a restart.
#[derive(Clone)]
pub struct SettingsUseCases {
    repo: Arc<dyn SettingsRepo>,
    cipher: Arc<SettingsCipher>,
}

impl SettingsUseCases {
    pub fn new(repo: Arc<dyn SettingsRepo>, cipher: Arc<SettingsCipher>) -> Self {
        Self { repo, cipher }
    }

    pub async fn get(&self, category: &str, key: &str) -> AppResult<Option<String>> {
        let Some(row) = self.repo.get(category, key).await? else {
            return Ok(None);
        };
        self.reveal(row)
    }

    /// Decrypted values for a category. NULL values are left out.
    pub async fn get_by_category(&self, category: &str) -> AppResult<SettingsMap> {
        let rows = self.repo.list_by_category(category).await?;
        let mut settings = SettingsMap::new();
        for row in rows {
            let key = row.key.clone();
            if let Some(value) = self.reveal(row)? {
                settings.insert(key, value);
            }
        }
        Ok(settings)
    }

    /// Like [`Self::get_by_category`], but encrypted values are replaced by
    /// [`MASKED_VALUE`] without being decrypted.
    pub async fn get_by_category_masked(&self, category: &str) -> AppResult<SettingsMap> {
        let rows = self.repo.list_by_category(category).await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let value = row.value?;
                let shown = if row.is_encrypted {
                    MASKED_VALUE.to_string()
                } else {
                    value
                };
                Some((row.key, shown))
            })
            .collect())
    }

    #[instrument(skip(self, value))]
    pub async fn set(
        &self,
        category: &str,
        key: &str,
        value: Option<&str>,
        actor: Option<&str>,
    ) -> AppResult<()> {
        let (stored, is_encrypted) = match value {
            Some(v) if !v.is_empty() && is_sensitive_key(key) => {
                (Some(self.cipher.encrypt(v)?), true)
            }
            other => (other.map(str::to_string), false),
        };

        self.repo
            .upsert(category, key, stored.as_deref(), is_encrypted, actor)
            .await
    }

    /// Apply a batch of writes. Returns the number of keys written.
    ///
    /// [`SettingWrite::Unchanged`] entries, and `Set` entries carrying the
    /// masking placeholder, never touch storage.
    pub async fn set_bulk<I>(&self, category: &str, entries: I, actor: Option<&str>) -> AppResult<usize>
    where
        I: IntoIterator<Item = (String, SettingWrite)>,
    {
        let mut written = 0;
        for (key, write) in entries {
            match write {
                SettingWrite::Unchanged => continue,
                SettingWrite::Set(value) if value == MASKED_VALUE => continue,
                SettingWrite::Set(value) => self.set(category, &key, Some(&value), actor).await?,
                SettingWrite::Clear => self.set(category, &key, None, actor).await?,
            }
            written += 1;
        }

        tracing::info!(category, written, actor = ?actor, "Settings updated");
        Ok(written)
    }

    pub async fn delete_category(&self, category: &str) -> AppResult<u64> {
        let deleted = self.repo.delete_category(category).await?;
        tracing::info!(category, deleted, "Settings category deleted");
        Ok(deleted)
    }

    /// Replace a whole category: delete it, then write every non-empty entry.
    ///
    /// Used when switching email providers so credentials of the previous
    /// provider do not linger. Placeholder values are dropped, which means
    /// secrets must be re-entered on replace.
    pub async fn replace_category(
        &self,
        category: &str,
        entries: SettingsMap,
        actor: Option<&str>,
    ) -> AppResult<usize> {
        self.repo.delete_category(category).await?;
        let writes = entries
            .into_iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k, SettingWrite::Set(v)));
        self.set_bulk(category, writes, actor).await
    }

    // ------------------------------------------------------------------------
    // Email category
    // ------------------------------------------------------------------------

    /// Provider configuration parsed from the `email` category.
    pub async fn email_settings(&self) -> AppResult<EmailProviderConfig> {
        let settings = self.get_by_category(SettingCategory::Email.as_str()).await?;
        EmailProviderConfig::from_settings(&settings)
    }

    pub async fn email_settings_masked(&self) -> AppResult<SettingsMap> {
        self.get_by_category_masked(SettingCategory::Email.as_str()).await
    }

    /// Switching providers must not leave the previous provider's credentials behind.
    pub async fn replace_email_settings(
        &self,
        entries: SettingsMap,
        actor: Option<&str>,
    ) -> AppResult<usize> {
        self.replace_category(SettingCategory::Email.as_str(), entries, actor)
            .await
    }

    fn reveal(&self, row: StoredSetting) -> AppResult<Option<String>> {
        match row.value {
            Some(value) if row.is_encrypted => self.cipher.decrypt(&value).map(Some),
            other => Ok(other),
        }
    }
}
