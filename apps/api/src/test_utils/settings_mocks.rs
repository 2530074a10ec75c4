//! In-memory settings repository and seed helpers.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::{
    app_error::AppResult,
    application::use_cases::settings::{SettingsRepo, SettingsUseCases, StoredSetting},
    infra::crypto::SettingsCipher,
};

/// Fixed 32-byte key (`00 01 .. 1f`) for reproducible tests.
pub const TEST_SETTINGS_KEY: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

pub fn test_cipher() -> SettingsCipher {
    SettingsCipher::from_hex(TEST_SETTINGS_KEY).expect("Test cipher key should be valid")
}

/// In-memory implementation of SettingsRepo, keyed by `(category, key)`.
#[derive(Default)]
pub struct InMemorySettingsRepo {
    pub settings: Mutex<HashMap<(String, String), StoredSetting>>,
}

impl InMemorySettingsRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored row, ciphertext included (for test assertions).
    pub fn raw(&self, category: &str, key: &str) -> Option<StoredSetting> {
        self.settings
            .lock()
            .unwrap()
            .get(&(category.to_string(), key.to_string()))
            .cloned()
    }

    /// Store a row exactly as given, bypassing encryption.
    pub fn insert_raw(&self, category: &str, key: &str, value: &str, is_encrypted: bool) {
        self.settings.lock().unwrap().insert(
            (category.to_string(), key.to_string()),
            StoredSetting {
                category: category.to_string(),
                key: key.to_string(),
                value: Some(value.to_string()),
                is_encrypted,
                updated_at: Some(chrono::Utc::now()),
                updated_by: None,
            },
        );
    }
}

#[async_trait]
impl SettingsRepo for InMemorySettingsRepo {
    async fn get(&self, category: &str, key: &str) -> AppResult<Option<StoredSetting>> {
        Ok(self.raw(category, key))
    }

    async fn list_by_category(&self, category: &str) -> AppResult<Vec<StoredSetting>> {
        let mut rows: Vec<StoredSetting> = self
            .settings
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.category == category)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(rows)
    }

    async fn upsert(
        &self,
        category: &str,
        key: &str,
        value: Option<&str>,
        is_encrypted: bool,
        updated_by: Option<&str>,
    ) -> AppResult<()> {
        self.settings.lock().unwrap().insert(
            (category.to_string(), key.to_string()),
            StoredSetting {
                category: category.to_string(),
                key: key.to_string(),
                value: value.map(str::to_string),
                is_encrypted,
                updated_at: Some(chrono::Utc::now()),
                updated_by: updated_by.map(str::to_string),
            },
        );
        Ok(())
    }

    async fn delete_category(&self, category: &str) -> AppResult<u64> {
        let mut settings = self.settings.lock().unwrap();
        let before = settings.len();
        settings.retain(|(c, _), _| c != category);
        Ok((before - settings.len()) as u64)
    }
}

// ============================================================================
// Seed helpers
// ============================================================================

/// Configure the `email` category for SMTP on `smtp.example.com:587`.
pub async fn seed_smtp_settings(settings: &SettingsUseCases) {
    for (key, value) in [
        ("provider", "smtp"),
        ("smtp_host", "smtp.example.com"),
        ("smtp_port", "587"),
        ("smtp_username", "mailer@example.com"),
        ("smtp_password", "smtp-password"),
        ("smtp_use_tls", "false"),
    ] {
        settings.set("email", key, Some(value), None).await.unwrap();
    }
}

/// Configure the `email` category for SendGrid.
pub async fn seed_sendgrid_settings(settings: &SettingsUseCases) {
    for (key, value) in [("provider", "sendgrid"), ("sendgrid_api_key", "SG.test-key")] {
        settings.set("email", key, Some(value), None).await.unwrap();
    }
}

/// Synchronous variant of [`seed_smtp_settings`] writing plaintext rows directly.
pub fn seed_smtp_rows(repo: &InMemorySettingsRepo) {
    for (key, value) in [
        ("provider", "smtp"),
        ("smtp_host", "smtp.example.com"),
        ("smtp_port", "587"),
        ("smtp_username", "mailer@example.com"),
        ("smtp_password", "smtp-password"),
    ] {
        repo.insert_raw("email", key, value, false);
    }
}
