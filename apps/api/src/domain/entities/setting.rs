use serde::{Deserialize, Serialize};

/// Placeholder shown in place of encrypted values on masked reads.
pub const MASKED_VALUE: &str = "••••••••";

/// Substrings that mark a setting key as sensitive (matched case-insensitively).
const SENSITIVE_TERMS: [&str; 4] = ["password", "api_key", "secret", "token"];

/// Returns true if values stored under this key must be encrypted at rest.
pub fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_lowercase();
    SENSITIVE_TERMS.iter().any(|term| key.contains(term))
}

/// Settings namespaces used by the funnel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingCategory {
    Email,
    Stripe,
    Welcome,
    Complete,
}

impl SettingCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingCategory::Email => "email",
            SettingCategory::Stripe => "stripe",
            SettingCategory::Welcome => "welcome",
            SettingCategory::Complete => "complete",
        }
    }

    /// Keys an admin is allowed to write through the back-office API.
    /// `None` means the category is replaced wholesale instead.
    pub fn editable_keys(&self) -> Option<&'static [&'static str]> {
        match self {
            SettingCategory::Email => None,
            SettingCategory::Stripe => Some(&["price_setup", "price_monthly", "tax_rate"]),
            SettingCategory::Welcome => Some(&[
                "title",
                "content",
                "video_url",
                "show_video",
                "form_sections",
            ]),
            SettingCategory::Complete => Some(&[
                "subheadline",
                "reinforcement_1",
                "reinforcement_2",
                "logistics_title",
                "logistics_content",
                "calendar_url",
                "calendar_label",
            ]),
        }
    }
}

impl std::fmt::Display for SettingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SettingCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(SettingCategory::Email),
            "stripe" => Ok(SettingCategory::Stripe),
            "welcome" => Ok(SettingCategory::Welcome),
            "complete" => Ok(SettingCategory::Complete),
            _ => Err(format!("Unknown settings category: {}", s)),
        }
    }
}

/// A single write in a bulk settings update.
///
/// Masked reads hand the UI a placeholder instead of the real secret. When the
/// form is submitted back unchanged, the write must leave the stored value
/// alone, so callers express that intent explicitly instead of re-sending the
/// placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingWrite {
    /// Keep whatever is stored.
    Unchanged,
    /// Store NULL.
    Clear,
    /// Store the given value, encrypting it if the key is sensitive.
    Set(String),
}

impl SettingWrite {
    /// Interpret a submitted form value. Missing values clear the setting and
    /// the masking placeholder means "not edited".
    pub fn from_submitted(value: Option<String>) -> Self {
        match value {
            None => SettingWrite::Clear,
            Some(v) if v == MASKED_VALUE => SettingWrite::Unchanged,
            Some(v) => SettingWrite::Set(v),
        }
    }

    /// Like [`SettingWrite::from_submitted`], but an empty string also clears.
    pub fn from_submitted_non_empty(value: Option<String>) -> Self {
        match value {
            Some(v) if v.is_empty() => SettingWrite::Clear,
            other => SettingWrite::from_submitted(other),
        }
    }
}
