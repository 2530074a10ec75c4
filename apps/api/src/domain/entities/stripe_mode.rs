use serde::{Deserialize, Serialize};

/// Stripe environment mode - test (sandbox) or live (production)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StripeMode {
    #[default]
    Test,
    Live,
}

impl StripeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StripeMode::Test => "test",
            StripeMode::Live => "live",
        }
    }

    /// Live keys are only used when the app runs with `APP_ENV=production`.
    pub fn from_app_env(app_env: &str) -> Self {
        if app_env.eq_ignore_ascii_case("production") {
            StripeMode::Live
        } else {
            StripeMode::Test
        }
    }

    /// Suffix of the environment variables holding credentials for this mode.
    pub fn env_suffix(&self) -> &'static str {
        match self {
            StripeMode::Test => "TEST",
            StripeMode::Live => "LIVE",
        }
    }

    /// Detect mode from Stripe key prefix.
    /// Test keys start with sk_test_ or pk_test_.
    /// Live keys start with sk_live_ or pk_live_.
    /// Restricted keys follow the same live/test prefix rules.
    pub fn from_key_prefix(key: &str) -> Self {
        if key.starts_with("sk_live_") || key.starts_with("pk_live_") || key.starts_with("rk_live_")
        {
            StripeMode::Live
        } else {
            StripeMode::Test
        }
    }

    /// Validate that a key's prefix matches the expected mode.
    pub fn validate_key_prefix(&self, key: &str, key_name: &str) -> Result<(), String> {
        let detected = Self::from_key_prefix(key);
        if detected != *self {
            Err(format!(
                "{} has {} prefix but {} mode was expected",
                key_name,
                detected.as_str(),
                self.as_str()
            ))
        } else {
            Ok(())
        }
    }
}

impl std::fmt::Display for StripeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
