use serde::{Deserialize, Serialize};

/// Outbound email provider selected in the `email` settings category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailProviderKind {
    Smtp,
    SendGrid,
}

impl EmailProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailProviderKind::Smtp => "smtp",
            EmailProviderKind::SendGrid => "sendgrid",
        }
    }
}

impl std::fmt::Display for EmailProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EmailProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "smtp" => Ok(EmailProviderKind::Smtp),
            "sendgrid" => Ok(EmailProviderKind::SendGrid),
            _ => Err(format!("Unsupported email provider: {}", s)),
        }
    }
}
