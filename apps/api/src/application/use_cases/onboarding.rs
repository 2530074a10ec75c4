use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app_error::AppResult;
use crate::application::use_cases::operator::OperatorUseCases;
use crate::application::use_cases::settings::{SettingsMap, SettingsUseCases};
use crate::domain::entities::setting::SettingCategory;

#[async_trait]
pub trait OnboardingRepo: Send + Sync {
    async fn insert(
        &self,
        operator_id: Option<Uuid>,
        session_id: Option<&str>,
        responses: &BTreeMap<String, String>,
    ) -> AppResult<OnboardingResponseProfile>;
}

#[derive(Debug, Clone, Serialize)]
pub struct OnboardingResponseProfile {
    pub id: Uuid,
    pub operator_id: Option<Uuid>,
    pub session_id: Option<String>,
    pub responses: BTreeMap<String, String>,
    pub submitted_at: DateTime<Utc>,
}

// ============================================================================
// Page configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub label: String,
    pub placeholder: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSection {
    pub title: String,
    pub fields: Vec<FormField>,
}

/// Survey questions shown when no `welcome.form_sections` setting exists.
pub fn default_form_sections() -> Vec<FormSection> {
    fn field(label: &str, placeholder: &str) -> FormField {
        FormField {
            label: label.to_string(),
            placeholder: placeholder.to_string(),
        }
    }

    vec![
        FormSection {
            title: "Services & Pricing".into(),
            fields: vec![
                field(
                    "Services you offer",
                    "Example: Lawn mowing, edging, weed control, green waste removal",
                ),
                field(
                    "How you normally price jobs",
                    "Example: Minimum callout $120. Standard mow from $150 up to 400sqm. Add $40 for overgrown lawns.",
                ),
            ],
        },
        FormSection {
            title: "Where & When You Work".into(),
            fields: vec![
                field(
                    "Service areas / suburbs",
                    "Example: Perth, Fremantle, Joondalup, Midland, Rockingham",
                ),
                field(
                    "Working hours",
                    "Example: Mon-Fri 7am-5pm, Sat 8am-12pm, Sun closed.",
                ),
            ],
        },
        FormSection {
            title: "Booking Rules".into(),
            fields: vec![
                field("Booking limits or rules", "Example: Minimum 24 hr lead time."),
                field(
                    "Details we should collect from callers",
                    "Example: Full name, address, mobile, service needed, preferred day/time, access details.",
                ),
            ],
        },
        FormSection {
            title: "Escalations".into(),
            fields: vec![field(
                "When should we alert you immediately?",
                "Example: Urgent cleanups or complaints should be SMSed to me immediately on 0400 123 456.",
            )],
        },
    ]
}

#[derive(Debug, Clone, Serialize)]
pub struct OperatorSummary {
    pub email: String,
    pub business_name: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WelcomeConfig {
    pub title: String,
    pub content: String,
    pub video_url: String,
    pub show_video: bool,
    pub form_sections: Vec<FormSection>,
    pub operator: Option<OperatorSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompleteConfig {
    pub subheadline: String,
    pub reinforcement_1: String,
    pub reinforcement_2: String,
    pub logistics_title: String,
    pub logistics_content: String,
    pub calendar_url: String,
    pub calendar_label: String,
}

const DEFAULT_WELCOME_TITLE: &str = "Welcome to Lawnies";
const DEFAULT_CALENDAR_URL: &str = "https://calendar.google.com/calendar/appointments/schedules/AcZssZ1Z5SY7eihMhvz4Otn_vLuti9CSA2OQ0-i9kuDCpAjmDMINRq_uQuYEubpDlAsnpap-00hmacwy?gv=true";

/// Empty strings fall back to the default, as an unset field would.
fn or_default(settings: &SettingsMap, key: &str, default: &str) -> String {
    settings
        .get(key)
        .filter(|v| !v.is_empty())
        .cloned()
        .unwrap_or_else(|| default.to_string())
}

fn parse_form_sections(raw: Option<&String>) -> Vec<FormSection> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return default_form_sections();
    };
    match serde_json::from_str::<Vec<FormSection>>(raw) {
        Ok(sections) if !sections.is_empty() => sections,
        Ok(_) => default_form_sections(),
        Err(err) => {
            tracing::warn!(error = %err, "Invalid welcome.form_sections setting, using defaults");
            default_form_sections()
        }
    }
}

// ============================================================================
// Use Cases
// ============================================================================

#[derive(Clone)]
pub struct OnboardingUseCases {
    repo: Arc<dyn OnboardingRepo>,
    operators: Arc<OperatorUseCases>,
    settings: Arc<SettingsUseCases>,
}

impl OnboardingUseCases {
    pub fn new(
        repo: Arc<dyn OnboardingRepo>,
        operators: Arc<OperatorUseCases>,
        settings: Arc<SettingsUseCases>,
    ) -> Self {
        Self {
            repo,
            operators,
            settings,
        }
    }

    pub async fn welcome_config(&self, session_id: Option<&str>) -> AppResult<WelcomeConfig> {
        let settings = self
            .settings
            .get_by_category(SettingCategory::Welcome.as_str())
            .await?;

        let operator = match session_id.filter(|s| !s.is_empty()) {
            Some(session_id) => self
                .operators
                .get_by_checkout_session(session_id)
                .await?
                .map(|op| OperatorSummary {
                    email: op.email,
                    business_name: op.business_name,
                    phone: op.phone,
                }),
            None => None,
        };

        Ok(WelcomeConfig {
            title: or_default(&settings, "title", DEFAULT_WELCOME_TITLE),
            content: or_default(&settings, "content", ""),
            video_url: or_default(&settings, "video_url", ""),
            show_video: settings.get("show_video").map(String::as_str) != Some("false"),
            form_sections: parse_form_sections(settings.get("form_sections")),
            operator,
        })
    }

    pub async fn complete_config(&self) -> AppResult<CompleteConfig> {
        let settings = self
            .settings
            .get_by_category(SettingCategory::Complete.as_str())
            .await?;

        Ok(CompleteConfig {
            subheadline: or_default(
                &settings,
                "subheadline",
                "To activate your receptionist, we'll run through your details together and confirm everything is configured correctly.",
            ),
            reinforcement_1: or_default(
                &settings,
                "reinforcement_1",
                "This session usually takes 20–30 minutes.",
            ),
            reinforcement_2: or_default(
                &settings,
                "reinforcement_2",
                "By the end of the call, you'll know exactly how your receptionist will handle incoming jobs.",
            ),
            logistics_title: or_default(&settings, "logistics_title", "How we'll run the session"),
            logistics_content: or_default(
                &settings,
                "logistics_content",
                "Google Meet is preferred.\nIf you choose a phone call, I'll call you at your booked time from 0431 847 833.\nPlease include the best number to reach you when booking, even if it's the same as your account number.",
            ),
            calendar_url: or_default(&settings, "calendar_url", DEFAULT_CALENDAR_URL),
            calendar_label: or_default(&settings, "calendar_label", "Book your setup session"),
        })
    }

    /// Store survey answers, linking them to the operator when the session id
    /// belongs to a provisioned account.
    pub async fn submit_survey(
        &self,
        session_id: Option<&str>,
        responses: BTreeMap<String, String>,
    ) -> AppResult<OnboardingResponseProfile> {
        let session_id = session_id.filter(|s| !s.is_empty());
        let operator_id = match session_id {
            Some(session_id) => self
                .operators
                .get_by_checkout_session(session_id)
                .await?
                .map(|op| op.id),
            None => None,
        };

        let saved = self.repo.insert(operator_id, session_id, &responses).await?;
        tracing::info!(
            response_id = %saved.id,
            operator_id = ?operator_id,
            answers = responses.len(),
            "Onboarding survey saved"
        );
        Ok(saved)
    }
}
