use chrono::{DateTime, Utc};
use chrono_tz::Australia::Sydney;

const BRAND_NAME: &str = "Lawnies";
const MISSING: &str = "—";

/// Rendered email body pair.
#[derive(Debug, Clone)]
pub struct EmailContent {
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Facts about a freshly provisioned operator for the internal alert.
#[derive(Debug, Clone)]
pub struct NewOperatorDetails<'a> {
    pub business_name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub signed_up_at: DateTime<Utc>,
    pub stripe_customer_id: Option<&'a str>,
    pub stripe_subscription_id: Option<&'a str>,
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Format a UTC instant as Sydney wall-clock time, e.g. `16 Oct 2026, 3:04 pm AEDT`.
pub fn format_sydney_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Sydney)
        .format("%-d %b %Y, %-I:%M %P %Z")
        .to_string()
}

/// Internal alert sent to the team when a checkout completes.
pub fn new_operator_email(details: &NewOperatorDetails<'_>) -> EmailContent {
    let signed_up = format_sydney_time(details.signed_up_at);
    let customer = details.stripe_customer_id.unwrap_or(MISSING);
    let subscription = details.stripe_subscription_id.unwrap_or(MISSING);

    let rows = [
        ("Business Name", details.business_name),
        ("Email", details.email),
        ("Phone", details.phone),
        ("Signed Up", signed_up.as_str()),
        ("Stripe Customer ID", customer),
        ("Stripe Subscription ID", subscription),
    ];

    let subject = format!("New {} Operator Signup — {}", BRAND_NAME, details.business_name);

    let table_rows: String = rows
        .iter()
        .map(|(label, value)| {
            format!(
                r#"<tr><td style="padding:6px 12px 6px 0;color:#6b7280;font-weight:600;">{}</td><td style="padding:6px 0;color:#111827;">{}</td></tr>"#,
                label,
                escape_html(value)
            )
        })
        .collect();

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <body style="background:#f8fafc;margin:0;padding:24px;font-family:Arial,Helvetica,sans-serif;">
    <div style="max-width:560px;margin:0 auto;background:#ffffff;border:1px solid #e5e7eb;border-radius:12px;padding:24px;">
      <h1 style="margin:0 0 12px;font-size:20px;color:#111827;">New operator signup</h1>
      <table style="border-collapse:collapse;font-size:14px;">{table_rows}</table>
    </div>
  </body>
</html>
"#
    );

    let text = std::iter::once("New operator signup".to_string())
        .chain(std::iter::once(String::new()))
        .chain(rows.iter().map(|(label, value)| format!("{label}: {value}")))
        .collect::<Vec<_>>()
        .join("\n");

    EmailContent { subject, html, text }
}
