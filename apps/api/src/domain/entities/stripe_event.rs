/// Stripe event types the webhook endpoint cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StripeEventKind {
    CheckoutSessionCompleted,
    Other(String),
}

impl StripeEventKind {
    pub fn parse(event_type: &str) -> Self {
        match event_type {
            "checkout.session.completed" => StripeEventKind::CheckoutSessionCompleted,
            other => StripeEventKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            StripeEventKind::CheckoutSessionCompleted => "checkout.session.completed",
            StripeEventKind::Other(s) => s,
        }
    }
}
