pub mod email_provider;
pub mod setting;
pub mod stripe_event;
pub mod stripe_mode;
pub mod subscription_status;
