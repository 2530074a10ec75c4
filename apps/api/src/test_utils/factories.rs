//! Test data factories for creating valid test fixtures.
//!
//! Each factory function creates a complete, valid object with sensible defaults.
//! Use the closure parameter to override specific fields as needed.

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::{
    application::use_cases::operator::{NewOperator, OperatorProfile},
    domain::entities::subscription_status::SubscriptionStatus,
};

/// Create the insert payload for an operator provisioned from checkout.
pub fn create_test_new_operator(overrides: impl FnOnce(&mut NewOperator)) -> NewOperator {
    let mut operator = NewOperator {
        email: "operator@example.com".to_string(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$test$hash".to_string(),
        business_name: "Green Lawns".to_string(),
        phone: "0400000000".to_string(),
        stripe_customer_id: Some("cus_test123".to_string()),
        stripe_subscription_id: Some("sub_test123".to_string()),
        stripe_checkout_session_id: format!("cs_test_{}", Uuid::new_v4().simple()),
    };
    overrides(&mut operator);
    operator
}

/// Create a stored operator with sensible defaults.
pub fn create_test_operator(overrides: impl FnOnce(&mut OperatorProfile)) -> OperatorProfile {
    let now = test_datetime();

    let mut operator = OperatorProfile {
        id: Uuid::new_v4(),
        email: "operator@example.com".to_string(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$test$hash".to_string(),
        business_name: "Green Lawns".to_string(),
        phone: "0400000000".to_string(),
        slug: None,
        stripe_customer_id: Some("cus_test123".to_string()),
        stripe_subscription_id: Some("sub_test123".to_string()),
        stripe_checkout_session_id: Some(format!("cs_test_{}", Uuid::new_v4().simple())),
        subscription_status: SubscriptionStatus::Active,
        created_at: now,
        updated_at: now,
    };
    overrides(&mut operator);
    operator
}

fn test_datetime() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
}
