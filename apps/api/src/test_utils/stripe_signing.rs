//! Produces `stripe-signature` headers for webhook tests.

use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Header value in Stripe's `t=<unix>,v1=<hex hmac>` form for `payload`.
pub fn sign_stripe_payload(secret: &str, timestamp: i64, payload: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key");
    mac.update(format!("{timestamp}.{payload}").as_bytes());
    format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
}
