//! Test utilities for integration testing.
//!
//! This module provides:
//! - Test data factories for creating valid test fixtures
//! - In-memory repository implementations for mocking persistence
//! - Scripted email transport and checkout gateway doubles
//! - A tracing layer that captures structured log events
//! - `TestAppStateBuilder` for HTTP-level tests

mod app_state_builder;
mod factories;
mod log_capture;
mod notification_mocks;
mod settings_mocks;
mod signup_mocks;
mod stripe_signing;

pub use app_state_builder::*;
pub use factories::*;
pub use log_capture::*;
pub use notification_mocks::*;
pub use settings_mocks::*;
pub use signup_mocks::*;
pub use stripe_signing::*;
