pub mod app;
pub mod config;
pub mod crypto;
pub mod db;
pub mod email_transport;
pub mod error;
pub mod http_client;
pub mod password;
pub mod pending_signup_sweeper;
pub mod setup;
pub mod stripe_client;
