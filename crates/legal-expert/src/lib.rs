pub mod auth;
pub mod config;
pub mod error;
pub mod respond;
pub mod telemetry;
pub mod workflows;
