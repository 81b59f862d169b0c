//! Core library components.
//!
//! Packaging, secret resolution and the Yandex Cloud API seams. Nothing in
//! here prints; the CLI layer owns user-facing output.

pub mod archive;
pub mod cloud;
pub mod config;
pub mod constants;
pub mod github;
pub mod inputs;
pub mod invocation;
pub mod secrets;
pub mod service_account;
