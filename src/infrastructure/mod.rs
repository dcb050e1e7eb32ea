//! Infrastructure layer modules
//!
//! This module contains shared infrastructure components:
//! - `auth`: credential provider and admin gate
//! - `config`: application configuration and settings
//! - `error`: error taxonomy
//! - `metrics`: Prometheus metrics helpers

pub mod auth;
pub mod config;
pub mod error;
pub mod metrics;
