//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the catalog:
//! - Logging and tracing infrastructure
//! - Configuration management
//!
//! ## Overview
//!
//! This crate contains the process-level setup that other modules depend on:
//! how logging is initialised and how the settings for the catalog store are
//! collected and validated before the store is opened.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{CoreConfig, CoreConfigBuilder};
pub use error::{Error, Result};
pub use logging::{init_logging, LogFormat, LogLevel, LoggingConfig};
