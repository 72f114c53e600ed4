//! Configuration module for bulk body compilation
//!
//! This module provides the `BulkConfig` struct and its builder for
//! configuring how objects are turned into bulk operations.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod types;

// Re-exports for public API
pub use builder::BulkConfigBuilder;
pub use types::BulkConfig;
