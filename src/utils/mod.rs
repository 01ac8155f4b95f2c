//! Utility Functions
//!
//! User-friendly error formatting for the binary.
//!
//! ```rust
//! use lamco_scroll::utils::format_user_error;
//!
//! let error = anyhow::anyhow!("Failed to parse config file");
//! let message = format_user_error(&error);
//! assert!(message.contains("Configuration Error"));
//! ```
//!
//! Error categories with context-aware help:
//! - Config errors → syntax, value ranges, hotkey names
//! - Clock errors → refresh rate
//! - Tap errors → input monitoring permission
//! - Input errors → replay line format

pub mod errors;

pub use errors::format_user_error;
