//! Data models for receipt extraction.

pub mod config;
pub mod receipt;

pub use config::RcptConfig;
pub use receipt::*;
