//! CLI subcommands.

pub mod batch;
pub mod common;
pub mod config;
pub mod extract;
pub mod normalize;
