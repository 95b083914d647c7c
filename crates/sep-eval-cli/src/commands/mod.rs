//! Subcommand implementations.

pub mod aggregate;
pub mod collect;
pub mod stats;
pub mod summary;
