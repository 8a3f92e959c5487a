//! Subcommands of the `snowmint` binary.
//!
//! - [`config`] - CLI and environment parsing, validated into run configs.
//! - [`generate`] - mint IDs, optionally with the rate reporter.
//! - [`inspect`] - decode IDs into their fields.
//! - [`telemetry`] - `tracing` subscriber setup.

pub mod config;
pub mod generate;
pub mod inspect;
pub mod telemetry;
