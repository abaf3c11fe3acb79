//! # Connector Retrieval
//!
//! Command-line front end for the lexical retrieval core used by the
//! integration connectors. Ranking and chunking live in
//! [`connector_retrieval_core`]; this crate loads configuration and input
//! files, wires up logging, and prints results.
//!
//! ## Quick Start
//!
//! ```bash
//! retrieve search "login failure" --records issues.json
//! retrieve search "rotation policy" --text handbook.md --matches
//! retrieve chunk handbook.md --json
//! retrieve --config retrieve.toml search "outage" --records incidents.json
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`search`] | `retrieve search` command |
//! | [`chunk`] | `retrieve chunk` command |

pub mod chunk;
pub mod config;
pub mod search;
