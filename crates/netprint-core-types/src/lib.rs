//! Core types shared across netprint crates
//!
//! This crate provides foundational types used by the engine, its logging
//! facility and the CLI front end:
//!
//! - **Correlation types**: RunId, tagging every event of one extraction run
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::RunId;
