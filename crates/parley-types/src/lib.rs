//! Shared domain types for Parley.
//!
//! This crate contains the domain types used across the Parley workspace:
//! prompts, messages, cost records, paging, provider configuration, and the
//! error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod error;
pub mod llm;
pub mod page;
pub mod prompt;
