//! Infrastructure layer for Parley.
//!
//! Implementations of the ports defined in `parley-core`: SQLite storage,
//! LLM provider clients, and configuration loading.

pub mod config;
pub mod llm;
pub mod sqlite;
