//! LLM provider abstractions for Parley.
//!
//! - `LlmProvider`: RPITIT trait for concrete provider implementations
//! - `BoxLlmProvider`: Object-safe wrapper for dynamic dispatch
//! - `ProviderRegistry`: name-indexed providers plus the dispatch call

pub mod box_provider;
pub mod provider;
pub mod registry;
