//! Dispatch orchestration, prompt lifecycle, and repository traits for Parley.
//!
//! This crate defines the "ports" (repository and provider traits) that the
//! infrastructure layer implements. It depends only on `parley-types` --
//! never on `parley-infra` or any database/IO crate.

pub mod llm;
pub mod prompt;

#[cfg(test)]
pub(crate) mod testing;
