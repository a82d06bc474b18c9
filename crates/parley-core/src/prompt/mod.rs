//! Prompt (conversation) domain logic.
//!
//! - `PromptRepository`: storage port implemented in parley-infra
//! - `load_context`: recent-history window for a new message
//! - `ChatDispatcher`: send a message and record the exchange
//! - `PromptService`: create, list, check, and page prompts

pub mod dispatch;
pub mod history;
pub mod repository;
pub mod service;
