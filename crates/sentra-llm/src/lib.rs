//! Sentra LLM - Plain-language interpretation of scan findings.
//!
//! This crate wraps an OpenAI-compatible chat completions API behind a
//! small provider abstraction and exposes the interpretation contract the
//! orchestrator consumes: one raw finding in, one plain-language
//! explanation out.
//!
//! # Example
//!
//! ```rust,ignore
//! use sentra_llm::{FindingInterpreter, LlmInterpreter, OpenAiProvider};
//! use std::sync::Arc;
//!
//! let provider = OpenAiProvider::new(api_key)?;
//! let interpreter = LlmInterpreter::new(Arc::new(provider));
//! let explanation = interpreter.interpret(&finding).await?;
//! println!("{}", explanation.how_to_fix);
//! ```
//!
//! Interpretation is an enhancement step: callers are expected to fall
//! back to `Interpretation::placeholder` when a single finding cannot be
//! interpreted, rather than failing the scan.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod interpreter;
pub mod provider;
pub mod providers;

// Re-export commonly used types
pub use error::{LlmError, Result};
pub use interpreter::{FindingInterpreter, LlmInterpreter, PlaceholderInterpreter};
pub use provider::{CompletionRequest, CompletionResponse, LlmProvider, Message, Role};
pub use providers::OpenAiProvider;
