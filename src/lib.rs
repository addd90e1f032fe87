#![deny(missing_docs)]

//! Claim intake pipeline and Bedrock Lambda handler.

/// Bedrock client traits, SDK adapters, and the messages invoker.
pub mod bedrock;
/// Environment-driven configuration management.
pub mod config;
/// Lambda event routing for Bedrock actions.
pub mod handler;
/// Structured logging and tracing setup.
pub mod logging;
/// Best-effort text and JSON recovery from model responses.
pub mod normalize;
/// Claim processing orchestration.
pub mod pipeline;
/// Messages-API request types and prompt builders.
pub mod prompts;
/// Keyword-overlap retrieval over policy snippets.
pub mod retrieval;
/// Object storage for claim documents.
pub mod storage;
/// Claim field validation.
pub mod validation;

#[cfg(test)]
mod testing;
