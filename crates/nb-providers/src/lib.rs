//! nb-providers: LLM provider implementations for newsbrief
//!
//! This crate provides implementations of the Provider trait for LLM APIs.

pub mod openai;

pub use openai::OpenAIProvider;
