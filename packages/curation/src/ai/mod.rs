//! LLM implementations.
//!
//! Reference implementation of the [`Llm`](crate::traits::llm::Llm) trait.
//! Anything else can implement the trait directly.

#[cfg(feature = "openai")]
mod openai;

#[cfg(feature = "openai")]
pub use openai::OpenAiLlm;
