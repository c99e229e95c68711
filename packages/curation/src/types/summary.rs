//! Summarization outputs.

use serde::{Deserialize, Serialize};

/// Problem / Method / Result triple produced by the structuring stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredFields {
    pub problem: String,
    pub method: String,
    pub result: String,
}

impl StructuredFields {
    pub fn new(
        problem: impl Into<String>,
        method: impl Into<String>,
        result: impl Into<String>,
    ) -> Self {
        Self {
            problem: problem.into(),
            method: method.into(),
            result: result.into(),
        }
    }

    /// Fields in problem, method, result order.
    pub fn into_array(self) -> [String; 3] {
        [self.problem, self.method, self.result]
    }
}

/// Three ordered, non-empty bullets for one paper.
///
/// Regenerated every run, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub bullets: [String; 3],

    /// Structuring stage used the LLM rather than the extractive fallback
    pub structured_by_llm: bool,

    /// Compression stage used the LLM rather than the structured fields
    pub compressed_by_llm: bool,
}

impl Summary {
    pub fn bullets(&self) -> &[String] {
        &self.bullets
    }

    /// Neither LLM stage succeeded.
    pub fn is_fallback(&self) -> bool {
        !self.structured_by_llm && !self.compressed_by_llm
    }
}
