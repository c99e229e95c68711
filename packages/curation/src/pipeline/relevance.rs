//! LLM relevance filter against the user's research interests.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::error::LlmError;
use crate::summarize::prompts::format_relevance_prompt;
use crate::traits::llm::Llm;
use crate::types::paper::Paper;

/// Temperature for the relevance call.
pub const RELEVANCE_TEMPERATURE: f32 = 0.3;

fn arxiv_id() -> &'static Regex {
    static ID: OnceLock<Regex> = OnceLock::new();
    ID.get_or_init(|| {
        Regex::new(r"(?i)(?:arxiv:)?(\d{4}\.\d{4,5}|[a-z][a-z\-]*(?:\.[A-Z]{2})?/\d{7})(?:v\d+)?")
            .unwrap()
    })
}

/// arXiv ids named in `reply` that belong to `candidates`.
///
/// Reply order, no repeats, at most `limit`.
pub fn parse_relevant_ids(reply: &str, candidates: &[Paper], limit: usize) -> Vec<String> {
    let known: HashSet<&str> = candidates.iter().map(|p| p.id.as_str()).collect();
    let mut picked = HashSet::new();
    let mut ids = Vec::new();

    for capture in arxiv_id().captures_iter(reply) {
        let id = &capture[1];
        if !known.contains(id) {
            debug!(paper_id = id, "Relevance reply named an unknown id");
            continue;
        }
        if picked.insert(id.to_string()) {
            ids.push(id.to_string());
            if ids.len() == limit {
                break;
            }
        }
    }
    ids
}

/// Ask the LLM which candidates match `interests`.
///
/// Returns the chosen ids, most relevant first. An empty list means the
/// reply named none of the candidates.
pub async fn select_relevant(
    llm: &dyn Llm,
    interests: &str,
    candidates: &[Paper],
    limit: usize,
) -> Result<Vec<String>, LlmError> {
    let prompt = format_relevance_prompt(interests, candidates, limit);
    let reply = llm.complete(&prompt, RELEVANCE_TEMPERATURE).await?;
    Ok(parse_relevant_ids(&reply, candidates, limit))
}
