//! Compression stage: structured fields to exactly three bullets.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::error::{Stage, SummarizationError};
use crate::summarize::prompts::format_compress_prompt;
use crate::traits::llm::Llm;
use crate::types::config::OutputLanguage;
use crate::types::summary::StructuredFields;

/// Ask the LLM to paraphrase the fields into three bullets.
pub async fn compress(
    llm: &dyn Llm,
    fields: &StructuredFields,
    title: &str,
    language: OutputLanguage,
    temperature: f32,
) -> Result<[String; 3], SummarizationError> {
    let prompt = format_compress_prompt(fields, title, language);
    let response = llm
        .complete(&prompt, temperature)
        .await
        .map_err(|source| SummarizationError::Llm {
            stage: Stage::Compress,
            source,
        })?;
    debug!(response_len = response.len(), "Compression response");
    parse_bullets(&response)
}

fn bullet_prefix() -> &'static Regex {
    static PREFIX: OnceLock<Regex> = OnceLock::new();
    PREFIX.get_or_init(|| Regex::new(r"^(?:[•\-\*·]|\d+[.)]\s|\d+、)\s*").unwrap())
}

/// Extract exactly three bullets from a response.
///
/// Lines starting with `•`, `-`, `*` or a numeric marker like `1. ` are bullets and
/// have the marker stripped. Without any marked lines, exactly three
/// non-empty lines are accepted as-is.
pub fn parse_bullets(response: &str) -> Result<[String; 3], SummarizationError> {
    let lines: Vec<&str> = response
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let prefix = bullet_prefix();
    let marked: Vec<String> = lines
        .iter()
        .filter(|l| prefix.is_match(l))
        .map(|l| prefix.replace(l, "").trim().to_string())
        .filter(|l| !l.is_empty())
        .collect();

    let bullets: Vec<String> = if marked.is_empty() {
        lines.iter().map(|l| l.to_string()).collect()
    } else {
        marked
    };

    <[String; 3]>::try_from(bullets).map_err(|bullets| SummarizationError::Unparseable {
        stage: Stage::Compress,
        reason: format!("expected 3 bullets, got {}", bullets.len()),
    })
}

/// Structured fields verbatim as the three bullets.
pub fn fallback_bullets(fields: &StructuredFields) -> [String; 3] {
    fields.clone().into_array()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::testing::MockLlm;

    #[test]
    fn test_parse_bullet_styles() {
        for response in [
            "• one\n• two\n• three",
            "- one\n- two\n- three",
            "* one\n* two\n* three",
            "1. one\n2. two\n3. three",
            "Summary:\n• one\n\n• two\n• three\n",
        ] {
            let bullets = parse_bullets(response).unwrap();
            assert_eq!(bullets, ["one", "two", "three"], "response {:?}", response);
        }
    }

    #[test]
    fn test_parse_unmarked_lines() {
        let bullets = parse_bullets("alpha\nbeta\ngamma").unwrap();
        assert_eq!(bullets, ["alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_parse_unmarked_lines_starting_with_numbers() {
        let bullets = parse_bullets("Planning is hard.\nSubgoals help.\n2.5x faster on ALFWorld.").unwrap();
        assert_eq!(bullets[2], "2.5x faster on ALFWorld.");

        let bullets = parse_bullets("1) one\n2) two\n3、三").unwrap();
        assert_eq!(bullets, ["one", "two", "三"]);
    }

    #[test]
    fn test_parse_chinese_bullets() {
        let bullets = parse_bullets("• 解决长程规划难题\n• 子目标分解框架\n• 基准提升显著").unwrap();
        assert_eq!(bullets[0], "解决长程规划难题");
    }

    #[test]
    fn test_parse_rejects_wrong_count() {
        assert!(parse_bullets("• one\n• two").is_err());
        assert!(parse_bullets("• a\n• b\n• c\n• d").is_err());
        assert!(parse_bullets("").is_err());
    }

    #[test]
    fn test_fallback_bullets() {
        let fields = StructuredFields::new("p", "m", "r");
        assert_eq!(fallback_bullets(&fields), ["p", "m", "r"]);
    }

    #[tokio::test]
    async fn test_compress_uses_language_and_temperature() {
        let llm = MockLlm::new().with_response("• a\n• b\n• c");
        let fields = StructuredFields::new("p", "m", "r");
        let bullets = compress(&llm, &fields, "T", OutputLanguage::Chinese, 0.6)
            .await
            .unwrap();
        assert_eq!(bullets, ["a", "b", "c"]);

        let calls = llm.calls();
        assert_eq!(calls[0].temperature, 0.6);
        assert!(calls[0].prompt.user.contains("中文要点"));
    }

    #[tokio::test]
    async fn test_compress_llm_error() {
        let llm = MockLlm::new().with_error(LlmError::RateLimited("quota".into()));
        let fields = StructuredFields::new("p", "m", "r");
        let err = compress(&llm, &fields, "T", OutputLanguage::English, 0.6)
            .await
            .unwrap_err();
        assert!(matches!(err, SummarizationError::Llm { stage: Stage::Compress, .. }));
    }
}
