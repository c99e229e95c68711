//! Structuring stage: key sentences to Problem / Method / Result.

use tracing::debug;

use crate::error::{Stage, SummarizationError};
use crate::summarize::prompts::format_structure_prompt;
use crate::traits::llm::Llm;
use crate::types::summary::StructuredFields;

/// Ask the LLM for the three labelled fields.
pub async fn structure(
    llm: &dyn Llm,
    sentences: &[String],
    title: &str,
    temperature: f32,
) -> Result<StructuredFields, SummarizationError> {
    let prompt = format_structure_prompt(sentences, title);
    let response = llm
        .complete(&prompt, temperature)
        .await
        .map_err(|source| SummarizationError::Llm {
            stage: Stage::Structure,
            source,
        })?;
    debug!(response_len = response.len(), "Structuring response");
    parse_structured(&response)
}

/// Parse `Problem:`, `Method:` and `Result:` labelled lines.
///
/// Labels are case-insensitive and may carry list markers or markdown bold.
/// All three must be present and non-empty.
pub fn parse_structured(response: &str) -> Result<StructuredFields, SummarizationError> {
    let mut problem = None;
    let mut method = None;
    let mut result = None;

    for line in response.lines() {
        let Some((label, value)) = split_label(line) else {
            continue;
        };
        let slot = match label.as_str() {
            "problem" => &mut problem,
            "method" => &mut method,
            "result" => &mut result,
            _ => continue,
        };
        if slot.is_none() && !value.is_empty() {
            *slot = Some(value);
        }
    }

    match (problem, method, result) {
        (Some(problem), Some(method), Some(result)) => Ok(StructuredFields {
            problem,
            method,
            result,
        }),
        (problem, method, result) => {
            let missing: Vec<&str> = [
                ("Problem", problem.is_none()),
                ("Method", method.is_none()),
                ("Result", result.is_none()),
            ]
            .into_iter()
            .filter(|(_, missing)| *missing)
            .map(|(label, _)| label)
            .collect();
            Err(SummarizationError::Unparseable {
                stage: Stage::Structure,
                reason: format!("missing {}", missing.join(", ")),
            })
        }
    }
}

/// `"- **Method:** foo"` -> `("method", "foo")`
fn split_label(line: &str) -> Option<(String, String)> {
    let line = line
        .trim()
        .trim_start_matches(['-', '*', '•', ' '])
        .trim_start();
    let (label, value) = line.split_once(':')?;
    let label = label.trim().trim_matches('*').trim().to_lowercase();
    let value = value.trim().trim_start_matches('*').trim().to_string();
    Some((label, value))
}

/// Distribute extracted sentences over the three fields.
///
/// First sentence is the problem, the last is the result, anything in
/// between is the method. Slots with no sentence get the title.
pub fn fallback_structure(sentences: &[String], title: &str) -> StructuredFields {
    let title = title.trim();
    match sentences {
        [] => StructuredFields::new(title, title, title),
        [only] => StructuredFields::new(only.as_str(), title, only.as_str()),
        [first, last] => StructuredFields::new(first.as_str(), title, last.as_str()),
        [first, middle @ .., last] => {
            StructuredFields::new(first.as_str(), middle.join(" "), last.as_str())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::testing::MockLlm;

    #[test]
    fn test_parse_plain_labels() {
        let fields = parse_structured(
            "- Problem: LLMs plan poorly.\n- Method: Subgoal decomposition.\n- Result: 12% better.",
        )
        .unwrap();
        assert_eq!(fields.problem, "LLMs plan poorly.");
        assert_eq!(fields.method, "Subgoal decomposition.");
        assert_eq!(fields.result, "12% better.");
    }

    #[test]
    fn test_parse_markdown_and_case() {
        let fields = parse_structured(
            "Here you go:\n**Problem:** gap\n* method: approach\n•  RESULT:   outcome\n",
        )
        .unwrap();
        assert_eq!(fields, StructuredFields::new("gap", "approach", "outcome"));
    }

    #[test]
    fn test_parse_rejects_missing_label() {
        let err = parse_structured("- Problem: gap\n- Method: approach").unwrap_err();
        assert!(matches!(
            err,
            SummarizationError::Unparseable { stage: Stage::Structure, ref reason } if reason.contains("Result")
        ));
    }

    #[test]
    fn test_parse_rejects_empty_value() {
        assert!(parse_structured("Problem: gap\nMethod:\nResult: r").is_err());
        assert!(parse_structured("I cannot help with that.").is_err());
    }

    #[test]
    fn test_fallback_structure() {
        let s = |v: &[&str]| v.iter().map(|x| x.to_string()).collect::<Vec<_>>();

        let fields = fallback_structure(&s(&["A.", "B.", "C.", "D."]), "T");
        assert_eq!(fields, StructuredFields::new("A.", "B. C.", "D."));

        let fields = fallback_structure(&s(&["A.", "B."]), "T");
        assert_eq!(fields, StructuredFields::new("A.", "T", "B."));

        let fields = fallback_structure(&[], "Title");
        assert_eq!(fields, StructuredFields::new("Title", "Title", "Title"));
    }

    #[tokio::test]
    async fn test_structure_uses_low_temperature_prompt() {
        let llm = MockLlm::new().with_response("Problem: p\nMethod: m\nResult: r");
        let fields = structure(&llm, &["S.".to_string()], "T", 0.2).await.unwrap();
        assert_eq!(fields, StructuredFields::new("p", "m", "r"));

        let calls = llm.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].temperature, 0.2);
        assert!(calls[0].prompt.user.contains("KEY SENTENCES"));
    }

    #[tokio::test]
    async fn test_structure_llm_error() {
        let llm = MockLlm::new().with_error(LlmError::Request("timeout".into()));
        let err = structure(&llm, &[], "T", 0.2).await.unwrap_err();
        assert!(matches!(err, SummarizationError::Llm { stage: Stage::Structure, .. }));
    }
}
