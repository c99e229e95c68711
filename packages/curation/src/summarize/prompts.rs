//! LLM prompts for the structuring and compression stages, and for the
//! research-interest relevance filter.

use std::fmt::Write;

use crate::traits::llm::Prompt;
use crate::types::config::OutputLanguage;
use crate::types::paper::Paper;
use crate::types::summary::StructuredFields;

/// Abstract characters shown per paper in the relevance prompt.
pub const RELEVANCE_ABSTRACT_CHARS: usize = 300;

/// System prompt for the relevance filter.
pub const RELEVANCE_SYSTEM: &str = "You are an expert research analyst who selects \
the papers that best match a researcher's stated interests.";

/// Prompt asking for the most relevant paper ids.
pub const RELEVANCE_PROMPT: &str = r#"My research interests: {interests}

Recent arXiv papers:

{papers}

Pick the {limit} papers most relevant to my research interests.

Requirements:
1. Return only arXiv IDs (like 2402.12345)
2. One ID per line
3. Most relevant first
4. No explanations

Example:
2402.12345
2402.12346"#;

/// System prompt for the structuring stage.
pub const STRUCTURE_SYSTEM: &str = "You are a precise academic information extractor. \
Output ONLY the requested structured fields, nothing else.";

/// Prompt for turning key sentences into Problem / Method / Result.
pub const STRUCTURE_PROMPT: &str = r#"From the following key sentences of a research paper, extract exactly 3 fields.
Write each as ONE concise sentence (max 20 words). Be specific, not vague.

KEY SENTENCES:
{sentences}

PAPER TITLE (for context):
{title}

Output format (use exactly these labels):
- Problem: <what gap or challenge the paper addresses>
- Method: <core technical approach or framework>
- Result: <main quantitative or qualitative outcome>"#;

/// System prompt for English compression.
pub const COMPRESS_SYSTEM_EN: &str = "You are an academic paper compression expert. \
Rephrase everything in your own words and never copy the original phrasing.";

/// Prompt for English compression into three bullets.
pub const COMPRESS_PROMPT_EN: &str = r#"Rewrite the following structured paper info into 3 concise bullet points.

Rules (follow ALL of them):
1. Each bullet starts with •
2. Each bullet has at most 15 words
3. Bullet 1: the problem addressed
4. Bullet 2: the method or approach used
5. Bullet 3: the outcome achieved
6. Do NOT reuse phrases from the input; paraphrase
7. Be specific, not generic

Structured info:
{structured}

Paper title:
{title}"#;

/// System prompt for Chinese compression.
pub const COMPRESS_SYSTEM_ZH: &str = "你是学术论文压缩专家。你必须用自己的语言重写，严禁照搬原文措辞。";

/// Prompt for Chinese compression into three bullets.
pub const COMPRESS_PROMPT_ZH: &str = r#"将以下论文结构化信息改写为 3 条中文要点。

规则（必须全部遵守）：
1. 每条以 • 开头
2. 每条不超过 25 个中文字
3. 第一条说明解决的问题
4. 第二条说明采用的方法
5. 第三条说明达到的效果
6. 禁止直接翻译原句，用自己的语言概括
7. 使用中文学术术语

结构化信息：
{structured}

论文标题：
{title}"#;

/// Build the structuring prompt from extracted sentences.
pub fn format_structure_prompt(sentences: &[String], title: &str) -> Prompt {
    let user = STRUCTURE_PROMPT
        .replace("{sentences}", &sentences.join("\n"))
        .replace("{title}", title);
    Prompt::new(user).with_system(STRUCTURE_SYSTEM)
}

/// Render structured fields as the labelled block both stages use.
pub fn format_structured(fields: &StructuredFields) -> String {
    format!(
        "- Problem: {}\n- Method: {}\n- Result: {}",
        fields.problem, fields.method, fields.result
    )
}

/// Build the compression prompt in the requested language.
pub fn format_compress_prompt(
    fields: &StructuredFields,
    title: &str,
    language: OutputLanguage,
) -> Prompt {
    let (template, system) = match language {
        OutputLanguage::English => (COMPRESS_PROMPT_EN, COMPRESS_SYSTEM_EN),
        OutputLanguage::Chinese => (COMPRESS_PROMPT_ZH, COMPRESS_SYSTEM_ZH),
    };
    let user = template
        .replace("{structured}", &format_structured(fields))
        .replace("{title}", title);
    Prompt::new(user).with_system(system)
}

/// Build the relevance prompt listing every candidate.
pub fn format_relevance_prompt(interests: &str, papers: &[Paper], limit: usize) -> Prompt {
    let mut listing = String::new();
    for (i, paper) in papers.iter().enumerate() {
        let abstract_head: String = paper
            .abstract_text
            .chars()
            .take(RELEVANCE_ABSTRACT_CHARS)
            .collect();
        let _ = write!(
            listing,
            "{}. ID: {}\n   Title: {}\n   Abstract: {}...\n\n",
            i + 1,
            paper.id,
            paper.title.trim(),
            abstract_head.trim()
        );
    }
    let user = RELEVANCE_PROMPT
        .replace("{interests}", interests.trim())
        .replace("{papers}", listing.trim_end())
        .replace("{limit}", &limit.to_string());
    Prompt::new(user).with_system(RELEVANCE_SYSTEM)
}
