//! Rule-based key-sentence extraction.
//!
//! Zero cost and deterministic: every sentence is scored by the number of
//! academic cue words it contains plus a positional bonus, and the best K
//! are returned in their original order.

/// Cue words for "what did they build".
pub const METHOD_KEYWORDS: &[&str] = &[
    "propose", "present", "introduce", "develop", "design", "method", "approach", "framework",
    "architecture", "model", "algorithm", "technique", "mechanism", "strategy", "pipeline",
    "leverage", "employ", "utilize", "formulate", "novel",
];

/// Cue words for "what did they find".
pub const RESULT_KEYWORDS: &[&str] = &[
    "experiment", "result", "evaluation", "benchmark", "dataset", "outperform", "improve",
    "achieve", "surpass", "state-of-the-art", "sota", "accuracy", "performance", "f1", "bleu",
    "rouge", "demonstrate", "show", "significantly", "superior", "comparable", "reduce",
    "increase", "gain",
];

/// Cue words for "what was wrong before".
pub const PROBLEM_KEYWORDS: &[&str] = &[
    "challenge", "problem", "limitation", "issue", "gap", "lack", "suffer", "difficult",
    "bottleneck", "drawback", "however", "although", "despite", "remain", "existing",
    "struggle", "fail", "inadequate",
];

const FIRST_SENTENCE_BONUS: usize = 2;
const LAST_SENTENCE_BONUS: usize = 1;

/// Stands in for the period of an abbreviation while splitting.
const ABBREVIATION_DOT: char = '\u{2024}';

const ABBREVIATIONS: &[&str] = &["et al.", "i.e.", "e.g."];

/// Split `text` into sentences on `.`, `!` or `?` followed by whitespace.
///
/// `et al.`, `i.e.` and `e.g.` never end a sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut protected = text.trim().to_string();
    for abbr in ABBREVIATIONS {
        protected = protected.replace(abbr, &abbr.replace('.', &ABBREVIATION_DOT.to_string()));
    }

    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = protected.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        let at_boundary = matches!(c, '.' | '!' | '?')
            && chars.peek().is_some_and(|next| next.is_whitespace());
        if at_boundary {
            push_sentence(&mut sentences, &current);
            current.clear();
        }
    }
    push_sentence(&mut sentences, &current);
    sentences
}

fn push_sentence(sentences: &mut Vec<String>, raw: &str) {
    let sentence = raw.trim().replace(ABBREVIATION_DOT, ".");
    if !sentence.is_empty() {
        sentences.push(sentence);
    }
}

/// Number of cue words found in `sentence`, plus the positional bonus.
fn sentence_score(sentence: &str, index: usize, count: usize) -> usize {
    let lower = sentence.to_lowercase();
    let hits = METHOD_KEYWORDS
        .iter()
        .chain(RESULT_KEYWORDS)
        .chain(PROBLEM_KEYWORDS)
        .filter(|kw| lower.contains(*kw))
        .count();

    let bonus = if index == 0 {
        FIRST_SENTENCE_BONUS
    } else if index + 1 == count {
        LAST_SENTENCE_BONUS
    } else {
        0
    };
    hits + bonus
}

/// Select the `k` most informative sentences of `abstract_text`, in order.
///
/// Abstracts with at most `k` sentences are returned whole. Ties go to the
/// earlier sentence.
pub fn extract_key_sentences(abstract_text: &str, k: usize) -> Vec<String> {
    let sentences = split_sentences(abstract_text);
    if sentences.len() <= k {
        return sentences;
    }

    let count = sentences.len();
    let mut ranked: Vec<(usize, usize)> = sentences
        .iter()
        .enumerate()
        .map(|(i, s)| (i, sentence_score(s, i, count)))
        .collect();
    // stable: equal scores keep position order
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let mut keep: Vec<usize> = ranked.into_iter().take(k).map(|(i, _)| i).collect();
    keep.sort_unstable();

    keep.into_iter().map(|i| sentences[i].clone()).collect()
}
