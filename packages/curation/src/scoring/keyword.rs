use crate::error::ScoreError;
use crate::scoring::Scorer;
use crate::types::config::KeywordConfig;
use crate::types::paper::Paper;

/// Fraction of research-interest keywords present in title and abstract.
///
/// `saturation` matches give a full score; with fewer keywords than that,
/// matching all of them does.
#[derive(Debug, Clone)]
pub struct KeywordScorer {
    keywords: Vec<String>,
    saturation: usize,
}

impl KeywordScorer {
    pub fn new(config: &KeywordConfig) -> Self {
        Self {
            keywords: normalize_keywords(&config.keywords),
            saturation: config.saturation.max(1),
        }
    }

    /// Number of distinct keywords present in the paper.
    pub fn hits(&self, paper: &Paper) -> usize {
        count_hits(&self.keywords, &paper.searchable_text())
    }
}

impl Scorer for KeywordScorer {
    fn name(&self) -> &str {
        "keyword"
    }

    fn score(&self, paper: &Paper) -> Result<f64, ScoreError> {
        if self.keywords.is_empty() {
            return Ok(0.0);
        }
        let denominator = self.saturation.min(self.keywords.len()) as f64;
        Ok((self.hits(paper) as f64 / denominator).min(1.0))
    }
}

/// Lowercased, trimmed, non-empty, deduplicated.
pub(crate) fn normalize_keywords(keywords: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for kw in keywords {
        let kw = kw.trim().to_lowercase();
        if !kw.is_empty() && !out.contains(&kw) {
            out.push(kw);
        }
    }
    out
}

/// `text` must already be lowercased.
pub(crate) fn count_hits(keywords: &[String], text: &str) -> usize {
    keywords.iter().filter(|kw| text.contains(kw.as_str())).count()
}
