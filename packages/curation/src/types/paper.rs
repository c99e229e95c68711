//! Paper records and enrichment patches.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a paper has been formally published beyond arXiv.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicationStatus {
    #[default]
    Preprint,
    Published,
}

/// A paper as fetched from arXiv, plus whatever enrichment has been applied.
///
/// Enrichment goes through [`Paper::enriched`], which returns a new copy and
/// never clears a field that is already set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    /// arXiv id without URL prefix or version suffix
    pub id: String,

    pub title: String,

    pub abstract_text: String,

    /// Author names in byline order
    #[serde(default)]
    pub authors: Vec<String>,

    /// arXiv categories, primary first, no duplicates
    #[serde(default)]
    pub categories: Vec<String>,

    pub published: DateTime<Utc>,

    pub pdf_url: Option<String>,

    // Enrichment fields
    pub citation_count: Option<u64>,

    pub influential_citation_count: Option<u64>,

    /// Author affiliations, deduplicated
    #[serde(default)]
    pub institutions: Vec<String>,

    /// Venue or conference name
    pub venue: Option<String>,

    #[serde(default)]
    pub publication: PublicationStatus,

    /// Journal or proceedings title when published
    pub journal: Option<String>,

    pub doi: Option<String>,

    pub publisher: Option<String>,
}

impl Paper {
    /// Create an unenriched paper.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        abstract_text: impl Into<String>,
        published: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            abstract_text: abstract_text.into(),
            authors: Vec::new(),
            categories: Vec::new(),
            published,
            pdf_url: None,
            citation_count: None,
            influential_citation_count: None,
            institutions: Vec::new(),
            venue: None,
            publication: PublicationStatus::Preprint,
            journal: None,
            doi: None,
            publisher: None,
        }
    }

    pub fn with_authors(mut self, authors: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.authors = authors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_categories(
        mut self,
        categories: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.categories.clear();
        for category in categories {
            let category = category.into();
            if !self.categories.contains(&category) {
                self.categories.push(category);
            }
        }
        self
    }

    pub fn with_pdf_url(mut self, url: impl Into<String>) -> Self {
        self.pdf_url = Some(url.into());
        self
    }

    /// Abstract page URL.
    pub fn abs_url(&self) -> String {
        format!("https://arxiv.org/abs/{}", self.id)
    }

    /// Lowercased title and abstract, used for keyword matching.
    pub fn searchable_text(&self) -> String {
        format!("{} {}", self.title, self.abstract_text).to_lowercase()
    }

    pub fn is_published(&self) -> bool {
        self.publication == PublicationStatus::Published
    }

    /// Copy of this paper with `patch` applied.
    ///
    /// Set fields in the patch overwrite; unset fields leave the paper alone.
    /// Institutions accumulate. Publication status only moves towards
    /// `Published`.
    pub fn enriched(&self, patch: &Enrichment) -> Paper {
        let mut paper = self.clone();

        if let Some(n) = patch.citation_count {
            paper.citation_count = Some(n);
        }
        if let Some(n) = patch.influential_citation_count {
            paper.influential_citation_count = Some(n);
        }
        for inst in &patch.institutions {
            let inst = inst.trim();
            if !inst.is_empty() && !paper.institutions.iter().any(|i| i == inst) {
                paper.institutions.push(inst.to_string());
            }
        }
        if let Some(venue) = non_empty(&patch.venue) {
            paper.venue = Some(venue);
        }
        if patch.published == Some(true) {
            paper.publication = PublicationStatus::Published;
        }
        if let Some(journal) = non_empty(&patch.journal) {
            paper.journal = Some(journal);
        }
        if let Some(doi) = non_empty(&patch.doi) {
            paper.doi = Some(doi);
        }
        if let Some(publisher) = non_empty(&patch.publisher) {
            paper.publisher = Some(publisher);
        }

        paper
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Partial paper fields returned by one enrichment source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Enrichment {
    pub citation_count: Option<u64>,
    pub influential_citation_count: Option<u64>,
    #[serde(default)]
    pub institutions: Vec<String>,
    pub venue: Option<String>,
    /// `Some(true)` when formal publication was verified
    pub published: Option<bool>,
    pub journal: Option<String>,
    pub doi: Option<String>,
    pub publisher: Option<String>,
}

impl Enrichment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_citations(mut self, citations: u64, influential: u64) -> Self {
        self.citation_count = Some(citations);
        self.influential_citation_count = Some(influential);
        self
    }

    pub fn with_institutions(
        mut self,
        institutions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.institutions = institutions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_venue(mut self, venue: impl Into<String>) -> Self {
        self.venue = Some(venue.into());
        self
    }

    pub fn with_publication(mut self, journal: impl Into<String>) -> Self {
        self.published = Some(true);
        self.journal = Some(journal.into());
        self
    }

    /// True when the patch sets nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn paper() -> Paper {
        Paper::new(
            "2402.12345",
            "Reasoning with LLMs",
            "We study reasoning.",
            Utc.with_ymd_and_hms(2024, 2, 19, 0, 0, 0).unwrap(),
        )
        .with_authors(["Ada", "Alan"])
        .with_categories(["cs.CL", "cs.AI", "cs.CL"])
    }

    #[test]
    fn test_categories_are_deduplicated() {
        assert_eq!(paper().categories, vec!["cs.CL", "cs.AI"]);
    }

    #[test]
    fn test_enrichment_sets_fields() {
        let patch = Enrichment::new()
            .with_citations(12, 2)
            .with_institutions(["MIT", "MIT", " "])
            .with_venue("NeurIPS");
        let enriched = paper().enriched(&patch);

        assert_eq!(enriched.citation_count, Some(12));
        assert_eq!(enriched.influential_citation_count, Some(2));
        assert_eq!(enriched.institutions, vec!["MIT"]);
        assert_eq!(enriched.venue.as_deref(), Some("NeurIPS"));
        assert_eq!(enriched.title, "Reasoning with LLMs");
        assert_eq!(enriched.authors, vec!["Ada", "Alan"]);
    }

    #[test]
    fn test_second_patch_cannot_clear_first() {
        let first = Enrichment::new()
            .with_citations(5, 0)
            .with_venue("ICML")
            .with_publication("Proceedings of ICML");
        let second = Enrichment {
            published: Some(false),
            venue: Some("".into()),
            ..Default::default()
        };

        let paper = paper().enriched(&first).enriched(&second);
        assert_eq!(paper.citation_count, Some(5));
        assert_eq!(paper.venue.as_deref(), Some("ICML"));
        assert!(paper.is_published());
        assert_eq!(paper.journal.as_deref(), Some("Proceedings of ICML"));
    }

    #[test]
    fn test_enriched_returns_new_copy() {
        let original = paper();
        let _ = original.enriched(&Enrichment::new().with_citations(1, 1));
        assert_eq!(original.citation_count, None);
        assert!(Enrichment::new().is_empty());
    }
}
