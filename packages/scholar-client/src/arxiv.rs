//! arXiv export API client (Atom feed).

use std::sync::OnceLock;
use std::time::Duration;

use chrono::{DateTime, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScholarError};
use crate::limiter::SourceLimiter;

const BASE_URL: &str = "https://export.arxiv.org/api/query";

/// arXiv asks for at most one request every three seconds.
pub const ARXIV_MIN_INTERVAL: Duration = Duration::from_secs(3);

/// One entry of an arXiv Atom feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArxivEntry {
    /// Canonical id without version suffix, e.g. `2402.12345`
    pub arxiv_id: String,
    pub title: String,
    pub summary: String,
    pub authors: Vec<String>,
    pub categories: Vec<String>,
    pub published: DateTime<Utc>,
    pub pdf_url: Option<String>,
}

/// Search window and category filter.
#[derive(Debug, Clone)]
pub struct ArxivQuery {
    pub categories: Vec<String>,
    pub submitted_from: DateTime<Utc>,
    pub submitted_to: DateTime<Utc>,
    pub max_results: usize,
}

impl ArxivQuery {
    /// The `search_query` parameter for this window.
    pub fn search_query(&self) -> String {
        let window = format!(
            "submittedDate:[{} TO {}]",
            self.submitted_from.format("%Y%m%d%H%M"),
            self.submitted_to.format("%Y%m%d%H%M")
        );
        let cats: Vec<String> = self
            .categories
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(|c| format!("cat:{}", c))
            .collect();

        if cats.is_empty() {
            window
        } else {
            format!("({}) AND {}", cats.join(" OR "), window)
        }
    }
}

#[derive(Clone)]
pub struct ArxivClient {
    client: reqwest::Client,
    base_url: String,
    limiter: SourceLimiter,
}

impl ArxivClient {
    pub fn new(limiter: SourceLimiter) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("arxiv-digest/0.1")
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| ScholarError::Client(e.to_string()))?;
        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
            limiter,
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Newest-first search over the submission window.
    pub async fn search(&self, query: &ArxivQuery) -> Result<Vec<ArxivEntry>> {
        let search_query = query.search_query();
        tracing::info!(query = %search_query, max_results = query.max_results, "Querying arXiv");

        self.limiter.until_ready().await;
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("search_query", search_query.as_str())])
            .query(&[("start", 0usize), ("max_results", query.max_results)])
            .query(&[("sortBy", "submittedDate"), ("sortOrder", "descending")])
            .header(ACCEPT, "application/atom+xml, application/xml;q=0.9")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ScholarError::Api {
                service: "arXiv",
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        let entries = parse_atom_feed(&body)?;
        tracing::info!(count = entries.len(), "Fetched arXiv entries");
        Ok(entries)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Id,
    Title,
    Summary,
    Published,
    AuthorName,
}

#[derive(Default)]
struct PartialEntry {
    id: String,
    title: String,
    summary: String,
    published: String,
    authors: Vec<String>,
    categories: Vec<String>,
    pdf_url: Option<String>,
}

impl PartialEntry {
    fn finish(self) -> Result<ArxivEntry> {
        let published = DateTime::parse_from_rfc3339(self.published.trim())
            .map_err(|e| ScholarError::Parse {
                service: "arXiv",
                message: format!("bad published date {:?}: {}", self.published, e),
            })?
            .with_timezone(&Utc);

        Ok(ArxivEntry {
            arxiv_id: canonical_id(&self.id),
            title: clean_title(&self.title),
            summary: clean_abstract(&self.summary),
            authors: self.authors,
            categories: self.categories,
            published,
            pdf_url: self.pdf_url,
        })
    }
}

/// Parse an arXiv Atom document into entries.
pub fn parse_atom_feed(xml: &str) -> Result<Vec<ArxivEntry>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<PartialEntry> = None;
    let mut field: Option<Field> = None;
    let mut author_name = String::new();

    loop {
        let event = reader.read_event().map_err(|e| ScholarError::Parse {
            service: "arXiv",
            message: format!("XML error at {}: {}", reader.buffer_position(), e),
        })?;

        match event {
            Event::Eof => break,
            Event::Start(e) => match e.local_name().as_ref() {
                b"entry" => current = Some(PartialEntry::default()),
                b"id" if current.is_some() => field = Some(Field::Id),
                b"title" if current.is_some() => field = Some(Field::Title),
                b"summary" if current.is_some() => field = Some(Field::Summary),
                b"published" if current.is_some() => field = Some(Field::Published),
                b"name" if current.is_some() => {
                    author_name.clear();
                    field = Some(Field::AuthorName);
                }
                _ => {}
            },
            Event::Empty(e) => {
                let Some(entry) = current.as_mut() else {
                    continue;
                };
                match e.local_name().as_ref() {
                    b"category" => {
                        if let Some(term) = attribute(&e, b"term") {
                            if !entry.categories.contains(&term) {
                                entry.categories.push(term);
                            }
                        }
                    }
                    b"link" => {
                        if attribute(&e, b"title").as_deref() == Some("pdf") {
                            entry.pdf_url = attribute(&e, b"href");
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(t) => {
                let (Some(entry), Some(f)) = (current.as_mut(), field) else {
                    continue;
                };
                let text = t.unescape().map_err(|e| ScholarError::Parse {
                    service: "arXiv",
                    message: e.to_string(),
                })?;
                match f {
                    Field::Id => entry.id.push_str(&text),
                    Field::Title => entry.title.push_str(&text),
                    Field::Summary => entry.summary.push_str(&text),
                    Field::Published => entry.published.push_str(&text),
                    Field::AuthorName => author_name.push_str(&text),
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"entry" => {
                    if let Some(entry) = current.take() {
                        entries.push(entry.finish()?);
                    }
                    field = None;
                }
                b"name" => {
                    if let Some(entry) = current.as_mut() {
                        let name = author_name.trim();
                        if !name.is_empty() {
                            entry.authors.push(name.to_string());
                        }
                    }
                    field = None;
                }
                _ => field = None,
            },
            _ => {}
        }
    }

    Ok(entries)
}

fn attribute(e: &quick_xml::events::BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == key)
        .and_then(|a| a.unescape_value().ok())
        .map(|v| v.into_owned())
}

/// `http://arxiv.org/abs/2402.12345v2` -> `2402.12345`
pub fn canonical_id(raw: &str) -> String {
    static VERSION: OnceLock<Regex> = OnceLock::new();
    let version = VERSION.get_or_init(|| Regex::new(r"v\d+$").unwrap());

    let tail = raw.trim().rsplit("/abs/").next().unwrap_or(raw).trim();
    version.replace(tail, "").into_owned()
}

/// Collapse whitespace and newlines.
pub fn clean_title(title: &str) -> String {
    title.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapse whitespace and drop leftover LaTeX commands with a braced argument.
pub fn clean_abstract(text: &str) -> String {
    static LATEX: OnceLock<Regex> = OnceLock::new();
    let latex = LATEX.get_or_init(|| Regex::new(r"\\[a-zA-Z]+\{[^}]*\}").unwrap());

    let collapsed = clean_title(text);
    clean_title(&latex.replace_all(&collapsed, ""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:arxiv="http://arxiv.org/schemas/atom">
  <title type="html">ArXiv Query: search_query=cat:cs.AI</title>
  <id>http://arxiv.org/api/abc</id>
  <entry>
    <id>http://arxiv.org/abs/2402.12345v2</id>
    <updated>2024-02-20T10:00:00Z</updated>
    <published>2024-02-19T18:30:00Z</published>
    <title>Reasoning   with
      Large Language Models</title>
    <summary>  We study \textbf{chain} reasoning.
      Results &amp; analysis follow.</summary>
    <author><name>Ada Lovelace</name><arxiv:affiliation>Analytical Engines</arxiv:affiliation></author>
    <author><name>Alan Turing</name></author>
    <link href="http://arxiv.org/abs/2402.12345v2" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/2402.12345v2" rel="related" type="application/pdf"/>
    <arxiv:primary_category term="cs.CL" scheme="http://arxiv.org/schemas/atom"/>
    <category term="cs.CL" scheme="http://arxiv.org/schemas/atom"/>
    <category term="cs.AI" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2402.00001v1</id>
    <published>2024-02-18T09:00:00Z</published>
    <title>Second</title>
    <summary>Short.</summary>
    <author><name>Grace Hopper</name></author>
    <category term="cs.LG"/>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_atom_feed() {
        let entries = parse_atom_feed(FEED).unwrap();
        assert_eq!(entries.len(), 2);

        let first = &entries[0];
        assert_eq!(first.arxiv_id, "2402.12345");
        assert_eq!(first.title, "Reasoning with Large Language Models");
        assert_eq!(first.summary, "We study reasoning. Results & analysis follow.");
        assert_eq!(first.authors, vec!["Ada Lovelace", "Alan Turing"]);
        assert_eq!(first.categories, vec!["cs.CL", "cs.AI"]);
        assert_eq!(
            first.pdf_url.as_deref(),
            Some("http://arxiv.org/pdf/2402.12345v2")
        );
        assert_eq!(
            first.published,
            Utc.with_ymd_and_hms(2024, 2, 19, 18, 30, 0).unwrap()
        );

        assert_eq!(entries[1].arxiv_id, "2402.00001");
        assert_eq!(entries[1].pdf_url, None);
    }

    #[test]
    fn test_feed_title_is_not_an_entry() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>empty</title></feed>"#;
        assert!(parse_atom_feed(xml).unwrap().is_empty());
    }

    #[test]
    fn test_bad_date_is_an_error() {
        let xml = r#"<feed><entry><id>http://arxiv.org/abs/1</id><published>yesterday</published></entry></feed>"#;
        assert!(matches!(
            parse_atom_feed(xml),
            Err(ScholarError::Parse { .. })
        ));
    }

    #[test]
    fn test_canonical_id() {
        assert_eq!(canonical_id("http://arxiv.org/abs/2402.12345v10"), "2402.12345");
        assert_eq!(canonical_id("2402.12345"), "2402.12345");
        assert_eq!(canonical_id("http://arxiv.org/abs/hep-th/9901001v1"), "hep-th/9901001");
    }

    #[test]
    fn test_search_query() {
        let query = ArxivQuery {
            categories: vec!["cs.AI".into(), " ".into(), "cs.LG".into()],
            submitted_from: Utc.with_ymd_and_hms(2024, 2, 17, 0, 0, 0).unwrap(),
            submitted_to: Utc.with_ymd_and_hms(2024, 2, 19, 9, 30, 0).unwrap(),
            max_results: 50,
        };
        assert_eq!(
            query.search_query(),
            "(cat:cs.AI OR cat:cs.LG) AND submittedDate:[202402170000 TO 202402190930]"
        );

        let no_cats = ArxivQuery {
            categories: vec![],
            ..query
        };
        assert!(no_cats.search_query().starts_with("submittedDate:["));
    }
}
