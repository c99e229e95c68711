//! Digest rendering: compact chat text and the full Markdown report.

use std::fmt::Write;

use chrono::NaiveDate;

use crate::types::paper::Paper;
use crate::types::report::RunReport;
use crate::types::scored::CuratedPaper;

/// Papers listed in the chat message; the rest are only in the report file.
pub const MESSAGE_MAX_PAPERS: usize = 10;

const TITLE_MAX_CHARS: usize = 80;
const MESSAGE_AUTHORS: usize = 3;
const REPORT_AUTHORS: usize = 5;

/// Compact digest for a chat channel.
pub fn render_message(report: &RunReport, date: NaiveDate) -> String {
    let mut out = format!("📚 arXiv digest {}\n", date.format("%Y-%m-%d"));

    if report.is_empty() {
        out.push_str("\nNo new papers today.");
        if report.summary.fetched > 0 {
            let _ = write!(
                out,
                " ({} fetched, all seen in earlier runs)",
                report.summary.fetched
            );
        }
        return out;
    }

    let _ = writeln!(out, "{} papers selected\n", report.papers.len());

    for (i, curated) in report.papers.iter().take(MESSAGE_MAX_PAPERS).enumerate() {
        let paper = curated.paper();
        let _ = writeln!(out, "{}. {}", i + 1, truncate(&paper.title, TITLE_MAX_CHARS));

        let mut meta = Vec::new();
        if curated.total() > 0.0 {
            meta.push(format!("⭐ {:.0}", curated.total()));
        }
        if let Some(citations) = paper.citation_count.filter(|c| *c > 0) {
            meta.push(format!("📈 {} citations", citations));
        }
        meta.push(publication_tag(paper));
        let _ = writeln!(out, "{}", meta.join(" | "));

        if !paper.authors.is_empty() {
            let _ = writeln!(out, "👥 {}", author_list(&paper.authors, MESSAGE_AUTHORS));
        }
        let _ = writeln!(out, "🔗 {}", paper.abs_url());
        for bullet in curated.summary.bullets() {
            let _ = writeln!(out, "  • {}", bullet);
        }
        out.push('\n');
    }

    if report.papers.len() > MESSAGE_MAX_PAPERS {
        let _ = writeln!(
            out,
            "... {} more, see attached report",
            report.papers.len() - MESSAGE_MAX_PAPERS
        );
    }

    out.trim_end().to_string()
}

/// Full Markdown report, one section per selected paper plus run counters.
pub fn render_markdown(report: &RunReport, date: NaiveDate) -> String {
    let mut out = format!("# arXiv digest {}\n\n", date.format("%Y-%m-%d"));

    if report.is_empty() {
        out.push_str("No new papers today.\n");
    } else {
        let _ = writeln!(out, "{} papers selected.\n", report.papers.len());
        for (i, curated) in report.papers.iter().enumerate() {
            write_paper_section(&mut out, i + 1, curated);
        }
    }

    let summary = &report.summary;
    out.push_str("## Run summary\n\n");
    let _ = writeln!(out, "- Fetched: {}", summary.fetched);
    let _ = writeln!(out, "- New: {}", summary.new);
    let _ = writeln!(out, "- Seen in earlier runs: {}", summary.skipped_seen);
    if summary.prefiltered_out > 0 {
        let _ = writeln!(out, "- Dropped before enrichment: {}", summary.prefiltered_out);
    }
    if summary.relevance_fallback {
        out.push_str("- Relevance filter unavailable, used keyword prefilter\n");
    }
    let _ = writeln!(out, "- Enrichment failures: {}", summary.enrichment_failures.len());
    let _ = writeln!(out, "- Structuring fallbacks: {}", summary.structuring_fallbacks);
    let _ = writeln!(out, "- Compression fallbacks: {}", summary.compression_fallbacks);

    out
}

/// Caption for the attached report file.
pub fn report_caption(report: &RunReport, date: NaiveDate) -> String {
    format!(
        "arXiv digest {} ({} papers)",
        date.format("%Y-%m-%d"),
        report.papers.len()
    )
}

fn write_paper_section(out: &mut String, rank: usize, curated: &CuratedPaper) {
    let paper = curated.paper();
    let _ = writeln!(out, "## {}. {}\n", rank, paper.title);
    let _ = writeln!(out, "**Score**: {:.1}/100", curated.total());
    let _ = writeln!(out, "**arXiv ID**: {}", paper.id);
    if !paper.authors.is_empty() {
        let _ = writeln!(out, "**Authors**: {}", author_list(&paper.authors, REPORT_AUTHORS));
    }
    if !paper.institutions.is_empty() {
        let _ = writeln!(out, "**Institutions**: {}", paper.institutions.join("; "));
    }
    if !paper.categories.is_empty() {
        let _ = writeln!(out, "**Categories**: {}", paper.categories.join(", "));
    }
    if let Some(citations) = paper.citation_count {
        let _ = writeln!(
            out,
            "**Citations**: {} (influential: {})",
            citations,
            paper.influential_citation_count.unwrap_or(0)
        );
    }

    let mut status = publication_tag(paper);
    if let Some(doi) = paper.doi.as_deref().filter(|_| paper.is_published()) {
        let _ = write!(status, " (DOI: {})", doi);
    }
    let _ = writeln!(out, "**Publication**: {}", status);
    let _ = writeln!(out, "**Link**: {}\n", paper.abs_url());

    out.push_str("**Summary**:\n");
    for bullet in curated.summary.bullets() {
        let _ = writeln!(out, "- {}", bullet);
    }
    out.push_str("\n---\n\n");
}

fn publication_tag(paper: &Paper) -> String {
    if paper.is_published() {
        match paper.journal.as_deref().or(paper.venue.as_deref()) {
            Some(journal) => format!("✅ {}", journal),
            None => "✅ published".to_string(),
        }
    } else if let Some(venue) = paper.venue.as_deref().filter(|v| !v.is_empty()) {
        format!("📋 {}", venue)
    } else {
        "📝 preprint".to_string()
    }
}

fn author_list(authors: &[String], limit: usize) -> String {
    let mut list = authors
        .iter()
        .take(limit)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if authors.len() > limit {
        list.push_str("...");
    }
    list
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars - 3).collect();
    cut.push_str("...");
    cut
}
