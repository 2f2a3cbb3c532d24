//! Browsable HTML index of a collection.
//!
//! A single self-contained page: a header with generation time and counts,
//! a text box that filters cards client-side, and one card per record with
//! its PDF link (or a "PDF not available" marker) and source link.

use crate::models::EnrichedRecord;
use std::error::Error;
use std::fmt::Write;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

const STYLE: &str = r#"body {font-family: Arial, sans-serif; margin: 20px; background: #f5f5f5;}
h1 {color: #2c3e50; text-align: center;}
.stats {background: #3498db; color: white; padding: 15px; border-radius: 5px; margin: 20px 0;}
.article {background: white; border-left: 4px solid #3498db; padding: 15px; margin: 10px 0; border-radius: 5px;}
.title {font-weight: bold; font-size: 1.1em; color: #2980b9; margin-bottom: 10px;}
.source {display: inline-block; background: #27ae60; color: white; padding: 3px 8px; border-radius: 3px; font-size: 0.85em;}
.authors {color: #7f8c8d; font-size: 0.9em; margin: 5px 0;}
.pdf-link, .url-link {color: white; padding: 8px 15px; text-decoration: none; border-radius: 3px; display: inline-block; margin: 10px 5px 0 0;}
.pdf-link {background: #e74c3c;}
.url-link {background: #95a5a6;}
.no-pdf {color: #e74c3c; font-weight: bold;}
.filter input {padding: 10px; width: 300px; font-size: 1em; border: 2px solid #3498db; border-radius: 3px;}"#;

const FILTER_SCRIPT: &str = r#"function filterArticles() {
    const input = document.getElementById('searchInput').value.toLowerCase();
    for (const article of document.getElementsByClassName('article')) {
        article.style.display = article.textContent.toLowerCase().includes(input) ? '' : 'none';
    }
}"#;

/// Escape text for use in HTML content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Up to three authors, then "et al.".
fn author_line(authors: &[String]) -> String {
    if authors.is_empty() {
        return "N/A".to_string();
    }
    let mut line = authors.iter().take(3).cloned().collect::<Vec<_>>().join(", ");
    if authors.len() > 3 {
        line.push_str(" et al.");
    }
    line
}

/// Render the index page.
pub fn render_index(records: &[EnrichedRecord], generated_at: &str) -> Result<String, std::fmt::Error> {
    let pdf_count = records.iter().filter(|r| r.pdf_path.is_some()).count();
    let mut html = String::new();

    writeln!(html, "<!DOCTYPE html>")?;
    writeln!(html, "<html><head><meta charset=\"utf-8\">")?;
    writeln!(html, "<title>Finance AI articles - {}</title>", escape_html(generated_at))?;
    writeln!(html, "<style>\n{STYLE}\n</style>")?;
    writeln!(html, "<script>\n{FILTER_SCRIPT}\n</script>")?;
    writeln!(html, "</head><body>")?;
    writeln!(html, "<h1>Finance &amp; AI articles</h1>")?;
    writeln!(html, "<div class=\"stats\">")?;
    writeln!(html, "<p><strong>Generated:</strong> {}</p>", escape_html(generated_at))?;
    writeln!(html, "<p><strong>Total articles:</strong> {}</p>", records.len())?;
    writeln!(html, "<p><strong>PDFs downloaded:</strong> {pdf_count}</p>")?;
    writeln!(html, "</div>")?;
    writeln!(
        html,
        "<div class=\"filter\"><input type=\"text\" id=\"searchInput\" onkeyup=\"filterArticles()\" placeholder=\"Filter by keyword...\"></div>"
    )?;
    writeln!(html, "<hr>")?;

    for (i, record) in records.iter().enumerate() {
        let candidate = &record.candidate;
        writeln!(html, "<div class=\"article\">")?;
        writeln!(html, "<div class=\"title\">{}. {}</div>", i + 1, escape_html(&candidate.title))?;
        writeln!(html, "<span class=\"source\">{}</span>", escape_html(candidate.source.display_name()))?;
        writeln!(html, "<div class=\"authors\">Authors: {}</div>", escape_html(&author_line(&candidate.authors)))?;
        let published = candidate
            .published
            .map(|date| date.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        writeln!(html, "<div>Date: {published}</div>")?;

        match &record.pdf_path {
            Some(path) => writeln!(
                html,
                "<a href=\"{}\" class=\"pdf-link\" target=\"_blank\">Open PDF</a>",
                escape_html(path)
            )?,
            None => writeln!(html, "<span class=\"no-pdf\">PDF not available</span>")?,
        }
        if !candidate.source_url.is_empty() {
            writeln!(
                html,
                "<a href=\"{}\" class=\"url-link\" target=\"_blank\">Source</a>",
                escape_html(&candidate.source_url)
            )?;
        }
        writeln!(html, "</div>")?;
    }

    writeln!(html, "</body></html>")?;
    Ok(html)
}

#[instrument(level = "info", skip_all, fields(path = %path.display(), count = records.len()))]
pub async fn write_index(
    records: &[EnrichedRecord],
    path: &Path,
    generated_at: &str,
) -> Result<(), Box<dyn Error>> {
    let html = render_index(records, generated_at)?;
    fs::write(path, html).await?;
    info!("Wrote HTML index");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CandidateRecord, Source};

    fn record(title: &str, authors: &[&str]) -> EnrichedRecord {
        let mut candidate = CandidateRecord::new(Source::BankingFinance, title).unwrap();
        candidate.authors = authors.iter().map(|a| a.to_string()).collect();
        candidate.source_url = "https://www.sciencedirect.com/science/article/pii/S1".to_string();
        candidate.into()
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>R&D</b> \"x\""), "&lt;b&gt;R&amp;D&lt;/b&gt; &quot;x&quot;");
    }

    #[test]
    fn test_author_line() {
        assert_eq!(author_line(&[]), "N/A");
        let four: Vec<String> = ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect();
        assert_eq!(author_line(&four), "A, B, C et al.");
        assert_eq!(author_line(&four[..2]), "A, B");
    }

    #[test]
    fn test_render_index_cards() {
        let mut with_pdf = record("Bank runs & <AI>", &["A", "B", "C", "D"]);
        with_pdf.pdf_path = Some("pdfs_articles/banking_finance/x.pdf".to_string());
        let without_pdf = record("Credit spreads and machine learning", &[]);

        let html = render_index(&[with_pdf, without_pdf], "2025-05-06 14:30:00").unwrap();
        assert!(html.contains("<p><strong>Total articles:</strong> 2</p>"));
        assert!(html.contains("<p><strong>PDFs downloaded:</strong> 1</p>"));
        assert!(html.contains("1. Bank runs &amp; &lt;AI&gt;"));
        assert!(html.contains("Authors: A, B, C et al."));
        assert!(html.contains("J Banking Finance"));
        assert!(html.contains("href=\"pdfs_articles/banking_finance/x.pdf\""));
        assert!(html.contains("2. Credit spreads and machine learning"));
        assert!(html.contains("Date: N/A"));
        assert_eq!(html.matches("PDF not available").count(), 1);
        assert_eq!(html.matches("class=\"article\"").count(), 2);
    }
}
