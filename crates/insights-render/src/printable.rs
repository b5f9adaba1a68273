//! Print-friendly output: HTML for PDF conversion and plain text
//!
//! Print pipelines rarely carry a color emoji font, so report symbols are
//! replaced with bracketed tags before anything is written.

use crate::layout::{layout_monthly_report, Block, RenderContext, ReportLayout};
use insights_core::MonthlySummary;
use std::fmt::Write;

const VARIATION_SELECTOR: char = '\u{FE0F}';

const PRINT_STYLE: &str = "body { font-family: Helvetica, Arial, sans-serif; font-size: 10pt; \
    margin: 1in; } h1 { text-align: center; font-size: 16pt; } h2 { font-size: 12pt; } \
    table { border-collapse: collapse; } td, th { border: 1px solid #999; padding: 4px 8px; } \
    .footer { text-align: center; font-style: italic; font-size: 8pt; }";

const SYMBOL_TAGS: &[(char, &str)] = &[
    ('🧒', "[Child]"),
    ('📅', "[Date]"),
    ('🌱', "[Curiosity Seed]"),
    ('📊', "[Growth Metrics]"),
    ('🧠', "[Intellectual]"),
    ('😊', "[Emotional]"),
    ('🤝', "[Social]"),
    ('🎨', "[Creative]"),
    ('🏃', "[Physical]"),
    ('🧭', "[Character/Values]"),
    ('🚀', "[Planning/Independence]"),
    ('🌈', "[Curiosity Response]"),
    ('🗣', "[Communication Skills]"),
    ('📣', "[Note for Parent]"),
    ('🟢', "[Excellent]"),
    ('✅', "[Good]"),
    ('⚠', "[Fair]"),
    ('📈', "[Needs Work]"),
    ('🔵', "[Balanced Growth]"),
    ('🟡', "[Moderate Growth]"),
    ('🔴', "[Limited Growth]"),
    ('💚', "[Good Score]"),
    ('📋', "[Report]"),
];

/// Lines starting with these tags are section headings in a daily narrative
const HEADING_TAGS: &[&str] = &[
    "[Child]",
    "[Date]",
    "[Curiosity Seed]",
    "[Growth Metrics]",
    "[Curiosity Response]",
    "[Communication Skills]",
    "[Note for Parent]",
];

/// Replace report symbols with text tags and drop any other astral-plane symbol
pub fn flatten_symbols(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c == VARIATION_SELECTOR {
            continue;
        }
        match SYMBOL_TAGS.iter().find(|(symbol, _)| *symbol == c) {
            Some((_, tag)) => out.push_str(tag),
            None if u32::from(c) > 0xFFFF => {}
            None => out.push(c),
        }
    }
    out
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn clean(text: &str) -> String {
    escape_html(&flatten_symbols(text))
}

/// Paragraph text from a narrative; template heading lines are emphasized
fn write_narrative_lines(html: &mut String, text: &str) {
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let flat = flatten_symbols(line);
        let escaped = escape_html(flat.trim_start());
        let emphasized = HEADING_TAGS.iter().any(|tag| flat.starts_with(tag))
            || flat.contains("Overall Growth Score");
        if emphasized {
            let _ = writeln!(html, "<p class=\"section\"><strong>{escaped}</strong></p>");
        } else {
            let _ = writeln!(html, "<p>{escaped}</p>");
        }
    }
}

fn html_from_layout(layout: &ReportLayout) -> String {
    let mut html = String::new();
    let _ = writeln!(html, "<!DOCTYPE html>");
    let _ = writeln!(html, "<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">");
    let _ = writeln!(html, "<title>{}</title>", clean(&layout.title));
    let _ = writeln!(html, "<style>{PRINT_STYLE}</style>");
    let _ = writeln!(html, "</head>\n<body>");

    for block in &layout.blocks {
        match block {
            Block::Heading { level, text } => {
                let level = (*level).clamp(1, 6);
                let _ = writeln!(html, "<h{level}>{}</h{level}>", clean(text));
            }
            Block::Paragraph { text } => write_narrative_lines(&mut html, text),
            Block::Bullets { items } => {
                let _ = writeln!(html, "<ul>");
                for item in items {
                    let _ = writeln!(html, "<li>{}</li>", clean(item));
                }
                let _ = writeln!(html, "</ul>");
            }
            Block::Table { headers, rows } => {
                let _ = writeln!(html, "<table>");
                let cells: String = headers
                    .iter()
                    .map(|h| format!("<th>{}</th>", clean(h)))
                    .collect();
                let _ = writeln!(html, "<tr>{cells}</tr>");
                for row in rows {
                    let cells: String = row
                        .iter()
                        .map(|c| format!("<td>{}</td>", clean(c)))
                        .collect();
                    let _ = writeln!(html, "<tr>{cells}</tr>");
                }
                let _ = writeln!(html, "</table>");
            }
            Block::Footer { text } => {
                let _ = writeln!(html, "<p class=\"footer\">{}</p>", clean(text));
            }
        }
    }

    let _ = writeln!(html, "</body>\n</html>");
    html
}

/// Monthly report as standalone HTML ready for PDF conversion
pub fn render_printable_narrative(summary: &MonthlySummary, context: &RenderContext) -> String {
    let layout = layout_monthly_report(summary, context);
    let html = html_from_layout(&layout);
    tracing::debug!(bytes = html.len(), "rendered printable narrative");
    html
}

/// Monthly report as plain text with flattened symbols
pub fn render_plain_text(summary: &MonthlySummary, context: &RenderContext) -> String {
    let layout = layout_monthly_report(summary, context);
    let mut out = String::new();

    for block in &layout.blocks {
        match block {
            Block::Heading { level, text } => {
                let text = flatten_symbols(text);
                let rule = if *level <= 1 { '=' } else { '-' };
                let underline = rule.to_string().repeat(text.chars().count());
                let _ = writeln!(out, "\n{text}\n{underline}");
            }
            Block::Paragraph { text } => {
                let _ = writeln!(out, "{}", flatten_symbols(text.trim()));
            }
            Block::Bullets { items } => {
                for item in items {
                    let _ = writeln!(out, "  - {}", flatten_symbols(item));
                }
            }
            Block::Table { headers, rows } => {
                let _ = writeln!(out, "{}", headers.join(" | "));
                for row in rows {
                    let _ = writeln!(out, "{}", flatten_symbols(&row.join(" | ")));
                }
            }
            Block::Footer { text } => {
                let _ = writeln!(out, "\n{text}");
            }
        }
    }
    out.trim_start().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::tests::{context, empty_summary, rich_summary};

    #[test]
    fn test_flatten_known_symbols() {
        assert_eq!(flatten_symbols("📊 Growth Metrics"), "[Growth Metrics] Growth Metrics");
        assert_eq!(flatten_symbols("🗣️ Communication"), "[Communication Skills] Communication");
        assert_eq!(flatten_symbols("⚠️ Fair"), "[Fair] Fair");
    }

    #[test]
    fn test_flatten_drops_unknown_astral_symbols() {
        assert_eq!(flatten_symbols("Great day 🦄!"), "Great day !");
        assert_eq!(flatten_symbols("café – naïve"), "café – naïve");
    }

    #[test]
    fn test_printable_html_is_escaped_and_flat() {
        let mut summary = rich_summary();
        summary.narrative_text = "🧒 Child's Name: Ava\nBuilt <towers> & bridges 🦄".to_string();
        let html = render_printable_narrative(&summary, &context());

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<strong>[Child] Child&#39;s Name: Ava</strong>"));
        assert!(html.contains("Built &lt;towers&gt; &amp; bridges"));
        assert!(!html.chars().any(|c| u32::from(c) > 0xFFFF));
        assert!(html.contains("<h2>Communication Skills</h2>"));
    }

    #[test]
    fn test_printable_omits_empty_sections() {
        let html = render_printable_narrative(&empty_summary(), &context());
        assert!(!html.contains("<table>"));
        assert!(!html.contains("<h2>Strengths</h2>"));
        assert!(html.contains("Report generated on:"));
    }

    #[test]
    fn test_plain_text_layout() {
        let text = render_plain_text(&rich_summary(), &context());
        assert!(text.starts_with("Monthly Learning Report\n======================="));
        assert!(text.contains("  - curiosity (2)"));
        assert!(text.contains("Confidence Level | Strong"));
    }
}
