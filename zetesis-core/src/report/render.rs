//! Console and Markdown rendering of a report

use super::ResearchReport;

const RULE: &str = "════════════════════════════════════════════════════════════════";
const PREVIEW_CHARS: usize = 100;
const NO_INSIGHT: &str = "No insight available";

/// Render `report` as a fixed-layout text block
pub fn render(report: &ResearchReport) -> String {
    let score = &report.score;
    let mut lines = vec![
        "╔══════════════════════════════════════════════════════════════╗".to_string(),
        "║                    AI RESEARCH REPORT                        ║".to_string(),
        "╚══════════════════════════════════════════════════════════════╝".to_string(),
        String::new(),
        format!("Date:  {}", report.created_at.format("%Y-%m-%d %H:%M:%S UTC")),
        format!("Topic: {}", report.topic),
        String::new(),
        RULE.to_string(),
        String::new(),
        format!("SEARCH RESULTS ({} sources):", report.snippets.len()),
    ];

    for (index, snippet) in report.snippets.iter().enumerate() {
        lines.push(format!("{}. {}", index + 1, snippet.title));
        lines.push(format!("   {}", preview(&snippet.body)));
        if let Some(url) = &snippet.source_url {
            lines.push(format!("   {}", url));
        }
    }

    lines.extend([
        String::new(),
        RULE.to_string(),
        String::new(),
        "ANALYSIS:".to_string(),
        format!(
            "• Sentiment: {} (positive: {}, negative: {})",
            score.label.to_string().to_uppercase(),
            score.positive_count,
            score.negative_count
        ),
        format!("• Confidence: {:.1}%", score.confidence() * 100.0),
        format!("• Word count: {}", report.stats.word_count),
        format!("• Sentences: {}", report.stats.sentence_count),
        String::new(),
        RULE.to_string(),
        String::new(),
        "AI INSIGHTS:".to_string(),
        report.insight.as_deref().unwrap_or(NO_INSIGHT).to_string(),
        String::new(),
        RULE.to_string(),
        String::new(),
        sources_line(report),
    ]);

    lines.join("\n") + "\n"
}

/// Render `report` as a Markdown document
pub fn render_markdown(report: &ResearchReport) -> String {
    let score = &report.score;
    let mut lines = vec![
        format!("# Research report: {}", report.topic),
        String::new(),
        format!("**Date:** {}", report.created_at.format("%Y-%m-%d %H:%M UTC")),
        String::new(),
        "## Sources".to_string(),
        String::new(),
    ];

    for (index, snippet) in report.snippets.iter().enumerate() {
        let title = match &snippet.source_url {
            Some(url) => format!("[{}]({})", snippet.title, url),
            None => snippet.title.clone(),
        };
        lines.push(format!("{}. {}", index + 1, title));
        if !snippet.body.is_empty() {
            lines.push(format!("   > {}", preview(&snippet.body)));
        }
    }

    lines.extend([
        String::new(),
        "## Analysis".to_string(),
        String::new(),
        format!("- **Sentiment:** {}", score.label),
        format!("- **Positive markers:** {}", score.positive_count),
        format!("- **Negative markers:** {}", score.negative_count),
        format!("- **Confidence:** {:.1}%", score.confidence() * 100.0),
        format!("- **Words:** {}", report.stats.word_count),
        format!("- **Sentences:** {}", report.stats.sentence_count),
        String::new(),
        "## Insight".to_string(),
        String::new(),
        report.insight.as_deref().unwrap_or(NO_INSIGHT).to_string(),
        String::new(),
        "---".to_string(),
        format!("*{}*", sources_line(report)),
    ]);

    lines.join("\n") + "\n"
}

fn sources_line(report: &ResearchReport) -> String {
    let provenance = &report.provenance;
    let provider = if provenance.search_provider.is_empty() {
        "unknown"
    } else {
        provenance.search_provider.as_str()
    };

    let mut line = format!(
        "Sources: search {} ({}), insight {}",
        provenance.search, provider, provenance.insight
    );
    if let Some(model) = &provenance.model {
        line.push_str(&format!(" ({})", model));
    }
    line
}

fn preview(body: &str) -> String {
    match body.char_indices().nth(PREVIEW_CHARS) {
        Some((byte_index, _)) => format!("{}...", &body[..byte_index]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::sample_report;

    #[test]
    fn test_render_layout() {
        let text = render(&sample_report());

        assert!(text.contains("AI RESEARCH REPORT"));
        assert!(text.contains("Date:  2025-03-14 09:26:53 UTC"));
        assert!(text.contains("Topic: AI in education"));
        assert!(text.contains("SEARCH RESULTS (2 sources):"));
        assert!(text.contains("1. AI в освіті: персоналізація навчання"));
        assert!(text.contains("• Sentiment: POSITIVE (positive: 1, negative: 0)"));
        assert!(text.contains("• Confidence: 100.0%"));
        assert!(text.contains("Освіта змінюється."));
        assert!(text.ends_with("Sources: search fallback (static), insight fallback\n"));
    }

    #[test]
    fn test_render_without_insight() {
        let mut report = sample_report();
        report.insight = None;
        assert!(render(&report).contains("No insight available"));
        assert!(render_markdown(&report).contains("No insight available"));
    }

    #[test]
    fn test_render_markdown() {
        let text = render_markdown(&sample_report());

        assert!(text.starts_with("# Research report: AI in education\n"));
        assert!(text.contains("**Date:** 2025-03-14 09:26 UTC"));
        assert!(text.contains(
            "1. [AI в освіті: персоналізація навчання](https://example.com/ai-education)"
        ));
        assert!(text.contains("   > Адаптивні системи"));
        assert!(text.contains("- **Sentiment:** positive"));
        assert!(text.contains("- **Positive markers:** 1"));
        assert!(text.contains("## Insight\n\nОсвіта змінюється.\n"));
        assert!(text.ends_with("*Sources: search fallback (static), insight fallback*\n"));
    }

    #[test]
    fn test_model_is_listed_in_sources() {
        let mut report = sample_report();
        report.provenance.model = Some("gpt-4".to_string());
        assert!(render(&report).contains("insight fallback (gpt-4)"));
    }

    #[test]
    fn test_preview_cuts_long_bodies() {
        let body = "я".repeat(150);
        let cut = preview(&body);
        assert_eq!(cut.chars().count(), PREVIEW_CHARS + 3);
        assert!(cut.ends_with("..."));
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn test_render_is_pure() {
        let report = sample_report();
        assert_eq!(render(&report), render(&report));
    }
}
