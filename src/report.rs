//! Markdown briefing built from a `Summary`.

use chrono::NaiveDate;
use std::fmt::Write as _;

use crate::aggregate::Summary;
use crate::model::SentimentLabel;

fn pct(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

fn table<I>(out: &mut String, heading: &str, column: &str, rows: I, total: usize)
where
    I: IntoIterator<Item = (String, usize)>,
{
    let _ = writeln!(out, "## {heading}\n");
    let _ = writeln!(out, "| {column} | Count | Share |");
    let _ = writeln!(out, "|---|---:|---:|");
    let mut any = false;
    for (name, count) in rows {
        any = true;
        let _ = writeln!(out, "| {name} | {count} | {:.1}% |", pct(count, total));
    }
    if !any {
        let _ = writeln!(out, "| (none) | 0 | 0.0% |");
    }
    out.push('\n');
}

/// Daily statistics section. Keyword shares are relative to `total`, so they
/// can sum past 100% when items match several keywords.
pub fn render_markdown(summary: &Summary, date: NaiveDate) -> String {
    let mut out = String::new();
    let total = summary.total;

    let _ = writeln!(out, "# Opinion briefing {}\n", date.format("%Y-%m-%d"));
    let _ = writeln!(out, "- Items: {total}");
    let _ = writeln!(out, "- Mean polarity: {:+.2}", summary.mean_score);
    let _ = writeln!(
        out,
        "- Engagement: {} likes, {} comments, {} shares\n",
        summary.engagement.likes, summary.engagement.comments, summary.engagement.shares
    );

    table(
        &mut out,
        "By platform",
        "Platform",
        summary
            .by_platform
            .iter()
            .map(|(p, c)| (p.to_string(), *c)),
        total,
    );
    table(
        &mut out,
        "By keyword",
        "Keyword",
        summary.by_keyword.iter().map(|(k, c)| (k.clone(), *c)),
        total,
    );
    table(
        &mut out,
        "By sentiment",
        "Sentiment",
        SentimentLabel::ALL
            .iter()
            .map(|l| (l.to_string(), summary.sentiment_count(*l))),
        total,
    );

    out
}
