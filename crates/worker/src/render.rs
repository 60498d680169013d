use sentcorr_core::domain::ScoredArticle;
use sentcorr_core::pipeline::Report;
use std::collections::HashMap;
use std::io::{self, Write};

const TITLE_WIDTH: usize = 40;
const BAR_WIDTH: f64 = 20.0;
const PLACEHOLDER: &str = "...";

pub fn render_text(report: &Report, out: &mut impl Write) -> io::Result<()> {
    write_metrics(report, out)?;
    write_top_articles(report, out)?;
    write_daily_table(report, out)?;
    write_article_list(&report.articles, out)
}

fn write_metrics(report: &Report, out: &mut impl Write) -> io::Result<()> {
    let m = &report.metrics;
    let req = &report.request;

    writeln!(out, "=== Metrics ===")?;
    writeln!(out, "Ticker: {}  Query: {}", req.ticker, req.query)?;
    writeln!(
        out,
        "Time Period Examined: {} ({} to {})",
        req.period, req.window.start, req.window.end
    )?;
    writeln!(out, "Number of Articles Analyzed: {}", m.articles_scored)?;
    if m.skipped_malformed > 0 {
        writeln!(
            out,
            "Articles Skipped (unparseable date): {} of {}",
            m.skipped_malformed, m.articles_received
        )?;
    }
    match m.average_sentiment {
        Some(avg) => writeln!(out, "Average Sentiment (Compound): {avg:.2}")?,
        None => writeln!(out, "Average Sentiment (Compound): n/a")?,
    }
    writeln!(
        out,
        "Sentiment Guide: -1 = Very Negative, 0 = Neutral, 1 = Very Positive"
    )?;
    match m.correlation {
        Some(corr) => writeln!(
            out,
            "Correlation (daily sentiment vs close, {} days): {corr:.2}",
            m.overlap_days
        )?,
        None => writeln!(
            out,
            "Correlation: n/a (not enough overlapping data between news and stock prices)"
        )?,
    }
    writeln!(out)
}

fn write_top_articles(report: &Report, out: &mut impl Write) -> io::Result<()> {
    writeln!(
        out,
        "=== Sentiment of Top {} News Articles ===",
        report.top_articles.len()
    )?;
    for article in &report.top_articles {
        writeln!(
            out,
            "{:<width$}  {:>+6.2}  {}",
            shorten(&article.title, TITLE_WIDTH),
            article.sentiment,
            bar(article.sentiment),
            width = TITLE_WIDTH
        )?;
    }
    writeln!(
        out,
        "Note: each row is one article's compound sentiment score; '+' bars are positive, '-' bars negative."
    )?;
    writeln!(out)
}

fn write_daily_table(report: &Report, out: &mut impl Write) -> io::Result<()> {
    let counts: HashMap<_, _> = report
        .daily_sentiment
        .iter()
        .map(|d| (d.date, d.article_count))
        .collect();

    writeln!(out, "=== Daily Average Sentiment vs Stock Price ===")?;
    writeln!(out, "{:<10}  {:>9}  {:>8}  {:>10}", "Date", "Sentiment", "Articles", "Close")?;
    for point in &report.aligned {
        let sentiment = point
            .sentiment
            .map(|s| format!("{s:+.2}"))
            .unwrap_or_else(|| "-".to_string());
        let count = counts
            .get(&point.date)
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        let close = point
            .price
            .map(|p| format!("{p:.2}"))
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            out,
            "{:<10}  {:>9}  {:>8}  {:>10}",
            point.date.format("%Y/%m/%d"),
            sentiment,
            count,
            close
        )?;
    }
    writeln!(out)
}

fn write_article_list(articles: &[ScoredArticle], out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Articles List:")?;
    for (idx, article) in articles.iter().enumerate() {
        let title = if article.title.is_empty() {
            "No Title Provided"
        } else {
            article.title.as_str()
        };
        writeln!(
            out,
            "{}. {} - Source: {} - Date: {}",
            idx + 1,
            title,
            article.source,
            article.listing_date()
        )?;
    }
    Ok(())
}

fn bar(sentiment: f64) -> String {
    let len = (sentiment.abs() * BAR_WIDTH).round() as usize;
    let glyph = if sentiment >= 0.0 { "+" } else { "-" };
    glyph.repeat(len)
}

/// Collapses whitespace and, if still wider than `width`, drops trailing
/// words until the text plus `...` fits.
pub fn shorten(text: &str, width: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    let collapsed = words.join(" ");
    if collapsed.chars().count() <= width {
        return collapsed;
    }

    let budget = width.saturating_sub(PLACEHOLDER.len());
    let mut kept = String::new();
    for word in words {
        let extra = if kept.is_empty() { 0 } else { 1 };
        if kept.chars().count() + extra + word.chars().count() > budget {
            break;
        }
        if extra == 1 {
            kept.push(' ');
        }
        kept.push_str(word);
    }
    kept.push_str(PLACEHOLDER);
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use sentcorr_core::domain::{AlignedPoint, DailySentiment};
    use sentcorr_core::pipeline::{Metrics, ReportRequest};
    use sentcorr_core::time::DateWindow;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn report() -> Report {
        let article = ScoredArticle {
            title: "Apple beats estimates".to_string(),
            description: None,
            source: "Reuters".to_string(),
            published_at: Utc.with_ymd_and_hms(2024, 1, 2, 14, 0, 0).unwrap(),
            published_date: d(2),
            sentiment: 0.5,
        };
        Report {
            request: ReportRequest {
                ticker: "AAPL".to_string(),
                query: "finance".to_string(),
                period: "10d".to_string(),
                window: DateWindow { start: d(1), end: d(10) },
            },
            metrics: Metrics {
                articles_received: 2,
                articles_scored: 1,
                skipped_malformed: 1,
                average_sentiment: Some(0.5),
                overlap_days: 1,
                correlation: None,
            },
            top_articles: vec![article.clone()],
            articles: vec![article],
            daily_sentiment: vec![DailySentiment {
                date: d(2),
                mean_sentiment: 0.5,
                article_count: 1,
            }],
            aligned: vec![
                AlignedPoint { date: d(2), sentiment: Some(0.5), price: Some(185.0) },
                AlignedPoint { date: d(3), sentiment: None, price: Some(184.25) },
            ],
        }
    }

    #[test]
    fn shorten_keeps_short_titles() {
        assert_eq!(shorten("Hello   world", 40), "Hello world");
    }

    #[test]
    fn shorten_drops_whole_words() {
        assert_eq!(shorten("Hello world!", 11), "Hello...");
        let long = "Apple shares climb after record quarterly iPhone sales in China";
        let short = shorten(long, 40);
        assert!(short.chars().count() <= 40);
        assert!(short.ends_with("..."));
        assert!(long.starts_with(short.trim_end_matches("...")));
    }

    #[test]
    fn bar_length_tracks_magnitude() {
        assert_eq!(bar(0.5), "++++++++++");
        assert_eq!(bar(-0.25), "-----");
        assert_eq!(bar(0.0), "");
    }

    #[test]
    fn renders_all_sections() {
        let mut buf = Vec::new();
        render_text(&report(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("Number of Articles Analyzed: 1"));
        assert!(text.contains("Articles Skipped (unparseable date): 1 of 2"));
        assert!(text.contains("Average Sentiment (Compound): 0.50"));
        assert!(text.contains("Correlation: n/a"));
        assert!(text.contains("2024/01/03"));
        assert!(text.contains("184.25"));
        assert!(text.contains("1. Apple beats estimates - Source: Reuters - Date: 2024/01/02"));
    }
}
