//! Operator reports — spam summaries and retroactive re-scans.
//!
//! These print directly to stdout; they back the `spam-report` and
//! `rescan` commands.

use chrono::{Duration, Local, TimeZone, Utc};

use crate::error::Result;
use crate::pipeline::classify::Classifier;
use crate::store::ArticleStore;

/// Print spam detected in the last `days` days, then overall stats.
pub async fn spam_report(store: &ArticleStore, days: i64) -> Result<()> {
    let cutoff = (Utc::now() - Duration::days(days)).timestamp();
    let hits = store.recent_spam(cutoff).await?;

    let day_word = if days == 1 { "Day" } else { "Days" };
    println!("\n=== SPAM DETECTED (Last {days} {day_word}) ===\n");

    if hits.is_empty() {
        println!(
            "✅ No spam detected in the last {days} {}",
            day_word.to_lowercase()
        );
        return Ok(());
    }

    for article in &hits {
        let fetched = Local
            .timestamp_opt(article.fetched_at, 0)
            .single()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| article.fetched_at.to_string());
        println!("{fetched} - {}", clip(&article.title, 70));

        let author = article
            .author_alias
            .as_deref()
            .or(article.author_name.as_deref())
            .unwrap_or("Unknown");
        println!("  Author: {author}");
        println!();
    }

    let article_word = if hits.len() == 1 { "article" } else { "articles" };
    println!("---");
    println!(
        "Total: {} spam {article_word} in last {days} {}",
        hits.len(),
        day_word.to_lowercase()
    );

    let stats = store.stats().await?;
    println!("\n📊 Overall Stats:");
    println!("  Total spam blocked: {}", stats.spam);
    println!("  Clean articles pending: {}", stats.pending);
    Ok(())
}

/// Re-run classification over stored clean unposted articles and flag
/// any that now match the current rules. Posted articles are never
/// revisited. Returns how many were flagged.
pub async fn rescan(store: &ArticleStore, classifier: &Classifier) -> Result<usize> {
    let articles = store.clean_unposted().await?;
    let mut flagged = 0;

    for article in articles {
        let verdict = classifier.classify(&article)?;
        if verdict.is_spam && store.mark_spam(&article.content_id).await? {
            flagged += 1;
            println!(
                "🚫 Marked as spam: {}... (rules: {})",
                clip(&article.title, 60),
                verdict.matched_rules.join(", ")
            );
        }
    }

    println!("\n✅ Marked {flagged} articles as spam");
    let stats = store.stats().await?;
    println!(
        "📊 Stats: {} spam articles, {} pending clean articles",
        stats.spam, stats.pending
    );
    Ok(flagged)
}

fn clip(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
