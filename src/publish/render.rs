//! Post text rendering.
//!
//! Posts are `title\n\nurl` with an optional hashtag suffix, held under
//! the 280-character platform limit. The URL counts as 23 characters
//! regardless of its real length because the platform shortens links.

use crate::store::Article;

/// Platform character limit per post.
pub const POST_CHAR_LIMIT: usize = 280;

/// Characters a link occupies after platform shortening.
pub const LINK_RESERVE: usize = 23;

/// Tags rendered as hashtags, at most.
const MAX_HASHTAGS: usize = 3;

const ELLIPSIS: &str = "...";

/// A post ready for delivery.
#[derive(Debug, Clone)]
pub struct RenderedPost {
    pub content_id: String,
    pub text: String,
}

/// Render an article into post text.
///
/// Budget arithmetic: 280 total, minus 23 for the shortened link, minus
/// 2 for the blank line, minus the hashtag suffix and its separator
/// space when tags are present. Whatever remains is the title allowance.
pub fn render(article: &Article) -> RenderedPost {
    let hashtags = hashtag_suffix(article.tags.as_deref());

    let mut title_budget = POST_CHAR_LIMIT - LINK_RESERVE - 2;
    if !hashtags.is_empty() {
        title_budget = title_budget.saturating_sub(hashtags.chars().count() + 1);
    }

    let title = truncate(&article.title, title_budget);

    let mut text = format!("{title}\n\n{}", article.url);
    if !hashtags.is_empty() {
        text.push(' ');
        text.push_str(&hashtags);
    }

    RenderedPost {
        content_id: article.content_id.clone(),
        text,
    }
}

/// Build the hashtag suffix from a comma-joined tag list.
///
/// The first three non-empty tags are used; hyphens and spaces inside a
/// tag are stripped so each hashtag stays one token.
fn hashtag_suffix(tags: Option<&str>) -> String {
    let Some(tags) = tags else {
        return String::new();
    };
    tags.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .take(MAX_HASHTAGS)
        .map(|t| format!("#{}", t.replace(['-', ' '], "")))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Truncate to a character budget, appending an ellipsis when shortened.
/// Operates on chars, never splitting a multi-byte character.
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut out: String = s.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // Exactly 23 characters, so rendered length equals budgeted length.
    const SHORT_URL: &str = "https://t.co/0123456789";

    fn article(title: &str, tags: Option<&str>) -> Article {
        Article {
            content_id: "/content/x".to_string(),
            title: title.to_string(),
            author_name: None,
            author_alias: None,
            description: None,
            url: SHORT_URL.to_string(),
            tags: tags.map(str::to_string),
            created_at: None,
            published_at: None,
            fetched_at: 0,
            is_spam: false,
            posted: false,
        }
    }

    #[test]
    fn short_title_renders_unmodified() {
        let post = render(&article("A short title", None));
        assert_eq!(post.text, format!("A short title\n\n{SHORT_URL}"));
    }

    #[test]
    fn long_title_is_truncated_within_the_limit() {
        let long_title = "x".repeat(400);
        let post = render(&article(&long_title, None));

        assert!(post.text.chars().count() <= POST_CHAR_LIMIT);
        // Title allowance with no tags is 280 - 23 - 2 = 255.
        let title_part = post.text.split("\n\n").next().unwrap();
        assert_eq!(title_part.chars().count(), 255);
        assert!(title_part.ends_with("..."));
    }

    #[test]
    fn hashtags_come_from_the_first_three_tags() {
        let post = render(&article(
            "Title",
            Some("rust,aws-lambda,serverless tips,extra"),
        ));
        assert_eq!(
            post.text,
            format!("Title\n\n{SHORT_URL} #rust #awslambda #serverlesstips")
        );
    }

    #[test]
    fn hashtag_suffix_shrinks_the_title_allowance() {
        let long_title = "y".repeat(400);
        let post = render(&article(&long_title, Some("rust,tokio")));

        assert!(post.text.chars().count() <= POST_CHAR_LIMIT);
        assert!(post.text.ends_with("#rust #tokio"));

        // "#rust #tokio" is 12 chars; allowance is 255 - 12 - 1 = 242.
        let title_part = post.text.split("\n\n").next().unwrap();
        assert_eq!(title_part.chars().count(), 242);
    }

    #[test]
    fn empty_and_whitespace_tags_are_dropped() {
        let post = render(&article("Title", Some(" , rust , ")));
        assert!(post.text.ends_with("#rust"));

        let post = render(&article("Title", Some(",,")));
        assert_eq!(post.text, format!("Title\n\n{SHORT_URL}"));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let title = "é".repeat(300);
        let post = render(&article(&title, None));
        let title_part = post.text.split("\n\n").next().unwrap();
        assert_eq!(title_part.chars().count(), 255);
        assert!(title_part.ends_with("..."));
    }
}
