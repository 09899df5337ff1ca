use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::str::FromStr;

use crate::error::AppError;

pub const NO_TITLE: &str = "No title found";
pub const LEAN_NO_TITLE: &str = "Article";

/// Elements whose open tag switches text accumulation on and whose close tag
/// switches it off again.
const REGION_TAGS: &[&str] = &["p", "article", "div", "section"];

static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("title").expect("Failed to parse title selector")
});

static PARAGRAPH_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("p").expect("Failed to parse paragraph selector")
});

// Comments and raw-text elements never contribute text runs.
static NOISE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<!--.*?-->|<script\b.*?</script\s*>|<style\b.*?</style\s*>|<noscript\b.*?</noscript\s*>")
        .expect("Failed to compile noise pattern")
});

// Quoted attribute values may contain `>`.
static TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<(?:(/?)([A-Za-z][A-Za-z0-9-]*)(?:[^>"']|"[^"]*"|'[^']*')*|[!?][^>]*)>"#)
        .expect("Failed to compile tag pattern")
});

// Start of a tag the document never closed.
static UNCLOSED_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<[A-Za-z/!?]").expect("Failed to compile unclosed tag pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractStrategy {
    /// Text of every `<p>` in the document, in document order.
    #[default]
    Paragraphs,
    /// Single streaming pass with one "inside a region" flag.
    TagScoped,
}

impl ExtractStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractStrategy::Paragraphs => "paragraphs",
            ExtractStrategy::TagScoped => "tag-scoped",
        }
    }

    fn placeholder_title(&self) -> &'static str {
        match self {
            ExtractStrategy::Paragraphs => NO_TITLE,
            ExtractStrategy::TagScoped => LEAN_NO_TITLE,
        }
    }
}

impl FromStr for ExtractStrategy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "paragraphs" => Ok(ExtractStrategy::Paragraphs),
            "tag-scoped" | "tag_scoped" => Ok(ExtractStrategy::TagScoped),
            other => Err(AppError::Config(format!("Unknown extract strategy: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtractOptions {
    pub strategy: ExtractStrategy,
    /// Keep at most this many characters of body text.
    pub max_chars: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedArticle {
    pub title: String,
    pub body_text: String,
}

/// Never fails: a missing title becomes the strategy's placeholder and a page
/// without extractable text yields an empty body.
pub fn extract(html: &str, options: &ExtractOptions) -> ExtractedArticle {
    let (title, body_text) = match options.strategy {
        ExtractStrategy::Paragraphs => {
            let document = Html::parse_document(html);
            (document_title(&document), collect_paragraphs(&document))
        }
        ExtractStrategy::TagScoped => (literal_title(html), accumulate_regions(html)),
    };

    let body_text = match options.max_chars {
        Some(limit) => truncate_chars(body_text, limit),
        None => body_text,
    };

    ExtractedArticle {
        title: title.unwrap_or_else(|| options.strategy.placeholder_title().to_string()),
        body_text,
    }
}

fn document_title(document: &Html) -> Option<String> {
    document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
}

fn collect_paragraphs(document: &Html) -> String {
    let paragraphs: Vec<String> = document
        .select(&PARAGRAPH_SELECTOR)
        .map(|element| squash_whitespace(&element.text().collect::<Vec<_>>().join(" ")))
        .filter(|text| !text.is_empty())
        .collect();

    paragraphs.join(" ")
}

/// First literal `<title>`..`</title>` pair, case-sensitive.
fn literal_title(html: &str) -> Option<String> {
    let start = html.find("<title>")? + "<title>".len();
    let len = html[start..].find("</title>")?;
    let title = html[start..start + len].trim();
    (!title.is_empty()).then(|| title.to_string())
}

/// The flag does not track depth: `<div><p>a</div>b</p>` drops `b` because the
/// closing `div` clears it while the `p` is still open.
fn accumulate_regions(html: &str) -> String {
    let html = NOISE.replace_all(html, " ");
    let mut inside = false;
    let mut fragments: Vec<String> = Vec::new();
    let mut cursor = 0;

    for tag in TAG.captures_iter(&html) {
        let Some(whole) = tag.get(0) else { continue };
        if inside {
            push_fragment(&mut fragments, &html[cursor..whole.start()]);
        }
        cursor = whole.end();

        let Some(name) = tag.get(2) else { continue };
        let name = name.as_str().to_ascii_lowercase();
        if REGION_TAGS.contains(&name.as_str()) {
            let closing = tag.get(1).is_some_and(|slash| !slash.as_str().is_empty());
            inside = !closing;
        }
    }
    if inside {
        let tail = &html[cursor..];
        let tail = UNCLOSED_TAG.find(tail).map_or(tail, |open| &tail[..open.start()]);
        push_fragment(&mut fragments, tail);
    }

    fragments.join(" ")
}

fn push_fragment(fragments: &mut Vec<String>, text: &str) {
    let text = squash_whitespace(text);
    if !text.is_empty() {
        fragments.push(text);
    }
}

fn squash_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(text: String, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn tag_scoped() -> ExtractOptions {
        ExtractOptions {
            strategy: ExtractStrategy::TagScoped,
            max_chars: None,
        }
    }

    #[rstest]
    #[case(ExtractStrategy::Paragraphs)]
    #[case(ExtractStrategy::TagScoped)]
    fn title_is_trimmed_text_between_tags(#[case] strategy: ExtractStrategy) {
        let html = "<html><head><title>  Hello World \n</title></head><body><p>Body.</p></body></html>";
        let article = extract(html, &ExtractOptions { strategy, max_chars: None });
        assert_eq!(article.title, "Hello World");
    }

    #[rstest]
    #[case(ExtractStrategy::Paragraphs, "No title found")]
    #[case(ExtractStrategy::TagScoped, "Article")]
    fn missing_title_uses_placeholder(#[case] strategy: ExtractStrategy, #[case] expected: &str) {
        let article = extract("<p>Only a paragraph.</p>", &ExtractOptions { strategy, max_chars: None });
        assert_eq!(article.title, expected);
    }

    #[test]
    fn literal_title_match_is_case_sensitive() {
        let article = extract("<TITLE>Shouting</TITLE><p>Text.</p>", &tag_scoped());
        assert_eq!(article.title, LEAN_NO_TITLE);
    }

    #[test]
    fn paragraphs_are_collected_in_document_order() {
        let html = "<body><div><p>First <b>bold</b> line.</p></div><span>skip me</span><p>Second.</p><p>  </p></body>";
        let article = extract(html, &ExtractOptions::default());
        assert_eq!(article.body_text, "First bold line. Second.");
    }

    #[test]
    fn tag_scoped_only_keeps_text_inside_regions() {
        let html = "<body>outside<article>Inside <em>here</em>.</article>after<p>Para.</p></body>";
        let article = extract(html, &tag_scoped());
        assert_eq!(article.body_text, "Inside here . Para.");
    }

    #[test]
    fn nested_container_close_clears_the_flag() {
        let html = "<div><p>kept</div>dropped</p>";
        let article = extract(html, &tag_scoped());
        assert_eq!(article.body_text, "kept");
    }

    #[test]
    fn scripts_styles_and_comments_are_skipped() {
        let html = "<div>a<script>var x = '<p>no</p>';</script>b<!-- hidden --><style>p{}</style>c</div>";
        let article = extract(html, &tag_scoped());
        assert_eq!(article.body_text, "a b c");
    }

    #[rstest]
    #[case(ExtractStrategy::Paragraphs)]
    #[case(ExtractStrategy::TagScoped)]
    fn body_never_contains_markup(#[case] strategy: ExtractStrategy) {
        let html = "<!DOCTYPE html><html><body><p class=\"x\">One <a href=\"/\">two</a><br/>three</p></body></html>";
        let article = extract(html, &ExtractOptions { strategy, max_chars: None });
        assert!(!article.body_text.contains('<'));
        assert!(!article.body_text.contains('>'));
        assert!(article.body_text.contains("two"));
    }

    #[test]
    fn quoted_angle_brackets_stay_inside_the_tag() {
        let html = r#"<p>Link <a title="x>y" data-q='a>b'>here</a> now.</p>"#;
        assert_eq!(extract(html, &tag_scoped()).body_text, "Link here now.");
    }

    #[test]
    fn unclosed_trailing_tag_is_dropped() {
        let html = r#"<div>Text before <p class="x"#;
        assert_eq!(extract(html, &tag_scoped()).body_text, "Text before");
    }

    #[test]
    fn body_is_truncated_to_char_budget() {
        let html = "<p>héllo wörld and more</p>";
        let options = ExtractOptions {
            strategy: ExtractStrategy::Paragraphs,
            max_chars: Some(5),
        };
        assert_eq!(extract(html, &options).body_text, "héllo");
    }

    #[test]
    fn strategy_parses_from_config_values() {
        assert_eq!("tag-scoped".parse::<ExtractStrategy>().unwrap(), ExtractStrategy::TagScoped);
        assert_eq!(" Paragraphs ".parse::<ExtractStrategy>().unwrap(), ExtractStrategy::Paragraphs);
        assert!("dom".parse::<ExtractStrategy>().is_err());
    }
}
