use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use crate::error::AppError;

/// Size of the high-frequency vocabulary sentences are scored against.
pub const COMMON_WORD_LIMIT: usize = 200;

/// Positional summaries skip sentences of this many characters or fewer.
pub const MIN_SENTENCE_CHARS: usize = 20;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("Failed to compile word pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// Cut after `.`, `!` or `?` when followed by whitespace; the mark stays.
    Whitespace,
    /// Cut at every `.`, `!` or `?`; the mark is dropped.
    Terminal,
}

/// Splits `text` into trimmed sentences, in order, dropping any whose length
/// in characters is not greater than `min_len`.
pub fn segment(text: &str, boundary: Boundary, min_len: usize) -> Box<dyn Iterator<Item = &str> + '_> {
    let spans: Box<dyn Iterator<Item = &str> + '_> = match boundary {
        Boundary::Whitespace => Box::new(split_after_terminals(text)),
        Boundary::Terminal => Box::new(text.split(['.', '!', '?'])),
    };

    Box::new(
        spans
            .map(str::trim)
            .filter(move |sentence| !sentence.is_empty() && sentence.chars().count() > min_len),
    )
}

fn split_after_terminals(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let mut chars = rest.char_indices().peekable();
        while let Some((_, c)) = chars.next() {
            if !matches!(c, '.' | '!' | '?') {
                continue;
            }
            if let Some(&(next_index, next)) = chars.peek() {
                if next.is_whitespace() {
                    let (head, tail) = rest.split_at(next_index);
                    rest = tail;
                    return Some(head);
                }
            }
        }
        Some(std::mem::take(&mut rest))
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryMethod {
    #[default]
    Frequency,
    Positional,
}

impl SummaryMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryMethod::Frequency => "frequency",
            SummaryMethod::Positional => "positional",
        }
    }

    pub fn default_max_sentences(&self) -> usize {
        match self {
            SummaryMethod::Frequency => 5,
            SummaryMethod::Positional => 3,
        }
    }
}

impl FromStr for SummaryMethod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "frequency" => Ok(SummaryMethod::Frequency),
            "positional" => Ok(SummaryMethod::Positional),
            other => Err(AppError::Config(format!("Unknown summary method: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceScore<'a> {
    pub sentence: &'a str,
    pub score: usize,
}

/// Segments `text` the way `method` expects and summarizes it.
pub fn summarize(method: SummaryMethod, text: &str, max_sentences: usize) -> String {
    match method {
        SummaryMethod::Frequency => {
            let sentences: Vec<&str> = segment(text, Boundary::Whitespace, 0).collect();
            summarize_by_frequency(&sentences, text, max_sentences)
        }
        SummaryMethod::Positional => {
            let sentences: Vec<&str> = segment(text, Boundary::Terminal, MIN_SENTENCE_CHARS).collect();
            summarize_by_position(&sentences, max_sentences)
        }
    }
}

/// Picks the `max_sentences` sentences with the most common words and joins
/// them in rank order. Text that is already short enough comes back as is.
pub fn summarize_by_frequency(sentences: &[&str], full_text: &str, max_sentences: usize) -> String {
    if sentences.len() <= max_sentences {
        return full_text.to_string();
    }

    let common = common_words(full_text, COMMON_WORD_LIMIT);
    let mut scores = score_sentences(sentences, &common);
    // Stable: equal scores keep document order.
    scores.sort_by(|a, b| b.score.cmp(&a.score));

    scores
        .iter()
        .take(max_sentences)
        .map(|scored| scored.sentence)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn summarize_by_position(sentences: &[&str], max_sentences: usize) -> String {
    let picked: Vec<&str> = sentences.iter().copied().take(max_sentences).collect();
    if picked.is_empty() {
        return String::new();
    }
    format!("{}.", picked.join(". "))
}

/// The `limit` most frequent lowercase words; ties go to the word seen first.
pub fn common_words(text: &str, limit: usize) -> HashSet<String> {
    let lowered = text.to_lowercase();
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, word) in WORD.find_iter(&lowered).enumerate() {
        counts.entry(word.as_str()).or_insert((0, position)).0 += 1;
    }

    let mut ranked: Vec<(&str, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
        count_b.cmp(count_a).then(first_a.cmp(first_b))
    });

    ranked
        .into_iter()
        .take(limit)
        .map(|(word, _)| word.to_string())
        .collect()
}

/// Identical sentences are scored once, at their first position.
fn score_sentences<'a>(sentences: &[&'a str], common: &HashSet<String>) -> Vec<SentenceScore<'a>> {
    let mut seen = HashSet::new();
    sentences
        .iter()
        .copied()
        .filter(|sentence| seen.insert(*sentence))
        .map(|sentence| {
            let lowered = sentence.to_lowercase();
            let score = WORD
                .find_iter(&lowered)
                .filter(|word| common.contains(word.as_str()))
                .count();
            SentenceScore { sentence, score }
        })
        .collect()
}
