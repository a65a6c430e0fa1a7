// src/services/scorer.rs

//! Keyword relevance scoring.
//!
//! An additive heuristic: keyword frequency, whole-word matches, presence in
//! the introduction and in short heading-like lines, followed by a length
//! adjustment. Scores are only meaningful relative to each other.

use regex::Regex;

use crate::error::Result;
use crate::utils::text::{char_len, char_prefix};

/// Texts shorter than this score zero.
const MIN_CONTENT_CHARS: usize = 100;
/// Size of the introduction window.
const INTRO_CHARS: usize = 500;
/// Lines shorter than this are treated as headings.
const HEADING_MAX_CHARS: usize = 100;

const OCCURRENCE_POINTS: u64 = 2;
const EXACT_MATCH_POINTS: u64 = 3;
const INTRO_POINTS: u64 = 10;
const HEADING_POINTS: u64 = 15;

/// Anything that can rate a page's text.
pub trait Scorer: Send + Sync {
    fn score(&self, text: &str) -> u32;
}

#[derive(Debug, Clone)]
struct KeywordPattern {
    /// Lowercased keyword
    needle: String,
    /// Whole-word matcher for `needle`
    exact: Regex,
}

/// Scores text against an ordered keyword list, case-insensitively.
#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    keywords: Vec<KeywordPattern>,
}

impl RelevanceScorer {
    /// Build a scorer. Blank keywords are ignored.
    pub fn new<I, S>(keywords: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().to_lowercase())
            .filter(|k| !k.trim().is_empty())
            .map(|needle| {
                let exact = Regex::new(&format!(r"\b{}\b", regex::escape(&needle)))?;
                Ok(KeywordPattern { needle, exact })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { keywords })
    }

    /// The lowercased keywords in scoring order.
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(|k| k.needle.as_str())
    }

    /// Score `content`.
    pub fn score(&self, content: &str) -> u32 {
        let length = char_len(content);
        if length < MIN_CONTENT_CHARS {
            return 0;
        }

        let lowered = content.to_lowercase();
        let intro = char_prefix(&lowered, INTRO_CHARS);
        let lines: Vec<(usize, String)> = content
            .split('\n')
            .map(|line| (char_len(line), line.to_lowercase().trim().to_string()))
            .collect();

        let mut total: u64 = 0;
        for keyword in &self.keywords {
            let needle = keyword.needle.as_str();

            total += OCCURRENCE_POINTS * lowered.matches(needle).count() as u64;
            total += EXACT_MATCH_POINTS * keyword.exact.find_iter(&lowered).count() as u64;

            if intro.contains(needle) {
                total += INTRO_POINTS;
            }

            let headings = lines
                .iter()
                .filter(|(line_len, line)| *line_len < HEADING_MAX_CHARS && line.contains(needle))
                .count() as u64;
            total += HEADING_POINTS * headings;
        }

        // Both upper bonuses apply above 3000 characters.
        if length < 500 {
            total = scale(total, 0.7);
        }
        if length > 1000 {
            total = scale(total, 1.2);
        }
        if length > 3000 {
            total = scale(total, 1.5);
        }

        u32::try_from(total).unwrap_or(u32::MAX)
    }
}

impl Scorer for RelevanceScorer {
    fn score(&self, text: &str) -> u32 {
        RelevanceScorer::score(self, text)
    }
}

/// Multiply and truncate toward zero.
fn scale(value: u64, factor: f64) -> u64 {
    (value as f64 * factor) as u64
}
