// src/services/keywords.rs

//! Keyword extraction from natural-language instructions.

use std::collections::HashSet;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use unicode_segmentation::UnicodeSegmentation;

use crate::services::llm::{ChatClient, ChatPrompt};

const KEYWORD_SYSTEM_PROMPT: &str = "You are a keyword extraction specialist. Extract the most \
relevant search keywords from the given instructions. Focus on terms that would be useful for \
web crawling and content relevance matching. Respond with a JSON object of the form \
{\"keywords\": [\"...\"]} and nothing else.";

const KEYWORD_MAX_TOKENS: u32 = 150;

/// English stop words.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "ain", "all", "am", "an", "and", "any",
    "are", "aren", "as", "at", "be", "because", "been", "before", "being", "below", "between",
    "both", "but", "by", "can", "couldn", "d", "did", "didn", "do", "does", "doesn", "doing",
    "don", "down", "during", "each", "few", "for", "from", "further", "had", "hadn", "has",
    "hasn", "have", "haven", "having", "he", "her", "here", "hers", "herself", "him", "himself",
    "his", "how", "i", "if", "in", "into", "is", "isn", "it", "its", "itself", "just", "ll",
    "m", "ma", "me", "mightn", "more", "most", "mustn", "my", "myself", "needn", "no", "nor",
    "not", "now", "o", "of", "off", "on", "once", "only", "or", "other", "our", "ours",
    "ourselves", "out", "over", "own", "re", "s", "same", "shan", "she", "should", "shouldn",
    "so", "some", "such", "t", "than", "that", "the", "their", "theirs", "them", "themselves",
    "then", "there", "these", "they", "this", "those", "through", "to", "too", "under", "until",
    "up", "ve", "very", "was", "wasn", "we", "were", "weren", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "won", "wouldn", "y", "you", "your", "yours",
    "yourself", "yourselves",
];

static TOPIC_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?:details|information|info)\s+(?:of|about|on)\s+(\w+)").ok()
});

/// Turns instructions into an ordered keyword list.
#[async_trait]
pub trait KeywordExtractor: Send + Sync {
    async fn extract(&self, instructions: &str) -> Vec<String>;
}

/// Offline extraction from phrases and content words.
#[derive(Debug, Clone)]
pub struct HeuristicKeywordExtractor {
    stop_words: HashSet<&'static str>,
}

impl Default for HeuristicKeywordExtractor {
    fn default() -> Self {
        Self {
            stop_words: STOP_WORDS.iter().copied().collect(),
        }
    }
}

impl HeuristicKeywordExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract keywords: multi-word phrases first, then single words.
    pub fn extract_keywords(&self, instructions: &str) -> Vec<String> {
        let lowered = instructions.to_lowercase();
        let tokens: Vec<&str> = lowered
            .split_word_bounds()
            .filter(|t| !t.trim().is_empty())
            .collect();

        let is_content = |token: &str| {
            token.chars().all(char::is_alphabetic) && !self.stop_words.contains(token)
        };

        let mut phrases = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        for &token in &tokens {
            if is_content(token) {
                current.push(token);
            } else if !current.is_empty() {
                phrases.push(current.join(" "));
                current.clear();
            }
        }
        if !current.is_empty() {
            phrases.push(current.join(" "));
        }

        let words = tokens
            .iter()
            .copied()
            .filter(|&t| is_content(t))
            .map(String::from);

        let mut keywords: Vec<String> = phrases.into_iter().chain(words).collect();

        if let Some(topic) = TOPIC_PATTERN
            .as_ref()
            .and_then(|re| re.captures(&lowered))
            .and_then(|caps| caps.get(1))
        {
            keywords.push(topic.as_str().to_string());
        }

        let keywords = dedup_preserving_order(keywords);
        if !keywords.is_empty() {
            return keywords;
        }

        // Nothing survived stop-word filtering
        dedup_preserving_order(
            lowered
                .split_whitespace()
                .filter(|w| w.chars().count() > 3)
                .map(String::from)
                .collect(),
        )
    }
}

#[async_trait]
impl KeywordExtractor for HeuristicKeywordExtractor {
    async fn extract(&self, instructions: &str) -> Vec<String> {
        let keywords = self.extract_keywords(instructions);
        log::info!("Extracted keywords: {:?}", keywords);
        keywords
    }
}

/// Asks a language model for keywords, falling back to the heuristic.
#[derive(Debug, Clone)]
pub struct LlmKeywordExtractor {
    client: ChatClient,
    fallback: HeuristicKeywordExtractor,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum KeywordReply {
    Object {
        #[serde(default)]
        keywords: Vec<String>,
    },
    List(Vec<String>),
}

impl LlmKeywordExtractor {
    pub fn new(client: ChatClient) -> Self {
        Self {
            client,
            fallback: HeuristicKeywordExtractor::new(),
        }
    }

    async fn ask(&self, instructions: &str) -> crate::error::Result<Vec<String>> {
        let reply = self
            .client
            .complete(ChatPrompt {
                system: KEYWORD_SYSTEM_PROMPT,
                user: instructions,
                max_tokens: KEYWORD_MAX_TOKENS,
                json: true,
            })
            .await?;
        Ok(parse_keyword_reply(&reply))
    }
}

#[async_trait]
impl KeywordExtractor for LlmKeywordExtractor {
    async fn extract(&self, instructions: &str) -> Vec<String> {
        match self.ask(instructions).await {
            Ok(keywords) if !keywords.is_empty() => {
                log::info!("Model extracted keywords: {:?}", keywords);
                keywords
            }
            Ok(_) => {
                log::warn!("Model returned no keywords, using heuristic extraction");
                self.fallback.extract(instructions).await
            }
            Err(e) => {
                log::error!("Keyword extraction request failed: {}", e);
                self.fallback.extract(instructions).await
            }
        }
    }
}

/// Keywords from a model reply, or nothing if it is not the expected JSON.
fn parse_keyword_reply(reply: &str) -> Vec<String> {
    let keywords = match serde_json::from_str::<KeywordReply>(reply) {
        Ok(KeywordReply::Object { keywords }) | Ok(KeywordReply::List(keywords)) => keywords,
        Err(e) => {
            log::warn!("Unreadable keyword reply: {}", e);
            Vec::new()
        }
    };
    dedup_preserving_order(
        keywords
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect(),
    )
}

fn dedup_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
