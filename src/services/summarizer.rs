// src/services/summarizer.rs

//! Content summarization.
//!
//! [`LlmSummarizer`] sends content to a chat model chunk by chunk;
//! [`ExtractiveSummarizer`] works offline by picking leading sentences.

use async_trait::async_trait;
use unicode_segmentation::UnicodeSegmentation;

use crate::models::Digest;
use crate::services::llm::{ChatClient, ChatPrompt};
use crate::utils::text::{char_len, collapse_whitespace};

const SUMMARY_SYSTEM_PROMPT: &str = "You are a helpful assistant that summarizes web content \
accurately and concisely, extracting the most relevant information based on the user's \
instructions.";

const NO_CONTENT: &str = "No content found";

const MAX_KEY_POINTS: usize = 10;
const MAX_SENTENCE_POINTS: usize = 5;
const LIST_MARKERS: [&str; 6] = ["•", "-", "*", "1.", "2.", "3."];

/// Produces a [`Digest`] of `content` guided by `prompt`.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, content: &str, prompt: &str) -> Digest;
}

/// Split `content` at paragraph breaks into chunks of roughly `max_len`
/// characters.
///
/// Paragraph separators do not count toward a chunk's length, and a single
/// paragraph longer than `max_len` becomes its own chunk.
pub fn chunk_content(content: &str, max_len: usize) -> Vec<String> {
    if char_len(content) <= max_len {
        return vec![content.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0;

    for para in content.split("\n\n") {
        let para_len = char_len(para);
        if current_len + para_len > max_len && !current.is_empty() {
            chunks.push(current.join("\n\n"));
            current.clear();
            current_len = 0;
        }
        current.push(para);
        current_len += para_len;
    }
    if !current.is_empty() {
        chunks.push(current.join("\n\n"));
    }
    chunks
}

/// Pull list items out of `text`, or short sentences if it has none.
pub fn extract_key_points(text: &str) -> Vec<String> {
    let mut points: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| char_len(line) > 5 && LIST_MARKERS.iter().any(|m| line.starts_with(m)))
        .map(|line| {
            line.trim_start_matches(|c: char| "•-*123456789. ".contains(c))
                .to_string()
        })
        .collect();

    if points.is_empty() {
        points = text
            .split(". ")
            .filter(|s| (21..200).contains(&char_len(s)))
            .take(MAX_SENTENCE_POINTS)
            .map(|s| {
                let s = s.trim();
                if s.ends_with('.') {
                    s.to_string()
                } else {
                    format!("{s}.")
                }
            })
            .collect();
    }

    points.truncate(MAX_KEY_POINTS);
    points
}

/// Summarizes through a chat-completions model.
#[derive(Debug, Clone)]
pub struct LlmSummarizer {
    client: ChatClient,
}

impl LlmSummarizer {
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize(&self, content: &str, prompt: &str) -> Digest {
        if content.trim().is_empty() {
            return Digest {
                summary: NO_CONTENT.to_string(),
                key_points: Vec::new(),
            };
        }

        let config = self.client.config();
        let chunks = chunk_content(content, config.chunk_size);
        let total = chunks.len();
        let mut parts = Vec::with_capacity(total);

        for (i, chunk) in chunks.iter().enumerate() {
            let chunk_prompt = if total > 1 {
                format!("{prompt} (Content part {}/{total})", i + 1)
            } else {
                prompt.to_string()
            };

            let request = ChatPrompt {
                system: SUMMARY_SYSTEM_PROMPT,
                user: &format!("{chunk_prompt}\n\n{chunk}"),
                max_tokens: config.max_tokens,
                json: false,
            };
            match self.client.complete(request).await {
                Ok(text) => parts.push(text),
                Err(e) => {
                    log::error!("Error processing content chunk {}: {}", i + 1, e);
                    parts.push(format!("Error processing content: {e}"));
                }
            }
        }

        let summary = parts.join("\n\n");
        let key_points = extract_key_points(&summary);
        Digest {
            summary,
            key_points,
        }
    }
}

/// Offline summarizer that keeps the opening sentences of the content.
#[derive(Debug, Clone)]
pub struct ExtractiveSummarizer {
    max_sentences: usize,
}

impl Default for ExtractiveSummarizer {
    fn default() -> Self {
        Self { max_sentences: 5 }
    }
}

impl ExtractiveSummarizer {
    pub fn new(max_sentences: usize) -> Self {
        Self { max_sentences }
    }
}

#[async_trait]
impl Summarizer for ExtractiveSummarizer {
    async fn summarize(&self, content: &str, _prompt: &str) -> Digest {
        let sentences: Vec<String> = content
            .unicode_sentences()
            .map(collapse_whitespace)
            .filter(|s| char_len(s) > 20)
            .take(self.max_sentences)
            .collect();

        if sentences.is_empty() {
            return Digest {
                summary: if content.trim().is_empty() {
                    NO_CONTENT.to_string()
                } else {
                    collapse_whitespace(content)
                },
                key_points: Vec::new(),
            };
        }

        let key_points = extract_key_points(content);
        Digest {
            summary: sentences.join(" "),
            key_points,
        }
    }
}
