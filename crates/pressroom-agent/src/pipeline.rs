// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retrieval pipeline that condenses long source content before generation.
//!
//! The content is split into overlapping character chunks and summarized in
//! groups. Key questions are derived from the summary, the best matching chunks
//! are retrieved for each question by term overlap, and the answers are
//! assembled into a `Q:`/`A:` dialog. A title is inferred only when the source
//! did not supply one.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use pressroom_core::{
    CondenseConfig, Condensed, GenerationModel, PressroomError, RetrievalPipeline,
};
use tracing::debug;

/// Chunks summarized together in the first summarization pass.
const SUMMARY_GROUP: usize = 4;

const SUMMARIZE_PROMPT: &str = "Write a concise summary of the following text. \
Keep the key facts, names and numbers.\n\n";

const COMBINE_PROMPT: &str = "Combine these partial summaries into a single \
concise summary of the whole document.\n\n";

const QUESTIONS_PROMPT: &str = "Based on this summary, list the {n} most \
important questions a reader would want answered. Write one question per line \
with no numbering or commentary.\n\nSummary:\n";

const ANSWER_PROMPT: &str = "Answer the question using only the context below. \
If the context does not contain the answer, say so briefly.\n\n";

const TITLE_PROMPT: &str = "Give a short, descriptive title for the document \
summarized below. Reply with the title only.\n\n";

/// [`RetrievalPipeline`] driven entirely by a [`GenerationModel`].
pub struct DefaultRetrievalPipeline {
    model: Arc<dyn GenerationModel>,
}

impl DefaultRetrievalPipeline {
    pub fn new(model: Arc<dyn GenerationModel>) -> Self {
        Self { model }
    }

    async fn ask(&self, prompt: String) -> Result<String, PressroomError> {
        let reply = self.model.generate(&prompt, &[]).await?;
        Ok(reply.trim().to_string())
    }

    async fn summarize(&self, chunks: &[String]) -> Result<String, PressroomError> {
        let mut partials = Vec::new();
        for group in chunks.chunks(SUMMARY_GROUP) {
            let text = group.join("\n\n");
            partials.push(self.ask(format!("{SUMMARIZE_PROMPT}{text}")).await?);
        }
        if partials.len() == 1 {
            return Ok(partials.remove(0));
        }
        self.ask(format!("{COMBINE_PROMPT}{}", partials.join("\n\n")))
            .await
    }
}

#[async_trait]
impl RetrievalPipeline for DefaultRetrievalPipeline {
    async fn condense(
        &self,
        raw_content: &str,
        config: &CondenseConfig,
    ) -> Result<Condensed, PressroomError> {
        let chunks = chunk_text(raw_content, config.chunk_size, config.chunk_overlap);
        if chunks.is_empty() {
            return Err(PressroomError::generation("nothing to condense"));
        }
        debug!(chunks = chunks.len(), "condensing content");

        let summary = self.summarize(&chunks).await?;

        let questions_reply = self
            .ask(format!(
                "{}{summary}",
                QUESTIONS_PROMPT.replace("{n}", &config.questions.to_string())
            ))
            .await?;
        let questions = parse_questions(&questions_reply, config.questions);
        if questions.is_empty() {
            return Err(PressroomError::generation("model returned no questions"));
        }

        let mut dialog = Vec::with_capacity(questions.len());
        for question in &questions {
            let context = top_chunks(&chunks, question, config.chunks_per_question).join("\n\n");
            let answer = self
                .ask(format!(
                    "{ANSWER_PROMPT}Context:\n{context}\n\nQuestion: {question}"
                ))
                .await?;
            dialog.push(format!("Q: {question}\nA: {answer}"));
        }

        let title = match &config.known_title {
            Some(title) => Some(title.clone()),
            None => {
                let reply = self.ask(format!("{TITLE_PROMPT}{summary}")).await?;
                let title = reply.lines().next().unwrap_or_default();
                let title = title.trim().trim_matches('"').trim();
                (!title.is_empty()).then(|| title.to_string())
            }
        };

        Ok(Condensed {
            dialog: dialog.join("\n\n"),
            title,
        })
    }
}

/// Split into chunks of `size` characters, each starting `size - overlap`
/// characters after the previous one.
pub fn chunk_text(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() || size == 0 {
        return Vec::new();
    }
    let step = size.saturating_sub(overlap).max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }
    chunks
}

/// One question per non-empty line, with list markers stripped.
pub fn parse_questions(reply: &str, limit: usize) -> Vec<String> {
    reply
        .lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(|c: char| {
                    c.is_ascii_digit() || matches!(c, '-' | '*' | '•' | '.' | ')')
                })
                .trim()
        })
        .filter(|line| !line.is_empty())
        .take(limit)
        .map(str::to_string)
        .collect()
}

fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.chars().count() > 2)
        .map(str::to_lowercase)
        .collect()
}

/// The `k` chunks sharing the most terms with `query`, in document order.
///
/// Ties go to the earlier chunk.
pub fn top_chunks<'a>(chunks: &'a [String], query: &str, k: usize) -> Vec<&'a str> {
    let query_terms = terms(query);
    let mut scored: Vec<(usize, usize)> = chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| (terms(chunk).intersection(&query_terms).count(), i))
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    let mut picked: Vec<usize> = scored.into_iter().take(k).map(|(_, i)| i).collect();
    picked.sort_unstable();
    picked.into_iter().map(|i| chunks[i].as_str()).collect()
}
