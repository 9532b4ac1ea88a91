//! Micro-batched sentiment classification over raw posts.

use std::sync::Arc;

use tracing::debug;

use coinpulse_core::RawPost;

use crate::sentiment::{ModelError, Sentiment, SentimentModel};

/// Maximum characters of post text sent to the model.
const TEXT_CAP: usize = 512;

/// Truncate on a character boundary.
fn truncate_chars(text: &str, cap: usize) -> &str {
    match text.char_indices().nth(cap) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Classification stage: owns the worker's model instance and chunks posts
/// into micro-batch inference calls.
///
/// Posts with empty or whitespace-only text are assigned `(neutral, 0.0)`
/// without ever reaching the model.
pub struct Classifier {
    model: Arc<dyn SentimentModel>,
    batch_size: usize,
}

impl Classifier {
    pub fn new(model: Arc<dyn SentimentModel>, batch_size: usize) -> Self {
        Self {
            model,
            batch_size: batch_size.max(1),
        }
    }

    /// Classify every post, returning one result per input (in order).
    pub async fn classify_posts(&self, posts: &[RawPost]) -> Result<Vec<Sentiment>, ModelError> {
        let mut results: Vec<Sentiment> = vec![Sentiment::neutral(); posts.len()];
        let mut pending: Vec<(usize, &str)> = Vec::new();

        for (index, post) in posts.iter().enumerate() {
            if !post.text.trim().is_empty() {
                pending.push((index, truncate_chars(&post.text, TEXT_CAP)));
            }
        }

        let mut calls = 0usize;
        for chunk in pending.chunks(self.batch_size) {
            let texts: Vec<&str> = chunk.iter().map(|(_, t)| *t).collect();
            let sentiments = self.model.classify_batch(&texts).await?;

            if sentiments.len() != texts.len() {
                return Err(ModelError::BatchMismatch {
                    sent: texts.len(),
                    received: sentiments.len(),
                });
            }

            for ((index, _), sentiment) in chunk.iter().zip(sentiments) {
                results[*index] = sentiment;
            }
            calls += 1;
        }

        debug!(
            posts = posts.len(),
            classified = pending.len(),
            model_calls = calls,
            "classification stage complete"
        );

        Ok(results)
    }
}
