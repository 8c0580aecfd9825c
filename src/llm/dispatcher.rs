//! Prompt dispatch over context chunks
//!
//! One model call per chunk, in chunk order. The per-chunk answers are joined
//! with single spaces. The first failed call ends the dispatch: the answers
//! gathered so far are returned together with a warning.

use crate::chunker::Chunk;
use crate::llm::backend::{BackendError, LanguageModel};
use tokio_util::sync::CancellationToken;

/// The combined answer for one user message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub text: String,
    pub chunks_total: usize,
    pub chunks_answered: usize,
    /// Set when the answer is partial or there was nothing to answer from
    pub warning: Option<String>,
}

impl Dispatch {
    /// True when every chunk was answered
    pub fn is_complete(&self) -> bool {
        self.chunks_total > 0 && self.chunks_answered == self.chunks_total
    }
}

/// Builds the prompt sent with one chunk
pub fn build_prompt(context: &str, user_message: &str) -> String {
    format!("Context: {}\n\nUser: {}", context, user_message)
}

/// Asks the model about `user_message` once per context chunk
///
/// # Arguments
///
/// * `model` - The language model backend
/// * `user_message` - The user's free-text question
/// * `chunks` - Context chunks, answered in `sequence_index` order
/// * `cancel` - Checked before each chunk and raced against each call
///
/// # Returns
///
/// A `Dispatch`; never an error. Backend failures and cancellation surface as
/// `warning` with the partial text gathered before them.
pub async fn respond<M>(
    model: &M,
    user_message: &str,
    chunks: &[Chunk],
    cancel: &CancellationToken,
) -> Dispatch
where
    M: LanguageModel + ?Sized,
{
    let mut ordered: Vec<&Chunk> = chunks.iter().collect();
    ordered.sort_by_key(|c| c.sequence_index);

    let total = ordered.len();
    if total == 0 {
        tracing::warn!("No site content available; nothing sent to the model");
        return Dispatch {
            text: String::new(),
            chunks_total: 0,
            chunks_answered: 0,
            warning: Some("No site content is available to answer from".to_string()),
        };
    }

    let mut answers: Vec<String> = Vec::with_capacity(total);
    let mut failure: Option<BackendError> = None;

    for chunk in ordered {
        if cancel.is_cancelled() {
            failure = Some(BackendError::Cancelled);
            break;
        }

        let prompt = build_prompt(&chunk.text, user_message);
        tracing::debug!(
            "Sending chunk {}/{} ({} chars) to {}",
            chunk.sequence_index + 1,
            total,
            prompt.len(),
            model.name()
        );

        let result = tokio::select! {
            _ = cancel.cancelled() => Err(BackendError::Cancelled),
            result = model.generate(&prompt) => result,
        };

        match result {
            Ok(answer) => answers.push(answer),
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }

    let answered = answers.len();
    let warning = failure.map(|e| {
        let warning = format!(
            "Answer is partial: {} of {} context chunks answered before the model call failed ({})",
            answered, total, e
        );
        tracing::warn!("{}", warning);
        warning
    });

    Dispatch {
        text: answers.join(" "),
        chunks_total: total,
        chunks_answered: answered,
        warning,
    }
}
