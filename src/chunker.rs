//! Size-bounded chunking of aggregated site text
//!
//! Model backends cap how much context one prompt can carry, so the
//! aggregated text is cut into contiguous, non-overlapping chunks. Sizes are
//! counted in characters (Unicode scalar values) and cuts always fall on
//! character boundaries.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
    #[error("Chunk size must be positive, got {0}")]
    InvalidSize(usize),
}

/// One contiguous slice of a larger text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub sequence_index: usize,
    pub text: String,
}

impl Chunk {
    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Splits `text` into chunks of at most `max_size` characters
///
/// Every chunk except possibly the last holds exactly `max_size` characters,
/// and concatenating the chunks in `sequence_index` order gives back `text`.
/// Empty input produces no chunks.
///
/// # Example
///
/// ```
/// use site_chat::chunker::chunk;
///
/// let chunks = chunk("abcdefgh", 3).unwrap();
/// let texts: Vec<_> = chunks.iter().map(|c| c.text.as_str()).collect();
/// assert_eq!(texts, ["abc", "def", "gh"]);
/// ```
pub fn chunk(text: &str, max_size: usize) -> Result<Vec<Chunk>, ChunkError> {
    if max_size == 0 {
        return Err(ChunkError::InvalidSize(max_size));
    }

    let mut chunks = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let cut = rest
            .char_indices()
            .nth(max_size)
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len());
        let (head, tail) = rest.split_at(cut);
        chunks.push(Chunk {
            sequence_index: chunks.len(),
            text: head.to_string(),
        });
        rest = tail;
    }

    Ok(chunks)
}

/// Concatenates chunks in sequence order
pub fn join(chunks: &[Chunk]) -> String {
    let mut ordered: Vec<&Chunk> = chunks.iter().collect();
    ordered.sort_by_key(|c| c.sequence_index);
    ordered.iter().map(|c| c.text.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(chunks: &[Chunk]) -> Vec<&str> {
        chunks.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn test_example_split() {
        let chunks = chunk("abcdefgh", 3).unwrap();
        assert_eq!(texts(&chunks), vec!["abc", "def", "gh"]);
        assert_eq!(join(&chunks), "abcdefgh");
    }

    #[test]
    fn test_sequence_indices() {
        let chunks = chunk("abcdefgh", 3).unwrap();
        let indices: Vec<_> = chunks.iter().map(|c| c.sequence_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_exact_multiple() {
        let chunks = chunk("abcdef", 3).unwrap();
        assert_eq!(texts(&chunks), vec!["abc", "def"]);
    }

    #[test]
    fn test_size_larger_than_text() {
        let chunks = chunk("abc", 100).unwrap();
        assert_eq!(texts(&chunks), vec!["abc"]);
    }

    #[test]
    fn test_empty_text() {
        assert!(chunk("", 5).unwrap().is_empty());
    }

    #[test]
    fn test_zero_size_rejected() {
        assert_eq!(chunk("abc", 0), Err(ChunkError::InvalidSize(0)));
    }

    #[test]
    fn test_multibyte_characters_not_split() {
        let text = "héllo wörld ✓ ünïcode";
        let chunks = chunk(text, 4).unwrap();
        for c in &chunks[..chunks.len() - 1] {
            assert_eq!(c.char_len(), 4);
        }
        assert!(chunks.last().unwrap().char_len() <= 4);
        assert_eq!(join(&chunks), text);
    }

    #[test]
    fn test_reconstruction_and_sizes_across_inputs() {
        let samples = [
            "a",
            "Content from https://example.gov/:\nSolar incentives are available.",
            "\n\n  spaced   out\ttext\n",
            "日本語のテキストを分割します",
        ];
        for text in samples {
            for size in 1..=12 {
                let chunks = chunk(text, size).unwrap();
                assert_eq!(join(&chunks), text, "size {}", size);
                let (last, rest) = chunks.split_last().unwrap();
                assert!(rest.iter().all(|c| c.char_len() == size));
                assert!(last.char_len() <= size && last.char_len() > 0);
            }
        }
    }

    #[test]
    fn test_join_orders_by_index() {
        let mut chunks = chunk("abcdefgh", 3).unwrap();
        chunks.reverse();
        assert_eq!(join(&chunks), "abcdefgh");
    }
}
