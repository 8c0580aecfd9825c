use sha2::{Digest, Sha256};
use std::fmt;

/// Deterministic cache key over an operation's relevant inputs
///
/// Each part is length-prefixed before hashing so that `["ab", "c"]` and
/// `["a", "bc"]` never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Hashes a tagged list of parts
    pub fn of(kind: &str, parts: &[&str]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update((kind.len() as u64).to_le_bytes());
        hasher.update(kind.as_bytes());
        for part in parts {
            hasher.update((part.len() as u64).to_le_bytes());
            hasher.update(part.as_bytes());
        }
        Self(hex::encode(hasher.finalize()))
    }

    /// Key for a crawl of `seed_url`
    pub fn for_crawl(seed_url: &str) -> Self {
        Self::of("crawl", &[seed_url])
    }

    /// Key for one answer: the model, the user's message and the full context
    pub fn for_response(model: &str, message: &str, context: &str) -> Self {
        Self::of("response", &[model, message, context])
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form is enough for log lines
        write!(f, "{}", &self.0[..12.min(self.0.len())])
    }
}
