//! Memoization of crawl results and model responses
//!
//! Keys are content fingerprints (SHA-256 of the inputs that matter); values
//! are stored with their creation time so they can expire for periodic
//! refresh.

mod fingerprint;
mod memo;

pub use fingerprint::Fingerprint;
pub use memo::{CacheEntry, MemoCache};
