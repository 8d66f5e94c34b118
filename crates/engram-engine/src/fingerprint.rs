use sha2::{Digest, Sha256};

use engram_types::FilteredMessage;

/// Stored fingerprint length in hex characters.
///
/// Truncation keeps the state file compact; 64 bits of the digest is far
/// more than enough to distinguish content versions of one session. The
/// length is a constant, not a tunable: changing it would invalidate every
/// stored hash at once.
const FINGERPRINT_LEN: usize = 16;

/// Canonical textual form of filtered session content.
///
/// One `"[{role}]: {text}"` line per message, newline-joined. This exact
/// string is both what gets fingerprinted and what becomes the episode
/// body, so hash equality always means episode-body equality.
pub fn canonical_content(messages: &[FilteredMessage]) -> String {
    messages
        .iter()
        .map(|m| m.canonical_line())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Deterministic content fingerprint: SHA256 of the canonical form,
/// hex-encoded and truncated. Empty input yields the hash of the empty
/// string, which is itself a valid, stable fingerprint.
pub fn fingerprint(messages: &[FilteredMessage]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_content(messages).as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..FINGERPRINT_LEN].to_string()
}
