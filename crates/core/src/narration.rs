//! Narration audio rules: content hashing, regeneration decisions, and
//! object-key layout.
//!
//! A chapter stores the URL of its narration plus the hash of the text that
//! produced it. Asking for narration of identical text is a no-op.

use crate::hashing::sha256_hex;
use crate::types::DbId;

/// MIME type of every narration object.
pub const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

/// What to do with a narration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioPlan {
    /// Audio for this exact text already exists.
    Reuse { url: String },
    /// Synthesize new audio; store `hash` alongside the new URL.
    Generate { hash: String },
}

/// Hash of the narration text. Surrounding whitespace is ignored.
pub fn audio_text_hash(text: &str) -> String {
    sha256_hex(text.trim().as_bytes())
}

/// Decide whether stored narration can be reused for `text`.
pub fn plan_audio(stored_hash: Option<&str>, stored_url: Option<&str>, text: &str) -> AudioPlan {
    let hash = audio_text_hash(text);
    match (stored_hash, stored_url) {
        (Some(stored), Some(url)) if stored == hash && !url.is_empty() => AudioPlan::Reuse {
            url: url.to_string(),
        },
        _ => AudioPlan::Generate { hash },
    }
}

/// Object key for a freshly generated narration file.
///
/// The timestamp keeps keys unique so a regenerated file never overwrites a
/// URL that may still be cached by clients.
pub fn audio_object_key(room_id: DbId, chapter_id: DbId, timestamp_ms: i64) -> String {
    format!("rooms/{room_id}/chapters/{chapter_id}-{timestamp_ms}.mp3")
}

/// Join a public bucket domain and an object key into a URL.
pub fn public_object_url(domain: &str, key: &str) -> String {
    let domain = domain.strip_suffix('/').unwrap_or(domain);
    let key = key.strip_prefix('/').unwrap_or(key);
    format!("{domain}/{key}")
}
