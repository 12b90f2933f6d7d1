//! Content snapshots
//!
//! One snapshot holds every readable representation of a single clipboard
//! state. Snapshots are immutable once captured.

use sha2::{Digest, Sha256};
use std::fmt;

use super::flavor::{FlavorMap, PLAIN_TEXT, RICH_TEXT};
use super::rtf::rtf_to_plain_text;
use crate::platform::ClipboardPlatform;

/// Preview shown when no flavor yields readable text.
pub const NO_PREVIEW: &str = "no preview available";

/// Immutable capture of the clipboard across all readable flavors.
///
/// Equality and hashing are structural over the whole flavor map; the map is
/// sorted, so capture order never matters.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ContentSnapshot {
    flavors: FlavorMap,
}

impl ContentSnapshot {
    /// Build a snapshot from a flavor map, dropping empty payloads.
    ///
    /// Returns None when nothing is left.
    pub fn from_flavors(flavors: FlavorMap) -> Option<Self> {
        let flavors: FlavorMap = flavors
            .into_iter()
            .filter(|(_, bytes)| !bytes.is_empty())
            .collect();
        if flavors.is_empty() {
            None
        } else {
            Some(Self { flavors })
        }
    }

    /// Read every advertised flavor from the platform.
    ///
    /// Flavors advertised without bytes are silently omitted.
    pub fn capture(platform: &mut dyn ClipboardPlatform) -> Option<Self> {
        let mut flavors = FlavorMap::new();
        for flavor in platform.flavors() {
            if flavors.contains_key(&flavor) {
                continue;
            }
            match platform.read_bytes(&flavor) {
                Some(bytes) => {
                    flavors.insert(flavor, bytes);
                }
                None => tracing::trace!(flavor = %flavor, "Flavor advertised without data"),
            }
        }
        Self::from_flavors(flavors)
    }

    /// Untruncated preview text, following the plain text > RTF > sentinel order.
    pub fn display_text(&self) -> String {
        if let Some(text) = self
            .flavors
            .get(PLAIN_TEXT)
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
            .filter(|text| !text.is_empty())
        {
            return text.to_string();
        }

        if let Some(text) = self
            .flavors
            .get(RICH_TEXT)
            .and_then(|bytes| rtf_to_plain_text(bytes))
            .filter(|text| !text.is_empty())
        {
            return text;
        }

        NO_PREVIEW.to_string()
    }

    /// Preview truncated to `limit` characters; None means unlimited.
    pub fn preview(&self, limit: Option<usize>) -> String {
        let text = self.display_text();
        match limit {
            Some(max) => truncate_chars(&text, max).to_string(),
            None => text,
        }
    }

    /// Flavor map to hand to `ClipboardPlatform::write_item`.
    pub fn restore_form(&self) -> FlavorMap {
        self.flavors.clone()
    }

    pub fn flavors(&self) -> impl Iterator<Item = &str> {
        self.flavors.keys().map(String::as_str)
    }

    pub fn flavor_count(&self) -> usize {
        self.flavors.len()
    }

    pub fn has_flavor(&self, flavor: &str) -> bool {
        self.flavors.contains_key(flavor)
    }

    pub fn bytes(&self, flavor: &str) -> Option<&[u8]> {
        self.flavors.get(flavor).map(Vec::as_slice)
    }

    /// Total payload size across flavors.
    pub fn byte_len(&self) -> usize {
        self.flavors.values().map(Vec::len).sum()
    }

    /// Short SHA-256 digest over the canonical flavor map, for logs.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for (flavor, bytes) in &self.flavors {
            hasher.update((flavor.len() as u64).to_le_bytes());
            hasher.update(flavor.as_bytes());
            hasher.update((bytes.len() as u64).to_le_bytes());
            hasher.update(bytes);
        }
        let hash = hasher.finalize();
        hex::encode(&hash[..6])
    }
}

// Never print payload bytes
impl fmt::Debug for ContentSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (flavor, bytes) in &self.flavors {
            map.entry(flavor, &format_args!("{} bytes", bytes.len()));
        }
        map.finish()
    }
}

/// Truncate to at most `max_chars` characters on a char boundary.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
