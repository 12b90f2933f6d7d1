//! Clipboard flavor identifiers
//!
//! A flavor is one named representation of the same logical copy. Identifiers
//! are macOS uniform type identifiers; the portable backend reuses them so
//! snapshots look the same on every platform.

use std::collections::BTreeMap;

/// UTF-8 plain text
pub const PLAIN_TEXT: &str = "public.utf8-plain-text";
/// Rich Text Format
pub const RICH_TEXT: &str = "public.rtf";
/// HTML fragment
pub const HTML: &str = "public.html";
/// TIFF image (what AppKit apps put on the pasteboard for images)
pub const TIFF: &str = "public.tiff";
/// PNG image
pub const PNG: &str = "public.png";

/// Flavor identifier -> raw payload.
///
/// A BTreeMap keeps keys sorted, which gives snapshots a canonical order for
/// equality and hashing independent of capture order.
pub type FlavorMap = BTreeMap<String, Vec<u8>>;

/// Coarse classification used by the paste delay policy and previews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlavorKind {
    PlainText,
    RichText,
    Html,
    Image,
    Other,
}

impl FlavorKind {
    pub fn of(flavor: &str) -> Self {
        match flavor {
            PLAIN_TEXT => FlavorKind::PlainText,
            RICH_TEXT => FlavorKind::RichText,
            HTML => FlavorKind::Html,
            TIFF | PNG => FlavorKind::Image,
            _ => FlavorKind::Other,
        }
    }

    /// Rich text, HTML, or image: representations some apps take longer to accept.
    pub fn is_heavy(self) -> bool {
        matches!(
            self,
            FlavorKind::RichText | FlavorKind::Html | FlavorKind::Image
        )
    }
}
