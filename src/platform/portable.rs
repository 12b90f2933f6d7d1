//! Portable backend built on arboard.
//!
//! arboard exposes no change counter, so one is synthesized from a content
//! hash: each `change_count()` call reads the clipboard and bumps the counter
//! when the hash differs from the previous read. `flavors()` and
//! `read_bytes()` answer from that same read, which is what the engine does
//! within one poll tick.
//!
//! Only plain text and images are visible through arboard; images are
//! surfaced as the PNG flavor.

use arboard::{Clipboard, ImageData};
use std::borrow::Cow;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::Cursor;
use tracing::{debug, warn};

use super::{ClipboardPlatform, PasteSimulator};
use crate::clipboard_stack::flavor::{FlavorMap, FlavorKind, PLAIN_TEXT, PNG};
use crate::error::{Result, StackClipError};

#[derive(Default)]
struct Observed {
    text: Option<String>,
    image: Option<ImageData<'static>>,
}

impl Observed {
    fn hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.text.hash(&mut hasher);
        if let Some(image) = &self.image {
            image.width.hash(&mut hasher);
            image.height.hash(&mut hasher);
            image.bytes.hash(&mut hasher);
        }
        hasher.finish()
    }
}

pub struct ArboardClipboard {
    clipboard: Clipboard,
    change_count: i64,
    last_hash: Option<u64>,
    observed: Observed,
}

impl ArboardClipboard {
    pub fn new() -> Result<Self> {
        let clipboard = Clipboard::new()
            .map_err(|e| StackClipError::Clipboard(format!("Failed to create clipboard instance: {}", e)))?;
        let mut this = Self {
            clipboard,
            change_count: 0,
            last_hash: None,
            observed: Observed::default(),
        };
        this.refresh();
        Ok(this)
    }

    fn refresh(&mut self) {
        let observed = Observed {
            text: self.clipboard.get_text().ok().filter(|t| !t.is_empty()),
            image: self.clipboard.get_image().ok(),
        };
        let hash = observed.hash();
        if self.last_hash != Some(hash) {
            if self.last_hash.is_some() {
                self.change_count += 1;
                debug!(
                    change_count = self.change_count,
                    "Clipboard change detected via content hash"
                );
            }
            self.last_hash = Some(hash);
        }
        self.observed = observed;
    }
}

impl ClipboardPlatform for ArboardClipboard {
    fn change_count(&mut self) -> i64 {
        self.refresh();
        self.change_count
    }

    fn flavors(&mut self) -> Vec<String> {
        let mut flavors = Vec::new();
        if self.observed.text.is_some() {
            flavors.push(PLAIN_TEXT.to_string());
        }
        if self.observed.image.is_some() {
            flavors.push(PNG.to_string());
        }
        flavors
    }

    fn read_bytes(&mut self, flavor: &str) -> Option<Vec<u8>> {
        match flavor {
            PLAIN_TEXT => self.observed.text.as_ref().map(|t| t.as_bytes().to_vec()),
            PNG => {
                let image = self.observed.image.as_ref()?;
                match encode_image_to_png_bytes(image) {
                    Ok(bytes) => Some(bytes),
                    Err(e) => {
                        warn!(error = %e, "Failed to encode clipboard image as PNG, omitting flavor");
                        None
                    }
                }
            }
            _ => None,
        }
    }

    fn clear(&mut self) -> Result<()> {
        self.clipboard
            .clear()
            .map_err(|e| StackClipError::Clipboard(format!("Failed to clear clipboard: {}", e)))
    }

    fn write_item(&mut self, item: &FlavorMap) -> Result<()> {
        let write_err = |message: String| StackClipError::ClipboardWrite {
            message,
            flavor_count: item.len(),
        };

        // arboard holds one representation at a time: text wins over image.
        if let Some(text) = item
            .get(PLAIN_TEXT)
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
        {
            self.clipboard
                .set_text(text.to_string())
                .map_err(|e| write_err(format!("Failed to set clipboard text: {}", e)))?;
        } else if let Some(png) = item
            .iter()
            .find(|(flavor, _)| FlavorKind::of(flavor) == FlavorKind::Image)
            .map(|(_, bytes)| bytes)
        {
            let image = decode_png_to_image_data(png)
                .ok_or_else(|| write_err("Failed to decode stored image".into()))?;
            self.clipboard
                .set_image(image)
                .map_err(|e| write_err(format!("Failed to set clipboard image: {}", e)))?;
        } else {
            return Err(write_err(
                "no flavor this backend can write (plain text or image)".into(),
            ));
        }

        // Re-read so the write shows up as exactly one counter bump
        self.refresh();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "arboard"
    }
}

fn encode_image_to_png_bytes(image: &ImageData) -> std::result::Result<Vec<u8>, String> {
    let rgba_image = image::RgbaImage::from_raw(
        image.width as u32,
        image.height as u32,
        image.bytes.to_vec(),
    )
    .ok_or_else(|| "Failed to create RGBA image from clipboard data".to_string())?;

    let mut png_data = Vec::new();
    let mut cursor = Cursor::new(&mut png_data);
    rgba_image
        .write_to(&mut cursor, image::ImageFormat::Png)
        .map_err(|e| format!("Failed to encode image as PNG: {}", e))?;

    Ok(png_data)
}

fn decode_png_to_image_data(png_bytes: &[u8]) -> Option<ImageData<'static>> {
    let img = image::load_from_memory(png_bytes).ok()?;
    let rgba = img.to_rgba8();

    Some(ImageData {
        width: rgba.width() as usize,
        height: rgba.height() as usize,
        bytes: Cow::Owned(rgba.into_raw()),
    })
}

/// Synthetic paste is macOS-only; other platforms keep the clipboard update
/// and skip the keystroke.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedPaste;

impl PasteSimulator for UnsupportedPaste {
    fn simulate_paste(&self) -> Result<()> {
        Err(StackClipError::PasteUnsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_encode_decode_preserves_dimensions() {
        let image = ImageData {
            width: 2,
            height: 1,
            bytes: Cow::Owned(vec![255, 0, 0, 255, 0, 255, 0, 255]),
        };
        let png = encode_image_to_png_bytes(&image).unwrap();
        let decoded = decode_png_to_image_data(&png).unwrap();
        assert_eq!((decoded.width, decoded.height), (2, 1));
        assert_eq!(decoded.bytes.as_ref(), image.bytes.as_ref());
    }

    #[test]
    fn test_observed_hash_changes_with_text() {
        let a = Observed {
            text: Some("a".into()),
            image: None,
        };
        let b = Observed {
            text: Some("b".into()),
            image: None,
        };
        assert_ne!(a.hash(), b.hash());
        assert_eq!(a.hash(), Observed { text: Some("a".into()), image: None }.hash());
    }

    #[test]
    fn test_unsupported_paste_is_degraded_mode() {
        let err = UnsupportedPaste.simulate_paste().unwrap_err();
        assert!(err.is_degraded_mode());
    }
}
