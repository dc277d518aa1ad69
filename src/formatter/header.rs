//! Copyright banner injection.
//!
//! When a banner is configured, files that do not mention `Copyright` near
//! the top get it inserted at offset 0 as part of the formatter's edit list.

use crate::replace::Edit;

/// How far into the file to look for an existing notice.
pub const HEADER_SCAN_BYTES: usize = 300;

const MARKER: &[u8] = b"Copyright";

/// True if `original` already carries a notice in its first bytes.
#[must_use]
pub fn has_copyright(original: &[u8]) -> bool {
    let head = &original[..original.len().min(HEADER_SCAN_BYTES)];
    head.windows(MARKER.len()).any(|w| w == MARKER)
}

/// Add `banner` at the start of the file unless it already has a notice.
///
/// An edit already starting at offset 0 gets the banner prepended to its
/// content; otherwise a new insertion at offset 0 is added.
pub fn inject(original: &[u8], banner: &[u8], edits: &mut Vec<Edit>) {
    if banner.is_empty() || has_copyright(original) {
        return;
    }
    if let Some(first) = edits.iter_mut().find(|e| e.offset == 0) {
        first.content.splice(0..0, banner.iter().copied());
    } else {
        edits.insert(0, Edit::new(0, 0, banner));
    }
}
