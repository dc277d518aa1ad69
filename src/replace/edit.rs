//! A single byte-range replacement and its minimal-extent trimming.

use std::fmt;

/// Identity of an edit: its `(offset, length)` in the pristine file.
///
/// Ids are assigned once, when the edit list is built, and never change as
/// other edits are applied. Their ordering is the order of the edits in the
/// pristine file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EditId {
    pub offset: usize,
    pub length: usize,
}

impl fmt::Display for EditId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.offset, self.length)
    }
}

/// Replace `length` bytes at `offset` with `content`.
#[derive(Clone, PartialEq, Eq)]
pub struct Edit {
    pub offset: usize,
    pub length: usize,
    pub content: Vec<u8>,
}

impl Edit {
    #[must_use]
    pub fn new(offset: usize, length: usize, content: impl Into<Vec<u8>>) -> Self {
        Self {
            offset,
            length,
            content: content.into(),
        }
    }

    /// One past the last replaced byte, saturating at `usize::MAX` so a
    /// nonsensical range still reads as out of bounds.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.offset.saturating_add(self.length)
    }

    #[must_use]
    pub const fn id(&self) -> EditId {
        EditId {
            offset: self.offset,
            length: self.length,
        }
    }

    /// Nothing removed and nothing inserted.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.length == 0 && self.content.is_empty()
    }

    /// Change in file size once this edit is applied.
    #[must_use]
    pub fn size_delta(&self) -> isize {
        signed(self.content.len()) - signed(self.length)
    }

    /// Shrink the edit to the smallest range that still produces the same
    /// result when applied to `original`.
    ///
    /// The common suffix of the replaced bytes and the content is dropped
    /// first, then the common prefix; the offset advances by the prefix.
    /// An edit whose range falls outside `original` is returned unchanged.
    #[must_use]
    pub fn trimmed(mut self, original: &[u8]) -> Self {
        let Some(replaced) = original.get(self.offset..self.end()) else {
            return self;
        };

        let suffix = common_prefix_len(replaced.iter().rev(), self.content.iter().rev());
        self.length -= suffix;
        self.content.truncate(self.content.len() - suffix);

        let replaced = &replaced[..self.length];
        let prefix = common_prefix_len(replaced.iter(), self.content.iter());
        self.offset += prefix;
        self.length -= prefix;
        self.content.drain(..prefix);

        self
    }
}

// Lengths are bounded by in-memory buffers, which never exceed isize::MAX.
fn signed(n: usize) -> isize {
    isize::try_from(n).unwrap_or(isize::MAX)
}

fn common_prefix_len<'a>(
    a: impl Iterator<Item = &'a u8>,
    b: impl Iterator<Item = &'a u8>,
) -> usize {
    a.zip(b).take_while(|(x, y)| x == y).count()
}

impl fmt::Debug for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Edit")
            .field("offset", &self.offset)
            .field("length", &self.length)
            .field("content", &String::from_utf8_lossy(&self.content))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn splice(original: &[u8], edit: &Edit) -> Vec<u8> {
        let mut out = original.to_vec();
        out.splice(edit.offset..edit.end(), edit.content.iter().copied());
        out
    }

    #[test]
    fn trims_shared_prefix_and_suffix() {
        let original = b"int main(){return 0;}";
        let edit = Edit::new(8, 13, "(){\n  return 0;\n}");

        let trimmed = edit.clone().trimmed(original);

        assert_eq!(trimmed, Edit::new(11, 9, "\n  return 0;\n"));
        assert_eq!(splice(original, &trimmed), b"int main(){\n  return 0;\n}");
        assert_eq!(splice(original, &trimmed), splice(original, &edit));
    }

    #[test]
    fn suffix_is_trimmed_before_prefix() {
        // "aa" -> "a": suffix pass consumes the match, leaving a pure deletion
        // at the original offset.
        let original = b"xaay";
        let trimmed = Edit::new(1, 2, "a").trimmed(original);
        assert_eq!(trimmed, Edit::new(1, 1, ""));
    }

    #[test]
    fn identical_replacement_becomes_noop() {
        let original = b"abc";
        let trimmed = Edit::new(0, 3, "abc").trimmed(original);
        assert!(trimmed.is_noop());
        assert_eq!(trimmed.offset, 0);
    }

    #[test]
    fn pure_insertion_is_untouched() {
        let original = b"abc";
        let edit = Edit::new(1, 0, "zz");
        assert_eq!(edit.clone().trimmed(original), edit);
    }

    #[test]
    fn pure_deletion_is_untouched() {
        let original = b"abc";
        let edit = Edit::new(1, 2, "");
        assert_eq!(edit.clone().trimmed(original), edit);
    }

    #[test]
    fn out_of_range_edit_is_returned_unchanged() {
        let edit = Edit::new(2, 10, "x");
        assert_eq!(edit.clone().trimmed(b"abc"), edit);
    }

    #[test]
    fn overflowing_range_saturates_and_is_left_alone() {
        let edit = Edit::new(usize::MAX - 1, 5, "x");
        assert_eq!(edit.end(), usize::MAX);
        assert_eq!(edit.clone().trimmed(b"abc"), edit);
    }

    #[test]
    fn size_delta_signs() {
        assert_eq!(Edit::new(0, 3, "x").size_delta(), -2);
        assert_eq!(Edit::new(0, 1, "xyz").size_delta(), 2);
        assert_eq!(Edit::new(4, 0, "").size_delta(), 0);
    }

    proptest! {
        #[test]
        fn trimming_preserves_the_result(
            original in proptest::collection::vec(prop::sample::select(b"ab \n{}".to_vec()), 0..40),
            content in proptest::collection::vec(prop::sample::select(b"ab \n{}".to_vec()), 0..40),
            seed in any::<prop::sample::Index>(),
            span in any::<prop::sample::Index>(),
        ) {
            let offset = seed.index(original.len() + 1);
            let length = span.index(original.len() - offset + 1);
            let edit = Edit::new(offset, length, content);

            let trimmed = edit.clone().trimmed(&original);

            prop_assert_eq!(splice(&original, &trimmed), splice(&original, &edit));
            prop_assert!(trimmed.offset >= edit.offset);
            prop_assert!(trimmed.end() <= edit.end());
            prop_assert!(trimmed.content.len() <= edit.content.len());
        }

        #[test]
        fn trimming_is_idempotent(
            original in proptest::collection::vec(any::<u8>(), 0..32),
            content in proptest::collection::vec(any::<u8>(), 0..32),
            seed in any::<prop::sample::Index>(),
            span in any::<prop::sample::Index>(),
        ) {
            let offset = seed.index(original.len() + 1);
            let length = span.index(original.len() - offset + 1);
            let once = Edit::new(offset, length, content).trimmed(&original);
            let twice = once.clone().trimmed(&original);
            prop_assert_eq!(once, twice);
        }
    }
}
