use std::path::{Path, PathBuf};

use super::ReplaceError;
use super::edit::{Edit, EditId};
use super::splice::{SpliceTarget, apply_edit};

#[derive(Clone, Debug)]
struct Pending {
    id: EditId,
    /// Coordinates in the file as it currently stands.
    edit: Edit,
}

/// The not-yet-applied edits of one file.
///
/// Edits are identified by their pristine `(offset, length)`. Applying one
/// shifts every later edit by the size change, so the remaining edits keep
/// pointing at the same bytes no matter which subset has already landed or
/// in what order.
#[derive(Clone, Debug)]
pub struct ReplacementSet {
    path: PathBuf,
    /// Sorted by id; since edits are disjoint this is also file order.
    pending: Vec<Pending>,
}

impl ReplacementSet {
    /// Collect `edits`, all expressed against the pristine file.
    ///
    /// No-op edits are dropped.
    ///
    /// # Errors
    /// Returns [`ReplaceError::Overlap`] if two edits touch the same bytes or
    /// insert at the same position.
    pub fn new(
        path: impl Into<PathBuf>,
        edits: impl IntoIterator<Item = Edit>,
    ) -> Result<Self, ReplaceError> {
        let mut pending: Vec<Pending> = edits
            .into_iter()
            .filter(|edit| !edit.is_noop())
            .map(|edit| Pending {
                id: edit.id(),
                edit,
            })
            .collect();
        pending.sort_by_key(|p| p.id);

        for pair in pending.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if a.id == b.id || a.edit.end() > b.edit.offset {
                return Err(ReplaceError::Overlap {
                    first: a.id,
                    second: b.id,
                });
            }
        }

        Ok(Self {
            path: path.into(),
            pending,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Ids of the pending edits, in file order.
    pub fn ids(&self) -> impl Iterator<Item = EditId> + '_ {
        self.pending.iter().map(|p| p.id)
    }

    /// Pending edits with their ids, in file order and current coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (EditId, &Edit)> + '_ {
        self.pending.iter().map(|p| (p.id, &p.edit))
    }

    /// The pending edit `id`, in current-file coordinates.
    #[must_use]
    pub fn get(&self, id: EditId) -> Option<&Edit> {
        self.position(id).map(|i| &self.pending[i].edit)
    }

    /// Apply the pending edit `id` to `target` and remove it from the set.
    ///
    /// `target` must hold the pristine file with exactly the already-applied
    /// edits of this set spliced in. Returns the size change.
    ///
    /// # Errors
    /// Returns [`ReplaceError::UnknownEdit`] if `id` is not pending, or any
    /// error from splicing.
    pub fn apply<T: SpliceTarget + ?Sized>(
        &mut self,
        id: EditId,
        target: &mut T,
    ) -> Result<isize, ReplaceError> {
        let index = self.position(id).ok_or(ReplaceError::UnknownEdit(id))?;
        let delta = apply_edit(target, &self.pending[index].edit)?;
        self.pending.remove(index);
        self.shift_from(index, delta)?;
        Ok(delta)
    }

    fn position(&self, id: EditId) -> Option<usize> {
        self.pending.binary_search_by_key(&id, |p| p.id).ok()
    }

    /// Every edit at or after `index` lies after the one just applied.
    fn shift_from(&mut self, index: usize, delta: isize) -> Result<(), ReplaceError> {
        if delta == 0 {
            return Ok(());
        }
        for p in &mut self.pending[index..] {
            p.edit.offset = p
                .edit
                .offset
                .checked_add_signed(delta)
                .ok_or(ReplaceError::Rebase { id: p.id, delta })?;
        }
        debug_assert!(
            self.pending
                .windows(2)
                .all(|w| w[0].edit.end() <= w[1].edit.offset),
            "pending edits out of order after shifting by {delta}"
        );
        Ok(())
    }
}
