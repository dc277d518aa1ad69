//! Grouping attributed edits into one commit per original author.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use blamefmt_git::{Author, GitOid};

use super::Attribution;
use crate::replace::EditId;

/// Edit ids keyed by file, each list in file order.
pub type EditsByFile = BTreeMap<PathBuf, Vec<EditId>>;

/// One edit of one file with the commit it was attributed to.
#[derive(Clone, Debug)]
pub struct AttributedEdit {
    pub path: PathBuf,
    pub id: EditId,
    pub attribution: Attribution,
}

/// All edits attributed to one author, across every commit of theirs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorGroup {
    pub author: Author,
    /// Source commits the edits were attributed to.
    pub commits: BTreeSet<GitOid>,
    pub edits: EditsByFile,
}

impl AuthorGroup {
    #[must_use]
    pub fn edit_count(&self) -> usize {
        self.edits.values().map(Vec::len).sum()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.edits.keys().map(PathBuf::as_path)
    }
}

/// Edits of files that could not be attributed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnattributedGroup {
    pub edits: EditsByFile,
}

impl UnattributedGroup {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    #[must_use]
    pub fn edit_count(&self) -> usize {
        self.edits.values().map(Vec::len).sum()
    }
}

/// Every edit of the run, split by author.
#[derive(Clone, Debug, Default)]
pub struct Partition {
    /// Ordered by author, which fixes the commit order of a run.
    pub groups: BTreeMap<Author, AuthorGroup>,
    pub unattributed: UnattributedGroup,
}

impl Partition {
    /// Group `attributed` edits first by commit, then merge the commit groups
    /// by author. `unattributed` edits are kept apart.
    pub fn build(
        attributed: impl IntoIterator<Item = AttributedEdit>,
        unattributed: impl IntoIterator<Item = (PathBuf, EditId)>,
    ) -> Self {
        let mut by_commit: BTreeMap<GitOid, (Author, Vec<(PathBuf, EditId)>)> = BTreeMap::new();
        for edit in attributed {
            let Attribution { commit, author } = edit.attribution;
            by_commit
                .entry(commit)
                .or_insert_with(|| (author, Vec::new()))
                .1
                .push((edit.path, edit.id));
        }

        let mut groups: BTreeMap<Author, AuthorGroup> = BTreeMap::new();
        for (commit, (author, edits)) in by_commit {
            let group = groups.entry(author.clone()).or_insert_with(|| AuthorGroup {
                author,
                commits: BTreeSet::new(),
                edits: BTreeMap::new(),
            });
            group.commits.insert(commit);
            for (path, id) in edits {
                group.edits.entry(path).or_default().push(id);
            }
        }
        for group in groups.values_mut() {
            sort_ids(&mut group.edits);
        }

        let mut rest = UnattributedGroup::default();
        for (path, id) in unattributed {
            rest.edits.entry(path).or_default().push(id);
        }
        sort_ids(&mut rest.edits);

        Self {
            groups,
            unattributed: rest,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.unattributed.is_empty()
    }
}

fn sort_ids(edits: &mut EditsByFile) {
    for ids in edits.values_mut() {
        ids.sort_unstable();
        ids.dedup();
    }
}
