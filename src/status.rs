//! Porcelain status parsing.
//!
//! Turns `git status --porcelain` text into per-column change counts,
//! decomposed into staged (index) and unstaged (working tree) sides.

/// Per-file-class change counts for one status column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeStat {
    pub added: u32,
    pub modified: u32,
    pub renamed: u32,
    pub deleted: u32,
    pub unmerged: u32,
}

impl ChangeStat {
    #[must_use]
    pub fn total(&self) -> u32 {
        self.added + self.modified + self.renamed + self.deleted + self.unmerged
    }
}

/// One parsed status report: index column vs. working-tree column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepoStatus {
    pub index: ChangeStat,
    pub working_tree: ChangeStat,
}

impl RepoStatus {
    /// Unmerged paths counted on either side.
    #[must_use]
    pub fn conflicts(&self) -> u32 {
        self.index.unmerged + self.working_tree.unmerged
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.index.total() == 0 && self.working_tree.total() == 0
    }
}

const INDEX_CHARS: &[char] = &[' ', 'A', 'C', 'D', 'M', 'R', 'U', '?', '!'];
const WORKING_TREE_CHARS: &[char] = &[' ', 'A', 'D', 'M', 'U', '?', '!'];

/// Parses porcelain status text into a [`RepoStatus`].
///
/// A line is counted only when both leading characters fall inside the
/// recognized character classes; anything else (blank lines included) is
/// ignored, not an error. The working-tree column intentionally does not
/// count `R`/`C`; the asymmetry with the index column is part of the format.
#[must_use]
pub fn parse_status(raw: &str) -> RepoStatus {
    let mut status = RepoStatus::default();

    for line in raw.lines() {
        let mut chars = line.chars();
        let (Some(index), Some(working_tree)) = (chars.next(), chars.next()) else {
            continue;
        };
        if !INDEX_CHARS.contains(&index) || !WORKING_TREE_CHARS.contains(&working_tree) {
            continue;
        }

        match index {
            'A' | 'C' => status.index.added += 1,
            'D' => status.index.deleted += 1,
            'M' => status.index.modified += 1,
            'R' => status.index.renamed += 1,
            'U' => status.index.unmerged += 1,
            _ => {}
        }

        match working_tree {
            'A' | '?' => status.working_tree.added += 1,
            'D' => status.working_tree.deleted += 1,
            'M' => status.working_tree.modified += 1,
            'U' => status.working_tree.unmerged += 1,
            _ => {}
        }
    }

    status
}
