//! Tree node representation.

/// Opaque handle to a node in a [`DirTree`](crate::tree::DirTree).
///
/// Handles are never reused within a tree's lifetime: once a node is
/// discarded (its parent re-expanded, or the root changed), lookups with
/// the old handle fail rather than aliasing a new node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub(crate) u64);

/// Expansion state of a directory's children.
///
/// An unexpanded directory carries no placeholder child node; the state
/// itself tells a UI whether to draw an expansion affordance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Children {
    /// Not yet expanded — contents unknown.
    NotExpanded,
    /// Expanded; the directory contained these entries.
    Expanded(Vec<EntryId>),
    /// Expanded; the directory was empty.
    Empty,
}

/// File- or directory-specific data on an [`Entry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    File {
        /// Detected encoding label, absent until computed or when the
        /// detector could not decide (empty or binary file).
        encoding: Option<String>,
        /// File size in bytes.
        size_bytes: u64,
    },
    Directory {
        /// Lazy expansion state.
        children: Children,
    },
}

/// A single node in the directory tree.
///
/// An entry stores only its base name; the absolute path is reconstructed
/// on demand by walking parent handles up to the tree root
/// ([`DirTree::resolve_path`](crate::tree::DirTree::resolve_path)).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    name: String,
    parent: Option<EntryId>,
    kind: EntryKind,
}

impl Entry {
    /// Creates a file entry.
    pub(crate) fn file(
        name: String,
        parent: Option<EntryId>,
        encoding: Option<String>,
        size_bytes: u64,
    ) -> Self {
        Self {
            name,
            parent,
            kind: EntryKind::File {
                encoding,
                size_bytes,
            },
        }
    }

    /// Creates a directory entry in the `NotExpanded` state.
    pub(crate) fn dir(name: String, parent: Option<EntryId>) -> Self {
        Self {
            name,
            parent,
            kind: EntryKind::Directory {
                children: Children::NotExpanded,
            },
        }
    }

    /// Returns the base name of this entry (one path segment, no separators).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the handle of the parent node. `None` for the tree root.
    pub fn parent(&self) -> Option<EntryId> {
        self.parent
    }

    /// Returns `true` if this entry is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self.kind, EntryKind::Directory { .. })
    }

    /// Returns the detected encoding label. Always `None` for directories.
    pub fn encoding(&self) -> Option<&str> {
        match &self.kind {
            EntryKind::File { encoding, .. } => encoding.as_deref(),
            EntryKind::Directory { .. } => None,
        }
    }

    /// Returns the file size in bytes. Always `0` for directories.
    pub fn size_bytes(&self) -> u64 {
        match self.kind {
            EntryKind::File { size_bytes, .. } => size_bytes,
            EntryKind::Directory { .. } => 0,
        }
    }

    /// Returns the file size in whole kibibytes (floor division).
    pub fn size_kib(&self) -> u64 {
        self.size_bytes() / 1024
    }

    /// Returns the expansion state. `None` for files.
    pub fn children(&self) -> Option<&Children> {
        match &self.kind {
            EntryKind::File { .. } => None,
            EntryKind::Directory { children } => Some(children),
        }
    }

    /// Formats the encoding/size annotation shown next to a file name,
    /// e.g. `"utf-8 (2 k)"`. An undetected encoding reads as `?`.
    /// Directories have no annotation.
    pub fn annotation(&self) -> String {
        match &self.kind {
            EntryKind::File { encoding, .. } => {
                let label = encoding.as_deref().unwrap_or("?");
                format!("{label} ({} k)", self.size_kib())
            }
            EntryKind::Directory { .. } => String::new(),
        }
    }

    pub(crate) fn set_children(&mut self, state: Children) {
        if let EntryKind::Directory { children } = &mut self.kind {
            *children = state;
        }
    }

    pub(crate) fn set_file_meta(&mut self, new_encoding: Option<String>, new_size: u64) {
        if let EntryKind::File {
            encoding,
            size_bytes,
        } = &mut self.kind
        {
            *encoding = new_encoding;
            *size_bytes = new_size;
        }
    }
}
