//! Lazily populated directory tree.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::encoding::detect::detect;
use crate::error::{CoreError, CoreResult};
use crate::tree::entry::{Children, Entry, EntryId};

/// An in-memory view of a filesystem subtree rooted at one directory.
///
/// Directory contents are read lazily: creating the tree populates only the
/// top level, and each [`expand`](DirTree::expand) re-reads one directory
/// from disk. Nodes carry base names only; absolute paths are reconstructed
/// by walking parent handles ([`resolve_path`](DirTree::resolve_path)).
///
/// The tree assumes a single interactive session — filesystem changes made
/// underneath it are picked up on the next expansion, not synchronized.
///
/// # Examples
///
/// ```no_run
/// use encfm_core::tree::DirTree;
///
/// let tree = DirTree::new("/home/user/project").unwrap();
/// for id in tree.top_level() {
///     let entry = tree.entry(*id).unwrap();
///     println!("{} {}", entry.name(), entry.annotation());
/// }
/// ```
#[derive(Debug)]
pub struct DirTree {
    root_path: PathBuf,
    root_id: EntryId,
    nodes: HashMap<EntryId, Entry>,
    next_id: u64,
}

impl DirTree {
    /// Builds a tree rooted at `root` and populates its top level.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidPath`] — `root` does not exist or is not a directory.
    /// - [`CoreError::PermissionDenied`] / [`CoreError::Io`] — the top-level
    ///   listing failed.
    pub fn new(root: impl Into<PathBuf>) -> CoreResult<Self> {
        let root_path = root.into();
        if !root_path.is_dir() {
            return Err(CoreError::InvalidPath(root_path));
        }

        let mut tree = Self {
            root_path,
            root_id: EntryId(0),
            nodes: HashMap::new(),
            next_id: 0,
        };
        let root_id = tree.alloc(Entry::dir(String::new(), None));
        tree.root_id = root_id;
        tree.expand(root_id)?;
        Ok(tree)
    }

    /// Returns the directory this tree is rooted at.
    pub fn root(&self) -> &Path {
        &self.root_path
    }

    /// Returns the handle of the root node.
    ///
    /// The root resolves to [`root`](DirTree::root) itself and can be passed
    /// to [`expand`](DirTree::expand) to refresh the top level.
    pub fn root_id(&self) -> EntryId {
        self.root_id
    }

    /// Looks up a node by handle. Returns `None` for discarded handles.
    pub fn entry(&self, id: EntryId) -> Option<&Entry> {
        self.nodes.get(&id)
    }

    /// Returns the top-level entries (children of the root), in display order.
    pub fn top_level(&self) -> &[EntryId] {
        self.children(self.root_id).unwrap_or(&[])
    }

    /// Returns a directory's current children, if it has been expanded.
    ///
    /// `None` for files, unexpanded directories, and stale handles.
    pub fn children(&self, id: EntryId) -> Option<&[EntryId]> {
        match self.nodes.get(&id)?.children()? {
            Children::Expanded(ids) => Some(ids),
            Children::NotExpanded | Children::Empty => None,
        }
    }

    /// Re-roots the tree at `path`, discarding all current nodes.
    ///
    /// The previous tree is left fully intact when this fails, so a bad
    /// navigation target never destroys the user's current view.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidPath`] — `path` does not exist or is not a directory.
    /// - Any error from populating the new top level.
    pub fn set_root(&mut self, path: &Path) -> CoreResult<()> {
        let fresh = DirTree::new(path)?;
        *self = fresh;
        Ok(())
    }

    /// Expands a directory node, re-reading its contents from disk.
    ///
    /// Any existing children (and their whole subtrees) are discarded first,
    /// invalidating their handles — each expansion is a fresh snapshot of
    /// the filesystem, never a cached listing. Returns the new child
    /// handles in display order: directories first, then files, each
    /// partition sorted by name (case-sensitive, ascending).
    ///
    /// # Errors
    ///
    /// - [`CoreError::StaleEntry`] — `id` is not a live node.
    /// - [`CoreError::NotADirectory`] — `id` refers to a file.
    /// - [`CoreError::NotFound`] / [`CoreError::PermissionDenied`] /
    ///   [`CoreError::Io`] — the directory listing failed.
    pub fn expand(&mut self, id: EntryId) -> CoreResult<Vec<EntryId>> {
        let entry = self.nodes.get(&id).ok_or(CoreError::StaleEntry)?;
        let path = self.resolve_path(id)?;
        if !entry.is_dir() {
            return Err(CoreError::NotADirectory(path));
        }

        self.discard_children(id);

        let ids = self.populate(&path, id)?;
        let state = if ids.is_empty() {
            Children::Empty
        } else {
            Children::Expanded(ids.clone())
        };
        if let Some(entry) = self.nodes.get_mut(&id) {
            entry.set_children(state);
        }
        Ok(ids)
    }

    /// Reconstructs the absolute path of a node by walking its parent chain.
    ///
    /// Name segments are joined in root-to-leaf order onto the tree's root
    /// path; the root handle resolves to the root path itself.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::StaleEntry`] when `id` (or any ancestor) has
    /// been discarded.
    pub fn resolve_path(&self, id: EntryId) -> CoreResult<PathBuf> {
        let mut segments: Vec<&str> = Vec::new();
        let mut cursor = id;
        loop {
            let entry = self.nodes.get(&cursor).ok_or(CoreError::StaleEntry)?;
            match entry.parent() {
                Some(parent) => {
                    segments.push(entry.name());
                    cursor = parent;
                }
                None => break,
            }
        }

        let mut path = self.root_path.clone();
        for segment in segments.iter().rev() {
            path.push(segment);
        }
        Ok(path)
    }

    /// Re-detects the encoding and re-reads the size of a file entry.
    ///
    /// Used after a conversion attempt so the annotated metadata reflects
    /// the bytes now on disk. Runs exactly one detector call.
    ///
    /// # Errors
    ///
    /// - [`CoreError::StaleEntry`] — `id` is not a live node.
    /// - [`CoreError::NotFound`] / [`CoreError::PermissionDenied`] /
    ///   [`CoreError::Io`] — the file is gone or unreadable.
    pub fn refresh_file(&mut self, id: EntryId) -> CoreResult<()> {
        let path = self.resolve_path(id)?;
        let size = std::fs::metadata(&path)
            .map_err(|e| CoreError::from_io(e, &path))?
            .len();
        let encoding = detect(&path)?;
        if let Some(entry) = self.nodes.get_mut(&id) {
            entry.set_file_meta(encoding, size);
        }
        Ok(())
    }

    /// Lists `path`, partitions into directories and files, sorts each
    /// partition by name, and allocates child nodes under `parent`.
    ///
    /// Directories come first (unexpanded); files follow, annotated with
    /// their detected encoding and byte size. Children that vanish or turn
    /// unreadable mid-listing are skipped, as are names that are not valid
    /// UTF-8 — entry paths are rebuilt from name segments, so a lossy name
    /// could not be resolved back to the real file.
    fn populate(&mut self, path: &Path, parent: EntryId) -> CoreResult<Vec<EntryId>> {
        let read_dir = std::fs::read_dir(path).map_err(|e| CoreError::from_io(e, path))?;

        let mut dirs: Vec<String> = Vec::new();
        let mut files: Vec<(String, u64)> = Vec::new();

        for dir_entry in read_dir {
            let dir_entry = match dir_entry {
                Ok(e) => e,
                Err(_) => continue,
            };
            let name = match dir_entry.file_name().into_string() {
                Ok(n) => n,
                Err(raw) => {
                    tracing::warn!("skipping non-UTF-8 entry name: {:?}", raw);
                    continue;
                }
            };
            let metadata = match dir_entry.metadata() {
                Ok(m) => m,
                Err(_) => continue,
            };
            if metadata.is_dir() {
                dirs.push(name);
            } else {
                files.push((name, metadata.len()));
            }
        }

        dirs.sort();
        files.sort_by(|a, b| a.0.cmp(&b.0));

        let mut ids = Vec::with_capacity(dirs.len() + files.len());
        for name in dirs {
            ids.push(self.alloc(Entry::dir(name, Some(parent))));
        }
        for (name, size) in files {
            let file_path = path.join(&name);
            let encoding = match detect(&file_path) {
                Ok(label) => label,
                Err(e) => {
                    tracing::warn!(
                        "encoding detection failed for {}: {e}",
                        file_path.display()
                    );
                    None
                }
            };
            ids.push(self.alloc(Entry::file(name, Some(parent), encoding, size)));
        }
        Ok(ids)
    }

    /// Removes a node's child subtree from the node map, invalidating every
    /// handle in it. The node itself stays live.
    fn discard_children(&mut self, id: EntryId) {
        let mut stack: Vec<EntryId> = match self.nodes.get(&id).and_then(Entry::children) {
            Some(Children::Expanded(ids)) => ids.clone(),
            _ => return,
        };
        while let Some(child) = stack.pop() {
            if let Some(removed) = self.nodes.remove(&child) {
                if let Some(Children::Expanded(grandchildren)) = removed.children() {
                    stack.extend(grandchildren.iter().copied());
                }
            }
        }
    }

    fn alloc(&mut self, entry: Entry) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, entry);
        id
    }
}
