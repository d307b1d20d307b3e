use std::collections::HashSet;
use std::path::Path;

use encfm_core::{
    convert_entries, Charset, Config, ConversionReport, CoreResult, DirTree, EntryId,
};

/// Application mode — determines how input is routed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppMode {
    /// Normal tree browsing.
    Browse,
    /// Typing a new root path; the string is the input so far.
    PathInput(String),
    /// Choosing a conversion target; `selected` indexes [`Charset::ALL`].
    EncodingSelect { selected: usize },
    /// Awaiting confirmation before rewriting the marked files.
    ConfirmConvert { target: Charset },
    /// Viewing the report of the last conversion batch.
    Report,
}

/// One visible row of the tree pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Row {
    pub id: EntryId,
    pub depth: usize,
}

/// Top-level application state.
///
/// Owns the core [`DirTree`] plus view concerns: the flattened list of
/// visible rows, the cursor, the marked selection (in mark order — the
/// converter processes it in that order), and which expanded directories
/// the user has folded shut in the view.
pub struct App {
    tree: DirTree,
    config: Config,
    rows: Vec<Row>,
    cursor: usize,
    marked: Vec<EntryId>,
    collapsed: HashSet<EntryId>,
    mode: AppMode,
    status: Option<String>,
    report: Option<ConversionReport>,
    should_quit: bool,
}

impl App {
    /// Creates the application state rooted at `start_dir`.
    pub fn new(start_dir: &Path, config: Config) -> CoreResult<Self> {
        let tree = DirTree::new(start_dir)?;
        let mut app = Self {
            tree,
            config,
            rows: Vec::new(),
            cursor: 0,
            marked: Vec::new(),
            collapsed: HashSet::new(),
            mode: AppMode::Browse,
            status: None,
            report: None,
            should_quit: false,
        };
        app.rebuild_rows();
        Ok(app)
    }

    pub fn tree(&self) -> &DirTree {
        &self.tree
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn mode(&self) -> &AppMode {
        &self.mode
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn report(&self) -> Option<&ConversionReport> {
        self.report.as_ref()
    }

    pub fn is_marked(&self, id: EntryId) -> bool {
        self.marked.contains(&id)
    }

    pub fn marked_count(&self) -> usize {
        self.marked.len()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// `true` when the directory row should draw an open (`▾`) affordance.
    pub fn is_open(&self, id: EntryId) -> bool {
        !self.collapsed.contains(&id) && self.tree.children(id).is_some()
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.rows.len() {
            self.cursor += 1;
        }
    }

    pub fn cursor_top(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_bottom(&mut self) {
        self.cursor = self.rows.len().saturating_sub(1);
    }

    /// Toggles the mark on the entry under the cursor.
    pub fn toggle_mark(&mut self) {
        let Some(row) = self.rows.get(self.cursor) else {
            return;
        };
        let id = row.id;
        if let Some(pos) = self.marked.iter().position(|m| *m == id) {
            self.marked.remove(pos);
        } else {
            self.marked.push(id);
        }
    }

    /// Opens the directory under the cursor.
    ///
    /// A folded directory is simply unfolded; otherwise the node is
    /// re-expanded, which re-reads it from disk (each open is a fresh
    /// snapshot, so files added or removed outside the program show up).
    pub fn activate(&mut self) {
        let Some(row) = self.rows.get(self.cursor) else {
            return;
        };
        let id = row.id;
        let Some(entry) = self.tree.entry(id) else {
            return;
        };
        if !entry.is_dir() {
            return;
        }

        if self.collapsed.remove(&id) {
            self.rebuild_rows();
            return;
        }

        match self.tree.expand(id) {
            Ok(children) => {
                if children.is_empty() {
                    self.status = Some("directory is empty".to_string());
                }
            }
            Err(e) => {
                tracing::warn!("expand failed: {e}");
                self.status = Some(format!("cannot open: {e}"));
            }
        }
        self.rebuild_rows();
    }

    /// Folds the directory under the cursor shut (view only — the tree
    /// keeps its children so unfolding is instant).
    pub fn collapse_current(&mut self) {
        let Some(row) = self.rows.get(self.cursor) else {
            return;
        };
        let id = row.id;
        if self.tree.children(id).is_some() {
            self.collapsed.insert(id);
            self.rebuild_rows();
        }
    }

    /// Re-reads the top level of the tree from disk.
    pub fn refresh(&mut self) {
        let root = self.tree.root_id();
        if let Err(e) = self.tree.expand(root) {
            self.status = Some(format!("refresh failed: {e}"));
        }
        self.rebuild_rows();
    }

    /// Enters path-input mode, prefilled with the current root.
    pub fn open_path_input(&mut self) {
        let current = self.tree.root().display().to_string();
        self.mode = AppMode::PathInput(current);
    }

    /// Applies the typed path as the new tree root.
    ///
    /// On failure the existing tree is left fully intact and the error is
    /// shown in the status line.
    pub fn apply_path_input(&mut self) {
        let AppMode::PathInput(input) = &self.mode else {
            return;
        };
        let input = input.clone();
        match self.tree.set_root(Path::new(&input)) {
            Ok(()) => {
                self.marked.clear();
                self.collapsed.clear();
                self.cursor = 0;
                self.status = Some(format!("root: {input}"));
                self.rebuild_rows();
            }
            Err(e) => {
                self.status = Some(e.to_string());
            }
        }
        self.mode = AppMode::Browse;
    }

    /// Opens the encoding picker for the marked entries.
    ///
    /// With nothing marked this only sets a warning status, mirroring the
    /// "no files selected" notice a conversion needs a selection for.
    pub fn begin_convert(&mut self) {
        if self.marked.is_empty() {
            self.status = Some("no files selected".to_string());
            return;
        }
        let selected = Charset::ALL
            .iter()
            .position(|c| c.label() == self.config.general.default_encoding)
            .unwrap_or(0);
        self.mode = AppMode::EncodingSelect { selected };
    }

    /// Confirms the picked target, or goes straight to conversion when
    /// confirmation is disabled in the config.
    pub fn pick_encoding(&mut self, target: Charset) {
        if self.config.ui.confirm_convert {
            self.mode = AppMode::ConfirmConvert { target };
        } else {
            self.run_convert(target);
        }
    }

    /// Runs the conversion batch over the marked entries.
    pub fn run_convert(&mut self, target: Charset) {
        let selection = self.marked.clone();
        let report = convert_entries(&mut self.tree, &selection, target);
        self.status = Some(format!(
            "{} converted, {} skipped, {} failed",
            report.converted(),
            report.skipped(),
            report.failed()
        ));
        self.report = Some(report);
        self.mode = AppMode::Report;
    }

    pub fn set_mode(&mut self, mode: AppMode) {
        self.mode = mode;
    }

    /// Recomputes the flattened row list from the tree, dropping marks on
    /// discarded handles and keeping the cursor in range.
    fn rebuild_rows(&mut self) {
        let mut rows = Vec::new();
        let mut stack: Vec<(EntryId, usize)> = self
            .tree
            .top_level()
            .iter()
            .rev()
            .map(|id| (*id, 0))
            .collect();
        while let Some((id, depth)) = stack.pop() {
            rows.push(Row { id, depth });
            if self.collapsed.contains(&id) {
                continue;
            }
            if let Some(children) = self.tree.children(id) {
                for child in children.iter().rev() {
                    stack.push((*child, depth + 1));
                }
            }
        }
        self.rows = rows;
        self.marked.retain(|id| self.tree.entry(*id).is_some());
        self.collapsed.retain(|id| self.tree.entry(*id).is_some());
        if self.cursor >= self.rows.len() {
            self.cursor = self.rows.len().saturating_sub(1);
        }
    }
}
