//! Bulk re-encoding of selected tree entries.

use std::path::{Path, PathBuf};

use crate::encoding::charset::{decoder_for_label, Charset};
use crate::encoding::detect::detect;
use crate::error::{CoreError, CoreResult};
use crate::tree::{DirTree, EntryId};

/// Per-entry outcome of a conversion batch.
#[derive(Debug)]
pub enum ConvertStatus {
    /// The file was decoded and rewritten in the target encoding.
    Converted {
        /// Source encoding label the file was decoded with.
        from: String,
    },
    /// The entry is a directory; conversion applies to files only.
    SkippedDirectory,
    /// The entry could not be converted. The rest of the batch still ran.
    Failed(CoreError),
}

/// One line of a [`ConversionReport`].
#[derive(Debug)]
pub struct ConvertOutcome {
    /// The handle this outcome refers to.
    pub id: EntryId,
    /// Display name of the entry, when the handle was still live.
    pub name: String,
    /// Resolved absolute path, when resolution succeeded.
    pub path: Option<PathBuf>,
    /// What happened to this entry.
    pub status: ConvertStatus,
}

/// Result of [`convert_entries`] — one outcome per selected handle, in
/// selection order. Nothing is dropped: failures appear here alongside
/// successes so the caller can surface every one.
#[derive(Debug, Default)]
pub struct ConversionReport {
    pub outcomes: Vec<ConvertOutcome>,
}

impl ConversionReport {
    /// Number of entries rewritten successfully.
    pub fn converted(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, ConvertStatus::Converted { .. }))
            .count()
    }

    /// Number of directories skipped.
    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, ConvertStatus::SkippedDirectory))
            .count()
    }

    /// Number of entries that failed.
    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, ConvertStatus::Failed(_)))
            .count()
    }
}

/// Converts the selected entries to `target`, one at a time, in selection
/// order.
///
/// Each entry is handled independently: the handle is resolved through the
/// tree's parent chain, the source encoding is re-detected from the bytes
/// currently on disk (an earlier conversion in the same batch may already
/// have rewritten the file, so cached labels are never trusted), the whole
/// file is decoded with lossy substitution, re-encoded with
/// [`Charset::encode_lossy`], and written back in place. A failure on one
/// entry never stops the batch.
///
/// After every attempt — success or failure — the entry's annotated
/// encoding and size are refreshed with a single detector pass.
///
/// Directories in the selection are reported as skipped. An empty selection
/// produces an empty report; frontends are expected to warn before calling.
pub fn convert_entries(
    tree: &mut DirTree,
    selection: &[EntryId],
    target: Charset,
) -> ConversionReport {
    let mut report = ConversionReport::default();

    for &id in selection {
        let name = tree
            .entry(id)
            .map(|e| e.name().to_string())
            .unwrap_or_default();
        let (path, status) = convert_one(tree, id, target);

        match &status {
            ConvertStatus::Converted { from } => {
                tracing::info!(
                    "converted {} from {from} to {target}",
                    display_of(&path, &name)
                );
            }
            ConvertStatus::SkippedDirectory => {
                tracing::debug!("skipped directory {}", display_of(&path, &name));
            }
            ConvertStatus::Failed(err) => {
                tracing::warn!("failed to convert {}: {err}", display_of(&path, &name));
            }
        }

        // restate the annotation from the bytes now on disk
        if tree.entry(id).is_some_and(|e| !e.is_dir()) {
            if let Err(err) = tree.refresh_file(id) {
                tracing::warn!("metadata refresh failed for {}: {err}", name);
            }
        }

        report.outcomes.push(ConvertOutcome {
            id,
            name,
            path,
            status,
        });
    }

    report
}

fn display_of(path: &Option<PathBuf>, name: &str) -> String {
    match path {
        Some(p) => p.display().to_string(),
        None => name.to_string(),
    }
}

fn convert_one(tree: &DirTree, id: EntryId, target: Charset) -> (Option<PathBuf>, ConvertStatus) {
    let entry = match tree.entry(id) {
        Some(e) => e,
        None => return (None, ConvertStatus::Failed(CoreError::StaleEntry)),
    };

    if entry.is_dir() {
        let path = tree.resolve_path(id).ok();
        return (path, ConvertStatus::SkippedDirectory);
    }

    let path = match tree.resolve_path(id) {
        Ok(p) => p,
        Err(e) => return (None, ConvertStatus::Failed(e)),
    };

    match rewrite_file(&path, target) {
        Ok(from) => (Some(path), ConvertStatus::Converted { from }),
        Err(e) => (Some(path), ConvertStatus::Failed(e)),
    }
}

/// Decodes the file with its freshly detected encoding and rewrites it in
/// `target`, in place. Returns the source label.
///
/// Decoding substitutes U+FFFD for malformed sequences rather than failing;
/// a file whose encoding cannot be detected at all (empty or binary) is
/// rejected instead of blindly rewritten. The write is a plain in-place
/// overwrite — no temp-file rename, so a crash mid-write can leave a
/// partial file.
fn rewrite_file(path: &Path, target: Charset) -> CoreResult<String> {
    let label = detect(path)?.ok_or_else(|| {
        CoreError::Decode(format!(
            "cannot determine source encoding of {}",
            path.display()
        ))
    })?;
    let decoder = decoder_for_label(&label)
        .ok_or_else(|| CoreError::Decode(format!("no decoder for detected encoding {label}")))?;

    let raw = std::fs::read(path).map_err(|e| CoreError::from_io(e, path))?;
    let (text, _, had_errors) = decoder.decode(&raw);
    if had_errors {
        tracing::warn!(
            "lossy decode of {} as {label}: malformed sequences replaced",
            path.display()
        );
    }

    let out = target.encode_lossy(&text);
    std::fs::write(path, out).map_err(|e| CoreError::from_io(e, path))?;
    Ok(label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn entry_named(tree: &DirTree, name: &str) -> EntryId {
        *tree
            .top_level()
            .iter()
            .find(|id| tree.entry(**id).unwrap().name() == name)
            .unwrap()
    }

    #[test]
    fn converts_utf8_to_gbk() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cn.txt");
        fs::write(&path, "这是一段需要重新编码的中文文本。").unwrap();

        let mut tree = DirTree::new(tmp.path()).unwrap();
        let id = entry_named(&tree, "cn.txt");

        let report = convert_entries(&mut tree, &[id], Charset::Gbk);

        assert_eq!(report.converted(), 1);
        assert!(matches!(
            report.outcomes[0].status,
            ConvertStatus::Converted { ref from } if from == "utf-8"
        ));
        let expected = encoding_rs::GBK
            .encode("这是一段需要重新编码的中文文本。")
            .0
            .into_owned();
        assert_eq!(fs::read(&path).unwrap(), expected);
    }

    #[test]
    fn ascii_round_trip_is_byte_identical() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("plain.txt");
        let original = b"just plain ascii text\nwith two lines\n".to_vec();
        fs::write(&path, &original).unwrap();

        let mut tree = DirTree::new(tmp.path()).unwrap();
        let id = entry_named(&tree, "plain.txt");

        convert_entries(&mut tree, &[id], Charset::Ascii);
        convert_entries(&mut tree, &[id], Charset::Utf8);

        assert_eq!(fs::read(&path).unwrap(), original);
    }

    #[test]
    fn gbk_file_converts_back_to_utf8() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("legacy.txt");
        let text = "历史遗留的国标编码文件，迁移到统一码。";
        let (gbk_bytes, _, _) = encoding_rs::GBK.encode(text);
        fs::write(&path, &gbk_bytes).unwrap();

        let mut tree = DirTree::new(tmp.path()).unwrap();
        let id = entry_named(&tree, "legacy.txt");

        let report = convert_entries(&mut tree, &[id], Charset::Utf8);

        assert_eq!(report.converted(), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), text);
    }

    #[test]
    fn utf8_sig_target_writes_bom_and_detects_back() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bom.txt");
        fs::write(&path, "needs a byte-order mark").unwrap();

        let mut tree = DirTree::new(tmp.path()).unwrap();
        let id = entry_named(&tree, "bom.txt");

        convert_entries(&mut tree, &[id], Charset::Utf8Sig);

        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(&[0xEF, 0xBB, 0xBF]));
        // annotation refresh picked up the rewritten bytes
        assert_eq!(tree.entry(id).unwrap().encoding(), Some("utf-8-sig"));

        // and a BOM'd file decodes back without the BOM leaking into content
        convert_entries(&mut tree, &[id], Charset::Utf8);
        assert_eq!(fs::read(&path).unwrap(), b"needs a byte-order mark");
    }

    #[test]
    fn ascii_target_substitutes_unrepresentable_chars() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mixed.txt");
        fs::write(&path, "price: 10€").unwrap();

        let mut tree = DirTree::new(tmp.path()).unwrap();
        let id = entry_named(&tree, "mixed.txt");

        let report = convert_entries(&mut tree, &[id], Charset::Ascii);

        assert_eq!(report.converted(), 1);
        assert_eq!(fs::read(&path).unwrap(), b"price: 10?");
    }

    #[test]
    fn directories_are_skipped_and_batch_continues() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("subdir")).unwrap();
        fs::write(tmp.path().join("file.txt"), "content").unwrap();

        let mut tree = DirTree::new(tmp.path()).unwrap();
        let dir_id = entry_named(&tree, "subdir");
        let file_id = entry_named(&tree, "file.txt");

        let report = convert_entries(&mut tree, &[dir_id, file_id], Charset::Utf8);

        assert_eq!(report.outcomes.len(), 2);
        assert!(matches!(
            report.outcomes[0].status,
            ConvertStatus::SkippedDirectory
        ));
        assert!(matches!(
            report.outcomes[1].status,
            ConvertStatus::Converted { .. }
        ));
    }

    #[test]
    fn vanished_file_fails_but_batch_completes() {
        let tmp = TempDir::new().unwrap();
        let doomed = tmp.path().join("doomed.txt");
        fs::write(&doomed, "x").unwrap();
        fs::write(tmp.path().join("ok.txt"), "y").unwrap();

        let mut tree = DirTree::new(tmp.path()).unwrap();
        let doomed_id = entry_named(&tree, "doomed.txt");
        let ok_id = entry_named(&tree, "ok.txt");

        fs::remove_file(&doomed).unwrap();
        let report = convert_entries(&mut tree, &[doomed_id, ok_id], Charset::Utf8);

        assert_eq!(report.failed(), 1);
        assert_eq!(report.converted(), 1);
        assert!(matches!(
            report.outcomes[0].status,
            ConvertStatus::Failed(CoreError::NotFound(_))
        ));
    }

    #[test]
    fn undetectable_file_fails_with_decode() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("blob.bin"), [0u8, 159, 146, 150]).unwrap();

        let mut tree = DirTree::new(tmp.path()).unwrap();
        let id = entry_named(&tree, "blob.bin");

        let report = convert_entries(&mut tree, &[id], Charset::Utf8);

        assert_eq!(report.failed(), 1);
        assert!(matches!(
            report.outcomes[0].status,
            ConvertStatus::Failed(CoreError::Decode(_))
        ));
        // the file was not rewritten
        assert_eq!(
            fs::read(tmp.path().join("blob.bin")).unwrap(),
            [0u8, 159, 146, 150]
        );
    }

    #[test]
    fn stale_handle_fails_the_entry() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("f.txt"), "x").unwrap();

        let mut tree = DirTree::new(tmp.path()).unwrap();
        let id = entry_named(&tree, "f.txt");
        tree.expand(tree.root_id()).unwrap(); // discards the old handle

        let report = convert_entries(&mut tree, &[id], Charset::Utf8);
        assert!(matches!(
            report.outcomes[0].status,
            ConvertStatus::Failed(CoreError::StaleEntry)
        ));
    }

    #[test]
    fn empty_selection_yields_empty_report() {
        let tmp = TempDir::new().unwrap();
        let mut tree = DirTree::new(tmp.path()).unwrap();

        let report = convert_entries(&mut tree, &[], Charset::Utf8);
        assert!(report.outcomes.is_empty());
    }

    #[test]
    fn metadata_is_refreshed_after_each_attempt() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cn.txt");
        let (gbk_bytes, _, _) = encoding_rs::GBK.encode("待转换的国标编码内容样本");
        fs::write(&path, &gbk_bytes).unwrap();

        let mut tree = DirTree::new(tmp.path()).unwrap();
        let id = entry_named(&tree, "cn.txt");
        assert_eq!(tree.entry(id).unwrap().encoding(), Some("gbk"));

        convert_entries(&mut tree, &[id], Charset::Utf8);

        let entry = tree.entry(id).unwrap();
        assert_eq!(entry.encoding(), Some("utf-8"));
        assert_eq!(entry.size_bytes(), fs::metadata(&path).unwrap().len());
    }

    #[test]
    fn mid_batch_changes_use_fresh_detection() {
        // The same file selected twice: the second pass must detect the
        // encoding written by the first, not a stale label.
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("twice.txt");
        fs::write(&path, "中文内容，先转国标再转回来").unwrap();

        let mut tree = DirTree::new(tmp.path()).unwrap();
        let id = entry_named(&tree, "twice.txt");

        let report = convert_entries(&mut tree, &[id, id], Charset::Gbk);

        assert_eq!(report.converted(), 2);
        let ConvertStatus::Converted { from } = &report.outcomes[0].status else {
            panic!("first pass should convert");
        };
        assert_eq!(from, "utf-8");
        let ConvertStatus::Converted { from } = &report.outcomes[1].status else {
            panic!("second pass should convert");
        };
        assert_eq!(from, "gbk");
    }
}
