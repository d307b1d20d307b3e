//! Statistical encoding detection over a bounded byte prefix.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chardetng::EncodingDetector;

use crate::encoding::charset::UTF8_BOM;
use crate::error::{CoreError, CoreResult};

/// Maximum number of bytes read from the start of a file for detection.
pub const MAX_SNIFF_BYTES: usize = 1024;

/// Detects the text encoding of the file at `path`.
///
/// Reads at most [`MAX_SNIFF_BYTES`] from the start of the file — never the
/// whole file — and guesses from that prefix alone, so the result is
/// deterministic for a fixed prefix and large files cost the same as small
/// ones. Returns `None` when the prefix gives nothing to decide on (empty
/// file) or looks like binary data; callers treat that as "unknown".
///
/// # Errors
///
/// - [`CoreError::NotFound`] — `path` does not exist.
/// - [`CoreError::PermissionDenied`] / [`CoreError::Io`] — the read failed.
pub fn detect(path: &Path) -> CoreResult<Option<String>> {
    let mut file = File::open(path).map_err(|e| CoreError::from_io(e, path))?;

    let mut buf = [0u8; MAX_SNIFF_BYTES];
    let mut len = 0;
    while len < MAX_SNIFF_BYTES {
        let n = file.read(&mut buf[len..])?;
        if n == 0 {
            break;
        }
        len += n;
    }

    Ok(sniff(&buf[..len]))
}

/// Guesses an encoding label for a raw byte prefix.
///
/// Byte-order marks win over the statistical pass, a pure-ASCII prefix is
/// reported as `ascii` directly, and a prefix containing NUL bytes (binary
/// data, BOM-less UTF-16 included) is undecidable. Everything else goes to
/// `chardetng`, whose guess is reported as a lowercased WHATWG label.
pub fn sniff(prefix: &[u8]) -> Option<String> {
    if prefix.is_empty() {
        return None;
    }
    if prefix.starts_with(&UTF8_BOM) {
        return Some("utf-8-sig".to_string());
    }
    if prefix.starts_with(&[0xFF, 0xFE]) {
        return Some("utf-16le".to_string());
    }
    if prefix.starts_with(&[0xFE, 0xFF]) {
        return Some("utf-16be".to_string());
    }
    if prefix.contains(&0) {
        return None;
    }
    if prefix.is_ascii() {
        return Some("ascii".to_string());
    }

    let mut detector = EncodingDetector::new();
    detector.feed(prefix, true);
    let encoding = detector.guess(None, true);
    Some(encoding.name().to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn sniff_empty_is_undecidable() {
        assert_eq!(sniff(b""), None);
    }

    #[test]
    fn sniff_pure_ascii() {
        assert_eq!(sniff(b"hello, world\n"), Some("ascii".to_string()));
    }

    #[test]
    fn sniff_utf8_bom() {
        assert_eq!(
            sniff(&[0xEF, 0xBB, 0xBF, b'h', b'i']),
            Some("utf-8-sig".to_string())
        );
    }

    #[test]
    fn sniff_utf16_boms() {
        assert_eq!(sniff(&[0xFF, 0xFE, b'h', 0]), Some("utf-16le".to_string()));
        assert_eq!(sniff(&[0xFE, 0xFF, 0, b'h']), Some("utf-16be".to_string()));
    }

    #[test]
    fn sniff_nul_bytes_are_binary() {
        assert_eq!(sniff(&[b'E', b'L', b'F', 0, 1, 2]), None);
    }

    #[test]
    fn sniff_utf8_text() {
        assert_eq!(
            sniff("编码转换工具，检测文件的字符编码。".as_bytes()),
            Some("utf-8".to_string())
        );
    }

    #[test]
    fn sniff_gbk_text() {
        let (bytes, _, _) =
            encoding_rs::GBK.encode("简体中文的编码检测，需要足够长的样本才稳定。");
        assert_eq!(sniff(&bytes), Some("gbk".to_string()));
    }

    #[test]
    fn sniff_is_deterministic() {
        let sample = "一段用于检测的中文文本".as_bytes();
        assert_eq!(sniff(sample), sniff(sample));
    }

    #[test]
    fn detect_reads_only_the_prefix() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("capped.txt");
        // ASCII prefix up to the cap, garbage after it
        let mut content = vec![b'a'; MAX_SNIFF_BYTES];
        content.extend_from_slice(&[0xFF, 0xFE, 0x00, 0x80]);
        fs::write(&path, &content).unwrap();

        assert_eq!(detect(&path).unwrap(), Some("ascii".to_string()));
    }

    #[test]
    fn detect_empty_file_is_none() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("empty.txt");
        fs::write(&path, "").unwrap();

        assert_eq!(detect(&path).unwrap(), None);
    }

    #[test]
    fn detect_missing_file_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let result = detect(&tmp.path().join("nope.txt"));
        assert!(matches!(result.unwrap_err(), CoreError::NotFound(_)));
    }

    #[test]
    fn detect_does_not_mutate_the_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("f.txt");
        fs::write(&path, "content").unwrap();

        detect(&path).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"content");
    }
}
