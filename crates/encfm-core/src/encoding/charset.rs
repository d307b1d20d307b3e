//! The closed set of conversion targets and label/codec mapping.

use std::fmt;
use std::str::FromStr;

use encoding_rs::{Encoding, GBK, UTF_8};

use crate::error::CoreError;

/// UTF-8 byte-order mark prepended by [`Charset::Utf8Sig`].
pub(crate) const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// A supported conversion target encoding.
///
/// This list is fixed and closed — frontends present it as-is and never
/// accept a free-text encoding name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Charset {
    Utf8,
    Gbk,
    Utf8Sig,
    Gb2312,
    Ascii,
}

impl Charset {
    /// All supported targets, in menu order.
    pub const ALL: [Charset; 5] = [
        Charset::Utf8,
        Charset::Gbk,
        Charset::Utf8Sig,
        Charset::Gb2312,
        Charset::Ascii,
    ];

    /// The canonical label for this target, as shown to the user and as
    /// reported by the detector.
    pub fn label(self) -> &'static str {
        match self {
            Charset::Utf8 => "utf-8",
            Charset::Gbk => "gbk",
            Charset::Utf8Sig => "utf-8-sig",
            Charset::Gb2312 => "gb2312",
            Charset::Ascii => "ascii",
        }
    }

    /// Encodes `text` in this target, substituting a placeholder for any
    /// character the target cannot represent (the encode never fails).
    ///
    /// `gbk`/`gb2312` use the `encoding_rs` GBK encoder, whose replacement
    /// for unmappable characters is a numeric character reference. `ascii`
    /// replaces non-ASCII characters with `?`. `utf-8-sig` is UTF-8 with a
    /// leading byte-order mark.
    pub fn encode_lossy(self, text: &str) -> Vec<u8> {
        match self {
            Charset::Utf8 => text.as_bytes().to_vec(),
            Charset::Utf8Sig => {
                let mut out = Vec::with_capacity(UTF8_BOM.len() + text.len());
                out.extend_from_slice(&UTF8_BOM);
                out.extend_from_slice(text.as_bytes());
                out
            }
            Charset::Gbk | Charset::Gb2312 => GBK.encode(text).0.into_owned(),
            Charset::Ascii => text
                .chars()
                .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
                .collect(),
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Charset {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Charset::ALL
            .into_iter()
            .find(|c| c.label() == s)
            .ok_or_else(|| CoreError::UnsupportedEncoding(s.to_string()))
    }
}

/// Returns the decoder for a detected label, when one exists.
///
/// `ascii` and `utf-8-sig` decode as UTF-8 (ASCII is a strict subset; the
/// UTF-8 decoder strips a leading BOM). Everything else goes through the
/// WHATWG label registry, so detector outputs like `gbk`, `big5` or
/// `windows-1252` resolve directly.
pub(crate) fn decoder_for_label(label: &str) -> Option<&'static Encoding> {
    match label {
        "ascii" | "utf-8-sig" => Some(UTF_8),
        other => Encoding::for_label(other.as_bytes()),
    }
}
