//! Encoding detection and conversion.
//!
//! Three pieces: [`detect`](detect::detect) sniffs a bounded byte prefix and
//! guesses a source encoding label, [`charset::Charset`] is the closed set
//! of conversion targets, and [`convert::convert_entries`] rewrites selected
//! tree entries in place with per-entry (never batch-aborting) failure
//! reporting.

pub mod charset;
pub mod convert;
pub mod detect;

pub use charset::Charset;
pub use convert::{convert_entries, ConversionReport, ConvertOutcome, ConvertStatus};
pub use detect::{detect, sniff, MAX_SNIFF_BYTES};
