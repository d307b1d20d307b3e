//! encfm core library — UI-agnostic encoding file manager logic.
//!
//! `encfm-core` lets a frontend browse a directory tree, see each file's
//! detected character encoding and size, and bulk-convert selected files to
//! a chosen target encoding. It is intentionally decoupled from any UI
//! framework so the TUI (`encfm-tui`) and future frontends share the same
//! underlying logic.
//!
//! # Modules
//!
//! - [`tree`] — Lazily populated directory tree: [`DirTree`], [`Entry`],
//!   opaque [`EntryId`] handles.
//! - [`encoding`] — Detection over a bounded byte prefix ([`detect`]),
//!   the closed conversion target set ([`Charset`]), and bulk in-place
//!   conversion ([`convert_entries`]).
//! - [`config`] — TOML-based settings ([`Config`]).
//! - [`error`] — Unified error type ([`CoreError`]) and result alias
//!   ([`CoreResult`]).
//!
//! All operations are synchronous and single-threaded: they run to
//! completion on the calling thread, and the model assumes one interactive
//! session (stale data between refreshes is tolerated, not synchronized).

pub mod config;
pub mod encoding;
pub mod error;
pub mod tree;

pub use config::settings::Config;
pub use encoding::charset::Charset;
pub use encoding::convert::{convert_entries, ConversionReport, ConvertOutcome, ConvertStatus};
pub use encoding::detect::{detect, MAX_SNIFF_BYTES};
pub use error::{CoreError, CoreResult};
pub use tree::{Children, DirTree, Entry, EntryId};
