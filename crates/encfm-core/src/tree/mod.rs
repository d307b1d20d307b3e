//! Directory tree model.
//!
//! [`DirTree`] maintains a lazily-expanded view of a filesystem subtree.
//! Nodes ([`entry::Entry`]) are addressed by opaque [`entry::EntryId`]
//! handles and store base names only; absolute paths are reconstructed by
//! walking parent handles.

pub mod entry;
pub mod model;

pub use entry::{Children, Entry, EntryId};
pub use model::DirTree;
