//! Collision-safe archive building for the archive path.

mod builder;
mod names;

pub use builder::{build_archive, ArchiveBlob, ArchiveBuilder};
pub use names::{with_suffix, ArchiveNameTable};
