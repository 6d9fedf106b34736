//! Build pipeline steps.

mod archive;
mod resolve;
mod stage;

pub use archive::ArchiveStep;
pub use resolve::{resolve_metadata, ResolveStep};
pub use stage::StageStep;
