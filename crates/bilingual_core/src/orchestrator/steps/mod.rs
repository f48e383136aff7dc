//! Pipeline step implementations.
//!
//! Each step handles one phase of an interleaving run.

mod export;
mod interleave;
mod section;
mod segment;

pub use export::ExportStep;
pub use interleave::InterleaveStep;
pub use section::SectionStep;
pub use segment::SegmentStep;
