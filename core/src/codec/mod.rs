pub mod cursor;
pub mod segment;
pub mod vlq;

pub use segment::{DeltaState, OriginalLocation, Segment, TableBounds};
