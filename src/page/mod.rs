//! Page layer: a 4 KiB outer-tree leaf that owns its own B+ sub-tree of
//! cache-line nodes.

pub mod header;
pub mod leaf_page;

pub use header::{Layout, PageHeader};
pub use leaf_page::{DeleteOutcome, InsertOutcome, LeafPage};
