//! Outer B+ tree: the top level of the nested hierarchy (§4.3).
//!
//! Routes down through [`outer::OuterInternal`] nodes to a leaf page or
//! superpage, which in turn owns the cache-line-granularity sub-tree
//! described in `page`/`superpage`/`cl`.

mod cursor;
mod outer;
mod tree;

pub use cursor::Cursor;
pub use outer::ChildRef;
pub use tree::Tree;
