//! Cache-line nodes: the innermost level of the matryoshka hierarchy.
//!
//! A leaf page's CL-slot array forms its own tiny B+ tree of these 64-byte
//! nodes. Unlike the page layer (whose slots can hold either a leaf page or
//! a page-internal and must read a kind tag to tell them apart), a page
//! always knows statically, from its own `sub_height`, whether a given
//! CL-slot holds a [`leaf::ClLeaf`] or an [`internal::ClInternal`] — so
//! there is no CL-level tagged union, just the two node types and the tag
//! byte each writes into its own encoding for forward-compatibility.

pub mod internal;
pub mod leaf;

pub use internal::ClInternal;
pub use leaf::ClLeaf;
