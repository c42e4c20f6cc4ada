//! # Matryoshka-nested B+ tree index
//!
//! An ordered in-memory index over 32-bit signed keys, nested three levels
//! deep: an outer B+ tree of 4 KiB pages (or, under the superpage hierarchy,
//! 2 MiB superpages), each page a B+ sub-tree of 64 B cache-line nodes.
//! Predecessor search at the cache-line level is SIMD-accelerated
//! (AVX2/SSE2, falling back to scalar) — see `simd`.
//!
//! ## Architecture
//!
//! - **Cache-line layer** (`cl`): 64 B leaf/internal nodes, up to 15 keys
//!   per leaf, 13 separators per internal.
//! - **Page layer** (`page`): 4 KiB leaf pages, each a self-contained B+
//!   sub-tree of cache-line nodes, in one of three layouts (default, fence,
//!   eytzinger — see `page::header::Layout`).
//! - **Superpage layer** (`superpage`): 2 MiB pages-of-pages, used only
//!   under [`config::LeafGranularity::Superpage`].
//! - **Outer tree** (`btree`): routes between leaf pages or superpages.
//! - **Arena** (`alloc`): slab allocation backing every layer, with an
//!   anonymous-mapping reservation for superpage footprint.
//!
//! ## Usage
//!
//! ```
//! use matryoshka_index::Tree;
//!
//! let mut tree = Tree::create();
//! tree.insert(42);
//! assert!(tree.contains(42));
//! assert_eq!(tree.search(50), Some(42));
//! tree.delete(42);
//! assert!(!tree.contains(42));
//! ```

pub mod alloc;
pub mod btree;
pub mod cl;
pub mod config;
pub mod error;
pub mod page;
pub mod simd;
pub mod superpage;

pub use btree::{Cursor, Tree};
pub use config::HierarchyConfig;
pub use error::{MtError, Result};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facade_roundtrip() {
        let mut tree = Tree::create();
        for i in 0..1000 {
            assert!(tree.insert(i));
        }
        assert_eq!(tree.len(), 1000);
        for i in 0..1000 {
            assert!(tree.contains(i));
        }
        assert!(!tree.contains(1000));

        for i in (0..1000).step_by(2) {
            assert!(tree.delete(i));
        }
        assert_eq!(tree.len(), 500);
    }

    #[test]
    fn facade_bulk_load_and_search() {
        let keys: Vec<i32> = (0..50_000).step_by(7).collect();
        let tree = Tree::bulk_load(&keys).unwrap();
        assert_eq!(tree.search(i32::MIN), None);
        assert_eq!(tree.search(8), Some(7));
        assert_eq!(tree.len(), keys.len() as u64);
    }

    #[test]
    fn facade_superpage_hierarchy() {
        let mut tree = Tree::create_with(HierarchyConfig::superpage());
        for i in 0..20_000 {
            tree.insert(i);
        }
        assert_eq!(tree.len(), 20_000);
        assert!(tree.contains(19_999));
    }

    #[test]
    fn facade_iteration_is_sorted() {
        let mut tree = Tree::create();
        for i in (0..2000).rev() {
            tree.insert(i);
        }
        let collected: Vec<i32> = tree.iter_from(i32::MIN).collect();
        let expected: Vec<i32> = (0..2000).collect();
        assert_eq!(collected, expected);
    }
}
