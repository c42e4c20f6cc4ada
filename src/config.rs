//! Hierarchy configuration: how the matryoshka nesting maps onto a given
//! machine's memory hierarchy.
//!
//! Grounded in the original implementation's `mt_hierarchy_t`
//! (`hierarchy.c`), reworked as a plain, serializable Rust value type in the
//! style of the teacher's `BTreeConfig` (`types/mod.rs`).

use crate::page::header::Layout;
use serde::{Deserialize, Serialize};

/// Page size in bytes: header (64B) plus 63 cache-line slots (63 * 64B).
pub const PAGE_SIZE: usize = 4096;
/// Cache-line node size in bytes.
pub const CL_SIZE: usize = 64;
/// Number of CL-slots in a page after the 64-byte header.
pub const PAGE_CL_SLOTS: usize = (PAGE_SIZE - PAGE_HEADER_SIZE) / CL_SIZE;
/// Page header size in bytes.
pub const PAGE_HEADER_SIZE: usize = 64;

/// Superpage size in bytes (2 MiB), used only when [`LayoutStrategy::superpage`]
/// hierarchies are selected.
pub const SUPERPAGE_SIZE: usize = 2 * 1024 * 1024;
/// Number of page-slots in a superpage after its header.
pub const SUPERPAGE_PAGE_SLOTS: usize = (SUPERPAGE_SIZE - PAGE_HEADER_SIZE) / PAGE_SIZE;

/// Maximum keys in a CL-leaf.
pub const CL_LEAF_MAX_KEYS: usize = 15;
/// Minimum keys in a CL-leaf before it underflows (roughly half-full).
pub const CL_LEAF_MIN_KEYS: usize = CL_LEAF_MAX_KEYS / 2;
/// Maximum separators in a CL-internal node.
pub const CL_INTERNAL_MAX_SEPS: usize = 12;
/// Maximum children in a CL-internal node (`CL_INTERNAL_MAX_SEPS + 1`).
pub const CL_INTERNAL_MAX_CHILDREN: usize = CL_INTERNAL_MAX_SEPS + 1;
/// Minimum separators in a CL-internal node before underflow.
pub const CL_INTERNAL_MIN_SEPS: usize = CL_INTERNAL_MAX_SEPS / 2;

/// Maximum separators in an outer-tree internal node.
pub const OUTER_MAX_SEPS: usize = 339;
/// Maximum children in an outer-tree internal node.
pub const OUTER_MAX_CHILDREN: usize = OUTER_MAX_SEPS + 1;
/// Minimum separators in an outer-tree internal node before underflow.
pub const OUTER_MIN_SEPS: usize = OUTER_MAX_SEPS / 2;

/// Approximate maximum keys a single leaf page's CL sub-tree can hold when
/// built bottom-up (height 2: a root internal, a layer of internals capped
/// at 13 children each, and as many 15-key CL-leaves as fit in the
/// remaining CL-slots) — matches spec.md §2's "Capacity ≈ 855 keys".
pub const PAGE_MAX_KEYS_APPROX: usize = 855;
/// Minimum keys a non-root leaf page must retain (`page_max_keys / 4`, §4.3 I3).
pub const PAGE_MIN_KEYS: usize = PAGE_MAX_KEYS_APPROX / 4;
/// Conservative per-page chunk size used by bulk-load, safely under
/// [`PAGE_MAX_KEYS_APPROX`].
pub const PAGE_BULK_CHUNK_KEYS: usize = 800;

/// Maximum separators / child page indices in a superpage-internal node
/// (§6 in-memory format table).
pub const PAGE_INTERNAL_MAX_SEPS: usize = 681;
pub const PAGE_INTERNAL_MAX_CHILDREN: usize = 682;
pub const PAGE_INTERNAL_MIN_SEPS: usize = PAGE_INTERNAL_MAX_SEPS / 2;

/// Approximate maximum keys a superpage can hold (§2: "Capacity ≈ 436 000 keys").
pub const SUPERPAGE_MAX_KEYS_APPROX: usize = 436_000;
/// Minimum keys a non-root superpage must retain, mirroring [`PAGE_MIN_KEYS`]'s
/// quarter-of-capacity rule at superpage granularity.
pub const SUPERPAGE_MIN_KEYS: usize = SUPERPAGE_MAX_KEYS_APPROX / 4;
/// Conservative per-superpage chunk size used by bulk-load.
pub const SUPERPAGE_BULK_CHUNK_KEYS: usize = 400_000;

/// Whether the outer tree's leaves are 4 KiB pages directly, or 2 MiB
/// superpages that are themselves a page-level B+ sub-tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeafGranularity {
    /// Outer-tree leaves are ordinary 4 KiB pages.
    Page,
    /// Outer-tree leaves are 2 MiB superpages, each containing a B+
    /// sub-tree of 4 KiB pages (reusing the page-level algorithms
    /// unchanged).
    Superpage,
}

/// Configuration for how the nested tree maps onto memory.
///
/// Constructed via one of the named presets (`default`, `fence`,
/// `eytzinger`, `superpage`) or via [`HierarchyConfig::custom`] for a
/// hand-tuned byte budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyConfig {
    pub leaf_layout: Layout,
    pub leaf_granularity: LeafGranularity,
    /// Bytes reserved per leaf allocation unit (4 KiB page, or 2 MiB
    /// superpage when `leaf_granularity` is `Superpage`).
    pub leaf_alloc_bytes: usize,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self::default_layout()
    }
}

impl HierarchyConfig {
    /// DEFAULT leaf layout, page-granular leaves.
    pub fn default_layout() -> Self {
        Self {
            leaf_layout: Layout::Default,
            leaf_granularity: LeafGranularity::Page,
            leaf_alloc_bytes: PAGE_SIZE,
        }
    }

    /// FENCE leaf layout (header-resident fence-key cache), page-granular.
    pub fn fence() -> Self {
        Self {
            leaf_layout: Layout::Fence,
            leaf_granularity: LeafGranularity::Page,
            leaf_alloc_bytes: PAGE_SIZE,
        }
    }

    /// EYTZINGER leaf layout, page-granular.
    pub fn eytzinger() -> Self {
        Self {
            leaf_layout: Layout::Eytzinger,
            leaf_granularity: LeafGranularity::Page,
            leaf_alloc_bytes: PAGE_SIZE,
        }
    }

    /// Page-level leaf layout, but leaves are allocated as 2 MiB superpages
    /// each holding a B+ sub-tree of pages.
    pub fn superpage() -> Self {
        Self {
            leaf_layout: Layout::Default,
            leaf_granularity: LeafGranularity::Superpage,
            leaf_alloc_bytes: SUPERPAGE_SIZE,
        }
    }

    /// A hand-tuned hierarchy. `leaf_alloc_bytes` must be a multiple of
    /// [`PAGE_SIZE`]; granularity is inferred from whether it equals one
    /// page or spans multiple (superpage-like).
    ///
    /// Mirrors `mt_hierarchy_init_custom`'s byte-budget derivation: capacity
    /// at each level is computed from the allocation size rather than
    /// hardcoded, so unusually small or large leaf allocations still produce
    /// a consistent hierarchy.
    pub fn custom(leaf_layout: Layout, leaf_alloc_bytes: usize) -> Self {
        let leaf_granularity = if leaf_alloc_bytes <= PAGE_SIZE {
            LeafGranularity::Page
        } else {
            LeafGranularity::Superpage
        };
        Self {
            leaf_layout,
            leaf_granularity,
            leaf_alloc_bytes,
        }
    }

    /// Number of CL-slots available per leaf page under this hierarchy.
    pub fn page_cl_slots(&self) -> usize {
        (PAGE_SIZE - PAGE_HEADER_SIZE) / CL_SIZE
    }
}
