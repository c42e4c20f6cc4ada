//! Superpage leaf (optional, §4.4): a 2 MiB outer-tree leaf whose own
//! page-slot array forms a B+ sub-tree of ordinary 4 KiB [`LeafPage`]s,
//! exactly mirroring the page/CL-node nesting one level up. Selected via
//! [`crate::config::HierarchyConfig::superpage`].
//!
//! Page-level internal routing nodes ([`PageInternal`]) have the same
//! insert-at-split-point / borrow / merge contract as
//! [`crate::btree::outer::OuterInternal`] and
//! [`crate::cl::internal::ClInternal`] — this crate's B+ nesting reuses one
//! shape at three granularities rather than inventing a new one per level.

use crate::alloc::reserve_arena;
use crate::config::{
    PAGE_INTERNAL_MAX_CHILDREN, PAGE_INTERNAL_MAX_SEPS, PAGE_INTERNAL_MIN_SEPS, PAGE_MIN_KEYS,
    SUPERPAGE_PAGE_SLOTS, SUPERPAGE_SIZE,
};
use crate::error::{MtError, Result};
use crate::page::header::Layout;
use crate::page::leaf_page::{even_group_sizes, DeleteOutcome as PageDeleteOutcome, InsertOutcome as PageInsertOutcome, LeafPage};
use crate::simd;

#[derive(Debug, Clone)]
enum PageSlot {
    Leaf(LeafPage),
    Internal(PageInternal),
}

#[derive(Debug, Clone)]
struct PageInternal {
    seps: Vec<i32>,
    children: Vec<u16>,
}

impl PageInternal {
    fn new(left: u16, right: u16, separator: i32) -> Self {
        Self {
            seps: vec![separator],
            children: vec![left, right],
        }
    }

    fn nseps(&self) -> usize {
        self.seps.len()
    }

    fn is_full(&self) -> bool {
        self.seps.len() >= PAGE_INTERNAL_MAX_SEPS
    }

    fn underflows(&self) -> bool {
        self.seps.len() < PAGE_INTERNAL_MIN_SEPS
    }

    fn child_index(&self, key: i32) -> usize {
        simd::upper_bound(&self.seps, key)
    }

    fn child_at(&self, idx: usize) -> u16 {
        self.children[idx]
    }

    fn insert_split(&mut self, child_idx: usize, separator: i32, new_right: u16) {
        debug_assert!(!self.is_full());
        self.seps.insert(child_idx, separator);
        self.children.insert(child_idx + 1, new_right);
    }

    fn remove_child(&mut self, child_idx: usize) {
        let sep_idx = if child_idx == 0 { 0 } else { child_idx - 1 };
        self.seps.remove(sep_idx);
        self.children.remove(child_idx);
    }

    fn replace_separator(&mut self, idx: usize, key: i32) {
        self.seps[idx] = key;
    }

    fn prepend(&mut self, sep: i32, child: u16) {
        debug_assert!(!self.is_full());
        self.seps.insert(0, sep);
        self.children.insert(0, child);
    }

    fn merge(&mut self, sep: i32, other: &PageInternal) {
        debug_assert!(self.seps.len() + 1 + other.seps.len() <= PAGE_INTERNAL_MAX_SEPS);
        self.seps.push(sep);
        self.seps.extend_from_slice(&other.seps);
        self.children.extend_from_slice(&other.children);
    }

    fn split(&mut self) -> (i32, PageInternal) {
        debug_assert!(self.is_full());
        let mid = self.seps.len() / 2;
        let promoted = self.seps[mid];
        let right_seps = self.seps.split_off(mid + 1);
        self.seps.truncate(mid);
        let right_children = self.children.split_off(mid + 1);
        (promoted, PageInternal { seps: right_seps, children: right_children })
    }
}

pub enum InsertOutcome {
    Inserted,
    Duplicate,
    SuperpageFull,
}

pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

enum SlotInsertResult {
    Duplicate,
    Inserted,
    Split { separator: i32, new_slot: u16 },
}

enum SlotDeleteResult {
    NotFound,
    Deleted { underflow: bool },
}

/// A 2 MiB outer-tree leaf: a page-slot array forming a B+ sub-tree of
/// ordinary leaf pages. `prev`/`next` link to neighbouring superpages in
/// the tree's global in-order chain (§I6); the page-to-page chain *within*
/// a superpage is purely local (`local_prev`/`local_next` on each
/// [`LeafPage`] slot), crossing to the neighbour superpage's `first_page`/
/// `last_page` only at the boundary.
pub struct Superpage {
    slots: Vec<Option<PageSlot>>,
    free: Vec<u16>,
    root: u16,
    sub_height: usize,
    count: u64,
    first_page: u16,
    last_page: u16,
    prev: Option<u32>,
    next: Option<u32>,
    /// Page-aligned anonymous mapping reserved for this superpage's
    /// footprint (§4.5); the sub-tree itself is stored as ordinary Rust
    /// values in `slots` rather than serialized into these bytes — see
    /// DESIGN.md for why.
    _reservation: memmap2::MmapMut,
}

impl Superpage {
    pub fn new() -> Self {
        let reservation = reserve_arena(SUPERPAGE_SIZE).expect("anonymous superpage mapping");
        let mut sp = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: 0,
            sub_height: 0,
            count: 0,
            first_page: 0,
            last_page: 0,
            prev: None,
            next: None,
            _reservation: reservation,
        };
        let leaf = LeafPage::new(Layout::Default);
        sp.slots.push(Some(PageSlot::Leaf(leaf)));
        sp.root = 0;
        sp.first_page = 0;
        sp.last_page = 0;
        sp
    }

    pub fn len(&self) -> u64 {
        self.count
    }

    pub fn prev_superpage(&self) -> Option<u32> {
        self.prev
    }

    pub fn next_superpage(&self) -> Option<u32> {
        self.next
    }

    pub fn set_prev_superpage(&mut self, id: Option<u32>) {
        self.prev = id;
    }

    pub fn set_next_superpage(&mut self, id: Option<u32>) {
        self.next = id;
    }

    pub fn first_key(&self) -> Option<i32> {
        self.leftmost_leaf(self.root).first_key()
    }

    fn leftmost_leaf(&self, slot: u16) -> &LeafPage {
        match self.slot_at(slot) {
            PageSlot::Leaf(p) => p,
            PageSlot::Internal(node) => self.leftmost_leaf(node.child_at(0)),
        }
    }

    fn slot_at(&self, idx: u16) -> &PageSlot {
        self.slots[idx as usize].as_ref().expect("live page slot")
    }

    fn slot_at_mut(&mut self, idx: u16) -> &mut PageSlot {
        self.slots[idx as usize].as_mut().expect("live page slot")
    }

    fn alloc_slot(&mut self, slot: PageSlot) -> Option<u16> {
        if let Some(idx) = self.free.pop() {
            self.slots[idx as usize] = Some(slot);
            Some(idx)
        } else if self.slots.len() < SUPERPAGE_PAGE_SLOTS {
            self.slots.push(Some(slot));
            Some((self.slots.len() - 1) as u16)
        } else {
            None
        }
    }

    fn free_slot(&mut self, idx: u16) {
        self.slots[idx as usize] = None;
        self.free.push(idx);
    }

    fn free_count(&self) -> usize {
        SUPERPAGE_PAGE_SLOTS - (self.slots.len() - self.free.len())
    }

    // ---- search ----

    pub fn contains(&self, key: i32) -> bool {
        self.search_page(key).contains(key)
    }

    /// Predecessor of `query` within this superpage's own page chain.
    /// `None` means the answer (if any) lies in an earlier superpage — the
    /// page located for `query` and every page before it in this superpage
    /// held nothing `<= query`.
    pub fn predecessor(&self, query: i32) -> Option<i32> {
        let local_id = self.locate_page(query);
        if let Some(p) = self.page_predecessor(local_id, query) {
            return Some(p);
        }
        // No predecessor in the located page means every key it holds is
        // > query; by B+ ordering the answer, if any, is the previous
        // page's maximum key.
        self.local_prev(local_id)
            .and_then(|prev| self.page_predecessor(prev, i32::MAX))
    }

    fn search_page(&self, key: i32) -> &LeafPage {
        let mut slot = self.root;
        loop {
            match self.slot_at(slot) {
                PageSlot::Leaf(p) => return p,
                PageSlot::Internal(node) => {
                    let idx = node.child_index(key);
                    slot = node.child_at(idx);
                }
            }
        }
    }

    // ---- insert ----

    pub fn insert(&mut self, key: i32) -> InsertOutcome {
        if self.contains(key) {
            return InsertOutcome::Duplicate;
        }
        if self.free_count() < self.sub_height + 2 {
            return InsertOutcome::SuperpageFull;
        }
        match self.insert_rec(self.root, self.sub_height, key) {
            SlotInsertResult::Duplicate => InsertOutcome::Duplicate,
            SlotInsertResult::Inserted => {
                self.count += 1;
                InsertOutcome::Inserted
            }
            SlotInsertResult::Split { separator, new_slot } => {
                let node = PageInternal::new(self.root, new_slot, separator);
                let new_root = match self.alloc_slot(PageSlot::Internal(node)) {
                    Some(s) => s,
                    None => return InsertOutcome::SuperpageFull,
                };
                self.root = new_root;
                self.sub_height += 1;
                self.count += 1;
                InsertOutcome::Inserted
            }
        }
    }

    fn insert_rec(&mut self, slot: u16, height: usize, key: i32) -> SlotInsertResult {
        if height == 0 {
            let page = match self.slot_at_mut(slot) {
                PageSlot::Leaf(p) => p,
                PageSlot::Internal(_) => unreachable!("height 0 slot must be a leaf page"),
            };
            return match page.insert(key) {
                PageInsertOutcome::Inserted => SlotInsertResult::Inserted,
                PageInsertOutcome::Duplicate => SlotInsertResult::Duplicate,
                PageInsertOutcome::PageFull => {
                    let (right, separator) = page.split();
                    let new_slot = self
                        .alloc_slot(PageSlot::Leaf(right))
                        .expect("slot budget reserved before descent");
                    self.splice_leaf_neighbours(slot, new_slot);
                    let target = if key < separator { slot } else { new_slot };
                    let target_page = match self.slot_at_mut(target) {
                        PageSlot::Leaf(p) => p,
                        PageSlot::Internal(_) => unreachable!(),
                    };
                    let outcome = target_page.insert(key);
                    debug_assert!(matches!(outcome, PageInsertOutcome::Inserted));
                    SlotInsertResult::Split { separator, new_slot }
                }
            };
        }

        let (child_idx, child_slot) = match self.slot_at(slot) {
            PageSlot::Internal(node) => {
                let idx = node.child_index(key);
                (idx, node.child_at(idx))
            }
            PageSlot::Leaf(_) => unreachable!("height > 0 slot must be internal"),
        };
        match self.insert_rec(child_slot, height - 1, key) {
            SlotInsertResult::Duplicate => SlotInsertResult::Duplicate,
            SlotInsertResult::Inserted => SlotInsertResult::Inserted,
            SlotInsertResult::Split { separator, new_slot } => {
                let node = match self.slot_at_mut(slot) {
                    PageSlot::Internal(n) => n,
                    _ => unreachable!(),
                };
                if !node.is_full() {
                    node.insert_split(child_idx, separator, new_slot);
                    SlotInsertResult::Inserted
                } else {
                    let (promoted, mut right) = node.split();
                    let mid = node.nseps();
                    if child_idx <= mid {
                        node.insert_split(child_idx, separator, new_slot);
                    } else {
                        right.insert_split(child_idx - mid - 1, separator, new_slot);
                    }
                    let right_slot = self
                        .alloc_slot(PageSlot::Internal(right))
                        .expect("slot budget reserved before descent");
                    SlotInsertResult::Split { separator: promoted, new_slot: right_slot }
                }
            }
        }
    }

    /// Splice a freshly-split right-hand leaf page into the *local*
    /// page-to-page chain right after `left`.
    fn splice_leaf_neighbours(&mut self, left: u16, right: u16) {
        let old_next = match self.slot_at(left) {
            PageSlot::Leaf(p) => p.next_page(),
            _ => unreachable!(),
        };
        if let PageSlot::Leaf(p) = self.slot_at_mut(right) {
            p.set_prev_page(Some(left as u32));
            p.set_next_page(old_next);
        }
        if let PageSlot::Leaf(p) = self.slot_at_mut(left) {
            p.set_next_page(Some(right as u32));
        }
        if let Some(n) = old_next {
            if let PageSlot::Leaf(p) = self.slot_at_mut(n as u16) {
                p.set_prev_page(Some(right as u32));
            }
        } else {
            self.last_page = right;
        }
    }

    // ---- delete ----

    pub fn delete(&mut self, key: i32) -> DeleteOutcome {
        match self.delete_rec(self.root, self.sub_height, key) {
            SlotDeleteResult::NotFound => DeleteOutcome::NotFound,
            SlotDeleteResult::Deleted { .. } => {
                self.count -= 1;
                self.collapse_root_if_needed();
                DeleteOutcome::Deleted
            }
        }
    }

    fn collapse_root_if_needed(&mut self) {
        while self.sub_height > 0 {
            let only_child = match self.slot_at(self.root) {
                PageSlot::Internal(node) if node.nseps() == 0 => Some(node.child_at(0)),
                _ => None,
            };
            match only_child {
                Some(child) => {
                    self.free_slot(self.root);
                    self.root = child;
                    self.sub_height -= 1;
                }
                None => break,
            }
        }
    }

    fn delete_rec(&mut self, slot: u16, height: usize, key: i32) -> SlotDeleteResult {
        if height == 0 {
            let page = match self.slot_at_mut(slot) {
                PageSlot::Leaf(p) => p,
                _ => unreachable!(),
            };
            return match page.delete(key) {
                PageDeleteOutcome::NotFound => SlotDeleteResult::NotFound,
                PageDeleteOutcome::Deleted => {
                    let underflow = page.len() < PAGE_MIN_KEYS;
                    SlotDeleteResult::Deleted { underflow }
                }
            };
        }

        let (child_idx, child_slot) = match self.slot_at(slot) {
            PageSlot::Internal(node) => {
                let idx = node.child_index(key);
                (idx, node.child_at(idx))
            }
            _ => unreachable!(),
        };
        match self.delete_rec(child_slot, height - 1, key) {
            SlotDeleteResult::NotFound => SlotDeleteResult::NotFound,
            SlotDeleteResult::Deleted { underflow } => {
                if underflow {
                    self.rebalance_child(slot, child_idx, height - 1);
                }
                let still_underflows = match self.slot_at(slot) {
                    PageSlot::Internal(node) => node.underflows(),
                    _ => unreachable!(),
                };
                SlotDeleteResult::Deleted { underflow: still_underflows }
            }
        }
    }

    fn rebalance_child(&mut self, parent: u16, child_idx: usize, child_height: usize) {
        let has_left = child_idx > 0;
        let (sibling_idx, child_slot, left_is_sibling) = if has_left {
            let node = match self.slot_at(parent) {
                PageSlot::Internal(n) => n,
                _ => unreachable!(),
            };
            (child_idx - 1, node.child_at(child_idx), true)
        } else {
            let node = match self.slot_at(parent) {
                PageSlot::Internal(n) => n,
                _ => unreachable!(),
            };
            (child_idx + 1, node.child_at(child_idx), false)
        };
        let sibling_slot = match self.slot_at(parent) {
            PageSlot::Internal(node) => node.child_at(sibling_idx),
            _ => unreachable!(),
        };
        let (left_slot, right_slot, sep_idx) = if left_is_sibling {
            (sibling_slot, child_slot, sibling_idx)
        } else {
            (child_slot, sibling_slot, child_idx)
        };

        if child_height == 0 {
            self.rebalance_leaf_pair(parent, sep_idx, left_slot, right_slot);
        } else {
            self.rebalance_internal_pair(parent, sep_idx, left_slot, right_slot);
        }
    }

    fn rebalance_leaf_pair(&mut self, parent: u16, sep_idx: usize, left: u16, right: u16) {
        let left_keys = match self.slot_at(left) {
            PageSlot::Leaf(p) => p.extract_sorted(),
            _ => unreachable!(),
        };
        let right_keys = match self.slot_at(right) {
            PageSlot::Leaf(p) => p.extract_sorted(),
            _ => unreachable!(),
        };
        let total = left_keys.len() + right_keys.len();

        if total > 2 * PAGE_MIN_KEYS {
            let mut combined = left_keys;
            combined.extend(right_keys);
            let mid = combined.len() / 2;
            if let PageSlot::Leaf(p) = self.slot_at_mut(left) {
                p.rebuild_from_sorted(&combined[..mid]);
            }
            if let PageSlot::Leaf(p) = self.slot_at_mut(right) {
                p.rebuild_from_sorted(&combined[mid..]);
            }
            let new_sep = combined[mid];
            match self.slot_at_mut(parent) {
                PageSlot::Internal(node) => node.replace_separator(sep_idx, new_sep),
                _ => unreachable!(),
            }
        } else {
            let mut combined = left_keys;
            combined.extend(right_keys);
            let right_next = match self.slot_at(right) {
                PageSlot::Leaf(p) => p.next_page(),
                _ => unreachable!(),
            };
            if let PageSlot::Leaf(p) = self.slot_at_mut(left) {
                p.rebuild_from_sorted(&combined);
                p.set_next_page(right_next);
            }
            if let Some(n) = right_next {
                if let PageSlot::Leaf(p) = self.slot_at_mut(n as u16) {
                    p.set_prev_page(Some(left as u32));
                }
            } else {
                self.last_page = left;
            }
            self.free_slot(right);
            match self.slot_at_mut(parent) {
                PageSlot::Internal(node) => node.remove_child(sep_idx + 1),
                _ => unreachable!(),
            }
        }
    }

    fn rebalance_internal_pair(&mut self, parent: u16, sep_idx: usize, left: u16, right: u16) {
        let left_nseps = match self.slot_at(left) {
            PageSlot::Internal(n) => n.nseps(),
            _ => unreachable!(),
        };
        if left_nseps > PAGE_INTERNAL_MIN_SEPS {
            let old_sep = match self.slot_at(parent) {
                PageSlot::Internal(n) => n.seps[sep_idx],
                _ => unreachable!(),
            };
            let (l_last_child, l_last_sep) = match self.slot_at_mut(left) {
                PageSlot::Internal(n) => {
                    let lc = n.children[n.nseps()];
                    let ls = n.seps[n.nseps() - 1];
                    n.remove_child(n.nseps());
                    (lc, ls)
                }
                _ => unreachable!(),
            };
            if let PageSlot::Internal(n) = self.slot_at_mut(right) {
                n.prepend(old_sep, l_last_child);
            }
            if let PageSlot::Internal(n) = self.slot_at_mut(parent) {
                n.replace_separator(sep_idx, l_last_sep);
            }
            return;
        }
        let right_nseps = match self.slot_at(right) {
            PageSlot::Internal(n) => n.nseps(),
            _ => unreachable!(),
        };
        if right_nseps > PAGE_INTERNAL_MIN_SEPS {
            let old_sep = match self.slot_at(parent) {
                PageSlot::Internal(n) => n.seps[sep_idx],
                _ => unreachable!(),
            };
            let (r_first_child, r_first_sep) = match self.slot_at_mut(right) {
                PageSlot::Internal(n) => {
                    let rc = n.children[0];
                    let rs = n.seps[0];
                    n.remove_child(0);
                    (rc, rs)
                }
                _ => unreachable!(),
            };
            let left_nseps2 = match self.slot_at(left) {
                PageSlot::Internal(n) => n.nseps(),
                _ => unreachable!(),
            };
            if let PageSlot::Internal(n) = self.slot_at_mut(left) {
                n.insert_split(left_nseps2, old_sep, r_first_child);
            }
            if let PageSlot::Internal(n) = self.slot_at_mut(parent) {
                n.replace_separator(sep_idx, r_first_sep);
            }
            return;
        }
        let sep = match self.slot_at(parent) {
            PageSlot::Internal(n) => n.seps[sep_idx],
            _ => unreachable!(),
        };
        let right_node = match self.slots[right as usize].take().expect("live slot") {
            PageSlot::Internal(n) => n,
            _ => unreachable!(),
        };
        self.free.push(right);
        if let PageSlot::Internal(n) = self.slot_at_mut(left) {
            n.merge(sep, &right_node);
        }
        if let PageSlot::Internal(n) = self.slot_at_mut(parent) {
            n.remove_child(sep_idx + 1);
        }
    }

    // ---- bulk structural operations ----

    pub fn extract_sorted(&self) -> Vec<i32> {
        let mut out = Vec::with_capacity(self.count as usize);
        self.extract_rec(self.root, self.sub_height, &mut out);
        out
    }

    fn extract_rec(&self, slot: u16, height: usize, out: &mut Vec<i32>) {
        match self.slot_at(slot) {
            PageSlot::Leaf(p) => out.extend_from_slice(&p.extract_sorted()),
            PageSlot::Internal(node) => {
                let children = node.children.clone();
                for child in children {
                    self.extract_rec(child, height - 1, out);
                }
            }
        }
    }

    /// Rebuild the whole page-slot sub-tree from a sorted, duplicate-free
    /// key slice, bottom-up, exactly mirroring
    /// [`LeafPage::rebuild_from_sorted`] one level up.
    pub fn rebuild_from_sorted(&mut self, keys: &[i32]) {
        self.slots.clear();
        self.free.clear();
        self.count = keys.len() as u64;

        if keys.is_empty() {
            let slot = self.alloc_slot(PageSlot::Leaf(LeafPage::new(Layout::Default))).unwrap();
            self.root = slot;
            self.sub_height = 0;
            self.first_page = slot;
            self.last_page = slot;
            return;
        }

        let page_cap = crate::config::PAGE_BULK_CHUNK_KEYS;
        let mut level: Vec<(u16, i32)> = Vec::new();
        let mut i = 0;
        let mut prev_slot: Option<u16> = None;
        let mut first_slot = None;
        while i < keys.len() {
            let end = (i + page_cap).min(keys.len());
            let page = LeafPage::bulk_load(Layout::Default, &keys[i..end]);
            let first = page.first_key().unwrap();
            let slot = self.alloc_slot(PageSlot::Leaf(page)).expect("superpage sized to fit its own bulk_load input");
            if first_slot.is_none() {
                first_slot = Some(slot);
            }
            if let Some(p) = prev_slot {
                if let PageSlot::Leaf(pg) = self.slot_at_mut(p) {
                    pg.set_next_page(Some(slot as u32));
                }
                if let PageSlot::Leaf(pg) = self.slot_at_mut(slot) {
                    pg.set_prev_page(Some(p as u32));
                }
            }
            prev_slot = Some(slot);
            level.push((slot, first));
            i = end;
        }
        self.first_page = first_slot.unwrap();
        self.last_page = prev_slot.unwrap();

        let mut height = 0usize;
        while level.len() > 1 {
            let mut next_level = Vec::new();
            let mut j = 0;
            for size in even_group_sizes(level.len(), PAGE_INTERNAL_MAX_CHILDREN) {
                let group = &level[j..j + size];
                let mut node = PageInternal::new(group[0].0, group[1].0, group[1].1);
                for pair in &group[2..] {
                    node.insert_split(node.nseps(), pair.1, pair.0);
                }
                let slot = self.alloc_slot(PageSlot::Internal(node)).expect("superpage sized to fit its own bulk_load input");
                next_level.push((slot, group[0].1));
                j += size;
            }
            level = next_level;
            height += 1;
        }

        self.root = level[0].0;
        self.sub_height = height;
    }

    /// Split this superpage in half, returning the new right sibling and
    /// its first key as separator for the outer tree.
    pub fn split(&mut self) -> (Superpage, i32) {
        let all = self.extract_sorted();
        let mid = all.len() / 2;
        self.rebuild_from_sorted(&all[..mid]);
        let mut right = Superpage::new();
        right.rebuild_from_sorted(&all[mid..]);
        let separator = right.first_key().expect("split half is never empty");
        (right, separator)
    }

    pub fn bulk_load(keys: &[i32]) -> Self {
        let mut sp = Superpage::new();
        sp.rebuild_from_sorted(keys);
        sp
    }

    /// Verify this superpage's page-slot sub-tree: key count matches
    /// `count`, keys are strictly ascending, and no non-root page-internal
    /// underflows. Recurses into each leaf page's own `validate`.
    pub fn validate(&self) -> Result<()> {
        let keys = self.extract_sorted();
        if keys.len() as u64 != self.count {
            return Err(MtError::corruption(format!(
                "superpage key count {} does not match recorded count {}",
                keys.len(),
                self.count
            )));
        }
        if !keys.windows(2).all(|w| w[0] < w[1]) {
            return Err(MtError::corruption("superpage keys are not strictly ascending"));
        }
        self.validate_occupancy(self.root, self.sub_height, true)
    }

    fn validate_occupancy(&self, slot: u16, height: usize, is_root: bool) -> Result<()> {
        match self.slot_at(slot) {
            PageSlot::Leaf(p) => p.validate(),
            PageSlot::Internal(node) => {
                if !is_root && node.underflows() {
                    return Err(MtError::corruption(format!(
                        "non-root page-internal at slot {slot} holds {} separators, below minimum {PAGE_INTERNAL_MIN_SEPS}",
                        node.nseps()
                    )));
                }
                let children = node.children.clone();
                for child in children {
                    self.validate_occupancy(child, height - 1, false)?;
                }
                Ok(())
            }
        }
    }

    /// Local page-to-page successor of `local_id` within this superpage, if
    /// any (`None` at the superpage's own right boundary — the caller
    /// crosses via `next_superpage`).
    pub fn local_next(&self, local_id: u32) -> Option<u32> {
        match self.slot_at(local_id as u16) {
            PageSlot::Leaf(p) => p.next_page(),
            _ => None,
        }
    }

    pub fn local_prev(&self, local_id: u32) -> Option<u32> {
        match self.slot_at(local_id as u16) {
            PageSlot::Leaf(p) => p.prev_page(),
            _ => None,
        }
    }

    pub fn first_page_local_id(&self) -> u32 {
        self.first_page as u32
    }

    pub fn last_page_local_id(&self) -> u32 {
        self.last_page as u32
    }

    pub fn page_predecessor(&self, local_id: u32, query: i32) -> Option<i32> {
        match self.slot_at(local_id as u16) {
            PageSlot::Leaf(p) => p.predecessor(query),
            _ => None,
        }
    }

    pub fn page_extract_sorted(&self, local_id: u32) -> Vec<i32> {
        match self.slot_at(local_id as u16) {
            PageSlot::Leaf(p) => p.extract_sorted(),
            _ => Vec::new(),
        }
    }

    /// The local id of the page that would hold `key` (used by the
    /// iterator to land directly on the right page rather than walking the
    /// local chain from the boundary).
    pub fn locate_page(&self, key: i32) -> u32 {
        let mut slot = self.root;
        loop {
            match self.slot_at(slot) {
                PageSlot::Leaf(_) => return slot as u32,
                PageSlot::Internal(node) => {
                    let idx = node.child_index(key);
                    slot = node.child_at(idx);
                }
            }
        }
    }
}

impl Default for Superpage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_search_delete_roundtrip() {
        let mut sp = Superpage::new();
        let input: Vec<i32> = (0..20_000).map(|i| i * 3).collect();
        for &k in &input {
            assert!(matches!(sp.insert(k), InsertOutcome::Inserted));
        }
        assert_eq!(sp.len(), input.len() as u64);
        for &k in &input {
            assert!(sp.contains(k));
        }
        assert!(!sp.contains(1));

        for &k in input.iter().step_by(2) {
            assert!(matches!(sp.delete(k), DeleteOutcome::Deleted));
        }
        assert_eq!(sp.len(), (input.len() / 2) as u64);
        for (i, &k) in input.iter().enumerate() {
            assert_eq!(sp.contains(k), i % 2 == 1);
        }
    }

    #[test]
    fn bulk_load_matches_input() {
        let input: Vec<i32> = (0..50_000).collect();
        let sp = Superpage::bulk_load(&input);
        assert_eq!(sp.len(), input.len() as u64);
        assert_eq!(sp.extract_sorted(), input);
        for &k in input.iter().step_by(97) {
            assert!(sp.contains(k));
        }
    }

    #[test]
    fn split_halves_preserve_order() {
        let input: Vec<i32> = (0..60_000).collect();
        let mut sp = Superpage::bulk_load(&input);
        let (right, separator) = sp.split();
        assert!(sp.extract_sorted().iter().all(|&k| k < separator));
        assert!(right.extract_sorted().iter().all(|&k| k >= separator));
        assert_eq!(sp.len() + right.len(), input.len() as u64);
    }
}
