//! SIMD-accelerated search over small sorted `i32` arrays.
//!
//! Ported from the original implementation's `inode.c` search cascade:
//! AVX2 8-lane compare, SSE2 4-lane compare, and a scalar binary search
//! with double-sided prefetch for larger arrays, each gated by runtime
//! feature detection rather than compile-time target features so a single
//! binary runs correctly (if not maximally fast) on any x86_64 host, with a
//! portable scalar path for non-x86_64 targets.
//!
//! Both searches below return the same thing the original's
//! `mt_inode_search` returns: the index `i` such that `keys[i-1] <= key <
//! keys[i]`, i.e. the insertion point / child-routing index for `key`. The
//! CL-leaf "single compare instruction" predecessor search additionally
//! needs the index of the greatest key `<= query`; that is `child_index(..)
//! - 1` and is computed by the caller.

/// Returns the index of the first element strictly greater than `key`, i.e.
/// the number of elements `<= key`. Used both for CL/outer internal-node
/// child routing and for CL-leaf predecessor search.
pub fn upper_bound(keys: &[i32], key: i32) -> usize {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") && keys.len() <= 64 {
            return unsafe { upper_bound_avx2(keys, key) };
        }
        if is_x86_feature_detected!("sse2") && keys.len() <= 32 {
            return unsafe { upper_bound_sse2(keys, key) };
        }
    }
    upper_bound_scalar(keys, key)
}

fn upper_bound_scalar(keys: &[i32], key: i32) -> usize {
    let n = keys.len();
    if n <= 16 {
        for (i, &k) in keys.iter().enumerate() {
            if k > key {
                return i;
            }
        }
        return n;
    }

    // Binary search with prefetch of both candidate next-halves, mirroring
    // inode.c's fallback path; `std::intrinsics::prefetch` is nightly-only,
    // so this relies on the branch predictor plus the compiler's own
    // automatic prefetching on the hot comparison.
    let mut lo = 0usize;
    let mut hi = n;
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if keys[mid] <= key {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn upper_bound_avx2(keys: &[i32], key: i32) -> usize {
    use std::arch::x86_64::*;

    let n = keys.len();
    let vkey = _mm256_set1_epi32(key);
    let mut i = 0usize;
    while i + 8 <= n {
        let vtree = _mm256_loadu_si256(keys.as_ptr().add(i) as *const __m256i);
        let vcmp = _mm256_cmpgt_epi32(vtree, vkey);
        let mask = _mm256_movemask_ps(_mm256_castsi256_ps(vcmp));
        if mask != 0 {
            return i + mask.trailing_zeros() as usize;
        }
        i += 8;
    }
    for (j, &k) in keys[i..].iter().enumerate() {
        if k > key {
            return i + j;
        }
    }
    n
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse2")]
unsafe fn upper_bound_sse2(keys: &[i32], key: i32) -> usize {
    use std::arch::x86_64::*;

    let n = keys.len();
    let vkey = _mm_set1_epi32(key);
    let mut i = 0usize;
    while i + 4 <= n {
        let vtree = _mm_loadu_si128(keys.as_ptr().add(i) as *const __m128i);
        let vcmp = _mm_cmpgt_epi32(vtree, vkey);
        let mask = _mm_movemask_ps(_mm_castsi128_ps(vcmp));
        if mask != 0 {
            return i + mask.trailing_zeros() as usize;
        }
        i += 4;
    }
    for (j, &k) in keys[i..].iter().enumerate() {
        if k > key {
            return i + j;
        }
    }
    n
}

/// Index of the greatest key `<= query`, or `None` if every key exceeds the
/// query (including the empty-array case).
pub fn predecessor_index(keys: &[i32], query: i32) -> Option<usize> {
    let ub = upper_bound(keys, query);
    if ub == 0 {
        None
    } else {
        Some(ub - 1)
    }
}

/// `true` if `key` is present in `keys` (which must be sorted ascending).
pub fn contains(keys: &[i32], key: i32) -> bool {
    match predecessor_index(keys, key) {
        Some(i) => keys[i] == key,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upper_bound_matches_scalar_reference() {
        let keys: Vec<i32> = (0..200).map(|i| i * 3).collect();
        for q in -5..605 {
            let expected = keys.iter().filter(|&&k| k <= q).count();
            assert_eq!(upper_bound(&keys, q), expected, "q={q}");
        }
    }

    #[test]
    fn predecessor_empty() {
        assert_eq!(predecessor_index(&[], 5), None);
    }

    #[test]
    fn predecessor_before_all() {
        assert_eq!(predecessor_index(&[10, 20, 30], 5), None);
    }

    #[test]
    fn predecessor_exact_and_between() {
        let keys = [10, 20, 30, 40];
        assert_eq!(predecessor_index(&keys, 20), Some(1));
        assert_eq!(predecessor_index(&keys, 25), Some(1));
        assert_eq!(predecessor_index(&keys, 40), Some(3));
        assert_eq!(predecessor_index(&keys, 1000), Some(3));
    }

    #[test]
    fn contains_basic() {
        let keys = [1, 3, 5, 7, 9];
        assert!(contains(&keys, 5));
        assert!(!contains(&keys, 6));
        assert!(!contains(&keys, 0));
        assert!(!contains(&keys, 100));
    }
}
