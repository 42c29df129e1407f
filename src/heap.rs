//! Array-backed binary min-heap primitives
//!
//! Edge lists are stored as plain slices kept in heap order by their
//! `priority` field, so the most preferred edge is always at index 0.
//! Priorities are recomputed by the search itself; the heap never owns a
//! comparator.

/// Anything carrying a numeric heap key
pub trait Prioritized {
    /// The heap key. Smaller is preferred.
    fn priority(&self) -> f64;
}

/// Restores the heap property below index `i0`, considering the first `n` items
///
/// Repeatedly swaps the element with its smaller child until no violation
/// remains or a leaf is reached. Returns `true` if the element moved.
pub fn down<T: Prioritized>(h: &mut [T], i0: usize, n: usize) -> bool {
    let n = n.min(h.len());
    let mut i = i0;
    loop {
        let left = 2 * i + 1;
        if left >= n {
            break;
        }
        let mut j = left;
        let right = left + 1;
        if right < n && h[right].priority() < h[left].priority() {
            j = right;
        }
        if !(h[j].priority() < h[i].priority()) {
            break;
        }
        h.swap(i, j);
        i = j;
    }
    i > i0
}

/// Establishes the heap property over the whole slice
pub fn init<T: Prioritized>(h: &mut [T]) {
    let n = h.len();
    for i in (0..n / 2).rev() {
        down(h, i, n);
    }
}

/// Returns true if every parent's priority is no greater than its children's
pub fn is_heap<T: Prioritized>(h: &[T]) -> bool {
    (1..h.len()).all(|i| !(h[i].priority() < h[(i - 1) / 2].priority()))
}
