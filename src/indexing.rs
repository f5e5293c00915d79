//! Index and slice normalization shared by index and slice evaluation.
//!
//! Negative positions count from the end: for a sequence of length `len`,
//! `-1` maps to `len - 1` and `-len` maps to `0`. Anything further out is
//! out of range.

/// Maps a possibly negative index onto `0..len`.
///
/// Returns `None` when the index is out of range.
///
/// # Examples
///
/// ```
/// use jsonquery::indexing::normalize_index;
///
/// assert_eq!(normalize_index(0, 3), Some(0));
/// assert_eq!(normalize_index(-1, 3), Some(2));
/// assert_eq!(normalize_index(-4, 3), None);
/// assert_eq!(normalize_index(3, 3), None);
/// ```
pub fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let resolved = if index < 0 { len + index } else { index };
    if (0..len).contains(&resolved) {
        usize::try_from(resolved).ok()
    } else {
        None
    }
}

/// Clamps one slice bound the way Python does.
fn clamp_bound(bound: i64, len: i64, step: i64) -> i64 {
    if bound < 0 {
        let shifted = bound + len;
        if shifted < 0 {
            if step < 0 { -1 } else { 0 }
        } else {
            shifted
        }
    } else if bound >= len {
        if step < 0 { len - 1 } else { len }
    } else {
        bound
    }
}

/// Positions selected by `[start:stop:step]` over a sequence of length
/// `len`, in traversal order.
///
/// `step` defaults to 1. A negative step walks backwards and its defaults
/// start at the last element. Returns `None` when `step` is zero.
///
/// # Examples
///
/// ```
/// use jsonquery::indexing::slice_indices;
///
/// assert_eq!(slice_indices(5, Some(1), Some(3), None), Some(vec![1, 2]));
/// assert_eq!(slice_indices(4, None, None, Some(-1)), Some(vec![3, 2, 1, 0]));
/// assert_eq!(slice_indices(4, None, None, Some(0)), None);
/// ```
pub fn slice_indices(
    len: usize,
    start: Option<i64>,
    stop: Option<i64>,
    step: Option<i64>,
) -> Option<Vec<usize>> {
    let step = step.unwrap_or(1);
    if step == 0 {
        return None;
    }

    let len = i64::try_from(len).unwrap_or(i64::MAX);
    let start = match start {
        Some(s) => clamp_bound(s, len, step),
        None if step < 0 => len - 1,
        None => 0,
    };
    let stop = match stop {
        Some(s) => clamp_bound(s, len, step),
        None if step < 0 => -1,
        None => len,
    };

    let mut indices = Vec::new();
    let mut i = start;
    while (step > 0 && i < stop) || (step < 0 && i > stop) {
        indices.push(i as usize);
        match i.checked_add(step) {
            Some(next) => i = next,
            None => break,
        }
    }
    Some(indices)
}

/// Applies a slice to `items`. Returns `None` when `step` is zero.
pub fn slice<T: Clone>(
    items: &[T],
    start: Option<i64>,
    stop: Option<i64>,
    step: Option<i64>,
) -> Option<Vec<T>> {
    slice_indices(items.len(), start, stop, step)
        .map(|indices| indices.into_iter().map(|i| items[i].clone()).collect())
}
