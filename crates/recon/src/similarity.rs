//! Ratcliff–Obershelp string similarity.
//!
//! `ratio = 2 * M / (len(a) + len(b))` where `M` is the total length of the
//! matching blocks found by repeatedly taking the longest common contiguous
//! run and recursing on both sides of it. Comparison is on lowercased chars.

/// Similarity ratio in `[0, 1]`. Two empty strings are identical (1.0).
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matches = matching_chars(&a, &b);
    2.0 * matches as f64 / total as f64
}

/// Sum of matching block lengths.
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        total += k;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            queue.push((i + k, ahi, j + k, bhi));
        }
    }

    total
}

/// Longest common run in `a[alo..ahi]` × `b[blo..bhi]`.
///
/// Returns `(i, j, len)`. Ties go to the smallest `i`, then smallest `j`.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let width = bhi - blo;
    let (mut best_i, mut best_j, mut best_len) = (alo, blo, 0);
    // prev[jj + 1] = run length ending at (i - 1, blo + jj)
    let mut prev = vec![0usize; width + 1];
    let mut curr = vec![0usize; width + 1];

    for i in alo..ahi {
        for jj in 0..width {
            let j = blo + jj;
            curr[jj + 1] = if a[i] == b[j] { prev[jj] + 1 } else { 0 };
            let k = curr[jj + 1];
            if k > best_len {
                best_i = i + 1 - k;
                best_j = j + 1 - k;
                best_len = k;
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    (best_i, best_j, best_len)
}
