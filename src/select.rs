// src/select.rs
//! Quota-based stratified sampler producing the final bounded list.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::article::Candidate;

/// Per-primary-source guaranteed slot count: `ceil(n / 3)`.
pub fn quota(n: usize) -> usize {
    n.div_ceil(3)
}

/// Pick at most `n` candidates: the top `k` from each pre-ordered partition
/// (Qiita by descending trend score, Zenn in feed order), then random fill
/// from the merged remainder, then a hard truncate to `n`.
///
/// For small `n` the two quota passes can select `2k > n` items before the
/// truncate, in which case the Zenn quota pick is the one dropped. That bias
/// is deliberate; see the selection scenarios in `tests/select_quota.rs`.
pub fn select_stratified<R: Rng + ?Sized>(
    mut qiita: Vec<Candidate>,
    mut zenn: Vec<Candidate>,
    n: usize,
    rng: &mut R,
) -> Vec<Candidate> {
    let k = quota(n);
    let mut selected = Vec::with_capacity(n);

    let take = k.min(qiita.len());
    selected.extend(qiita.drain(..take));
    let take = k.min(zenn.len());
    selected.extend(zenn.drain(..take));

    let mut pool: Vec<Candidate> = qiita.into_iter().chain(zenn).collect();
    pool.shuffle(rng);
    for c in pool {
        if selected.len() >= n {
            break;
        }
        selected.push(c);
    }

    selected.truncate(n);
    selected
}
