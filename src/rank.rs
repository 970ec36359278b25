// src/rank.rs
//! Decay-weighted popularity scoring and bounded top-K reduction for the
//! engagement-scored source.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use chrono::{DateTime, Utc};

use crate::article::Candidate;

/// Hacker-News-style decay score: `(likes - 1) / (hours + 2)^1.8`.
///
/// Fresh, highly-liked articles score highest. Strictly decreasing in age
/// for a fixed like count, strictly increasing in likes for a fixed age.
/// Zero likes yields a negative score, which simply ranks low. Clock skew
/// producing a future `created_at` clamps age to zero.
pub fn trend_score(likes: u32, created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let hours = (now - created_at).num_seconds().max(0) as f64 / 3600.0;
    (likes as f64 - 1.0) / (hours + 2.0).powf(1.8)
}

/// Attach a trend score to every candidate that has a publication time.
pub fn score_candidates(candidates: &mut [Candidate], now: DateTime<Utc>) {
    for c in candidates.iter_mut() {
        c.trend_score = c.created_at.map(|ts| trend_score(c.likes, ts, now));
    }
}

#[derive(PartialEq)]
struct Entry {
    score: f64,
    seq: usize,
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // total_cmp keeps NaN-free ordering; seq makes ties deterministic
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Reduce `candidates` to the `k` highest trend scores without a full sort,
/// using a bounded min-heap (`n·log k`). Result is ordered best-first.
/// Candidates without a score rank below every scored one.
pub fn top_k(candidates: Vec<Candidate>, k: usize) -> Vec<Candidate> {
    if k == 0 {
        return Vec::new();
    }

    let mut slots: Vec<Option<Candidate>> = candidates.into_iter().map(Some).collect();
    let mut heap: BinaryHeap<Reverse<Entry>> = BinaryHeap::with_capacity(k + 1);

    for (seq, c) in slots.iter().enumerate() {
        let score = c
            .as_ref()
            .and_then(|c| c.trend_score)
            .unwrap_or(f64::NEG_INFINITY);
        heap.push(Reverse(Entry { score, seq }));
        if heap.len() > k {
            heap.pop();
        }
    }

    let mut winners: Vec<Entry> = heap.into_iter().map(|Reverse(e)| e).collect();
    winners.sort_by(|a, b| b.cmp(a));
    winners
        .into_iter()
        .filter_map(|e| slots[e.seq].take())
        .collect()
}
