// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Hands out pixels to render workers.  The pixels are visited in a
//! shuffled order so that every worker gets a fair mix of cheap and
//! expensive points, and so that a partially finished render fills
//! in evenly across the whole raster instead of top to bottom.
//!
//! Claiming a pixel is a single `fetch_add` on a shared cursor.

use crossbeam::utils::CachePadded;
use rand::seq::SliceRandom;
use rand::{thread_rng, Rng};
use std::sync::atomic::{AtomicUsize, Ordering};

/// A permutation of `0..len` and a cursor into it.
#[derive(Debug)]
pub struct WorkQueue {
    order: Vec<usize>,
    cursor: CachePadded<AtomicUsize>,
}

impl WorkQueue {
    /// A freshly shuffled queue over `0..len`.
    pub fn new(len: usize) -> WorkQueue {
        WorkQueue::with_rng(len, &mut thread_rng())
    }

    /// A queue shuffled by the given generator, for reproducible
    /// orders.
    pub fn with_rng<R: Rng + ?Sized>(len: usize, rng: &mut R) -> WorkQueue {
        let mut queue = WorkQueue {
            order: Vec::with_capacity(len),
            cursor: CachePadded::new(AtomicUsize::new(0)),
        };
        queue.reset_with_rng(len, rng);
        queue
    }

    /// Reshuffles for a new render over `0..len` and rewinds the
    /// cursor.  Exclusive access means no worker can still be reading
    /// the old order.
    pub fn reset(&mut self, len: usize) {
        self.reset_with_rng(len, &mut thread_rng());
    }

    /// [`reset`](#method.reset) with a caller-supplied generator.
    pub fn reset_with_rng<R: Rng + ?Sized>(&mut self, len: usize, rng: &mut R) {
        self.order.clear();
        self.order.extend(0..len);
        self.order.shuffle(rng);
        *self.cursor.get_mut() = 0;
    }

    /// Claims the next pixel, or `None` once every pixel has been
    /// handed out.  Each pixel is handed out exactly once.
    #[inline]
    pub fn next(&self) -> Option<usize> {
        let slot = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.order.get(slot).cloned()
    }

    /// How many pixels have been handed out so far.
    pub fn claimed(&self) -> usize {
        self.cursor.load(Ordering::Relaxed).min(self.order.len())
    }

    /// Total number of pixels in this round.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when there is nothing to hand out at all.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn drains_every_index_once() {
        let queue = WorkQueue::new(1000);
        let mut seen: Vec<usize> = std::iter::from_fn(|| queue.next()).collect();
        assert_eq!(seen.len(), 1000);
        seen.sort();
        assert_eq!(seen, (0..1000).collect::<Vec<_>>());
        assert_eq!(queue.next(), None);
        assert_eq!(queue.next(), None);
        assert_eq!(queue.claimed(), 1000);
    }

    #[test]
    fn order_is_shuffled() {
        let queue = WorkQueue::with_rng(500, &mut StdRng::seed_from_u64(7));
        let order: Vec<usize> = std::iter::from_fn(|| queue.next()).collect();
        assert_ne!(order, (0..500).collect::<Vec<_>>());
    }

    #[test]
    fn same_seed_same_order() {
        let a = WorkQueue::with_rng(64, &mut StdRng::seed_from_u64(42));
        let b = WorkQueue::with_rng(64, &mut StdRng::seed_from_u64(42));
        let a: Vec<usize> = std::iter::from_fn(|| a.next()).collect();
        let b: Vec<usize> = std::iter::from_fn(|| b.next()).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn reset_rewinds_and_resizes() {
        let mut queue = WorkQueue::new(10);
        while queue.next().is_some() {}
        queue.reset(25);
        assert_eq!(queue.len(), 25);
        assert_eq!(queue.claimed(), 0);
        let mut seen: Vec<usize> = std::iter::from_fn(|| queue.next()).collect();
        seen.sort();
        assert_eq!(seen, (0..25).collect::<Vec<_>>());
    }

    #[test]
    fn empty_queue() {
        let queue = WorkQueue::new(0);
        assert!(queue.is_empty());
        assert_eq!(queue.next(), None);
        assert_eq!(queue.claimed(), 0);
    }

    #[test]
    fn concurrent_drain_has_no_duplicates_or_gaps() {
        let total = 200_000;
        let queue = Arc::new(WorkQueue::new(total));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let queue = queue.clone();
                thread::spawn(move || {
                    let mut mine = vec![];
                    while let Some(i) = queue.next() {
                        mine.push(i);
                    }
                    mine
                })
            })
            .collect();
        let mut seen = vec![false; total];
        for handle in handles {
            for i in handle.join().unwrap() {
                assert!(!seen[i], "{} handed out twice", i);
                seen[i] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }
}
