//! Playlist advancement.
//!
//! Sequential playlists step through `files` in order. Random playlists keep a
//! shuffled order of file indices and step through that instead; the track's
//! `current_index` always names the file, never the position in the order.

use rand::Rng;
use rand::seq::SliceRandom;

/// Index after `index` in a playlist of `len` files, wrapping when `looping`.
pub(crate) fn next_sequential(index: usize, len: usize, looping: bool) -> Option<usize> {
    if index + 1 < len {
        Some(index + 1)
    } else if looping && len > 0 {
        Some(0)
    } else {
        None
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ShuffleOrder {
    order: Vec<usize>,
    position: usize,
}

impl ShuffleOrder {
    pub fn new<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Self {
        let mut order: Vec<usize> = (0..len).collect();
        order.shuffle(rng);
        Self { order, position: 0 }
    }

    pub fn current(&self) -> usize {
        self.order.get(self.position).copied().unwrap_or(0)
    }

    /// Whether this order still matches a playlist of `len` files.
    pub fn fits(&self, len: usize) -> bool {
        self.order.len() == len
    }

    /// Step to the next file. On wrap a fresh order is drawn that does not
    /// repeat the file that just finished.
    pub fn advance<R: Rng + ?Sized>(&mut self, looping: bool, rng: &mut R) -> Option<usize> {
        if self.position + 1 < self.order.len() {
            self.position += 1;
            return Some(self.current());
        }
        if !looping || self.order.is_empty() {
            return None;
        }

        let last = self.current();
        self.order.shuffle(rng);
        if self.order.len() > 1 && self.order[0] == last {
            let swap_with = rng.gen_range(1..self.order.len());
            self.order.swap(0, swap_with);
        }
        self.position = 0;
        Some(self.current())
    }
}
