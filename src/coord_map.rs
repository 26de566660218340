//! `CoordMap` — an open-addressing hashmap from `TileCoord` to a dense slot
//! index, backing the sparse store's reverse index.
//!
//! Design:
//! - Flat, cache-friendly layout: packed 64-bit key + value + control word.
//! - Robin Hood probing with backward-shift deletion (no tombstones).
//! - Two-constant coordinate hash so grid-aligned patterns don't collide.
//! - Fingerprint in the control word to skip most full key comparisons.

use crate::coord::TileCoord;

/// Two distinct Fibonacci-derived constants for mixing x and y independently.
/// A single-constant sequential hash collides systematically on grid-aligned
/// coordinate patterns.
const MX: u64 = 0x517c_c1b7_2722_0a95;
const MY: u64 = 0x6c62_272e_07bb_0142;

#[inline(always)]
fn coord_hash(coord: TileCoord) -> u64 {
    (coord.x as u64).wrapping_mul(MX) ^ (coord.y as u64).wrapping_mul(MY).rotate_right(31)
}

const EMPTY: u32 = 0;
const OCCUPIED_BIT: u32 = 0x8000_0000;
const DIST_SHIFT: u32 = 12;
const DIST_MASK: u32 = 0x7fff_f000;
const FP_MASK: u32 = 0x0000_0fff;
const MATCH_MASK: u32 = OCCUPIED_BIT | FP_MASK;
const MAX_DIST: usize = (DIST_MASK >> DIST_SHIFT) as usize;

/// One slot: packed key (x low half, y high half) + value + control word.
///
/// Control word layout:
/// - bit 31: occupied flag
/// - bits 12..30: probe distance (Robin Hood DIB)
/// - bits 0..11: key fingerprint
#[derive(Clone, Copy)]
#[repr(C)]
struct Slot {
    key: u64,
    value: u32,
    /// `0` means empty.
    ctrl: u32,
}

impl Slot {
    const EMPTY: Self = Self {
        key: 0,
        value: 0,
        ctrl: EMPTY,
    };

    #[inline(always)]
    fn is_occupied(self) -> bool {
        self.ctrl & OCCUPIED_BIT != 0
    }

    #[inline(always)]
    fn is_empty(self) -> bool {
        self.ctrl == EMPTY
    }

    #[inline(always)]
    fn distance(self) -> usize {
        ((self.ctrl & DIST_MASK) >> DIST_SHIFT) as usize
    }

    #[inline(always)]
    fn set_distance(&mut self, distance: usize) {
        assert!(
            distance <= MAX_DIST,
            "CoordMap probe distance overflow (distance={distance}, max={MAX_DIST})"
        );
        self.ctrl = (self.ctrl & !DIST_MASK) | ((distance as u32) << DIST_SHIFT);
    }

    #[inline(always)]
    fn match_ctrl(self) -> u32 {
        self.ctrl & MATCH_MASK
    }

    #[inline(always)]
    fn coord(self) -> TileCoord {
        TileCoord::new(self.key as u32, (self.key >> 32) as u32)
    }
}

/// Maximum load factor numerator / denominator: 1/2 = 50%.
const LOAD_NUM: usize = 1;
const LOAD_DEN: usize = 2;

#[derive(Clone)]
pub(crate) struct CoordMap {
    slots: Vec<Slot>,
    len: usize,
    /// `capacity - 1`. Capacity is always a power of two.
    mask: usize,
}

impl CoordMap {
    /// Empty map with room for at least `cap` entries before growing.
    pub fn with_capacity(cap: usize) -> Self {
        let min_slots = cap
            .saturating_mul(LOAD_DEN)
            .div_ceil(LOAD_NUM)
            .next_power_of_two()
            .max(16);
        Self {
            slots: vec![Slot::EMPTY; min_slots],
            len: 0,
            mask: min_slots - 1,
        }
    }

    #[inline(always)]
    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Reserve room for `additional` more entries without rehashing.
    pub fn reserve(&mut self, additional: usize) {
        let required = self.len.saturating_add(additional);
        let min_slots = required
            .saturating_mul(LOAD_DEN)
            .div_ceil(LOAD_NUM)
            .next_power_of_two();
        if min_slots > self.slots.len() {
            self.resize(min_slots);
        }
    }

    /// Look up the slot index stored for a coordinate.
    ///
    /// Robin Hood displacement gives early exit on miss: once an occupied
    /// slot sits closer to its home than our key would here, the key cannot
    /// exist further along the chain.
    #[inline]
    pub fn get(&self, coord: TileCoord) -> Option<u32> {
        let key = coord.packed();
        let hash = coord_hash(coord);
        let target_ctrl = match_ctrl_of(hash);
        let mask = self.mask;
        let mut pos = hash as usize & mask;
        let mut our_dist = 0usize;

        loop {
            let slot = self.slots[pos];
            if slot.is_empty() {
                return None;
            }
            if our_dist > slot.distance() {
                return None;
            }
            if slot.match_ctrl() == target_ctrl && slot.key == key {
                return Some(slot.value);
            }
            pos = (pos + 1) & mask;
            our_dist += 1;
        }
    }

    /// Insert a mapping. Returns the previous value if the key was present.
    #[inline]
    pub fn insert(&mut self, coord: TileCoord, value: u32) -> Option<u32> {
        if self.needs_grow() {
            self.grow();
        }
        let key = coord.packed();
        let hash = coord_hash(coord);
        let target_ctrl = match_ctrl_of(hash);
        let mask = self.mask;
        let mut pos = hash as usize & mask;

        let mut ins = Slot {
            key,
            value,
            ctrl: occupied_ctrl(fingerprint_of(hash), 0),
        };

        loop {
            let slot = &mut self.slots[pos];

            if slot.is_empty() {
                *slot = ins;
                self.len += 1;
                return None;
            }

            // Exact match — update in place.
            if slot.match_ctrl() == target_ctrl && slot.key == key {
                let old = slot.value;
                slot.value = value;
                return Some(old);
            }

            // Robin Hood: if the existing entry is closer to home, steal its
            // spot and keep probing with the displaced entry.
            if ins.distance() > slot.distance() {
                std::mem::swap(&mut *slot, &mut ins);
            }

            ins.set_distance(ins.distance() + 1);
            pos = (pos + 1) & mask;
        }
    }

    /// Insert during resize — recomputes home position, skips the duplicate
    /// check.
    fn insert_rehash(&mut self, mut ins: Slot) {
        let mask = self.mask;
        let hash = coord_hash(ins.coord());
        let mut pos = hash as usize & mask;
        ins.set_distance(0);

        loop {
            let slot = &mut self.slots[pos];

            if slot.is_empty() {
                *slot = ins;
                self.len += 1;
                return;
            }

            if ins.distance() > slot.distance() {
                std::mem::swap(&mut *slot, &mut ins);
            }

            ins.set_distance(ins.distance() + 1);
            pos = (pos + 1) & mask;
        }
    }

    /// Remove a mapping. Returns the value if the key was present.
    #[inline]
    pub fn remove(&mut self, coord: TileCoord) -> Option<u32> {
        let key = coord.packed();
        let hash = coord_hash(coord);
        let target_ctrl = match_ctrl_of(hash);
        let mask = self.mask;
        let mut pos = hash as usize & mask;
        let mut our_dist = 0usize;

        loop {
            let slot = self.slots[pos];
            if slot.is_empty() {
                return None;
            }
            if our_dist > slot.distance() {
                return None;
            }
            if slot.match_ctrl() == target_ctrl && slot.key == key {
                let old = slot.value;
                self.backward_shift_delete(pos);
                self.len -= 1;
                return Some(old);
            }
            pos = (pos + 1) & mask;
            our_dist += 1;
        }
    }

    /// Backward-shift deletion using the stored probe distances.
    fn backward_shift_delete(&mut self, removed: usize) {
        let mask = self.mask;
        let mut gap = removed;
        loop {
            let next = (gap + 1) & mask;
            let mut candidate = self.slots[next];

            // An empty successor, or one at its home position, ends the chain.
            if candidate.is_empty() || candidate.distance() == 0 {
                self.slots[gap] = Slot::EMPTY;
                return;
            }

            candidate.set_distance(candidate.distance() - 1);
            self.slots[gap] = candidate;
            gap = next;
        }
    }

    #[inline(always)]
    fn needs_grow(&self) -> bool {
        self.len * LOAD_DEN >= self.slots.len() * LOAD_NUM
    }

    fn grow(&mut self) {
        let new_cap = (self.slots.len() * 2).max(16);
        self.resize(new_cap);
    }

    fn resize(&mut self, new_cap: usize) {
        debug_assert!(new_cap.is_power_of_two());
        let old_slots = std::mem::replace(&mut self.slots, vec![Slot::EMPTY; new_cap]);
        self.mask = new_cap - 1;
        self.len = 0;
        for slot in old_slots {
            if slot.is_occupied() {
                self.insert_rehash(slot);
            }
        }
    }

    /// Iterate over all `(coord, slot)` pairs in unspecified order.
    #[allow(dead_code)]
    pub fn iter(&self) -> impl Iterator<Item = (TileCoord, u32)> + '_ {
        self.slots.iter().filter_map(|slot| {
            if slot.is_occupied() {
                Some((slot.coord(), slot.value))
            } else {
                None
            }
        })
    }
}

/// Extract fingerprint bits from a hash. High bits are used (bucket selection
/// uses the low bits); at least one bit is kept set so EMPTY stays ctrl == 0.
#[inline(always)]
fn fingerprint_of(hash: u64) -> u32 {
    ((hash >> 52) as u32 & FP_MASK) | 1
}

#[inline(always)]
fn occupied_ctrl(fp: u32, distance: usize) -> u32 {
    OCCUPIED_BIT | ((distance as u32) << DIST_SHIFT) | fp
}

#[inline(always)]
fn match_ctrl_of(hash: u64) -> u32 {
    OCCUPIED_BIT | fingerprint_of(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: u32, y: u32) -> TileCoord {
        TileCoord::new(x, y)
    }

    #[test]
    fn insert_get_remove() {
        let mut m = CoordMap::with_capacity(64);
        assert!(m.get(c(10, 20)).is_none());

        m.insert(c(10, 20), 42);
        assert_eq!(m.get(c(10, 20)), Some(42));
        assert_eq!(m.len(), 1);

        // Overwrite.
        let old = m.insert(c(10, 20), 99);
        assert_eq!(old, Some(42));
        assert_eq!(m.get(c(10, 20)), Some(99));
        assert_eq!(m.len(), 1);

        // Remove.
        let removed = m.remove(c(10, 20));
        assert_eq!(removed, Some(99));
        assert!(m.get(c(10, 20)).is_none());
        assert_eq!(m.len(), 0);
    }

    #[test]
    fn axis_swapped_coords_are_distinct() {
        let mut m = CoordMap::with_capacity(16);
        m.insert(c(5, 10), 1);
        m.insert(c(10, 5), 2);
        m.insert(c(0, 0), 3);
        m.insert(c(u32::MAX, u32::MAX), 4);

        assert_eq!(m.get(c(5, 10)), Some(1));
        assert_eq!(m.get(c(10, 5)), Some(2));
        assert_eq!(m.get(c(0, 0)), Some(3));
        assert_eq!(m.get(c(u32::MAX, u32::MAX)), Some(4));
        assert_eq!(m.len(), 4);
    }

    #[test]
    fn grow_under_pressure() {
        let mut m = CoordMap::with_capacity(4);
        for i in 0..1000u32 {
            m.insert(c(i, i * 3), i);
        }
        assert_eq!(m.len(), 1000);
        for i in 0..1000u32 {
            assert_eq!(m.get(c(i, i * 3)), Some(i));
        }
    }

    #[test]
    fn remove_does_not_break_chains() {
        let mut m = CoordMap::with_capacity(64);
        // Entries likely to form a probe chain.
        for i in 0..20u32 {
            m.insert(c(i, 0), i);
        }
        for i in (0..20u32).step_by(2) {
            m.remove(c(i, 0));
        }
        // Remaining entries must still be reachable.
        for i in (1..20u32).step_by(2) {
            assert_eq!(m.get(c(i, 0)), Some(i));
        }
        assert_eq!(m.len(), 10);
    }

    #[test]
    fn iter_yields_all_entries() {
        let mut m = CoordMap::with_capacity(32);
        for i in 0..50u32 {
            m.insert(c(i, i + 7), i);
        }
        let mut collected: Vec<_> = m.iter().collect();
        collected.sort_by_key(|&(_, v)| v);
        assert_eq!(collected.len(), 50);
        for (i, &(coord, v)) in collected.iter().enumerate() {
            assert_eq!(coord, c(i as u32, i as u32 + 7));
            assert_eq!(v, i as u32);
        }
    }

    #[test]
    fn hash_spreads_axis_aligned_coordinates() {
        let mut x_buckets = std::collections::BTreeSet::new();
        let mut y_buckets = std::collections::BTreeSet::new();
        let bucket_mask = (1u64 << 16) - 1;
        for i in 0..(1u32 << 16) {
            x_buckets.insert(coord_hash(c(i, 0)) & bucket_mask);
            y_buckets.insert(coord_hash(c(0, i)) & bucket_mask);
        }

        assert!(
            x_buckets.len() >= 40_000,
            "x-axis bucket spread regressed: {}",
            x_buckets.len()
        );
        assert!(
            y_buckets.len() >= 40_000,
            "y-axis bucket spread regressed: {}",
            y_buckets.len()
        );
    }

    #[test]
    fn slot_size_is_16_bytes() {
        assert_eq!(std::mem::size_of::<Slot>(), 16);
    }

    #[test]
    #[should_panic(expected = "CoordMap probe distance overflow")]
    fn slot_distance_overflow_panics() {
        let mut slot = Slot {
            key: 0,
            value: 0,
            ctrl: occupied_ctrl(1, 0),
        };
        slot.set_distance(MAX_DIST + 1);
    }
}
