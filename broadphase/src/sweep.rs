use common::bb::Bb;
use fxhash::FxHashMap;

use crate::index::SpatialIndex;

/// Sort-and-sweep index: a flat list of bounds kept sorted on `min_x`,
/// re-sorted lazily when a query runs after mutations. Good default for
/// scenes without extreme clustering; `GridIndex` covers the rest.
pub struct SweepIndex {
    entries: Vec<(u32, Bb)>,
    positions: FxHashMap<u32, usize>,
    sorted: bool,
}

impl SweepIndex {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            positions: FxHashMap::default(),
            sorted: true,
        }
    }

    fn normalize(&mut self) {
        if self.sorted {
            return;
        }
        self.entries
            .sort_by(|a, b| a.1.min_x.total_cmp(&b.1.min_x));
        for (position, (id, _)) in self.entries.iter().enumerate() {
            self.positions.insert(*id, position);
        }
        self.sorted = true;
    }
}

impl Default for SweepIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SpatialIndex for SweepIndex {
    fn insert(&mut self, id: u32, bb: Bb) {
        match self.positions.get(&id) {
            Some(&position) => self.entries[position].1 = bb,
            None => {
                self.positions.insert(id, self.entries.len());
                self.entries.push((id, bb));
            }
        }
        self.sorted = false;
    }

    fn remove(&mut self, id: u32) -> bool {
        let position = match self.positions.remove(&id) {
            Some(position) => position,
            None => return false,
        };
        self.entries.swap_remove(position);
        if position < self.entries.len() {
            self.positions.insert(self.entries[position].0, position);
        }
        self.sorted = false;
        true
    }

    fn reindex(&mut self, id: u32, bb: Bb) -> bool {
        match self.positions.get(&id) {
            Some(&position) => {
                self.entries[position].1 = bb;
                self.sorted = false;
                true
            }
            None => false,
        }
    }

    fn reindex_all(&mut self) {
        self.sorted = false;
        self.normalize();
    }

    fn contains(&self, id: u32) -> bool {
        self.positions.contains_key(&id)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn bb(&self, id: u32) -> Option<Bb> {
        self.positions.get(&id).map(|&position| self.entries[position].1)
    }

    fn each(&self, visitor: &mut dyn FnMut(u32)) {
        for (id, _) in &self.entries {
            visitor(*id);
        }
    }

    fn query(&mut self, bb: Bb, visitor: &mut dyn FnMut(u32)) {
        self.normalize();
        for (id, entry_bb) in &self.entries {
            if entry_bb.min_x > bb.max_x {
                break;
            }
            if entry_bb.intersects(&bb) {
                visitor(*id);
            }
        }
    }

    fn each_pair(&mut self, visitor: &mut dyn FnMut(u32, u32)) {
        self.normalize();
        for i in 0..self.entries.len() {
            let (id_a, bb_a) = self.entries[i];
            for j in (i + 1)..self.entries.len() {
                let (id_b, bb_b) = self.entries[j];
                // Sorted on min_x, so once the sweep passes max_x the rest
                // of the list cannot overlap on x either.
                if bb_b.min_x > bb_a.max_x {
                    break;
                }
                if bb_a.min_y <= bb_b.max_y && bb_b.min_y <= bb_a.max_y {
                    visitor(id_a, id_b);
                }
            }
        }
    }
}
