use common::bb::Bb;
use fxhash::{FxHashMap, FxHashSet};

use crate::error::{BroadphaseError, BroadphaseResult};
use crate::index::SpatialIndex;

/// Spatial hash index: bounds are binned into square cells of a fixed
/// dimension. Works best when the cell dimension roughly matches the
/// typical object size and objects are spread fairly evenly.
#[derive(Debug)]
pub struct GridIndex {
    cell_dim: f32,
    cells: FxHashMap<(i32, i32), Vec<u32>>,
    bounds: FxHashMap<u32, Bb>,
}

impl GridIndex {
    /// `cell_dim` is the edge length of a cell; `count` is the expected
    /// number of tracked objects, used to presize the tables.
    pub fn new(cell_dim: f32, count: usize) -> BroadphaseResult<Self> {
        if !cell_dim.is_finite() || cell_dim <= 0.0 {
            return Err(BroadphaseError::InvalidCellDimension { dim: cell_dim });
        }
        if count == 0 {
            return Err(BroadphaseError::InvalidCellCount { count });
        }
        let mut cells = FxHashMap::default();
        cells.reserve(count);
        let mut bounds = FxHashMap::default();
        bounds.reserve(count);
        Ok(Self {
            cell_dim,
            cells,
            bounds,
        })
    }

    pub fn cell_dim(&self) -> f32 {
        self.cell_dim
    }

    fn cell_range(&self, bb: &Bb) -> (i32, i32, i32, i32) {
        let min_x = (bb.min_x / self.cell_dim).floor() as i32;
        let min_y = (bb.min_y / self.cell_dim).floor() as i32;
        let max_x = (bb.max_x / self.cell_dim).floor() as i32;
        let max_y = (bb.max_y / self.cell_dim).floor() as i32;
        (min_x, min_y, max_x, max_y)
    }

    fn link(&mut self, id: u32, bb: &Bb) {
        let (min_x, min_y, max_x, max_y) = self.cell_range(bb);
        for cx in min_x..=max_x {
            for cy in min_y..=max_y {
                self.cells.entry((cx, cy)).or_default().push(id);
            }
        }
    }

    fn unlink(&mut self, id: u32, bb: &Bb) {
        let (min_x, min_y, max_x, max_y) = self.cell_range(bb);
        for cx in min_x..=max_x {
            for cy in min_y..=max_y {
                if let Some(bucket) = self.cells.get_mut(&(cx, cy)) {
                    bucket.retain(|&entry| entry != id);
                    if bucket.is_empty() {
                        self.cells.remove(&(cx, cy));
                    }
                }
            }
        }
    }
}

impl SpatialIndex for GridIndex {
    fn insert(&mut self, id: u32, bb: Bb) {
        if let Some(old) = self.bounds.insert(id, bb) {
            self.unlink(id, &old);
        }
        self.link(id, &bb);
    }

    fn remove(&mut self, id: u32) -> bool {
        match self.bounds.remove(&id) {
            Some(old) => {
                self.unlink(id, &old);
                true
            }
            None => false,
        }
    }

    fn reindex(&mut self, id: u32, bb: Bb) -> bool {
        if !self.bounds.contains_key(&id) {
            return false;
        }
        self.insert(id, bb);
        true
    }

    fn reindex_all(&mut self) {
        self.cells.clear();
        let bounds: Vec<(u32, Bb)> = self.bounds.iter().map(|(&id, &bb)| (id, bb)).collect();
        for (id, bb) in bounds {
            self.link(id, &bb);
        }
    }

    fn contains(&self, id: u32) -> bool {
        self.bounds.contains_key(&id)
    }

    fn len(&self) -> usize {
        self.bounds.len()
    }

    fn bb(&self, id: u32) -> Option<Bb> {
        self.bounds.get(&id).copied()
    }

    fn each(&self, visitor: &mut dyn FnMut(u32)) {
        for &id in self.bounds.keys() {
            visitor(id);
        }
    }

    fn query(&mut self, bb: Bb, visitor: &mut dyn FnMut(u32)) {
        let (min_x, min_y, max_x, max_y) = self.cell_range(&bb);
        let mut seen = FxHashSet::default();
        for cx in min_x..=max_x {
            for cy in min_y..=max_y {
                let bucket = match self.cells.get(&(cx, cy)) {
                    Some(bucket) => bucket,
                    None => continue,
                };
                for &id in bucket {
                    if !seen.insert(id) {
                        continue;
                    }
                    if self.bounds[&id].intersects(&bb) {
                        visitor(id);
                    }
                }
            }
        }
    }

    fn each_pair(&mut self, visitor: &mut dyn FnMut(u32, u32)) {
        let mut seen: FxHashSet<(u32, u32)> = FxHashSet::default();
        for bucket in self.cells.values() {
            for i in 0..bucket.len() {
                for j in (i + 1)..bucket.len() {
                    let (id_a, id_b) = (bucket[i], bucket[j]);
                    let key = if id_a < id_b {
                        (id_a, id_b)
                    } else {
                        (id_b, id_a)
                    };
                    if !seen.insert(key) {
                        continue;
                    }
                    if self.bounds[&id_a].intersects(&self.bounds[&id_b]) {
                        visitor(id_a, id_b);
                    }
                }
            }
        }
    }
}
