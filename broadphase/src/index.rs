use common::bb::Bb;

/// Broad-phase acceleration structure over bounding boxes.
///
/// Objects are tracked by a caller-assigned `u32` id; the caller computes
/// bounding boxes and pushes them in through `insert`/`reindex`, so the
/// index never needs to call back into the owner. Implementations may
/// defer internal restructuring until a query forces it.
pub trait SpatialIndex {
    /// Track `id` with the given bounds. Inserting an id that is already
    /// present replaces its bounds.
    fn insert(&mut self, id: u32, bb: Bb);

    /// Stop tracking `id`. Returns false if the id was not present.
    fn remove(&mut self, id: u32) -> bool;

    /// Update the bounds of an already-tracked object. Returns false if
    /// the id was not present (the caller may then try another index).
    fn reindex(&mut self, id: u32, bb: Bb) -> bool;

    /// Rebuild internal structure from the currently stored bounds.
    fn reindex_all(&mut self);

    fn contains(&self, id: u32) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stored bounds for `id`, if tracked.
    fn bb(&self, id: u32) -> Option<Bb>;

    /// Visit every tracked id. Order is unspecified.
    fn each(&self, visitor: &mut dyn FnMut(u32));

    /// Visit every tracked id whose bounds intersect `bb`.
    fn query(&mut self, bb: Bb, visitor: &mut dyn FnMut(u32));

    /// Visit every unordered pair of tracked ids with intersecting bounds,
    /// each pair exactly once.
    fn each_pair(&mut self, visitor: &mut dyn FnMut(u32, u32));
}
