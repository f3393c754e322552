//! Interval index: a red-black tree of half-open character ranges.
//!
//! Entries live in an arena and are addressed by [`EntryId`]. The tree is
//! ordered by the low bound of each range, and every entry carries a `limit`:
//! the largest high bound found anywhere in its subtree. An overlap query can
//! skip any subtree whose limit does not reach past the query's low bound, so
//! [`IntervalIndex::find_intersecting`] is logarithmic plus output size.
//!
//! The index serves two purposes in this crate:
//!
//! - building character classes, where overlapping members are coalesced
//!   ([`IntervalIndex::insert_coalescing`]);
//! - partitioning the alphabet of a DFA state into disjoint pieces
//!   ([`IntervalIndex::partition`]), and afterwards holding the DFA edge
//!   table of that state.

use super::label::CharRange;

/// Identifier for an entry of an [`IntervalIndex`].
pub type EntryId = u32;

#[derive(Debug, Clone)]
struct Entry<T> {
    range: CharRange,
    /// Largest `range.hi` in this entry's subtree.
    limit: u8,
    parent: Option<EntryId>,
    left: Option<EntryId>,
    right: Option<EntryId>,
    red: bool,
    /// `None` once the entry has been removed and its slot awaits reuse.
    payload: Option<T>,
}

/// Red-black interval tree keyed by [`CharRange`], with a payload per entry.
#[derive(Debug, Clone)]
pub struct IntervalIndex<T> {
    entries: Vec<Entry<T>>,
    free: Vec<EntryId>,
    root: Option<EntryId>,
    len: usize,
}

impl<T> Default for IntervalIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> IntervalIndex<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            free: Vec::new(),
            root: None,
            len: 0,
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The range of a live entry.
    pub fn range(&self, id: EntryId) -> Option<CharRange> {
        let entry = self.entries.get(id as usize)?;
        entry.payload.as_ref().map(|_| entry.range)
    }

    /// The payload of a live entry.
    pub fn get(&self, id: EntryId) -> Option<&T> {
        self.entries.get(id as usize)?.payload.as_ref()
    }

    // ===== Accessors =====

    fn entry(&self, id: EntryId) -> &Entry<T> {
        &self.entries[id as usize]
    }

    fn entry_mut(&mut self, id: EntryId) -> &mut Entry<T> {
        &mut self.entries[id as usize]
    }

    fn parent(&self, id: EntryId) -> Option<EntryId> {
        self.entry(id).parent
    }

    fn left(&self, id: EntryId) -> Option<EntryId> {
        self.entry(id).left
    }

    fn right(&self, id: EntryId) -> Option<EntryId> {
        self.entry(id).right
    }

    fn is_red(&self, id: Option<EntryId>) -> bool {
        id.is_some_and(|id| self.entry(id).red)
    }

    fn is_black(&self, id: Option<EntryId>) -> bool {
        !self.is_red(id)
    }

    fn set_red(&mut self, id: EntryId, red: bool) {
        self.entry_mut(id).red = red;
    }

    fn compute_limit(&self, id: EntryId) -> u8 {
        let entry = self.entry(id);
        let left = entry.left.map_or(0, |l| self.entry(l).limit);
        let right = entry.right.map_or(0, |r| self.entry(r).limit);
        entry.range.hi.max(left).max(right)
    }

    fn update_limit(&mut self, id: EntryId) {
        let limit = self.compute_limit(id);
        self.entry_mut(id).limit = limit;
    }

    /// Recompute limits from `start` towards the root until one is unchanged.
    fn propagate_limit(&mut self, start: Option<EntryId>) {
        let mut current = start;
        while let Some(id) = current {
            let limit = self.compute_limit(id);
            if limit == self.entry(id).limit {
                break;
            }
            self.entry_mut(id).limit = limit;
            current = self.parent(id);
        }
    }

    // ===== Rotations =====

    fn rotate_left(&mut self, node: EntryId) {
        let Some(right) = self.right(node) else {
            return;
        };

        let right_left = self.left(right);
        self.entry_mut(node).right = right_left;
        if let Some(rl) = right_left {
            self.entry_mut(rl).parent = Some(node);
        }

        let parent = self.parent(node);
        self.entry_mut(right).parent = parent;
        match parent {
            None => self.root = Some(right),
            Some(p) if self.left(p) == Some(node) => self.entry_mut(p).left = Some(right),
            Some(p) => self.entry_mut(p).right = Some(right),
        }

        self.entry_mut(right).left = Some(node);
        self.entry_mut(node).parent = Some(right);

        // `node` is now below `right`, so it is updated first.
        self.update_limit(node);
        self.update_limit(right);
    }

    fn rotate_right(&mut self, node: EntryId) {
        let Some(left) = self.left(node) else {
            return;
        };

        let left_right = self.right(left);
        self.entry_mut(node).left = left_right;
        if let Some(lr) = left_right {
            self.entry_mut(lr).parent = Some(node);
        }

        let parent = self.parent(node);
        self.entry_mut(left).parent = parent;
        match parent {
            None => self.root = Some(left),
            Some(p) if self.right(p) == Some(node) => self.entry_mut(p).right = Some(left),
            Some(p) => self.entry_mut(p).left = Some(left),
        }

        self.entry_mut(left).right = Some(node);
        self.entry_mut(node).parent = Some(left);

        self.update_limit(node);
        self.update_limit(left);
    }

    // ===== Insert =====

    /// Insert `range` with `payload`. Overlapping entries are allowed; the
    /// callers that need disjointness check with [`Self::find_intersecting`]
    /// first.
    pub fn insert(&mut self, range: CharRange, payload: T) -> EntryId {
        debug_assert!(range.lo < range.hi, "empty range {range:?}");

        let entry = Entry {
            range,
            limit: range.hi,
            parent: None,
            left: None,
            right: None,
            red: true,
            payload: Some(payload),
        };
        let id = match self.free.pop() {
            Some(id) => {
                self.entries[id as usize] = entry;
                id
            }
            None => {
                self.entries.push(entry);
                (self.entries.len() - 1) as EntryId
            }
        };

        let mut parent = None;
        let mut current = self.root;
        while let Some(node) = current {
            parent = Some(node);
            let entry = self.entry_mut(node);
            entry.limit = entry.limit.max(range.hi);
            current = if range.lo <= entry.range.lo {
                entry.left
            } else {
                entry.right
            };
        }

        self.entry_mut(id).parent = parent;
        match parent {
            None => self.root = Some(id),
            Some(p) if range.lo <= self.entry(p).range.lo => self.entry_mut(p).left = Some(id),
            Some(p) => self.entry_mut(p).right = Some(id),
        }
        self.len += 1;

        self.insert_fix(id);
        id
    }

    fn insert_fix(&mut self, mut node: EntryId) {
        while let Some(parent) = self.parent(node).filter(|&p| self.is_red(Some(p))) {
            // A red parent is never the root, so the grandparent exists.
            let Some(grandparent) = self.parent(parent) else {
                break;
            };

            if Some(parent) == self.left(grandparent) {
                let uncle = self.right(grandparent);
                if let Some(u) = uncle.filter(|&u| self.is_red(Some(u))) {
                    self.set_red(parent, false);
                    self.set_red(u, false);
                    self.set_red(grandparent, true);
                    node = grandparent;
                    continue;
                }
                if Some(node) == self.right(parent) {
                    node = parent;
                    self.rotate_left(node);
                }
                if let Some(parent) = self.parent(node) {
                    if let Some(grandparent) = self.parent(parent) {
                        self.set_red(parent, false);
                        self.set_red(grandparent, true);
                        self.rotate_right(grandparent);
                    }
                }
            } else {
                let uncle = self.left(grandparent);
                if let Some(u) = uncle.filter(|&u| self.is_red(Some(u))) {
                    self.set_red(parent, false);
                    self.set_red(u, false);
                    self.set_red(grandparent, true);
                    node = grandparent;
                    continue;
                }
                if Some(node) == self.left(parent) {
                    node = parent;
                    self.rotate_right(node);
                }
                if let Some(parent) = self.parent(node) {
                    if let Some(grandparent) = self.parent(parent) {
                        self.set_red(parent, false);
                        self.set_red(grandparent, true);
                        self.rotate_left(grandparent);
                    }
                }
            }
        }

        if let Some(root) = self.root {
            self.set_red(root, false);
        }
    }

    // ===== Remove =====

    fn subtree_min(&self, mut node: EntryId) -> EntryId {
        while let Some(left) = self.left(node) {
            node = left;
        }
        node
    }

    /// Make `source` take `dest`'s place as a child of `dest`'s parent.
    fn replace_child(&mut self, source: Option<EntryId>, dest: EntryId) {
        let parent = self.parent(dest);
        match parent {
            None => self.root = source,
            Some(p) if self.left(p) == Some(dest) => self.entry_mut(p).left = source,
            Some(p) => self.entry_mut(p).right = source,
        }
        if let Some(s) = source {
            self.entry_mut(s).parent = parent;
        }
    }

    /// Put `source` in `dest`'s position, adopting its children and color.
    fn transplant(&mut self, source: EntryId, dest: EntryId) {
        self.replace_child(Some(source), dest);

        let Entry {
            left, right, red, ..
        } = *self.entry(dest);
        self.entry_mut(source).left = left;
        if let Some(l) = left {
            self.entry_mut(l).parent = Some(source);
        }
        self.entry_mut(source).right = right;
        if let Some(r) = right {
            self.entry_mut(r).parent = Some(source);
        }
        self.set_red(source, red);
    }

    /// Remove a live entry and return its payload. Returns `None` for ids
    /// that were never issued or are already removed.
    pub fn remove(&mut self, node: EntryId) -> Option<T> {
        self.entries.get(node as usize)?.payload.as_ref()?;

        let splice = match (self.left(node), self.right(node)) {
            (Some(_), Some(right)) => self.subtree_min(right),
            _ => node,
        };
        let subtree = self.left(splice).or(self.right(splice));
        let subtree_parent = if self.parent(splice) == Some(node) {
            Some(splice)
        } else {
            self.parent(splice)
        };

        self.replace_child(subtree, splice);
        let removed_black = !self.entry(splice).red;

        if splice != node {
            self.transplant(splice, node);
            self.propagate_limit(subtree_parent);
            if Some(splice) != subtree_parent {
                self.update_limit(splice);
            }
        }
        self.propagate_limit(self.parent(splice));

        if removed_black {
            self.remove_fix(subtree, subtree_parent);
        }

        self.len -= 1;
        self.free.push(node);
        let entry = self.entry_mut(node);
        entry.parent = None;
        entry.left = None;
        entry.right = None;
        entry.payload.take()
    }

    fn remove_fix(&mut self, mut node: Option<EntryId>, mut parent: Option<EntryId>) {
        while let Some(p) = parent {
            if self.is_red(node) {
                break;
            }

            if node == self.left(p) {
                let Some(mut other) = self.right(p) else {
                    break;
                };
                if self.is_red(Some(other)) {
                    self.set_red(other, false);
                    self.set_red(p, true);
                    self.rotate_left(p);
                    let Some(o) = self.right(p) else {
                        break;
                    };
                    other = o;
                }

                if self.is_black(self.left(other)) && self.is_black(self.right(other)) {
                    self.set_red(other, true);
                    node = Some(p);
                    parent = self.parent(p);
                } else {
                    if self.is_black(self.right(other)) {
                        if let Some(other_left) = self.left(other) {
                            self.set_red(other_left, false);
                        }
                        self.set_red(other, true);
                        self.rotate_right(other);
                        let Some(o) = self.right(p) else {
                            break;
                        };
                        other = o;
                    }
                    let p_red = self.entry(p).red;
                    self.set_red(other, p_red);
                    self.set_red(p, false);
                    if let Some(other_right) = self.right(other) {
                        self.set_red(other_right, false);
                    }
                    self.rotate_left(p);
                    node = self.root;
                    parent = None;
                }
            } else {
                let Some(mut other) = self.left(p) else {
                    break;
                };
                if self.is_red(Some(other)) {
                    self.set_red(other, false);
                    self.set_red(p, true);
                    self.rotate_right(p);
                    let Some(o) = self.left(p) else {
                        break;
                    };
                    other = o;
                }

                if self.is_black(self.right(other)) && self.is_black(self.left(other)) {
                    self.set_red(other, true);
                    node = Some(p);
                    parent = self.parent(p);
                } else {
                    if self.is_black(self.left(other)) {
                        if let Some(other_right) = self.right(other) {
                            self.set_red(other_right, false);
                        }
                        self.set_red(other, true);
                        self.rotate_left(other);
                        let Some(o) = self.left(p) else {
                            break;
                        };
                        other = o;
                    }
                    let p_red = self.entry(p).red;
                    self.set_red(other, p_red);
                    self.set_red(p, false);
                    if let Some(other_left) = self.left(other) {
                        self.set_red(other_left, false);
                    }
                    self.rotate_right(p);
                    node = self.root;
                    parent = None;
                }
            }
        }

        if let Some(n) = node {
            self.set_red(n, false);
        }
    }

    // ===== Queries =====

    /// Ids of all entries overlapping `range`, in ascending order of low bound.
    pub fn find_intersecting(&self, range: CharRange) -> Vec<EntryId> {
        let mut found = Vec::new();
        if let Some(root) = self.root {
            self.collect_intersecting(root, range, &mut found);
        }
        found
    }

    fn collect_intersecting(&self, node: EntryId, range: CharRange, found: &mut Vec<EntryId>) {
        let entry = self.entry(node);
        if entry.limit <= range.lo {
            return;
        }
        if let Some(left) = entry.left {
            self.collect_intersecting(left, range, found);
        }
        // Everything to the right starts at or after this entry.
        if entry.range.lo < range.hi {
            if entry.range.overlaps(range) {
                found.push(node);
            }
            if let Some(right) = entry.right {
                self.collect_intersecting(right, range, found);
            }
        }
    }

    /// In-order iteration over `(id, range, payload)`.
    pub fn iter(&self) -> Iter<'_, T> {
        let mut iter = Iter {
            index: self,
            stack: Vec::new(),
        };
        iter.descend(self.root);
        iter
    }

    /// Validate the red-black and limit invariants, panicking on violation.
    #[cfg(test)]
    pub(crate) fn check(&self) {
        let Some(root) = self.root else {
            assert_eq!(self.len, 0, "empty tree with non-zero length");
            return;
        };
        assert!(self.parent(root).is_none());
        assert!(!self.entry(root).red, "root must be black");
        let (size, _, _) = self.check_subtree(root, 0, u8::MAX);
        assert_eq!(size, self.len, "size mismatch");
    }

    /// Returns (size, limit, black height) of the subtree.
    #[cfg(test)]
    fn check_subtree(&self, node: EntryId, min_lo: u8, max_lo: u8) -> (usize, u8, usize) {
        let entry = self.entry(node);
        assert!(entry.payload.is_some(), "removed entry still linked");
        assert!(min_lo <= entry.range.lo && entry.range.lo <= max_lo, "order violation");

        let (left_size, left_limit, left_bh) = match entry.left {
            Some(l) => {
                assert_eq!(self.parent(l), Some(node), "left child parent mismatch");
                self.check_subtree(l, min_lo, entry.range.lo)
            }
            None => (0, 0, 0),
        };
        let (right_size, right_limit, right_bh) = match entry.right {
            Some(r) => {
                assert_eq!(self.parent(r), Some(node), "right child parent mismatch");
                self.check_subtree(r, entry.range.lo, max_lo)
            }
            None => (0, 0, 0),
        };

        assert_eq!(
            entry.limit,
            entry.range.hi.max(left_limit).max(right_limit),
            "limit not max of range end and children"
        );
        assert_eq!(left_bh, right_bh, "black height mismatch");
        if entry.red {
            assert!(!self.is_red(entry.parent), "red entry with red parent");
        }

        let bh = usize::from(!entry.red) + left_bh;
        (1 + left_size + right_size, entry.limit, bh)
    }
}

impl IntervalIndex<()> {
    /// Insert `range`, first absorbing every entry it overlaps so that the
    /// stored ranges stay pairwise disjoint.
    pub fn insert_coalescing(&mut self, range: CharRange) -> EntryId {
        let mut merged = range;
        for id in self.find_intersecting(range) {
            if let Some(existing) = self.range(id) {
                merged.lo = merged.lo.min(existing.lo);
                merged.hi = merged.hi.max(existing.hi);
                self.remove(id);
            }
        }
        self.insert(merged, ())
    }

    /// The stored ranges in ascending order.
    pub fn ranges(&self) -> Vec<CharRange> {
        self.iter().map(|(_, range, _)| range).collect()
    }

    /// Coarsest partition of the candidates' union into disjoint ranges such
    /// that every candidate is exactly a union of pieces. Pieces are returned
    /// in ascending order.
    pub fn partition<I>(candidates: I) -> Vec<CharRange>
    where
        I: IntoIterator<Item = CharRange>,
    {
        let mut index = Self::new();
        let mut pending: Vec<CharRange> = candidates.into_iter().collect();

        while let Some(candidate) = pending.pop() {
            let Some(&id) = index.find_intersecting(candidate).first() else {
                index.insert(candidate, ());
                continue;
            };
            let Some(stored) = index.range(id) else {
                continue;
            };
            index.remove(id);

            // The stored piece is cut at the overlap boundaries; its parts
            // are disjoint from every other piece, so they go straight back.
            // Parts of the candidate may still overlap other pieces and are
            // retried.
            let Some(overlap) = stored.intersect(candidate) else {
                continue;
            };
            let (before, rest) = match stored.split(overlap.lo) {
                Some((before, rest)) => (Some(before), rest),
                None => (None, stored),
            };
            let after = rest.split(overlap.hi).map(|(_, after)| after);
            for piece in before.into_iter().chain([overlap]).chain(after) {
                index.insert(piece, ());
            }
            pending.extend(candidate.remove(stored));
        }

        index.ranges()
    }
}

/// In-order iterator over an [`IntervalIndex`].
pub struct Iter<'a, T> {
    index: &'a IntervalIndex<T>,
    stack: Vec<EntryId>,
}

impl<T> Iter<'_, T> {
    fn descend(&mut self, mut node: Option<EntryId>) {
        while let Some(id) = node {
            self.stack.push(id);
            node = self.index.left(id);
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (EntryId, CharRange, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let index = self.index;
        self.descend(index.right(id));
        let entry = index.entry(id);
        entry.payload.as_ref().map(|payload| (id, entry.range, payload))
    }
}
