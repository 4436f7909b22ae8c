use crate::resource::{Quantity, Resource, ResourceMap, quantity_of, total_of};

/// Capacity-bounded store of resources.
///
/// The sum of all held quantities never exceeds `capacity`. Adds that would
/// break that are rejected whole; there are no partial adds.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Storage<K: Resource> {
    capacity: Quantity,
    contents: ResourceMap<K>,
}

impl<K: Resource> Storage<K> {
    pub fn new(capacity: Quantity) -> Self {
        Self {
            capacity,
            contents: ResourceMap::new(),
        }
    }

    pub fn capacity(&self) -> Quantity {
        self.capacity
    }

    /// Add `amount` of `kind`. Returns false, changing nothing, if the
    /// storage cannot hold all of it.
    #[must_use = "a rejected add leaves the storage unchanged"]
    pub fn try_add(&mut self, kind: K, amount: Quantity) -> bool {
        if u64::from(self.total()) + u64::from(amount) > u64::from(self.capacity) {
            return false;
        }
        if amount > 0 {
            *self.contents.entry(kind).or_insert(0) += amount;
        }
        true
    }

    /// Remove `amount` of `kind`. Returns false, changing nothing, if fewer
    /// than `amount` units are held.
    #[must_use = "a rejected remove leaves the storage unchanged"]
    pub fn try_remove(&mut self, kind: K, amount: Quantity) -> bool {
        let held = self.quantity(kind);
        if held < amount {
            return false;
        }
        if amount == 0 {
            return true;
        }
        if held == amount {
            self.contents.remove(&kind);
        } else if let Some(slot) = self.contents.get_mut(&kind) {
            *slot -= amount;
        }
        true
    }

    /// Quantity of a specific kind.
    pub fn quantity(&self, kind: K) -> Quantity {
        quantity_of(&self.contents, kind)
    }

    /// Total units across all kinds.
    pub fn total(&self) -> Quantity {
        // Bounded by capacity, so it always fits.
        total_of(&self.contents) as Quantity
    }

    /// Units that can still be added.
    pub fn free(&self) -> Quantity {
        self.capacity.saturating_sub(self.total())
    }

    /// Independent copy of the contents.
    pub fn snapshot(&self) -> ResourceMap<K> {
        self.contents.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Borrowed view of the contents, used for hashing.
    pub(crate) fn contents(&self) -> &ResourceMap<K> {
        &self.contents
    }

    /// Replace the contents wholesale during a facility commit.
    ///
    /// Callers guarantee the new contents fit; zero entries are dropped.
    pub(crate) fn replace_contents(&mut self, mut contents: ResourceMap<K>) {
        contents.retain(|_, q| *q > 0);
        debug_assert!(total_of(&contents) <= u64::from(self.capacity));
        self.contents = contents;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
    enum Grain {
        Wheat,
        Barley,
    }

    #[test]
    fn add_and_remove() {
        let mut store = Storage::new(100);
        assert!(store.try_add(Grain::Wheat, 50));
        assert_eq!(store.quantity(Grain::Wheat), 50);

        assert!(store.try_remove(Grain::Wheat, 30));
        assert_eq!(store.quantity(Grain::Wheat), 20);
    }

    #[test]
    fn add_rejects_whole_batch_when_over_capacity() {
        let mut store = Storage::new(10);
        assert!(store.try_add(Grain::Wheat, 6));
        assert!(!store.try_add(Grain::Barley, 5));
        assert_eq!(store.quantity(Grain::Barley), 0);
        assert_eq!(store.total(), 6);
    }

    #[test]
    fn add_exactly_to_capacity() {
        let mut store = Storage::new(10);
        assert!(store.try_add(Grain::Wheat, 10));
        assert_eq!(store.free(), 0);
        assert!(!store.try_add(Grain::Wheat, 1));
    }

    #[test]
    fn add_zero_is_a_no_op() {
        let mut store: Storage<Grain> = Storage::new(10);
        assert!(store.try_add(Grain::Wheat, 0));
        assert!(store.is_empty());
    }

    #[test]
    fn add_near_u32_max_does_not_wrap() {
        let mut store = Storage::new(u32::MAX);
        assert!(store.try_add(Grain::Wheat, u32::MAX - 1));
        assert!(!store.try_add(Grain::Barley, 2));
        assert!(store.try_add(Grain::Barley, 1));
        assert_eq!(store.total(), u32::MAX);
    }

    #[test]
    fn remove_more_than_held_is_rejected() {
        let mut store = Storage::new(100);
        assert!(store.try_add(Grain::Wheat, 5));
        assert!(!store.try_remove(Grain::Wheat, 10));
        assert_eq!(store.quantity(Grain::Wheat), 5);
    }

    #[test]
    fn remove_to_zero_drops_the_key() {
        let mut store = Storage::new(100);
        assert!(store.try_add(Grain::Wheat, 5));
        assert!(store.try_remove(Grain::Wheat, 5));
        assert!(store.is_empty());
        assert!(!store.snapshot().contains_key(&Grain::Wheat));
    }

    #[test]
    fn remove_absent_kind() {
        let mut store: Storage<Grain> = Storage::new(100);
        assert!(!store.try_remove(Grain::Barley, 1));
        assert!(store.try_remove(Grain::Barley, 0));
    }

    #[test]
    fn total_spans_kinds() {
        let mut store = Storage::new(100);
        assert!(store.try_add(Grain::Wheat, 30));
        assert!(store.try_add(Grain::Barley, 20));
        assert_eq!(store.total(), 50);
        assert_eq!(store.free(), 50);
    }

    #[test]
    fn snapshot_is_independent() {
        let mut store = Storage::new(100);
        assert!(store.try_add(Grain::Wheat, 30));
        let mut snap = store.snapshot();
        snap.insert(Grain::Wheat, 99);
        snap.insert(Grain::Barley, 1);
        assert_eq!(store.quantity(Grain::Wheat), 30);
        assert_eq!(store.quantity(Grain::Barley), 0);
    }

    #[test]
    fn replace_contents_drops_zero_entries() {
        let mut store = Storage::new(100);
        store.replace_contents(ResourceMap::from([(Grain::Wheat, 0), (Grain::Barley, 4)]));
        assert_eq!(store.snapshot(), ResourceMap::from([(Grain::Barley, 4)]));
    }

    #[test]
    fn serializes_for_reporting() {
        let mut store = Storage::new(10);
        assert!(store.try_add(Grain::Wheat, 3));
        let json = serde_json::to_value(&store).unwrap();
        assert_eq!(json["capacity"], 10);
        assert_eq!(json["contents"]["Wheat"], 3);
    }
}
