//! Resource kinds and quantity maps.
//!
//! A facility type declares its own closed `enum` of resource kinds (raw
//! materials and products share the one enum). Any type meeting the
//! [`Resource`] bounds works; the engine never converts kinds to strings.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Whole units of a resource.
pub type Quantity = u32;

/// Marker for resource-kind tags. Ordering keeps every map walk deterministic.
pub trait Resource: Copy + Ord + Hash + Debug + Send + Sync + 'static {}

impl<T> Resource for T where T: Copy + Ord + Hash + Debug + Send + Sync + 'static {}

/// Kind -> quantity. Absent keys mean zero; zero is never stored.
pub type ResourceMap<K> = BTreeMap<K, Quantity>;

/// Quantity of `kind` in `map`, zero when absent.
#[inline]
pub fn quantity_of<K: Resource>(map: &ResourceMap<K>, kind: K) -> Quantity {
    map.get(&kind).copied().unwrap_or(0)
}

/// Add every entry of `batch` into `pool`. Returns the first kind whose sum
/// overflows; `pool` is left partially merged in that case, so callers only
/// use this on scratch copies.
pub fn merge_into<K: Resource>(pool: &mut ResourceMap<K>, batch: &ResourceMap<K>) -> Result<(), K> {
    for (&kind, &qty) in batch {
        if qty == 0 {
            continue;
        }
        let slot = pool.entry(kind).or_insert(0);
        *slot = slot.checked_add(qty).ok_or(kind)?;
    }
    Ok(())
}

/// Sum of all quantities, widened so it cannot overflow.
pub fn total_of<K: Resource>(map: &ResourceMap<K>) -> u64 {
    map.values().map(|&q| u64::from(q)).sum()
}
