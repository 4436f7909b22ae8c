use slotmap::new_key_type;

new_key_type! {
    /// Identifies a facility registered with the [`Scheduler`](crate::scheduler::Scheduler).
    pub struct FacilityId;
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn facility_ids_are_distinct_and_copy() {
        let mut map: SlotMap<FacilityId, &str> = SlotMap::with_key();
        let a = map.insert("bakery");
        let b = map.insert("winery");
        let c = a; // Copy
        assert_ne!(a, b);
        assert_eq!(a, c);
        assert_eq!(map[a], "bakery");
    }

    #[test]
    fn removed_id_is_not_reused_as_equal() {
        let mut map: SlotMap<FacilityId, u32> = SlotMap::with_key();
        let a = map.insert(1);
        map.remove(a);
        let b = map.insert(2);
        assert_ne!(a, b);
        assert!(!map.contains_key(a));
    }
}
