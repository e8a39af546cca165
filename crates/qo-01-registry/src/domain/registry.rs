//! Reporter membership with index-stable reads.

use super::errors::RegistryError;
use shared_types::Address;
use std::collections::HashMap;

/// Most members the registry admits. Bounds the identities a single
/// finalization visits.
pub const MAX_REPORTERS: usize = 1_024;

/// Registered reporters.
///
/// `positions` maps each member to its slot in `order`, giving O(1)
/// membership tests and O(1) removal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReporterRegistry {
    positions: HashMap<Address, usize>,
    order: Vec<Address>,
}

impl ReporterRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `reporter`, appending it to the order list.
    ///
    /// Returns the registry size after the insertion.
    pub fn register(&mut self, reporter: Address) -> Result<usize, RegistryError> {
        if self.positions.contains_key(&reporter) {
            return Err(RegistryError::AlreadyRegistered);
        }
        if self.order.len() >= MAX_REPORTERS {
            return Err(RegistryError::Full {
                capacity: MAX_REPORTERS,
            });
        }
        self.positions.insert(reporter, self.order.len());
        self.order.push(reporter);
        Ok(self.order.len())
    }

    /// Removes `reporter` by swapping the last member into its slot.
    ///
    /// Returns the registry size after the removal.
    pub fn unregister(&mut self, reporter: &Address) -> Result<usize, RegistryError> {
        let index = self
            .positions
            .remove(reporter)
            .ok_or(RegistryError::NotRegistered)?;

        self.order.swap_remove(index);
        if let Some(moved) = self.order.get(index) {
            self.positions.insert(*moved, index);
        }
        Ok(self.order.len())
    }

    pub fn is_member(&self, reporter: &Address) -> bool {
        self.positions.contains_key(reporter)
    }

    pub fn size(&self) -> usize {
        self.order.len()
    }

    /// Member stored at `index` of the order list.
    pub fn member_at(&self, index: usize) -> Option<Address> {
        self.order.get(index).copied()
    }

    /// Snapshot of all members in order-list order.
    pub fn members(&self) -> &[Address] {
        &self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn addr(n: u8) -> Address {
        [n; 20]
    }

    #[test]
    fn test_register_appends() {
        let mut registry = ReporterRegistry::new();
        assert_eq!(registry.register(addr(1)), Ok(1));
        assert_eq!(registry.register(addr(2)), Ok(2));

        assert!(registry.is_member(&addr(1)));
        assert_eq!(registry.member_at(1), Some(addr(2)));
        assert_eq!(registry.members(), &[addr(1), addr(2)]);
    }

    #[test]
    fn test_register_twice_fails_without_change() {
        let mut registry = ReporterRegistry::new();
        registry.register(addr(1)).unwrap();
        let before = registry.clone();

        assert_eq!(
            registry.register(addr(1)),
            Err(RegistryError::AlreadyRegistered)
        );
        assert_eq!(registry, before);
    }

    #[test]
    fn test_register_beyond_capacity_fails() {
        let mut registry = ReporterRegistry::new();
        for n in 0..MAX_REPORTERS as u32 {
            let mut reporter = [0u8; 20];
            reporter[..4].copy_from_slice(&n.to_be_bytes());
            registry.register(reporter).unwrap();
        }
        let before = registry.clone();

        assert_eq!(
            registry.register([0xff; 20]),
            Err(RegistryError::Full {
                capacity: MAX_REPORTERS
            })
        );
        assert_eq!(registry, before);

        // Leaving frees a slot.
        registry.unregister(&[0u8; 20]).unwrap();
        assert_eq!(registry.register([0xff; 20]), Ok(MAX_REPORTERS));
    }

    #[test]
    fn test_unregister_non_member_leaves_state_unchanged() {
        let mut registry = ReporterRegistry::new();
        registry.register(addr(1)).unwrap();
        registry.register(addr(2)).unwrap();
        let before = registry.clone();

        assert_eq!(
            registry.unregister(&addr(9)),
            Err(RegistryError::NotRegistered)
        );
        assert_eq!(registry, before);
    }

    #[test]
    fn test_unregister_relocates_last_member() {
        let mut registry = ReporterRegistry::new();
        for n in 1..=4 {
            registry.register(addr(n)).unwrap();
        }

        assert_eq!(registry.unregister(&addr(2)), Ok(3));

        assert_eq!(registry.members(), &[addr(1), addr(4), addr(3)]);
        assert_eq!(registry.member_at(1), Some(addr(4)));
        assert_eq!(registry.member_at(3), None);

        // The relocated member can itself be removed correctly afterwards.
        assert_eq!(registry.unregister(&addr(4)), Ok(2));
        assert_eq!(registry.members(), &[addr(1), addr(3)]);
    }

    #[test]
    fn test_unregister_last_member() {
        let mut registry = ReporterRegistry::new();
        registry.register(addr(1)).unwrap();
        registry.register(addr(2)).unwrap();

        assert_eq!(registry.unregister(&addr(2)), Ok(1));
        assert_eq!(registry.members(), &[addr(1)]);
        assert!(!registry.is_member(&addr(2)));
    }

    #[test]
    fn test_reregister_after_removal() {
        let mut registry = ReporterRegistry::new();
        registry.register(addr(1)).unwrap();
        registry.unregister(&addr(1)).unwrap();

        assert_eq!(registry.register(addr(1)), Ok(1));
        assert_eq!(registry.member_at(0), Some(addr(1)));
    }

    proptest! {
        #[test]
        fn prop_order_and_index_stay_in_sync(ops in prop::collection::vec((any::<bool>(), 0u8..8), 0..64)) {
            let mut registry = ReporterRegistry::new();
            let mut model = std::collections::BTreeSet::new();

            for (insert, n) in ops {
                if insert {
                    let expected = model.insert(n);
                    prop_assert_eq!(registry.register(addr(n)).is_ok(), expected);
                } else {
                    let expected = model.remove(&n);
                    prop_assert_eq!(registry.unregister(&addr(n)).is_ok(), expected);
                }

                prop_assert_eq!(registry.size(), model.len());
                for (index, member) in registry.members().iter().enumerate() {
                    prop_assert_eq!(registry.positions.get(member), Some(&index));
                }
            }
        }
    }
}
