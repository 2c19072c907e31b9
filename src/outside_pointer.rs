use indexmap::IndexMap;
use ratatui::layout::{Position, Rect};
use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use crate::utils::rect_contains;

pub type SubscriptionId = u64;

/// Document-level pointer-down listeners, one per widget container.
///
/// Instead of a global listener per widget, every widget owns an
/// [`OutsidePointerSubscription`] that removes its entry when dropped.
#[derive(Debug, Default)]
pub struct OutsidePointerRegistry {
    next_id: SubscriptionId,
    containers: IndexMap<SubscriptionId, Rect>,
}

pub type SharedRegistry = Rc<RefCell<OutsidePointerRegistry>>;

impl OutsidePointerRegistry {
    pub fn shared() -> SharedRegistry {
        Rc::new(RefCell::new(Self::default()))
    }

    pub fn subscribe(registry: &SharedRegistry) -> OutsidePointerSubscription {
        let mut inner = registry.borrow_mut();

        let id = inner.next_id;
        inner.next_id += 1;
        inner.containers.insert(id, Rect::default());

        OutsidePointerSubscription {
            id,
            registry: Rc::downgrade(registry),
        }
    }

    /// Subscribers whose container does not contain `position`, in attachment order
    pub fn outside(&self, position: Position) -> Vec<SubscriptionId> {
        self.containers
            .iter()
            .filter(|(_, area)| !rect_contains(area, position))
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }
}

#[derive(Debug)]
pub struct OutsidePointerSubscription {
    id: SubscriptionId,
    registry: Weak<RefCell<OutsidePointerRegistry>>,
}

impl OutsidePointerSubscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn update_area(&self, area: Rect) {
        if let Some(registry) = self.registry.upgrade() {
            if let Some(container) = registry.borrow_mut().containers.get_mut(&self.id) {
                *container = area;
            }
        }
    }
}

impl Drop for OutsidePointerSubscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            // The registry may be borrowed while a page is torn down during dispatch
            if let Ok(mut registry) = registry.try_borrow_mut() {
                registry.containers.shift_remove(&self.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reports_containers_not_under_pointer() {
        let registry = OutsidePointerRegistry::shared();

        let first = OutsidePointerRegistry::subscribe(&registry);
        let second = OutsidePointerRegistry::subscribe(&registry);
        first.update_area(Rect::new(0, 0, 10, 3));
        second.update_area(Rect::new(0, 5, 10, 3));

        assert_eq!(
            registry.borrow().outside(Position::new(2, 1)),
            vec![second.id()]
        );
        assert_eq!(
            registry.borrow().outside(Position::new(20, 20)),
            vec![first.id(), second.id()]
        );
    }

    #[test]
    fn dropping_subscription_unregisters() {
        let registry = OutsidePointerRegistry::shared();

        let first = OutsidePointerRegistry::subscribe(&registry);
        {
            let _second = OutsidePointerRegistry::subscribe(&registry);
            assert_eq!(registry.borrow().len(), 2);
        }

        assert_eq!(registry.borrow().len(), 1);
        assert_eq!(registry.borrow().outside(Position::new(0, 0)), vec![first.id()]);

        drop(first);
        assert!(registry.borrow().is_empty());
    }

    #[test]
    fn subscription_outliving_registry_is_harmless() {
        let registry = OutsidePointerRegistry::shared();
        let subscription = OutsidePointerRegistry::subscribe(&registry);

        drop(registry);
        subscription.update_area(Rect::new(0, 0, 1, 1));
    }
}
