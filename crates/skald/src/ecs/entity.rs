//! # Entity — Identity Plus an Owned Component Set
//!
//! An [`Entity`] is a record owned by its [`Scene`](super::Scene): a stable
//! [`EntityId`], a display name, one [`Transform`], an optional parent link,
//! and at most one component per [`ComponentKind`](super::ComponentKind).
//!
//! ## Stable IDs
//!
//! Scenes are saved to JSON and prefab instances refer back to template
//! entities by id, so ids must survive a save/load cycle unchanged. The
//! [`EntityAllocator`] therefore hands out monotonically increasing numbers
//! and never recycles one, and loading a scene bumps it past every id it has
//! seen.
//!
//! ```text
//! allocate() → 1, 2, 3
//! reserve(10)
//! allocate() → 11
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::component::{Component, ComponentData, ComponentKind, ComponentSet};
use crate::math::Transform;

/// Stable, immutable entity identifier.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl EntityId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out fresh [`EntityId`]s.
#[derive(Debug, Clone)]
pub(crate) struct EntityAllocator {
    /// Next id to hand out. Never decreases.
    next: u64,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Allocate a fresh id.
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }

    /// Make sure `id` (and everything below it) is never handed out.
    pub fn reserve(&mut self, id: EntityId) {
        if id.0 >= self.next {
            self.next = id.0 + 1;
        }
    }
}

/// A live entity in a [`Scene`](super::Scene).
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    id: EntityId,
    pub name: String,
    pub transform: Transform,
    /// Parent in the scene hierarchy, if any.
    pub parent: Option<EntityId>,
    pub components: ComponentSet,
}

impl Entity {
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            transform: Transform::default(),
            parent: None,
            components: ComponentSet::default(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Builder: set the transform.
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Builder: add a component.
    pub fn with(mut self, component: impl Into<Component>) -> Self {
        self.components.insert(component);
        self
    }

    /// Typed component access.
    pub fn get<T: ComponentData>(&self) -> Option<&T> {
        self.components.get::<T>()
    }

    /// Typed mutable component access.
    pub fn get_mut<T: ComponentData>(&mut self) -> Option<&mut T> {
        self.components.get_mut::<T>()
    }

    /// Add a component, replacing any existing one of the same kind. Returns
    /// the replaced component.
    pub fn insert(&mut self, component: impl Into<Component>) -> Option<Component> {
        self.components.insert(component)
    }

    /// Remove the component of `kind`, returning it.
    pub fn remove(&mut self, kind: ComponentKind) -> Option<Component> {
        self.components.remove(kind)
    }

    pub fn has(&self, kind: ComponentKind) -> bool {
        self.components.has(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{BoxCollider2D, SpriteRenderer};

    #[test]
    fn allocator_is_monotonic() {
        let mut alloc = EntityAllocator::new();
        assert_eq!(alloc.allocate(), EntityId(1));
        assert_eq!(alloc.allocate(), EntityId(2));
        alloc.reserve(EntityId(10));
        assert_eq!(alloc.allocate(), EntityId(11));
        // Reserving something lower doesn't move backwards.
        alloc.reserve(EntityId(3));
        assert_eq!(alloc.allocate(), EntityId(12));
    }

    #[test]
    fn insert_replaces_same_kind() {
        let mut e = Entity::new(EntityId(1), "crate");
        assert!(e.insert(SpriteRenderer::new("box_a")).is_none());
        let old = e.insert(SpriteRenderer::new("box_b"));
        assert!(matches!(old, Some(Component::SpriteRenderer(s)) if s.sprite_id == "box_a"));
        assert_eq!(e.get::<SpriteRenderer>().unwrap().sprite_id, "box_b");
        assert_eq!(e.components.len(), 1);
    }

    #[test]
    fn remove_by_kind() {
        let mut e = Entity::new(EntityId(1), "wall").with(BoxCollider2D::default());
        assert!(e.has(ComponentKind::BoxCollider2D));
        assert!(e.remove(ComponentKind::BoxCollider2D).is_some());
        assert!(!e.has(ComponentKind::BoxCollider2D));
        assert!(e.remove(ComponentKind::BoxCollider2D).is_none());
    }
}
