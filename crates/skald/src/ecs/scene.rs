//! # Scene — The Entity Store
//!
//! A [`Scene`] owns every [`Entity`] exclusively. Entities keep the order in
//! which they were added (saved scenes list them in that order and systems
//! visit them in that order), and an index maps ids to positions for O(1)
//! lookup.
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │ Scene                                         │
//! │                                               │
//! │  entities: Vec<Entity>     insertion order    │
//! │  index: HashMap<EntityId, usize>              │
//! │  allocator: next id, never recycled           │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Hierarchy
//!
//! Parent links live on the child (`Entity::parent`). There is no cached
//! children list to keep in sync; [`Scene::children_of`] scans. Scenes here
//! hold tens to hundreds of entities, so the scan is cheap next to the
//! bookkeeping a `Children` component would need on every reparent.

use std::collections::{HashMap, VecDeque};

use super::entity::{Entity, EntityAllocator, EntityId};
use crate::error::LoadError;

#[derive(Debug, Clone)]
pub struct Scene {
    allocator: EntityAllocator,
    entities: Vec<Entity>,
    index: HashMap<EntityId, usize>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            allocator: EntityAllocator::new(),
            entities: Vec::new(),
            index: HashMap::new(),
        }
    }

    // ── Spawning ─────────────────────────────────────────────────────

    /// Spawn an empty entity with a fresh id.
    pub fn spawn(&mut self, name: impl Into<String>) -> EntityId {
        let id = self.allocator.allocate();
        self.push(Entity::new(id, name));
        id
    }

    /// Spawn an empty entity parented to `parent`.
    pub fn spawn_child(&mut self, parent: EntityId, name: impl Into<String>) -> EntityId {
        let id = self.spawn(name);
        if let Some(e) = self.get_mut(id) {
            e.parent = Some(parent);
        }
        id
    }

    /// Allocate an id without adding an entity. Use with [`Scene::insert_entity`]
    /// when the entity is built up front.
    pub fn allocate_id(&mut self) -> EntityId {
        self.allocator.allocate()
    }

    /// Add a fully built entity, keeping its id.
    ///
    /// Used by scene loading, where ids come from the document. Fails if the
    /// id is already taken.
    pub fn insert_entity(&mut self, entity: Entity) -> Result<EntityId, LoadError> {
        let id = entity.id();
        if self.index.contains_key(&id) {
            return Err(LoadError::DuplicateEntity { id });
        }
        self.allocator.reserve(id);
        self.push(entity);
        Ok(id)
    }

    fn push(&mut self, entity: Entity) {
        self.index.insert(entity.id(), self.entities.len());
        self.entities.push(entity);
    }

    // ── Removal ──────────────────────────────────────────────────────

    /// Remove one entity. Its children keep a dangling parent id; use
    /// [`Scene::despawn_recursive`] to take the subtree with it.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        let pos = self.index.remove(&id)?;
        let removed = self.entities.remove(pos);
        for (i, e) in self.entities.iter().enumerate().skip(pos) {
            self.index.insert(e.id(), i);
        }
        Some(removed)
    }

    /// Remove an entity and all of its descendants. Returns how many were
    /// removed.
    pub fn despawn_recursive(&mut self, id: EntityId) -> usize {
        if !self.contains(id) {
            return 0;
        }
        let mut doomed = vec![id];
        doomed.extend(self.descendants(id));
        doomed
            .into_iter()
            .filter(|e| self.despawn(*e).is_some())
            .count()
    }

    /// Remove every entity. Ids keep counting up.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.index.clear();
    }

    // ── Lookup ───────────────────────────────────────────────────────

    pub fn contains(&self, id: EntityId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.index.get(&id).map(|&i| &self.entities[i])
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.index.get(&id).map(|&i| &mut self.entities[i])
    }

    /// First entity with this exact name.
    pub fn find_by_name(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.iter().map(Entity::id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    // ── Hierarchy ────────────────────────────────────────────────────

    /// Direct children of `id`, in scene order.
    pub fn children_of(&self, id: EntityId) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|e| e.parent == Some(id))
            .map(Entity::id)
            .collect()
    }

    /// All descendants of `id` (excluding `id`), breadth-first.
    pub fn descendants(&self, id: EntityId) -> Vec<EntityId> {
        let mut out = Vec::new();
        let mut frontier = VecDeque::from([id]);
        while let Some(current) = frontier.pop_front() {
            for child in self.children_of(current) {
                // Guard against parent cycles in hand-edited data.
                if child != id && !out.contains(&child) {
                    out.push(child);
                    frontier.push_back(child);
                }
            }
        }
        out
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_assigns_increasing_ids() {
        let mut scene = Scene::new();
        let a = scene.spawn("a");
        let b = scene.spawn("b");
        assert!(b > a);
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.get(a).unwrap().name, "a");
    }

    #[test]
    fn despawn_keeps_order_and_index() {
        let mut scene = Scene::new();
        let a = scene.spawn("a");
        let b = scene.spawn("b");
        let c = scene.spawn("c");

        assert_eq!(scene.despawn(b).unwrap().name, "b");
        assert!(scene.get(b).is_none());
        assert_eq!(scene.get(c).unwrap().name, "c");
        assert_eq!(scene.ids().collect::<Vec<_>>(), vec![a, c]);
        assert!(scene.despawn(b).is_none());
    }

    #[test]
    fn insert_entity_rejects_duplicates_and_reserves() {
        let mut scene = Scene::new();
        scene.insert_entity(Entity::new(EntityId(40), "loaded")).unwrap();
        let err = scene
            .insert_entity(Entity::new(EntityId(40), "again"))
            .unwrap_err();
        assert!(matches!(err, LoadError::DuplicateEntity { id } if id == EntityId(40)));

        // Freshly spawned ids never collide with loaded ones.
        assert_eq!(scene.spawn("new"), EntityId(41));
    }

    #[test]
    fn despawn_recursive_takes_subtree() {
        let mut scene = Scene::new();
        let root = scene.spawn("root");
        let arm = scene.spawn_child(root, "arm");
        let hand = scene.spawn_child(arm, "hand");
        let other = scene.spawn("other");

        assert_eq!(scene.descendants(root), vec![arm, hand]);
        assert_eq!(scene.despawn_recursive(root), 3);
        assert_eq!(scene.ids().collect::<Vec<_>>(), vec![other]);
        assert_eq!(scene.despawn_recursive(root), 0);
    }

    #[test]
    fn find_by_name() {
        let mut scene = Scene::new();
        scene.spawn("player");
        let enemy = scene.spawn("enemy");
        assert_eq!(scene.find_by_name("enemy").map(Entity::id), Some(enemy));
        assert!(scene.find_by_name("boss").is_none());
    }
}
