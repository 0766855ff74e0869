//! # Prefabs — Immutable Entity Templates
//!
//! A [`Prefab`] is a snapshot of a scene subtree: one or more
//! [`PrefabEntity`] records, one of which is the designated root. Once built
//! it never changes; editing a prefab means snapshotting again.
//!
//! ```text
//! Prefab "goblin"                       Scene
//! ┌──────────────────────────┐          ┌──────────────────────────────────┐
//! │ root #1 goblin           │ instan-  │ #17 goblin                       │
//! │   SpriteRenderer         │ tiate ─▶ │   PrefabInstance { "goblin" }    │
//! │   Animator               │          │   SpriteRenderer, Animator       │
//! │   BoxCollider2D          │          │ #18 club (parent #17)            │
//! │ #2 club (parent #1)      │          └──────────────────────────────────┘
//! └──────────────────────────┘
//! ```
//!
//! ## Instances and overrides
//!
//! A live entity carrying a [`PrefabInstance`] names its prefab by string id
//! (looked up each time, never cached). For each mergeable component kind
//! and for the transform it has an override flag: when the flag is set the
//! entity's own value wins, otherwise the prefab root's value does. Editing a
//! field sets the flag; only an explicit reset clears it. See
//! [`resolver`] for the merge itself.

pub mod resolver;

use std::collections::{HashMap, HashSet};

use crate::ecs::{ComponentKind, ComponentSet, Entity, EntityId, Scene};
use crate::error::LoadError;
use crate::math::Transform;

pub use resolver::{
    effective_component, effective_source, effective_transform, reset_to_prefab, resolve_entity,
    resolve_prefabs, resolved_prefab,
};

/// One entity inside a prefab template.
#[derive(Debug, Clone, PartialEq)]
pub struct PrefabEntity {
    pub id: EntityId,
    pub name: String,
    /// Parent within the prefab. `None` for the root.
    pub parent: Option<EntityId>,
    pub transform: Transform,
    pub components: ComponentSet,
}

impl PrefabEntity {
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            parent: None,
            transform: Transform::default(),
            components: ComponentSet::default(),
        }
    }
}

/// An immutable template graph with a designated root.
#[derive(Debug, Clone, PartialEq)]
pub struct Prefab {
    id: String,
    name: String,
    root_id: EntityId,
    entities: Vec<PrefabEntity>,
}

impl Prefab {
    /// Build a prefab, checking that it has entities, that ids are unique,
    /// and that the root is among them.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        root_id: EntityId,
        entities: Vec<PrefabEntity>,
    ) -> Result<Self, LoadError> {
        let id = id.into();
        if entities.is_empty() {
            return Err(LoadError::EmptyPrefab { prefab: id });
        }
        let mut seen = HashSet::new();
        for e in &entities {
            if !seen.insert(e.id) {
                return Err(LoadError::DuplicateEntity { id: e.id });
            }
        }
        if !seen.contains(&root_id) {
            return Err(LoadError::MissingRoot {
                prefab: id,
                root: root_id,
            });
        }
        Ok(Self {
            id,
            name: name.into(),
            root_id,
            entities,
        })
    }

    /// Snapshot the subtree rooted at `root` in `scene`.
    ///
    /// Entity ids are kept, the root's parent link is dropped, and
    /// `PrefabInstance` components are left out (prefabs don't nest).
    pub fn snapshot(
        id: impl Into<String>,
        name: impl Into<String>,
        scene: &Scene,
        root: EntityId,
    ) -> Result<Self, LoadError> {
        let id = id.into();
        if !scene.contains(root) {
            return Err(LoadError::MissingRoot { prefab: id, root });
        }
        let members = std::iter::once(root).chain(scene.descendants(root));
        let entities = members
            .filter_map(|member| scene.get(member))
            .map(|e| {
                let mut components = e.components.clone();
                components.remove(ComponentKind::PrefabInstance);
                PrefabEntity {
                    id: e.id(),
                    name: e.name.clone(),
                    parent: if e.id() == root { None } else { e.parent },
                    transform: e.transform,
                    components,
                }
            })
            .collect();
        Self::new(id, name, root, entities)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root_id(&self) -> EntityId {
        self.root_id
    }

    pub fn entities(&self) -> &[PrefabEntity] {
        &self.entities
    }

    pub fn entity(&self, id: EntityId) -> Option<&PrefabEntity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// The root entity. Always present for a prefab built through
    /// [`Prefab::new`].
    pub fn root(&self) -> Option<&PrefabEntity> {
        self.entity(self.root_id)
    }

    /// Spawn the prefab into `scene` with fresh ids. The root gets a
    /// [`PrefabInstance`] adopting the prefab's transform. Returns the new
    /// root id.
    pub fn instantiate(&self, scene: &mut Scene) -> EntityId {
        self.spawn_into(scene, None)
    }

    /// Like [`instantiate`](Self::instantiate) but places the root at
    /// `transform`, so the instance keeps its own transform.
    pub fn instantiate_at(&self, scene: &mut Scene, transform: Transform) -> EntityId {
        self.spawn_into(scene, Some(transform))
    }

    fn spawn_into(&self, scene: &mut Scene, placed: Option<Transform>) -> EntityId {
        let remap: HashMap<EntityId, EntityId> = self
            .entities
            .iter()
            .map(|e| (e.id, scene.allocate_id()))
            .collect();
        let new_root = remap[&self.root_id];

        for template in &self.entities {
            let new_id = remap[&template.id];
            let mut entity = Entity::new(new_id, template.name.clone());
            entity.transform = template.transform;
            entity.components = template.components.clone();
            entity.parent = template.parent.and_then(|p| remap.get(&p).copied());

            if new_id == new_root {
                entity.parent = None;
                let mut instance = PrefabInstance::new(self.id.clone());
                if let Some(transform) = placed {
                    entity.transform = transform;
                    instance.use_prefab_transform = false;
                }
                entity.insert(instance);
            }
            // Ids come fresh from this scene's allocator.
            if scene.insert_entity(entity).is_err() {
                log::warn!("prefab '{}': id {new_id} already in scene", self.id);
            }
        }
        log::debug!(
            "instantiated prefab '{}' as {new_root} ({} entities)",
            self.id,
            self.entities.len()
        );
        new_root
    }
}

/// What an override flag (or a reset) applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideTarget {
    Transform,
    Component(ComponentKind),
}

/// Per-kind override flags on a [`PrefabInstance`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overrides {
    pub transform: bool,
    pub sprite_renderer: bool,
    pub animator: bool,
    pub box_collider: bool,
    pub physics_body: bool,
    pub rigidbody: bool,
    pub debug_render: bool,
}

impl Overrides {
    /// Flag for a component kind. `PrefabInstance` itself is never
    /// overridden.
    pub fn get(&self, kind: ComponentKind) -> bool {
        match kind {
            ComponentKind::SpriteRenderer => self.sprite_renderer,
            ComponentKind::Animator => self.animator,
            ComponentKind::BoxCollider2D => self.box_collider,
            ComponentKind::PhysicsBody2D => self.physics_body,
            ComponentKind::Rigidbody2D => self.rigidbody,
            ComponentKind::DebugRender2D => self.debug_render,
            ComponentKind::PrefabInstance => false,
        }
    }

    pub fn set(&mut self, kind: ComponentKind, value: bool) {
        match kind {
            ComponentKind::SpriteRenderer => self.sprite_renderer = value,
            ComponentKind::Animator => self.animator = value,
            ComponentKind::BoxCollider2D => self.box_collider = value,
            ComponentKind::PhysicsBody2D => self.physics_body = value,
            ComponentKind::Rigidbody2D => self.rigidbody = value,
            ComponentKind::DebugRender2D => self.debug_render = value,
            ComponentKind::PrefabInstance => {}
        }
    }

    pub fn get_target(&self, target: OverrideTarget) -> bool {
        match target {
            OverrideTarget::Transform => self.transform,
            OverrideTarget::Component(kind) => self.get(kind),
        }
    }

    pub fn set_target(&mut self, target: OverrideTarget, value: bool) {
        match target {
            OverrideTarget::Transform => self.transform = value,
            OverrideTarget::Component(kind) => self.set(kind, value),
        }
    }

    pub fn any(&self) -> bool {
        self.transform || ComponentKind::MERGEABLE.iter().any(|k| self.get(*k))
    }
}

/// Marks an entity as an instance of a prefab.
#[derive(Debug, Clone, PartialEq)]
pub struct PrefabInstance {
    pub prefab_id: String,
    /// Take the prefab root's transform (unless the transform is overridden).
    pub use_prefab_transform: bool,
    pub overrides: Overrides,
}

impl PrefabInstance {
    pub fn new(prefab_id: impl Into<String>) -> Self {
        Self {
            prefab_id: prefab_id.into(),
            use_prefab_transform: true,
            overrides: Overrides::default(),
        }
    }

    /// Whether the prefab id is worth looking up at all.
    pub fn has_prefab_id(&self) -> bool {
        !self.prefab_id.trim().is_empty()
    }
}
