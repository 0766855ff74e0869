//! # World — The Central Container
//!
//! The [`World`] owns the [`Scene`] and every resource. It's the single
//! source of truth for the simulation state and the only thing systems get
//! handed.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │ World                                               │
//! │                                                     │
//! │  scene: Scene                                       │
//! │    entities in order, each with its ComponentSet    │
//! │                                                     │
//! │  resources: HashMap<TypeId, Box<dyn Any>>           │
//! │    singleton data not tied to an entity              │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Resources
//!
//! Resources are "global" data: things like `Time`, keyboard state, the
//! `EventBus`, or the asset provider. They're stored as type-erased
//! `Box<dyn Any>` in a HashMap.
//!
//! Systems that need a resource *and* mutable entity access use the
//! extract/reinsert pattern:
//!
//! ```ignore
//! let assets = world.resource_remove::<Assets>()?;
//! for entity in world.scene.iter_mut() { /* … */ }
//! world.insert_resource(assets);
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;

use super::scene::Scene;

/// The entity store plus global resources.
pub struct World {
    pub scene: Scene,
    /// Global resources (singletons), keyed by TypeId.
    resources: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl World {
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            resources: HashMap::new(),
        }
    }

    /// Wrap an existing scene.
    pub fn with_scene(scene: Scene) -> Self {
        Self {
            scene,
            resources: HashMap::new(),
        }
    }

    // ── Resources ────────────────────────────────────────────────────

    /// Insert or replace the resource of type `T`.
    pub fn insert_resource<T: 'static + Send + Sync>(&mut self, value: T) {
        self.resources.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Get a shared reference to a resource.
    ///
    /// # Panics
    ///
    /// Panics if the resource hasn't been inserted.
    pub fn resource<T: 'static + Send + Sync>(&self) -> &T {
        self.get_resource::<T>().unwrap_or_else(|| {
            panic!(
                "Resource `{}` not found. Did you forget to insert it?",
                std::any::type_name::<T>()
            )
        })
    }

    /// Get a mutable reference to a resource.
    ///
    /// # Panics
    ///
    /// Panics if the resource hasn't been inserted.
    pub fn resource_mut<T: 'static + Send + Sync>(&mut self) -> &mut T {
        self.get_resource_mut::<T>().unwrap_or_else(|| {
            panic!(
                "Resource `{}` not found. Did you forget to insert it?",
                std::any::type_name::<T>()
            )
        })
    }

    /// `None` when absent.
    pub fn get_resource<T: 'static + Send + Sync>(&self) -> Option<&T> {
        self.resources
            .get(&TypeId::of::<T>())
            .and_then(|r| r.downcast_ref::<T>())
    }

    pub fn get_resource_mut<T: 'static + Send + Sync>(&mut self) -> Option<&mut T> {
        self.resources
            .get_mut(&TypeId::of::<T>())
            .and_then(|r| r.downcast_mut::<T>())
    }

    pub fn has_resource<T: 'static + Send + Sync>(&self) -> bool {
        self.resources.contains_key(&TypeId::of::<T>())
    }

    /// Take a resource out so the scene can be borrowed mutably alongside
    /// it. Put it back with [`insert_resource`](Self::insert_resource).
    pub fn resource_remove<T: 'static + Send + Sync>(&mut self) -> Option<T> {
        self.resources
            .remove(&TypeId::of::<T>())
            .and_then(|r| (r as Box<dyn Any>).downcast::<T>().ok())
            .map(|b| *b)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
