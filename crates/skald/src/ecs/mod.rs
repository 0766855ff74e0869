//! # Scene-Graph ECS
//!
//! A deliberately small entity store. Entities are records with a fixed,
//! closed set of component slots rather than archetype columns of arbitrary
//! types: the runtime only ever deals with a handful of component kinds, and
//! tools need to enumerate and edit them without runtime reflection.
//!
//! ## Module Overview
//!
//! - [`entity`] — Stable entity IDs and the [`Entity`] record
//! - [`component`] — [`ComponentKind`], the [`Component`] union, [`ComponentSet`]
//! - [`scene`] — [`Scene`], the ordered entity store
//! - [`world`] — [`World`] = scene + resources
//! - [`hierarchy`] — world-space transform propagation
//! - [`system`] — System trait and schedule runner

pub mod component;
pub mod entity;
pub mod hierarchy;
pub mod scene;
pub mod system;
pub mod world;

pub use component::{Component, ComponentData, ComponentKind, ComponentSet};
pub use entity::{Entity, EntityId};
pub use hierarchy::{GlobalTransform, propagate_transforms, world_matrix};
pub use scene::Scene;
pub use system::{Schedule, System};
pub use world::World;
