//! # Skald — 2D Scene and Animation Runtime
//!
//! A small runtime for 2D games: a scene of entities with transforms and a
//! closed set of components, prefab templates with per-instance overrides,
//! sprite animation driven by data-defined state machines, and simple
//! physics. Scenes and prefabs load from versioned JSON.
//!
//! Start with `use skald::prelude::*` and drive a [`Runtime`](runtime::Runtime)
//! with your own Δt.

pub mod animation;
pub mod asset;
pub mod components;
pub mod ecs;
pub mod error;
pub mod events;
pub mod input;
pub mod inspect;
pub mod math;
pub mod physics2d;
pub mod prefab;
pub mod prelude;
pub mod runtime;
pub mod scene;
pub mod time;
