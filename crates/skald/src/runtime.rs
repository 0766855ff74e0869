//! # Runtime — World Plus the Fixed Tick Pipeline
//!
//! [`Runtime`] owns a [`World`] and the ordered [`Schedule`] and advances
//! both by a host-supplied Δt. Nothing blocks and nothing runs in the
//! background; stopping the simulation just means not calling
//! [`step`](Runtime::step) any more.
//!
//! ```text
//! step(dt)
//!   ├─ EventBus::clear            last tick's events are gone
//!   ├─ Time::advance_secs(dt)
//!   ├─ animator_controller_system
//!   ├─ animation_system
//!   ├─ animation_notifier_system
//!   ├─ physics_system
//!   ├─ collision_system
//!   ├─ (user systems, in insertion order)
//!   └─ Keyboard::clear_just       pressed/released edges last one tick
//! ```
//!
//! ## Example
//!
//! ```ignore
//! let mut runtime = Runtime::new(library).with_scene(scene_from_json(&json)?);
//! runtime.resolve_prefabs();
//! loop {
//!     runtime.keyboard_mut().press(Key::Space);
//!     runtime.step(1.0 / 60.0);
//!     for hit in runtime.events::<AnimationNotifyEvent>() { /* ... */ }
//! }
//! ```

use crate::animation::{animation_notifier_system, animation_system, animator_controller_system};
use crate::asset::{AssetProvider, Assets};
use crate::ecs::{Scene, Schedule, System, World};
use crate::events::EventBus;
use crate::input::Keyboard;
use crate::physics2d::{CollisionState, PhysicsSettings, collision_system, physics_system};
use crate::prefab::resolve_prefabs;
use crate::time::Time;

/// Host wrapper around the world and its systems.
pub struct Runtime {
    pub world: World,
    pub systems: Schedule,
}

impl Runtime {
    /// Create a runtime with an empty scene, the core resources, and the
    /// core systems in their fixed order.
    pub fn new(assets: impl AssetProvider + Send + Sync + 'static) -> Self {
        let mut world = World::new();
        world.insert_resource(Time::new());
        world.insert_resource(Assets::new(assets));
        world.insert_resource(Keyboard::new());
        world.insert_resource(EventBus::new());
        world.insert_resource(PhysicsSettings::default());
        world.insert_resource(CollisionState::default());

        let mut systems = Schedule::new();
        systems
            .add_system(animator_controller_system)
            .add_system(animation_system)
            .add_system(animation_notifier_system)
            .add_system(physics_system)
            .add_system(collision_system);

        Self { world, systems }
    }

    /// Replace the scene.
    pub fn with_scene(mut self, scene: Scene) -> Self {
        self.world.scene = scene;
        self
    }

    /// Insert or replace a resource.
    pub fn insert_resource<T: 'static + Send + Sync>(mut self, value: T) -> Self {
        self.world.insert_resource(value);
        self
    }

    /// Add a system that runs after the core pipeline every tick.
    pub fn add_system<S: System + 'static>(mut self, system: S) -> Self {
        self.systems.add_system(system);
        self
    }

    /// Run one tick of `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        if let Some(bus) = self.world.get_resource_mut::<EventBus>() {
            bus.clear();
        }
        if let Some(time) = self.world.get_resource_mut::<Time>() {
            time.advance_secs(dt);
        }

        self.systems.run(&mut self.world);

        if let Some(keyboard) = self.world.get_resource_mut::<Keyboard>() {
            keyboard.clear_just();
        }
    }

    /// Merge every prefab instance in the scene with its prefab. Returns how
    /// many were resolved.
    pub fn resolve_prefabs(&mut self) -> usize {
        let Some(assets) = self.world.resource_remove::<Assets>() else {
            return 0;
        };
        let resolved = resolve_prefabs(&mut self.world.scene, &*assets);
        self.world.insert_resource(assets);
        log::debug!("resolved {resolved} prefab instances");
        resolved
    }

    pub fn scene(&self) -> &Scene {
        &self.world.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.world.scene
    }

    /// Events of type `T` published during the last step.
    pub fn events<T: Send + Sync + 'static>(&self) -> &[T] {
        self.world
            .get_resource::<EventBus>()
            .map(|bus| bus.read::<T>())
            .unwrap_or(&[])
    }

    /// Keyboard state for the next step.
    pub fn keyboard_mut(&mut self) -> &mut Keyboard {
        self.world.resource_mut::<Keyboard>()
    }

    pub fn time(&self) -> &Time {
        self.world.resource::<Time>()
    }

    /// Swap the asset provider, e.g. after reloading from disk.
    pub fn set_assets(&mut self, assets: impl AssetProvider + Send + Sync + 'static) {
        match self.world.get_resource_mut::<Assets>() {
            Some(current) => current.replace(assets),
            None => self.world.insert_resource(Assets::new(assets)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{AnimationClip, Animator};
    use crate::asset::AssetLibrary;
    use crate::components::SpriteRenderer;
    use crate::input::Key;

    #[test]
    fn core_systems_run_in_fixed_order() {
        let runtime = Runtime::new(AssetLibrary::new());
        assert_eq!(
            runtime.systems.system_names().collect::<Vec<_>>(),
            [
                "animator_controller_system",
                "animation_system",
                "animation_notifier_system",
                "physics_system",
                "collision_system",
            ]
        );
    }

    #[test]
    fn step_advances_time_and_animation() {
        let mut lib = AssetLibrary::new();
        lib.insert_animation(AnimationClip::new("blink").looping().frame("open", 0.5).frame("shut", 0.1));
        let mut runtime = Runtime::new(lib);
        let id = runtime.scene_mut().spawn("eye");
        {
            let e = runtime.scene_mut().get_mut(id).unwrap();
            e.insert(Animator::with_clip("blink"));
            e.insert(SpriteRenderer::default());
        }

        runtime.step(0.0);
        runtime.step(0.55);
        assert_eq!(runtime.time().tick_count(), 2);
        let sprite = runtime.scene().get(id).unwrap().get::<SpriteRenderer>().unwrap();
        assert_eq!(sprite.sprite_id, "shut");
    }

    #[test]
    fn input_edges_last_one_step() {
        let mut runtime = Runtime::new(AssetLibrary::new());
        runtime.keyboard_mut().press(Key::Space);
        runtime.step(0.016);
        assert!(!runtime.world.resource::<Keyboard>().just_pressed(Key::Space));
        assert!(runtime.world.resource::<Keyboard>().pressed(Key::Space));
    }

    #[test]
    fn events_are_cleared_each_step() {
        #[derive(Debug)]
        struct Ping;
        let mut runtime = Runtime::new(AssetLibrary::new()).add_system(|w: &mut World| {
            if w.resource::<Time>().tick_count() == 1 {
                w.resource_mut::<EventBus>().publish(Ping);
            }
        });
        runtime.step(0.1);
        assert_eq!(runtime.events::<Ping>().len(), 1);
        runtime.step(0.1);
        assert!(runtime.events::<Ping>().is_empty());
    }
}
