//! # 2D Physics — Integration and Overlap Detection
//!
//! Two simple peer systems that run after animation each tick:
//!
//! - [`physics_system`] integrates velocities into transforms.
//!   [`Rigidbody2D`] gets gravity, drag and angular velocity;
//!   [`PhysicsBody2D`] is a lighter kinematic mover with acceleration and a
//!   speed cap. An entity with both is driven by its `Rigidbody2D`.
//! - [`collision_system`] finds overlapping [`BoxCollider2D`]s and publishes
//!   [`CollisionEvent`]s with enter / stay / exit phases.
//!
//! Nothing here resolves contacts: overlapping bodies are reported, not
//! pushed apart.
//!
//! ## Collider boxes
//!
//! ```text
//!          size × world scale
//!      ┌───────────────────────┐
//!      │                       │
//!      │     ● ← world pos     │
//!      │       + offset×scale  │
//!      └───────────────────────┘
//! ```
//!
//! Rotation is ignored: boxes are axis-aligned in world space.
//!
//! ## Layers
//!
//! `layer` is the set of bits a collider belongs to, `mask` the bits it
//! wants to hear about. A pair interacts only when each one's layer hits the
//! other's mask.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ecs::{EntityId, Scene, World, propagate_transforms};
use crate::events::EventBus;
use crate::math::Vec2;
use crate::time::Time;

// ── Components ──────────────────────────────────────────────────────────

/// How a [`Rigidbody2D`] reacts to the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BodyType2D {
    /// Affected by gravity and drag.
    #[default]
    Dynamic,
    /// Moves by its velocity only.
    Kinematic,
    /// Never moves.
    Static,
}

/// Axis-aligned box collider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct BoxCollider2D {
    /// Full width/height in local units.
    pub size: Vec2,
    pub offset: Vec2,
    /// Triggers report overlaps but are flagged so gameplay can ignore them
    /// for blocking.
    pub is_trigger: bool,
    pub layer: u32,
    pub mask: u32,
}

impl Default for BoxCollider2D {
    fn default() -> Self {
        Self {
            size: Vec2::ONE,
            offset: Vec2::ZERO,
            is_trigger: false,
            layer: 1,
            mask: u32::MAX,
        }
    }
}

impl BoxCollider2D {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            ..Default::default()
        }
    }

    pub fn trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }

    /// Whether two colliders' layer masks allow them to interact.
    pub fn interacts_with(&self, other: &BoxCollider2D) -> bool {
        self.layer & other.mask != 0 && other.layer & self.mask != 0
    }
}

/// Simple velocity mover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PhysicsBody2D {
    pub velocity: Vec2,
    pub acceleration: Vec2,
    /// Speed cap; 0 means unlimited.
    pub max_speed: f32,
    pub is_static: bool,
}

impl Default for PhysicsBody2D {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            max_speed: 0.0,
            is_static: false,
        }
    }
}

/// Rigid body with gravity, drag and spin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Rigidbody2D {
    pub body_type: BodyType2D,
    pub mass: f32,
    pub gravity_scale: f32,
    pub linear_drag: f32,
    /// Radians per second around Z.
    pub angular_velocity: f32,
    pub velocity: Vec2,
    pub fixed_rotation: bool,
}

impl Default for Rigidbody2D {
    fn default() -> Self {
        Self {
            body_type: BodyType2D::Dynamic,
            mass: 1.0,
            gravity_scale: 1.0,
            linear_drag: 0.0,
            angular_velocity: 0.0,
            velocity: Vec2::ZERO,
            fixed_rotation: false,
        }
    }
}

impl Rigidbody2D {
    /// Apply an instantaneous impulse. Ignored for non-dynamic bodies and
    /// bodies without positive mass.
    pub fn apply_impulse(&mut self, impulse: Vec2) {
        if self.body_type == BodyType2D::Dynamic && self.mass > 0.0 {
            self.velocity += impulse / self.mass;
        }
    }
}

// ── Resources ───────────────────────────────────────────────────────────

/// Global physics configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsSettings {
    pub gravity: Vec2,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, -9.81),
        }
    }
}

/// Collider pairs overlapping as of the last collision pass.
#[derive(Debug, Clone, Default)]
pub struct CollisionState {
    active: BTreeSet<(EntityId, EntityId)>,
}

impl CollisionState {
    pub fn is_touching(&self, a: EntityId, b: EntityId) -> bool {
        self.active.contains(&ordered(a, b))
    }

    pub fn pair_count(&self) -> usize {
        self.active.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionPhase {
    Enter,
    Stay,
    Exit,
}

/// Published to the [`EventBus`] by [`collision_system`]. `a < b`.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionEvent {
    pub a: EntityId,
    pub b: EntityId,
    pub phase: CollisionPhase,
    /// Either collider is a trigger.
    pub trigger: bool,
}

fn ordered(a: EntityId, b: EntityId) -> (EntityId, EntityId) {
    if a <= b { (a, b) } else { (b, a) }
}

// ── Integration ─────────────────────────────────────────────────────────

/// Integrate every body in the scene by `dt` seconds.
pub fn integrate(scene: &mut Scene, settings: &PhysicsSettings, dt: f32) {
    if dt <= 0.0 {
        return;
    }
    for entity in scene.iter_mut() {
        let transform = &mut entity.transform;
        if let Some(body) = entity.components.rigidbody.as_mut() {
            match body.body_type {
                BodyType2D::Static => continue,
                BodyType2D::Dynamic => {
                    body.velocity += settings.gravity * body.gravity_scale * dt;
                    if body.linear_drag > 0.0 {
                        body.velocity /= 1.0 + body.linear_drag * dt;
                    }
                }
                BodyType2D::Kinematic => {}
            }
            transform.position += (body.velocity * dt).extend(0.0);
            if !body.fixed_rotation && body.angular_velocity != 0.0 {
                let angle = transform.rotation_z() + body.angular_velocity * dt;
                transform.set_rotation_z(crate::math::wrap_angle(angle));
            }
        } else if let Some(body) = entity.components.physics_body.as_mut() {
            if body.is_static {
                continue;
            }
            body.velocity += body.acceleration * dt;
            if body.max_speed > 0.0 {
                body.velocity = body.velocity.clamp_length_max(body.max_speed);
            }
            transform.position += (body.velocity * dt).extend(0.0);
        }
    }
}

/// System: integrate bodies by the current [`Time`] delta.
pub fn physics_system(world: &mut World) {
    let Some(dt) = world.get_resource::<Time>().map(Time::delta_secs) else {
        return;
    };
    let settings = world
        .get_resource::<PhysicsSettings>()
        .copied()
        .unwrap_or_default();
    integrate(&mut world.scene, &settings, dt);
}

// ── Overlap detection ───────────────────────────────────────────────────

/// World-space axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size.abs() * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Strict overlap; boxes that only share an edge don't count.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }
}

/// Every overlapping collider pair in the scene, as `(a, b, trigger)` with
/// `a < b`, sorted.
pub fn find_overlaps(scene: &Scene) -> Vec<(EntityId, EntityId, bool)> {
    let globals = propagate_transforms(scene);
    let boxes: Vec<(EntityId, &BoxCollider2D, Aabb)> = scene
        .iter()
        .filter_map(|e| {
            let collider = e.components.box_collider.as_ref()?;
            let global = globals.get(&e.id()).copied().unwrap_or_default();
            let scale = global.scale_2d();
            let center = global.translation().truncate() + collider.offset * scale;
            Some((
                e.id(),
                collider,
                Aabb::from_center_size(center, collider.size * scale),
            ))
        })
        .collect();

    let mut out = Vec::new();
    for (i, (id_a, col_a, box_a)) in boxes.iter().enumerate() {
        for (id_b, col_b, box_b) in &boxes[i + 1..] {
            if col_a.interacts_with(col_b) && box_a.overlaps(box_b) {
                let (a, b) = ordered(*id_a, *id_b);
                out.push((a, b, col_a.is_trigger || col_b.is_trigger));
            }
        }
    }
    out.sort_by_key(|&(a, b, _)| (a, b));
    out
}

/// System: detect overlaps and publish enter / stay / exit events.
pub fn collision_system(world: &mut World) {
    let overlaps = find_overlaps(&world.scene);
    let mut state = world.resource_remove::<CollisionState>().unwrap_or_default();
    let mut events = Vec::new();

    let current: BTreeSet<(EntityId, EntityId)> =
        overlaps.iter().map(|&(a, b, _)| (a, b)).collect();

    for &(a, b, trigger) in &overlaps {
        let phase = if state.active.contains(&(a, b)) {
            CollisionPhase::Stay
        } else {
            CollisionPhase::Enter
        };
        events.push(CollisionEvent {
            a,
            b,
            phase,
            trigger,
        });
    }

    for &(a, b) in state.active.difference(&current) {
        let trigger = [a, b].iter().any(|id| {
            world
                .scene
                .get(*id)
                .and_then(|e| e.components.box_collider.as_ref())
                .is_some_and(|c| c.is_trigger)
        });
        events.push(CollisionEvent {
            a,
            b,
            phase: CollisionPhase::Exit,
            trigger,
        });
    }

    state.active = current;
    world.insert_resource(state);

    if let Some(bus) = world.get_resource_mut::<EventBus>() {
        for event in events {
            bus.publish(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Transform;

    fn spawn_box(world: &mut World, x: f32, collider: BoxCollider2D) -> EntityId {
        let id = world.scene.spawn("box");
        let e = world.scene.get_mut(id).unwrap();
        e.transform = Transform::from_xy(x, 0.0);
        e.insert(collider);
        id
    }

    fn physics_world() -> World {
        let mut world = World::new();
        world.insert_resource(EventBus::new());
        world.insert_resource(CollisionState::default());
        world
    }

    #[test]
    fn dynamic_body_falls() {
        let mut scene = Scene::new();
        let id = scene.spawn("ball");
        scene.get_mut(id).unwrap().insert(Rigidbody2D::default());

        integrate(&mut scene, &PhysicsSettings::default(), 0.5);

        let e = scene.get(id).unwrap();
        let body = e.get::<Rigidbody2D>().unwrap();
        assert!((body.velocity.y + 4.905).abs() < 1e-4);
        assert!(e.transform.position.y < 0.0);
    }

    #[test]
    fn static_and_kinematic_ignore_gravity() {
        let mut scene = Scene::new();
        let wall = scene.spawn("wall");
        scene.get_mut(wall).unwrap().insert(Rigidbody2D {
            body_type: BodyType2D::Static,
            velocity: Vec2::new(5.0, 0.0),
            ..Default::default()
        });
        let platform = scene.spawn("platform");
        scene.get_mut(platform).unwrap().insert(Rigidbody2D {
            body_type: BodyType2D::Kinematic,
            velocity: Vec2::new(2.0, 0.0),
            ..Default::default()
        });

        integrate(&mut scene, &PhysicsSettings::default(), 1.0);

        assert_eq!(scene.get(wall).unwrap().transform.position.x, 0.0);
        let p = scene.get(platform).unwrap();
        assert_eq!(p.transform.position.x, 2.0);
        assert_eq!(p.get::<Rigidbody2D>().unwrap().velocity.y, 0.0);
    }

    #[test]
    fn physics_body_respects_max_speed() {
        let mut scene = Scene::new();
        let id = scene.spawn("car");
        scene.get_mut(id).unwrap().insert(PhysicsBody2D {
            acceleration: Vec2::new(100.0, 0.0),
            max_speed: 3.0,
            ..Default::default()
        });

        integrate(&mut scene, &PhysicsSettings::default(), 1.0);

        let body = scene.get(id).unwrap().get::<PhysicsBody2D>().unwrap();
        assert!((body.velocity.length() - 3.0).abs() < 1e-5);
    }

    #[test]
    fn impulse_divides_by_mass() {
        let mut body = Rigidbody2D {
            mass: 2.0,
            ..Default::default()
        };
        body.apply_impulse(Vec2::new(4.0, 0.0));
        assert_eq!(body.velocity, Vec2::new(2.0, 0.0));

        body.body_type = BodyType2D::Static;
        body.apply_impulse(Vec2::new(4.0, 0.0));
        assert_eq!(body.velocity, Vec2::new(2.0, 0.0));
    }

    #[test]
    fn overlap_phases_enter_stay_exit() {
        let mut world = physics_world();
        let a = spawn_box(&mut world, 0.0, BoxCollider2D::new(2.0, 2.0));
        let b = spawn_box(&mut world, 1.5, BoxCollider2D::new(2.0, 2.0));

        collision_system(&mut world);
        let events = world.resource::<EventBus>().read::<CollisionEvent>().to_vec();
        assert_eq!(events.len(), 1);
        assert_eq!((events[0].a, events[0].b), (a, b));
        assert_eq!(events[0].phase, CollisionPhase::Enter);

        world.resource_mut::<EventBus>().clear();
        collision_system(&mut world);
        assert_eq!(
            world.resource::<EventBus>().read::<CollisionEvent>()[0].phase,
            CollisionPhase::Stay
        );

        world.scene.get_mut(b).unwrap().transform.position.x = 10.0;
        world.resource_mut::<EventBus>().clear();
        collision_system(&mut world);
        let events = world.resource::<EventBus>().read::<CollisionEvent>();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].phase, CollisionPhase::Exit);
        assert!(!world.resource::<CollisionState>().is_touching(a, b));
    }

    #[test]
    fn layer_masks_filter_pairs() {
        let mut world = physics_world();
        spawn_box(&mut world, 0.0, BoxCollider2D::new(2.0, 2.0));
        spawn_box(
            &mut world,
            0.5,
            BoxCollider2D {
                layer: 0b10,
                mask: 0b10,
                ..BoxCollider2D::new(2.0, 2.0)
            },
        );

        collision_system(&mut world);
        assert!(world.resource::<EventBus>().read::<CollisionEvent>().is_empty());
    }

    #[test]
    fn scale_grows_box_and_trigger_is_flagged() {
        let mut world = physics_world();
        let a = spawn_box(&mut world, 0.0, BoxCollider2D::new(1.0, 1.0).trigger());
        spawn_box(&mut world, 1.5, BoxCollider2D::new(1.0, 1.0));

        collision_system(&mut world);
        assert!(world.resource::<EventBus>().read::<CollisionEvent>().is_empty());

        world.scene.get_mut(a).unwrap().transform.scale = crate::math::Vec3::splat(3.0);
        collision_system(&mut world);
        let events = world.resource::<EventBus>().read::<CollisionEvent>();
        assert_eq!(events.len(), 1);
        assert!(events[0].trigger);
    }
}
