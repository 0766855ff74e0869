//! # Entity Hierarchies — World-Space Transforms
//!
//! Entities store a local [`Transform`] and an optional parent id. This
//! module composes them into world space.
//!
//! ## Usage
//!
//! ```ignore
//! let parent = scene.spawn("ship");
//! let turret = scene.spawn_child(parent, "turret");
//!
//! let globals = propagate_transforms(&scene);
//! let turret_world = globals[&turret].matrix;
//! ```
//!
//! Parents are always computed before their children (BFS from the roots), so
//! every child is `parent_global * child_local`. An entity whose parent id
//! doesn't resolve is treated as a root.

use std::collections::{HashMap, VecDeque};

use super::entity::EntityId;
use super::scene::Scene;
use crate::math::{Mat4, Vec2, Vec3};

/// The world-space transform of one entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalTransform {
    pub matrix: Mat4,
}

impl GlobalTransform {
    pub fn translation(&self) -> Vec3 {
        self.matrix.col(3).truncate()
    }

    /// World-space XY scale (absolute values; mirroring doesn't shrink boxes).
    pub fn scale_2d(&self) -> Vec2 {
        Vec2::new(
            self.matrix.col(0).truncate().length(),
            self.matrix.col(1).truncate().length(),
        )
    }
}

impl Default for GlobalTransform {
    fn default() -> Self {
        Self {
            matrix: Mat4::IDENTITY,
        }
    }
}

/// Compute world-space transforms for every entity in the scene.
///
/// - Roots (no parent, or a parent that isn't in the scene) get their local
///   matrix.
/// - Children get `parent_global * child_local`.
pub fn propagate_transforms(scene: &Scene) -> HashMap<EntityId, GlobalTransform> {
    let mut out = HashMap::with_capacity(scene.len());
    let mut queue: VecDeque<(EntityId, Mat4)> = VecDeque::new();

    for entity in scene.iter() {
        let is_root = entity.parent.is_none_or(|p| !scene.contains(p));
        if is_root {
            queue.push_back((entity.id(), Mat4::IDENTITY));
        }
    }

    while let Some((id, parent_matrix)) = queue.pop_front() {
        // A parent cycle would revisit; first visit wins.
        if out.contains_key(&id) {
            continue;
        }
        let Some(entity) = scene.get(id) else {
            continue;
        };
        let matrix = parent_matrix * entity.transform.matrix();
        out.insert(id, GlobalTransform { matrix });

        for child in scene.children_of(id) {
            queue.push_back((child, matrix));
        }
    }

    out
}

/// World matrix of a single entity, walking up its parent chain.
pub fn world_matrix(scene: &Scene, id: EntityId) -> Option<Mat4> {
    let mut entity = scene.get(id)?;
    let mut matrix = entity.transform.matrix();
    let mut steps = 0;
    while let Some(parent) = entity.parent.and_then(|p| scene.get(p)) {
        matrix = parent.transform.matrix() * matrix;
        entity = parent;
        steps += 1;
        if steps > scene.len() {
            break;
        }
    }
    Some(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Transform;

    fn spawn_at(scene: &mut Scene, parent: Option<EntityId>, x: f32) -> EntityId {
        let id = match parent {
            Some(p) => scene.spawn_child(p, "e"),
            None => scene.spawn("e"),
        };
        scene.get_mut(id).unwrap().transform = Transform::from_xy(x, 0.0);
        id
    }

    #[test]
    fn root_gets_global_transform() {
        let mut scene = Scene::new();
        let root = spawn_at(&mut scene, None, 10.0);

        let globals = propagate_transforms(&scene);
        assert_eq!(globals[&root].matrix, Transform::from_xy(10.0, 0.0).matrix());
    }

    #[test]
    fn child_inherits_parent_transform() {
        let mut scene = Scene::new();
        let parent = spawn_at(&mut scene, None, 100.0);
        let child = spawn_at(&mut scene, Some(parent), 10.0);

        let globals = propagate_transforms(&scene);
        // Child at local (10,0,0) under parent at (100,0,0) → global (110,0,0)
        let t = globals[&child].translation();
        assert!((t.x - 110.0).abs() < 0.001);
        assert!(t.y.abs() < 0.001);
    }

    #[test]
    fn parent_scale_carries_to_child() {
        let mut scene = Scene::new();
        let parent = spawn_at(&mut scene, None, 0.0);
        scene.get_mut(parent).unwrap().transform.scale = Vec3::new(2.0, 3.0, 1.0);
        let child = spawn_at(&mut scene, Some(parent), 5.0);

        let globals = propagate_transforms(&scene);
        assert_eq!(globals[&child].scale_2d(), Vec2::new(2.0, 3.0));
        assert!((globals[&child].translation().x - 10.0).abs() < 0.001);
    }

    #[test]
    fn deep_hierarchy_matches_single_lookup() {
        let mut scene = Scene::new();
        let mut parent = spawn_at(&mut scene, None, 1.0);
        for _ in 0..5 {
            parent = spawn_at(&mut scene, Some(parent), 1.0);
        }

        let globals = propagate_transforms(&scene);
        let single = world_matrix(&scene, parent).unwrap();
        assert_eq!(globals[&parent].matrix, single);
        assert!((single.col(3).x - 6.0).abs() < 0.001);
    }

    #[test]
    fn dangling_parent_is_a_root() {
        let mut scene = Scene::new();
        let orphan = spawn_at(&mut scene, Some(EntityId(999)), 4.0);
        let globals = propagate_transforms(&scene);
        assert!((globals[&orphan].translation().x - 4.0).abs() < 0.001);
    }
}
