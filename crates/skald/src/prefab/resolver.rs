//! Prefab resolution and effective-value queries.
//!
//! Resolution writes the prefab root's data into every instance for each
//! kind the instance does not override:
//!
//! ```text
//! for each entity with PrefabInstance { prefab_id, .. }:
//!     prefab = assets.get_prefab(prefab_id)      miss → leave entity as-is
//!     root   = prefab.root()                     miss → leave entity as-is
//!     transform ← root.transform   if use_prefab_transform && !override
//!     for K in mergeable kinds:
//!         K ← root.K               if !override(K) && root has K
//! ```
//!
//! Non-overridden data is always fully replaced, so running the pass twice
//! gives the same result as running it once.
//!
//! The `effective_*` queries answer "which value wins" without mutating
//! anything, using the same rule. Display, editing, and gameplay all go
//! through them.

use std::sync::Arc;

use crate::asset::AssetProvider;
use crate::ecs::{ComponentData, ComponentKind, ComponentSet, Entity, Scene};
use crate::math::Transform;

use super::{OverrideTarget, Prefab, PrefabEntity, PrefabInstance};

/// Resolve every prefab instance in `scene`. Returns how many entities were
/// merged with a prefab.
pub fn resolve_prefabs(scene: &mut Scene, assets: &dyn AssetProvider) -> usize {
    let mut resolved = 0;
    for entity in scene.iter_mut() {
        let Some(prefab) = resolved_prefab(entity, assets) else {
            continue;
        };
        if resolve_entity(entity, &prefab) {
            resolved += 1;
        }
    }
    resolved
}

/// Look up the prefab an entity is an instance of. `None` when the entity
/// has no [`PrefabInstance`], the id is blank, the id doesn't resolve, or
/// the prefab has no root.
pub fn resolved_prefab(entity: &Entity, assets: &dyn AssetProvider) -> Option<Arc<Prefab>> {
    let instance = entity.get::<PrefabInstance>()?;
    if !instance.has_prefab_id() {
        return None;
    }
    let Some(prefab) = assets.get_prefab(&instance.prefab_id) else {
        log::trace!(
            "{} '{}': prefab '{}' not found",
            entity.id(),
            entity.name,
            instance.prefab_id
        );
        return None;
    };
    prefab.root()?;
    Some(prefab)
}

/// Merge one entity with its prefab. Returns `false` (and changes nothing)
/// if the prefab has no root or the entity is not an instance.
pub fn resolve_entity(entity: &mut Entity, prefab: &Prefab) -> bool {
    let Some(root) = prefab.root() else {
        log::warn!("prefab '{}' has no root entity", prefab.id());
        return false;
    };
    let Some(instance) = entity.get::<PrefabInstance>() else {
        return false;
    };
    let use_prefab_transform = instance.use_prefab_transform;
    let overrides = instance.overrides;

    if use_prefab_transform && !overrides.transform {
        entity.transform = root.transform;
    }
    for kind in ComponentKind::MERGEABLE {
        if overrides.get(kind) {
            continue;
        }
        if let Some(component) = root.components.cloned(kind) {
            entity.components.insert(component);
        }
    }
    true
}

/// The transform that wins for `entity` given its prefab.
pub fn effective_transform(entity: &Entity, prefab: Option<&Prefab>) -> Transform {
    match (entity.get::<PrefabInstance>(), prefab.and_then(Prefab::root)) {
        (Some(instance), Some(root))
            if instance.use_prefab_transform && !instance.overrides.transform =>
        {
            root.transform
        }
        _ => entity.transform,
    }
}

/// The component set holding the winning value of `kind`, or `None` when
/// neither the entity nor the prefab root has one.
pub fn effective_source<'a>(
    entity: &'a Entity,
    prefab: Option<&'a Prefab>,
    kind: ComponentKind,
) -> Option<&'a ComponentSet> {
    let own = entity.has(kind).then_some(&entity.components);
    let Some(instance) = entity.get::<PrefabInstance>() else {
        return own;
    };
    if !kind.is_mergeable() || instance.overrides.get(kind) {
        return own;
    }
    match prefab.and_then(Prefab::root) {
        Some(root) if root.components.has(kind) => Some(&root.components),
        _ => own,
    }
}

/// Typed form of [`effective_source`].
pub fn effective_component<'a, T: ComponentData>(
    entity: &'a Entity,
    prefab: Option<&'a Prefab>,
) -> Option<&'a T> {
    effective_source(entity, prefab, T::KIND)?.get::<T>()
}

/// Clear one override flag and put the prefab value back.
///
/// If the prefab root lacks the component, the entity keeps its own. Returns
/// `false` when the entity is not a prefab instance or the prefab has no
/// root.
pub fn reset_to_prefab(entity: &mut Entity, prefab: &Prefab, target: OverrideTarget) -> bool {
    let Some(root) = prefab.root() else {
        return false;
    };
    let Some(instance) = entity.get_mut::<PrefabInstance>() else {
        return false;
    };
    match target {
        OverrideTarget::Transform => {
            instance.overrides.transform = false;
            if instance.use_prefab_transform {
                entity.transform = root.transform;
            }
        }
        OverrideTarget::Component(kind) => {
            instance.overrides.set(kind, false);
            restore_component(entity, root, kind);
        }
    }
    true
}

fn restore_component(entity: &mut Entity, root: &PrefabEntity, kind: ComponentKind) {
    if !kind.is_mergeable() {
        return;
    }
    if let Some(component) = root.components.cloned(kind) {
        entity.components.insert(component);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Animator;
    use crate::asset::AssetLibrary;
    use crate::components::{BoxCollider2D, SpriteRenderer};
    use crate::ecs::EntityId;

    fn goblin_prefab() -> Prefab {
        let mut root = PrefabEntity::new(EntityId(1), "goblin");
        root.transform = Transform::from_xy(5.0, 6.0);
        root.components.insert(SpriteRenderer::new("goblin_idle"));
        root.components.insert(BoxCollider2D::new(1.0, 2.0));
        root.components.insert(Animator::with_controller("goblin_ctrl"));
        Prefab::new("goblin", "Goblin", EntityId(1), vec![root]).unwrap()
    }

    fn library() -> AssetLibrary {
        let mut lib = AssetLibrary::new();
        lib.insert_prefab(goblin_prefab());
        lib
    }

    fn instance_scene(instance: PrefabInstance) -> (Scene, EntityId) {
        let mut scene = Scene::new();
        let id = scene.spawn("goblin (1)");
        scene.get_mut(id).unwrap().insert(instance);
        (scene, id)
    }

    #[test]
    fn resolution_copies_non_overridden_data() {
        let lib = library();
        let (mut scene, id) = instance_scene(PrefabInstance::new("goblin"));
        assert_eq!(resolve_prefabs(&mut scene, &lib), 1);

        let e = scene.get(id).unwrap();
        assert_eq!(e.transform.position.x, 5.0);
        assert_eq!(e.get::<SpriteRenderer>().unwrap().sprite_id, "goblin_idle");
        assert_eq!(e.get::<BoxCollider2D>().unwrap().size.y, 2.0);
        assert_eq!(e.get::<Animator>().unwrap().controller_id, "goblin_ctrl");
    }

    #[test]
    fn overridden_kinds_keep_own_values() {
        let lib = library();
        let mut instance = PrefabInstance::new("goblin");
        instance.overrides.sprite_renderer = true;
        instance.overrides.transform = true;
        let (mut scene, id) = instance_scene(instance);
        {
            let e = scene.get_mut(id).unwrap();
            e.transform = Transform::from_xy(-1.0, 0.0);
            e.insert(SpriteRenderer::new("goblin_red"));
        }
        resolve_prefabs(&mut scene, &lib);

        let e = scene.get(id).unwrap();
        assert_eq!(e.transform.position.x, -1.0);
        assert_eq!(e.get::<SpriteRenderer>().unwrap().sprite_id, "goblin_red");
        assert!(e.has(ComponentKind::BoxCollider2D));
    }

    #[test]
    fn own_transform_when_not_using_prefab_transform() {
        let lib = library();
        let mut instance = PrefabInstance::new("goblin");
        instance.use_prefab_transform = false;
        let (mut scene, id) = instance_scene(instance);
        scene.get_mut(id).unwrap().transform = Transform::from_xy(9.0, 9.0);
        resolve_prefabs(&mut scene, &lib);
        assert_eq!(scene.get(id).unwrap().transform.position.x, 9.0);
    }

    #[test]
    fn resolution_is_idempotent() {
        let lib = library();
        let mut instance = PrefabInstance::new("goblin");
        instance.overrides.animator = true;
        let (mut scene, id) = instance_scene(instance);
        scene
            .get_mut(id)
            .unwrap()
            .insert(Animator::with_clip("dance"));

        resolve_prefabs(&mut scene, &lib);
        let once = scene.get(id).unwrap().clone();
        resolve_prefabs(&mut scene, &lib);
        assert_eq!(scene.get(id).unwrap(), &once);
    }

    #[test]
    fn misses_leave_entity_untouched() {
        let lib = library();
        for prefab_id in ["", "   ", "troll"] {
            let (mut scene, id) = instance_scene(PrefabInstance::new(prefab_id));
            let before = scene.get(id).unwrap().clone();
            assert_eq!(resolve_prefabs(&mut scene, &lib), 0);
            assert_eq!(scene.get(id).unwrap(), &before);
        }
    }

    #[test]
    fn effective_values_follow_override_rule() {
        let prefab = goblin_prefab();
        let mut instance = PrefabInstance::new("goblin");
        instance.overrides.box_collider = true;
        let entity = Entity::new(EntityId(3), "g")
            .with(instance)
            .with(SpriteRenderer::new("stale"))
            .with(BoxCollider2D::new(4.0, 4.0));

        // Not overridden: prefab wins even before resolution.
        let sprite = effective_component::<SpriteRenderer>(&entity, Some(&prefab)).unwrap();
        assert_eq!(sprite.sprite_id, "goblin_idle");
        // Overridden: own wins.
        let collider = effective_component::<BoxCollider2D>(&entity, Some(&prefab)).unwrap();
        assert_eq!(collider.size.x, 4.0);
        // Prefab lacks it and entity lacks it.
        assert!(effective_component::<crate::components::Rigidbody2D>(&entity, Some(&prefab)).is_none());

        assert_eq!(effective_transform(&entity, Some(&prefab)).position.x, 5.0);
        assert_eq!(effective_transform(&entity, None).position.x, 0.0);
    }

    #[test]
    fn reset_restores_prefab_value_and_clears_flag() {
        let prefab = goblin_prefab();
        let mut instance = PrefabInstance::new("goblin");
        instance.overrides.sprite_renderer = true;
        let mut entity = Entity::new(EntityId(3), "g")
            .with(instance)
            .with(SpriteRenderer::new("goblin_red"));

        assert!(reset_to_prefab(
            &mut entity,
            &prefab,
            OverrideTarget::Component(ComponentKind::SpriteRenderer)
        ));
        assert_eq!(entity.get::<SpriteRenderer>().unwrap().sprite_id, "goblin_idle");
        assert!(!entity.get::<PrefabInstance>().unwrap().overrides.sprite_renderer);

        let mut plain = Entity::new(EntityId(4), "plain");
        assert!(!reset_to_prefab(&mut plain, &prefab, OverrideTarget::Transform));
    }
}
