//! Prefabs: snapshot a subtree, instantiate it, override a field, and round
//! trip the scene through JSON.

use skald::prelude::*;
use skald::prefab::resolve_prefabs;

fn main() {
    env_logger::init();

    // Author a two-entity "torch" in a scratch scene and snapshot it.
    let mut scratch = Scene::new();
    let root = scratch.spawn("torch");
    if let Some(e) = scratch.get_mut(root) {
        e.insert(SpriteRenderer::new("torch_base"));
        e.insert(BoxCollider2D::new(0.5, 1.0).trigger());
    }
    let flame = scratch.spawn_child(root, "flame");
    if let Some(e) = scratch.get_mut(flame) {
        e.transform = Transform::from_xy(0.0, 0.6);
        e.insert(Animator::with_clip("flame_flicker"));
        e.insert(SpriteRenderer::new("flame_0"));
    }

    let prefab = match Prefab::snapshot("torch", "Torch", &scratch, root) {
        Ok(prefab) => prefab,
        Err(e) => {
            log::error!("snapshot failed: {e}");
            return;
        }
    };
    println!("prefab '{}' has {} entities", prefab.id(), prefab.entities().len());

    let mut library = AssetLibrary::new();
    let prefab = library.insert_prefab(prefab);

    // Two instances; the second gets a red tint.
    let mut scene = Scene::new();
    let plain = prefab.instantiate_at(&mut scene, Transform::from_xy(-3.0, 0.0));
    let red = prefab.instantiate_at(&mut scene, Transform::from_xy(3.0, 0.0));

    let registry = FieldRegistry::new();
    if let Some(entity) = scene.get_mut(red) {
        let target = OverrideTarget::Component(ComponentKind::SpriteRenderer);
        if let Err(e) = registry.edit(entity, Some(&*prefab), target, "Color", "1, 0.3, 0.3, 1") {
            log::error!("edit failed: {e}");
        }
        if let Err(e) = registry.edit(entity, Some(&*prefab), target, "Color", "very red") {
            println!("rejected edit: {e}");
        }
    }

    let json = match scene_to_json(&scene) {
        Ok(json) => json,
        Err(e) => {
            log::error!("save failed: {e}");
            return;
        }
    };
    println!("{json}");

    let mut reloaded = match scene_from_json(&json) {
        Ok(scene) => scene,
        Err(e) => {
            log::error!("load failed: {e}");
            return;
        }
    };
    let resolved = resolve_prefabs(&mut reloaded, &library);
    println!("resolved {resolved} instances after reload");

    for id in [plain, red] {
        let Some(entity) = reloaded.get(id) else {
            continue;
        };
        for view in registry.describe(entity, Some(&*prefab)) {
            let mark = if view.overridden { "*" } else { " " };
            println!("{} {mark} {:?}.{} = {}", entity.id(), view.target, view.name, view.value);
        }
    }
}
