//! # Scene Files — Versioned JSON Documents
//!
//! Scenes and prefabs are stored as JSON with a single integer `Version`.
//! A reader accepts any version up to [`CURRENT_VERSION`] and rejects newer
//! documents rather than guessing at fields it doesn't know.
//!
//! ```json
//! {
//!   "Version": 1,
//!   "Entities": [
//!     {
//!       "Id": 4,
//!       "Name": "goblin (2)",
//!       "Prefab": { "PrefabId": "goblin", "UsePrefabTransform": false },
//!       "Transform": { "Position": [3.0, 1.0, 0.0], "Scale": [1.0, 1.0, 1.0], "RotationZ": 0.0 },
//!       "SpriteRenderer": { "SpriteId": "goblin_red", ... }
//!     }
//!   ]
//! }
//! ```
//!
//! ## Overrides on disk
//!
//! For a prefab instance, a component block is written only when that kind
//! is overridden. Loading reverses this: a present block sets the override
//! flag, an absent one leaves the kind to the prefab. The transform block
//! follows the same rule, and is always written when the instance doesn't
//! use the prefab transform.
//!
//! Entities without a `Prefab` reference carry everything they have.
//!
//! Entity order and ids are preserved, so saving a freshly loaded scene
//! reproduces the same document.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::animation::Animator;
use crate::asset::read_file;
use crate::components::{BoxCollider2D, DebugRender2D, PhysicsBody2D, Rigidbody2D, SpriteRenderer};
use crate::ecs::{ComponentKind, ComponentSet, Entity, EntityId, Scene};
use crate::error::LoadError;
use crate::math::{Transform, Vec3};
use crate::prefab::{Prefab, PrefabEntity, PrefabInstance};

/// Newest document version this build reads and the one it writes.
pub const CURRENT_VERSION: u32 = 1;

// ── Documents ────────────────────────────────────────────────────────────

/// A whole scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SceneDocument {
    pub version: u32,
    #[serde(default)]
    pub entities: Vec<EntityRecord>,
}

/// A prefab template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PrefabDocument {
    pub version: u32,
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub root_id: EntityId,
    #[serde(default)]
    pub entities: Vec<EntityRecord>,
}

/// Reference from an instance to its prefab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PrefabRef {
    pub prefab_id: String,
    #[serde(default = "default_true")]
    pub use_prefab_transform: bool,
}

fn default_true() -> bool {
    true
}

/// Position, scale, and Z rotation in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransformRecord {
    pub position: [f32; 3],
    #[serde(default = "unit_scale")]
    pub scale: [f32; 3],
    #[serde(default, rename = "RotationZ")]
    pub rotation_z_degrees: f32,
}

fn unit_scale() -> [f32; 3] {
    [1.0; 3]
}

impl From<&Transform> for TransformRecord {
    fn from(t: &Transform) -> Self {
        Self {
            position: t.position.to_array(),
            scale: t.scale.to_array(),
            rotation_z_degrees: round_degrees(t.rotation_z_degrees()),
        }
    }
}

impl From<TransformRecord> for Transform {
    fn from(r: TransformRecord) -> Self {
        let mut t = Transform {
            position: Vec3::from_array(r.position),
            scale: Vec3::from_array(r.scale),
            ..Transform::IDENTITY
        };
        t.set_rotation_z_degrees(r.rotation_z_degrees);
        t
    }
}

/// Degrees survive a quaternion round trip only to about 1e-5, so they are
/// written rounded to 1e-4.
fn round_degrees(degrees: f32) -> f32 {
    let rounded = (degrees * 10_000.0).round() / 10_000.0;
    // Avoid writing -0.0.
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// One entity as stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EntityRecord {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefab: Option<PrefabRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<TransformRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite_renderer: Option<SpriteRenderer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animator: Option<Animator>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "BoxCollider2D")]
    pub box_collider: Option<BoxCollider2D>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "PhysicsBody2D")]
    pub physics_body: Option<PhysicsBody2D>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "Rigidbody2D")]
    pub rigidbody: Option<Rigidbody2D>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "DebugRender2D")]
    pub debug_render: Option<DebugRender2D>,
}

impl EntityRecord {
    /// Build a record, honoring override flags when the entity is a prefab
    /// instance.
    pub fn from_entity(entity: &Entity) -> Self {
        let instance = entity.get::<PrefabInstance>();
        let write_transform = instance
            .is_none_or(|i| !i.use_prefab_transform || i.overrides.transform);
        let write = |kind: ComponentKind| instance.is_none_or(|i| i.overrides.get(kind));

        let mut record = Self {
            id: entity.id(),
            name: entity.name.clone(),
            parent: entity.parent,
            prefab: instance.map(|i| PrefabRef {
                prefab_id: i.prefab_id.clone(),
                use_prefab_transform: i.use_prefab_transform,
            }),
            transform: write_transform.then(|| TransformRecord::from(&entity.transform)),
            ..Default::default()
        };
        record.copy_blocks(&entity.components, write);
        record
    }

    fn from_prefab_entity(entity: &PrefabEntity) -> Self {
        let mut record = Self {
            id: entity.id,
            name: entity.name.clone(),
            parent: entity.parent,
            transform: Some(TransformRecord::from(&entity.transform)),
            ..Default::default()
        };
        record.copy_blocks(&entity.components, |_| true);
        record
    }

    fn copy_blocks(&mut self, set: &ComponentSet, write: impl Fn(ComponentKind) -> bool) {
        let ComponentSet {
            sprite_renderer,
            animator,
            box_collider,
            physics_body,
            rigidbody,
            debug_render,
            prefab_instance: _,
        } = set;
        self.sprite_renderer = sprite_renderer
            .clone()
            .filter(|_| write(ComponentKind::SpriteRenderer));
        self.animator = animator
            .as_ref()
            .filter(|_| write(ComponentKind::Animator))
            .map(Animator::authoring);
        self.box_collider = box_collider
            .clone()
            .filter(|_| write(ComponentKind::BoxCollider2D));
        self.physics_body = physics_body
            .clone()
            .filter(|_| write(ComponentKind::PhysicsBody2D));
        self.rigidbody = rigidbody.clone().filter(|_| write(ComponentKind::Rigidbody2D));
        self.debug_render = debug_render
            .clone()
            .filter(|_| write(ComponentKind::DebugRender2D));
    }

    /// Component set described by the blocks present.
    fn components(&self) -> ComponentSet {
        ComponentSet {
            sprite_renderer: self.sprite_renderer.clone(),
            animator: self.animator.clone(),
            box_collider: self.box_collider.clone(),
            physics_body: self.physics_body.clone(),
            rigidbody: self.rigidbody.clone(),
            debug_render: self.debug_render.clone(),
            prefab_instance: None,
        }
    }

    /// Turn the record back into a live entity.
    pub fn to_entity(&self) -> Entity {
        let mut entity = Entity::new(self.id, self.name.clone());
        entity.parent = self.parent;
        entity.components = self.components();
        if let Some(transform) = self.transform {
            entity.transform = transform.into();
        }
        if let Some(prefab) = &self.prefab {
            let mut instance = PrefabInstance::new(prefab.prefab_id.clone());
            instance.use_prefab_transform = prefab.use_prefab_transform;
            instance.overrides.transform = prefab.use_prefab_transform && self.transform.is_some();
            for kind in ComponentKind::MERGEABLE {
                instance.overrides.set(kind, entity.has(kind));
            }
            entity.insert(instance);
        }
        entity
    }

    fn to_prefab_entity(&self) -> PrefabEntity {
        PrefabEntity {
            id: self.id,
            name: self.name.clone(),
            parent: self.parent,
            transform: self.transform.map(Transform::from).unwrap_or_default(),
            components: self.components(),
        }
    }
}

fn check_version(found: u32) -> Result<(), LoadError> {
    if found > CURRENT_VERSION {
        return Err(LoadError::UnsupportedVersion {
            found,
            supported: CURRENT_VERSION,
        });
    }
    Ok(())
}

// ── Scenes ───────────────────────────────────────────────────────────────

/// Capture a scene as a document.
pub fn save_scene(scene: &Scene) -> SceneDocument {
    SceneDocument {
        version: CURRENT_VERSION,
        entities: scene.iter().map(EntityRecord::from_entity).collect(),
    }
}

/// Build a scene from a document. Entity ids are kept; parent links to ids
/// not in the document are dropped.
pub fn load_scene(doc: &SceneDocument) -> Result<Scene, LoadError> {
    check_version(doc.version)?;
    let mut scene = Scene::new();
    for record in &doc.entities {
        scene.insert_entity(record.to_entity())?;
    }
    let dangling: Vec<EntityId> = scene
        .iter()
        .filter(|e| e.parent.is_some_and(|p| !scene.contains(p)))
        .map(Entity::id)
        .collect();
    for id in dangling {
        if let Some(entity) = scene.get_mut(id) {
            log::warn!("{id} '{}': parent not in scene, detaching", entity.name);
            entity.parent = None;
        }
    }
    Ok(scene)
}

pub fn scene_to_json(scene: &Scene) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&save_scene(scene))
}

pub fn scene_from_json(json: &str) -> Result<Scene, LoadError> {
    let doc: SceneDocument = serde_json::from_str(json)?;
    let scene = load_scene(&doc)?;
    log::info!("Loaded scene ({} entities)", scene.len());
    Ok(scene)
}

pub fn save_scene_file(scene: &Scene, path: impl AsRef<Path>) -> std::io::Result<()> {
    let json = scene_to_json(scene)?;
    std::fs::write(path, json)
}

pub fn load_scene_file(path: impl AsRef<Path>) -> Result<Scene, LoadError> {
    let path = path.as_ref();
    scene_from_json(&read_file(path)?).inspect_err(|e| {
        log::warn!("Failed to load scene '{}': {e}", path.display());
    })
}

// ── Prefabs ──────────────────────────────────────────────────────────────

pub fn save_prefab(prefab: &Prefab) -> PrefabDocument {
    PrefabDocument {
        version: CURRENT_VERSION,
        id: prefab.id().to_string(),
        name: prefab.name().to_string(),
        root_id: prefab.root_id(),
        entities: prefab
            .entities()
            .iter()
            .map(EntityRecord::from_prefab_entity)
            .collect(),
    }
}

/// Build a prefab from a document, checking version and structure.
pub fn load_prefab(doc: &PrefabDocument) -> Result<Prefab, LoadError> {
    check_version(doc.version)?;
    let entities = doc
        .entities
        .iter()
        .map(EntityRecord::to_prefab_entity)
        .collect();
    Prefab::new(doc.id.clone(), doc.name.clone(), doc.root_id, entities)
}

pub fn prefab_to_json(prefab: &Prefab) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&save_prefab(prefab))
}

pub fn prefab_from_json(json: &str) -> Result<Prefab, LoadError> {
    let doc: PrefabDocument = serde_json::from_str(json)?;
    load_prefab(&doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::BodyType2D;
    use crate::math::{Vec2, Vec4};

    #[test]
    fn newer_version_is_rejected() {
        let err = scene_from_json(r#"{ "Version": 2, "Entities": [] }"#).unwrap_err();
        assert!(matches!(
            err,
            LoadError::UnsupportedVersion {
                found: 2,
                supported: 1
            }
        ));
        let err = prefab_from_json(r#"{ "Version": 9, "Id": "p", "RootId": 1 }"#).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedVersion { found: 9, .. }));
    }

    #[test]
    fn older_versions_load() {
        let scene = scene_from_json(r#"{ "Version": 0, "Entities": [ { "Id": 3 } ] }"#).unwrap();
        assert!(scene.contains(EntityId(3)));
    }

    #[test]
    fn malformed_prefabs_fail_to_load() {
        let empty = r#"{ "Version": 1, "Id": "p", "RootId": 1, "Entities": [] }"#;
        assert!(matches!(
            prefab_from_json(empty),
            Err(LoadError::EmptyPrefab { .. })
        ));
        let rootless = r#"{ "Version": 1, "Id": "p", "RootId": 7, "Entities": [ { "Id": 1 } ] }"#;
        assert!(matches!(
            prefab_from_json(rootless),
            Err(LoadError::MissingRoot { .. })
        ));
    }

    #[test]
    fn duplicate_ids_fail() {
        let json = r#"{ "Version": 1, "Entities": [ { "Id": 1 }, { "Id": 1 } ] }"#;
        assert!(matches!(
            scene_from_json(json),
            Err(LoadError::DuplicateEntity { .. })
        ));
    }

    #[test]
    fn instance_blocks_follow_override_flags() {
        let mut scene = Scene::new();
        let id = scene.spawn("goblin (1)");
        {
            let e = scene.get_mut(id).unwrap();
            let mut instance = PrefabInstance::new("goblin");
            instance.overrides.box_collider = true;
            e.insert(instance);
            e.insert(SpriteRenderer::new("from_prefab"));
            e.insert(BoxCollider2D::new(3.0, 3.0));
        }

        let doc = save_scene(&scene);
        let record = &doc.entities[0];
        assert!(record.transform.is_none());
        assert!(record.sprite_renderer.is_none());
        assert!(record.box_collider.is_some());

        let loaded = load_scene(&doc).unwrap();
        let e = loaded.get(id).unwrap();
        let instance = e.get::<PrefabInstance>().unwrap();
        assert!(instance.overrides.box_collider);
        assert!(!instance.overrides.sprite_renderer);
        assert!(!instance.overrides.transform);
        assert!(!e.has(ComponentKind::SpriteRenderer));
    }

    #[test]
    fn own_transform_is_always_written() {
        let mut scene = Scene::new();
        let id = scene.spawn("placed");
        {
            let e = scene.get_mut(id).unwrap();
            e.transform = Transform::from_xy(1.0, 2.0);
            let mut instance = PrefabInstance::new("goblin");
            instance.use_prefab_transform = false;
            e.insert(instance);
        }
        let doc = save_scene(&scene);
        assert_eq!(doc.entities[0].transform.unwrap().position, [1.0, 2.0, 0.0]);

        let loaded = load_scene(&doc).unwrap();
        let instance = loaded.get(id).unwrap().get::<PrefabInstance>().unwrap().clone();
        assert!(!instance.use_prefab_transform);
        assert!(!instance.overrides.transform);
    }

    #[test]
    fn rotation_is_written_in_rounded_degrees() {
        let t = Transform::default().with_rotation_z(30f32.to_radians());
        let record = TransformRecord::from(&t);
        assert_eq!(record.rotation_z_degrees, 30.0);
        let back = Transform::from(record);
        assert!((back.rotation_z_degrees() - 30.0).abs() < 1e-3);
    }

    #[test]
    fn parents_survive_and_dangling_parents_detach() {
        let json = r#"{ "Version": 1, "Entities": [
            { "Id": 1, "Name": "root" },
            { "Id": 2, "Name": "child", "Parent": 1 },
            { "Id": 3, "Name": "orphan", "Parent": 99 }
        ] }"#;
        let scene = scene_from_json(json).unwrap();
        assert_eq!(scene.get(EntityId(2)).unwrap().parent, Some(EntityId(1)));
        assert_eq!(scene.get(EntityId(3)).unwrap().parent, None);
        // New spawns never reuse a loaded id.
        let mut scene = scene;
        assert_eq!(scene.spawn("new"), EntityId(4));
    }

    #[test]
    fn saved_animator_drops_runtime_state() {
        let mut anim = Animator::with_clip("walk");
        anim.frame_index = 3;
        anim.set_trigger("jump");
        let mut scene = Scene::new();
        let id = scene.spawn("hero");
        scene.get_mut(id).unwrap().insert(anim);

        let loaded = load_scene(&save_scene(&scene)).unwrap();
        let anim = loaded.get(id).unwrap().get::<Animator>().unwrap();
        assert_eq!(anim.clip_id, "walk");
        assert_eq!(anim.frame_index, 0);
        assert!(!anim.has_trigger("jump"));
    }

    #[test]
    fn prefab_document_round_trip() {
        let mut root = PrefabEntity::new(EntityId(1), "crate");
        root.transform = Transform::from_xy(0.5, 0.0);
        root.components.insert(BoxCollider2D::new(1.0, 1.0));
        root.components.insert(Rigidbody2D {
            body_type: BodyType2D::Static,
            ..Default::default()
        });
        let mut lid = PrefabEntity::new(EntityId(2), "lid");
        lid.parent = Some(EntityId(1));
        lid.components.insert(
            SpriteRenderer::new("crate_lid").with_color(Vec4::new(1.0, 0.5, 0.5, 1.0)),
        );
        let prefab = Prefab::new("crate", "Crate", EntityId(1), vec![root, lid]).unwrap();

        let json = prefab_to_json(&prefab).unwrap();
        let back = prefab_from_json(&json).unwrap();
        assert_eq!(back, prefab);
        assert_eq!(
            back.root().unwrap().components.box_collider.as_ref().unwrap().size,
            Vec2::ONE
        );
    }
}
