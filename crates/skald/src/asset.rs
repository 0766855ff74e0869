//! # Assets — Lookup by String Id
//!
//! Clips, controllers, prefabs, and sprite definitions are immutable assets
//! referenced from components by string id. Nothing caches a resolved asset
//! across ticks: every system asks the [`AssetProvider`] again, so replacing
//! an asset (a reload) takes effect on the next lookup.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │  Assets (resource in World)                            │
//! │    Box<dyn AssetProvider>                              │
//! │                                                        │
//! │  AssetLibrary (the in-memory provider)                 │
//! │    animations  ── id → Arc<AnimationClip>              │
//! │    controllers ── id → Arc<AnimatorController>         │
//! │    prefabs     ── id → Arc<Prefab>                     │
//! │    sprites     ── id → Arc<SpriteDefinition>           │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Misses are not errors
//!
//! Every lookup returns `Option`. A missing id simply disables whatever
//! depended on it for that tick. Loading, on the other hand, is strict: a
//! malformed file is a [`LoadError`] and nothing is inserted.
//!
//! ## Reloading
//!
//! Inserting an asset under an id that already exists replaces it. Entities
//! holding that id pick up the new data next tick; `Arc`s already handed out
//! keep the old data alive until dropped.

use std::collections::HashMap;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::animation::{AnimationClip, AnimatorController};
use crate::error::LoadError;
use crate::math::{Rect, Vec2};
use crate::prefab::Prefab;

/// Where a sprite lives in a texture atlas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SpriteDefinition {
    pub id: String,
    /// Texture path or atlas name.
    pub texture: String,
    /// Pixel region within the texture.
    pub region: Rect,
    /// Normalized pivot (0,0 = bottom-left, 0.5,0.5 = center).
    #[serde(default = "center")]
    pub pivot: Vec2,
}

fn center() -> Vec2 {
    Vec2::splat(0.5)
}

/// Read-only asset lookups. All misses are silent.
pub trait AssetProvider {
    fn get_animation(&self, id: &str) -> Option<Arc<AnimationClip>>;
    fn get_controller(&self, id: &str) -> Option<Arc<AnimatorController>>;
    fn get_prefab(&self, id: &str) -> Option<Arc<Prefab>>;
    fn get_sprite(&self, id: &str) -> Option<Arc<SpriteDefinition>>;
}

/// In-memory asset store.
#[derive(Debug, Default, Clone)]
pub struct AssetLibrary {
    animations: HashMap<String, Arc<AnimationClip>>,
    controllers: HashMap<String, Arc<AnimatorController>>,
    prefabs: HashMap<String, Arc<Prefab>>,
    sprites: HashMap<String, Arc<SpriteDefinition>>,
}

impl AssetLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Insertion ────────────────────────────────────────────────────

    /// Insert or replace a clip. Returns the shared handle.
    pub fn insert_animation(&mut self, clip: AnimationClip) -> Arc<AnimationClip> {
        let clip = Arc::new(clip);
        if self
            .animations
            .insert(clip.id.clone(), clip.clone())
            .is_some()
        {
            log::info!("Replaced animation clip '{}'", clip.id);
        }
        clip
    }

    pub fn insert_controller(&mut self, controller: AnimatorController) -> Arc<AnimatorController> {
        let controller = Arc::new(controller);
        if self
            .controllers
            .insert(controller.id.clone(), controller.clone())
            .is_some()
        {
            log::info!("Replaced animator controller '{}'", controller.id);
        }
        controller
    }

    pub fn insert_prefab(&mut self, prefab: Prefab) -> Arc<Prefab> {
        let prefab = Arc::new(prefab);
        if self
            .prefabs
            .insert(prefab.id().to_string(), prefab.clone())
            .is_some()
        {
            log::info!("Replaced prefab '{}'", prefab.id());
        }
        prefab
    }

    pub fn insert_sprite(&mut self, sprite: SpriteDefinition) -> Arc<SpriteDefinition> {
        let sprite = Arc::new(sprite);
        self.sprites.insert(sprite.id.clone(), sprite.clone());
        sprite
    }

    /// Forget a prefab. Instances referring to it stop resolving.
    pub fn remove_prefab(&mut self, id: &str) -> Option<Arc<Prefab>> {
        self.prefabs.remove(id)
    }

    // ── Loading ──────────────────────────────────────────────────────

    pub fn load_animation_json(&mut self, json: &str) -> Result<Arc<AnimationClip>, LoadError> {
        let clip = AnimationClip::from_json(json)?;
        log::info!("Loaded animation clip '{}' ({} frames)", clip.id, clip.frame_count());
        Ok(self.insert_animation(clip))
    }

    pub fn load_controller_json(
        &mut self,
        json: &str,
    ) -> Result<Arc<AnimatorController>, LoadError> {
        let controller = AnimatorController::from_json(json)?;
        log::info!(
            "Loaded animator controller '{}' ({} states, {} transitions)",
            controller.id,
            controller.states.len(),
            controller.transitions.len()
        );
        Ok(self.insert_controller(controller))
    }

    pub fn load_prefab_json(&mut self, json: &str) -> Result<Arc<Prefab>, LoadError> {
        let prefab = crate::scene::prefab_from_json(json)?;
        log::info!(
            "Loaded prefab '{}' ({} entities)",
            prefab.id(),
            prefab.entities().len()
        );
        Ok(self.insert_prefab(prefab))
    }

    pub fn load_sprite_json(&mut self, json: &str) -> Result<Arc<SpriteDefinition>, LoadError> {
        let sprite: SpriteDefinition = serde_json::from_str(json)?;
        Ok(self.insert_sprite(sprite))
    }

    /// Load every sprite from a JSON array (an atlas description).
    pub fn load_sprite_atlas_json(&mut self, json: &str) -> Result<usize, LoadError> {
        let sprites: Vec<SpriteDefinition> = serde_json::from_str(json)?;
        let count = sprites.len();
        for sprite in sprites {
            self.insert_sprite(sprite);
        }
        log::info!("Loaded {count} sprite definitions");
        Ok(count)
    }

    pub fn load_animation_file(&mut self, path: impl AsRef<Path>) -> Result<Arc<AnimationClip>, LoadError> {
        self.load_animation_json(&read_file(path.as_ref())?)
    }

    pub fn load_controller_file(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<Arc<AnimatorController>, LoadError> {
        self.load_controller_json(&read_file(path.as_ref())?)
    }

    pub fn load_prefab_file(&mut self, path: impl AsRef<Path>) -> Result<Arc<Prefab>, LoadError> {
        self.load_prefab_json(&read_file(path.as_ref())?)
    }

    pub fn load_sprite_atlas_file(&mut self, path: impl AsRef<Path>) -> Result<usize, LoadError> {
        self.load_sprite_atlas_json(&read_file(path.as_ref())?)
    }

    // ── Stats ────────────────────────────────────────────────────────

    pub fn animation_count(&self) -> usize {
        self.animations.len()
    }

    pub fn controller_count(&self) -> usize {
        self.controllers.len()
    }

    pub fn prefab_count(&self) -> usize {
        self.prefabs.len()
    }
}

impl AssetProvider for AssetLibrary {
    fn get_animation(&self, id: &str) -> Option<Arc<AnimationClip>> {
        self.animations.get(id).cloned()
    }

    fn get_controller(&self, id: &str) -> Option<Arc<AnimatorController>> {
        self.controllers.get(id).cloned()
    }

    fn get_prefab(&self, id: &str) -> Option<Arc<Prefab>> {
        self.prefabs.get(id).cloned()
    }

    fn get_sprite(&self, id: &str) -> Option<Arc<SpriteDefinition>> {
        self.sprites.get(id).cloned()
    }
}

pub(crate) fn read_file(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// World resource holding the active asset provider.
///
/// Systems take it out with `resource_remove`, use it alongside the scene,
/// and put it back.
pub struct Assets(Box<dyn AssetProvider + Send + Sync>);

impl Assets {
    pub fn new(provider: impl AssetProvider + Send + Sync + 'static) -> Self {
        Self(Box::new(provider))
    }

    /// Swap in a different provider.
    pub fn replace(&mut self, provider: impl AssetProvider + Send + Sync + 'static) {
        self.0 = Box::new(provider);
    }
}

impl Deref for Assets {
    type Target = dyn AssetProvider + Send + Sync;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}
