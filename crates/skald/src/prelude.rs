//! Convenience re-exports. `use skald::prelude::*` for the common items.

pub use crate::animation::{
    AnimationClip, AnimationFrame, AnimationNotifyEvent, Animator, AnimatorController, CompareOp,
    ControllerTransition, TransitionCondition,
};
pub use crate::asset::{AssetLibrary, AssetProvider, Assets, SpriteDefinition};
pub use crate::components::{
    BodyType2D, BoxCollider2D, DebugRender2D, PhysicsBody2D, Rigidbody2D, SpriteRenderer,
};
pub use crate::ecs::{Component, ComponentKind, Entity, EntityId, Scene, Schedule, System, World};
pub use crate::error::{FieldError, LoadError};
pub use crate::events::EventBus;
pub use crate::input::{Input, Key, Keyboard};
pub use crate::inspect::FieldRegistry;
pub use crate::math::{Mat4, Quat, Rect, Transform, Vec2, Vec3, Vec4};
pub use crate::physics2d::{CollisionEvent, CollisionPhase, PhysicsSettings};
pub use crate::prefab::{OverrideTarget, Prefab, PrefabInstance};
pub use crate::runtime::Runtime;
pub use crate::scene::{load_scene_file, save_scene_file, scene_from_json, scene_to_json};
pub use crate::time::Time;
