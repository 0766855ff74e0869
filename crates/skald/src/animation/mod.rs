//! # Animation — Clips, Controllers, and the Three Animation Systems
//!
//! Sprite animation is split between immutable assets and per-entity state:
//!
//! - [`AnimationClip`]: ordered frames, each a sprite id, a duration, and
//!   optional notify event names.
//! - [`AnimatorController`]: named states (clip + speed) and guarded
//!   transitions between them.
//! - [`Animator`]: the component: which clip is playing, where the cursor
//!   is, controller state, parameters, triggers.
//!
//! Three systems run in this order every tick:
//!
//! ```text
//! animator_controller_system   pick state / clip        (state_machine)
//!            │
//!            ▼
//! animation_system             advance cursor, sprite,  (playback)
//!            │                 crossfade, chaining
//!            ▼
//! animation_notifier_system    frame events → EventBus  (notify)
//! ```
//!
//! Assets are referenced by string id and looked up through the
//! [`AssetProvider`](crate::asset::AssetProvider) on every use, so a reloaded
//! clip or controller takes effect on the next tick.

pub mod animator;
pub mod clip;
pub mod controller;
pub mod notify;
pub mod playback;
pub mod state_machine;

pub use animator::{Animator, SPEED_MUL_PARAM};
pub use clip::{AnimationClip, AnimationFrame, MIN_FRAME_DURATION};
pub use controller::{
    ANY_STATE, AnimatorController, CompareOp, ControllerState, ControllerTransition, LegacyWhen,
    TransitionCondition,
};
pub use notify::{AnimationNotifyEvent, animation_notifier_system, collect_notify_events};
pub use playback::{advance_animations, advance_animator, animation_system};
pub use state_machine::{animator_controller_system, update_controller, update_controllers};
