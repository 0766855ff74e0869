//! # Animation Notifier — Frame Events
//!
//! Watches each animator's frame index and publishes one
//! [`AnimationNotifyEvent`] per notify name on every frame playback reaches.
//!
//! The notifier keeps its own record of the last clip and frame it fired
//! for, separate from the animation system's cursor. When the animation
//! system jumps several frames in one tick (a long Δt, a fast clip) the
//! notifier walks the skipped frames in playback direction so none of their
//! events are lost:
//!
//! ```text
//! frames   0   1   2   3   4   5   6
//! events           ★           ★
//! last notified ─▶ 1
//! current             ───────────▶ 6
//! fired: 2★, 3, 4, 5★, 6  (in that order)
//! ```
//!
//! A clip change, a restart of the same clip, the first observation, or an
//! index out of range fires the current frame only.

use crate::asset::{AssetProvider, Assets};
use crate::ecs::{EntityId, Scene, World};
use crate::events::EventBus;

use super::animator::Animator;
use super::clip::AnimationClip;

/// A notify marker on an animation frame was reached.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationNotifyEvent {
    pub entity: EntityId,
    pub entity_name: String,
    pub clip_id: String,
    pub frame_index: usize,
    pub event_name: String,
}

/// System: publish notify events for every animator to the [`EventBus`].
pub fn animation_notifier_system(world: &mut World) {
    let Some(assets) = world.resource_remove::<Assets>() else {
        return;
    };
    let events = collect_notify_events(&mut world.scene, &*assets);
    world.insert_resource(assets);

    if let Some(bus) = world.get_resource_mut::<EventBus>() {
        for event in events {
            bus.publish(event);
        }
    }
}

/// Walk every animator in `scene` and return the events to fire, in scene
/// order then frame order.
pub fn collect_notify_events(
    scene: &mut Scene,
    assets: &dyn AssetProvider,
) -> Vec<AnimationNotifyEvent> {
    let mut out = Vec::new();
    for entity in scene.iter_mut() {
        let id = entity.id();
        let Some(animator) = entity.components.animator.as_mut() else {
            continue;
        };
        let Some(clip) = assets
            .get_animation(&animator.clip_id)
            .filter(|c| !c.is_empty())
        else {
            continue;
        };
        let mut fire = |frame_index: usize| {
            for name in &clip.frames[frame_index].events {
                out.push(AnimationNotifyEvent {
                    entity: id,
                    entity_name: entity.name.clone(),
                    clip_id: clip.id.clone(),
                    frame_index,
                    event_name: name.clone(),
                });
            }
        };
        observe(animator, &clip, &mut fire);
    }
    out
}

/// Decide which frames to fire for one animator and update its record.
fn observe(animator: &mut Animator, clip: &AnimationClip, fire: &mut impl FnMut(usize)) {
    let count = clip.frame_count();
    let current = animator.frame_index.min(count - 1);

    // A rewind of the same clip counts as a new clip: the frames between
    // the old position and the end were never played.
    let restarted = std::mem::take(&mut animator.cursor_restarted);
    let same_clip =
        !restarted && animator.notify_clip_id.as_deref() == Some(clip.id.as_str());
    match animator.notify_frame {
        Some(last) if same_clip => {
            if last == current {
                return;
            }
            if last >= count || last.abs_diff(current) > count {
                fire(current);
            } else {
                let forward = animator.speed >= 0.0;
                let mut index = last;
                for _ in 0..count {
                    index = if forward {
                        (index + 1) % count
                    } else {
                        (index + count - 1) % count
                    };
                    fire(index);
                    if index == current {
                        break;
                    }
                }
            }
        }
        // New clip or first observation.
        _ => fire(current),
    }

    animator.notify_clip_id = Some(clip.id.clone());
    animator.notify_frame = Some(current);
}
