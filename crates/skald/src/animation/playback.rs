//! # Animation System — Clip Playback and Crossfade
//!
//! Advances every [`Animator`] by Δt, picks the frame to show, writes its
//! sprite id into the entity's [`SpriteRenderer`], and handles the end of a
//! clip: wrap when looping, chain into the next clip after a transition clip,
//! or stop.
//!
//! ## Per-entity flow
//!
//! ```text
//!  hold > 0 ? ──yes──▶ hold -= Δt, pin current frame ─▶ done
//!     │no
//!  resolve clip ──miss/empty──▶ done (paused)
//!     │
//!  reset requested? ─▶ cursor to start
//!  playing? ──no──▶ remember clip ─▶ done
//!     │
//!  cursor += |speed|·Δt
//!  while time_into_frame ≥ frame duration:
//!     step one frame (down when speed < 0)
//!     past the end?
//!        looping  ─▶ wrap, clip time mod length
//!        chained  ─▶ switch clip, commit pending state ─▶ done
//!        else     ─▶ pin last frame, stop ─▶ done
//!  show frame, crossfade if the clip changed
//! ```
//!
//! ## Reverse playback
//!
//! A negative speed walks the frame index downward. A looping clip wraps
//! from frame 0 to the last frame; a non-looping clip finishes when it steps
//! below frame 0 and stays on frame 0. `clip_time_seconds` always counts
//! progress through the clip (|speed|·Δt), whichever way it runs. A restart
//! at negative speed begins on the last frame.
//!
//! ## Crossfade
//!
//! A crossfade starts when the shown sprite changes because the clip changed.
//! Its length and freeze flag come from the one-shot overrides staged by the
//! controller, falling back to the animator's defaults; the overrides are
//! consumed either way. A freezing crossfade pins the cursor for the whole
//! fade.

use crate::asset::{AssetProvider, Assets};
use crate::components::SpriteRenderer;
use crate::ecs::{ComponentSet, Scene, World};
use crate::time::Time;

use super::animator::Animator;
use super::clip::AnimationClip;

/// System: advance every animator by the current [`Time`] delta.
pub fn animation_system(world: &mut World) {
    let Some(dt) = world.get_resource::<Time>().map(Time::delta_secs) else {
        return;
    };
    let Some(assets) = world.resource_remove::<Assets>() else {
        log::trace!("animation_system: no Assets resource");
        return;
    };
    advance_animations(&mut world.scene, &*assets, dt);
    world.insert_resource(assets);
}

/// Advance every animator in `scene` by `dt` seconds.
pub fn advance_animations(scene: &mut Scene, assets: &dyn AssetProvider, dt: f32) {
    let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
    for entity in scene.iter_mut() {
        let ComponentSet {
            animator,
            sprite_renderer,
            ..
        } = &mut entity.components;
        if let Some(animator) = animator.as_mut() {
            advance_animator(animator, sprite_renderer.as_mut(), assets, dt);
        }
    }
}

/// Advance one animator and its optional sprite by `dt` seconds.
pub fn advance_animator(
    animator: &mut Animator,
    mut sprite: Option<&mut SpriteRenderer>,
    assets: &dyn AssetProvider,
    dt: f32,
) {
    // The finished latch lives exactly one tick.
    animator.clip_finished_this_frame = false;

    if let Some(sprite) = sprite.as_deref_mut() {
        sprite.advance_crossfade(dt);
    }

    if animator.crossfade_hold_seconds > 0.0 {
        animator.crossfade_hold_seconds = (animator.crossfade_hold_seconds - dt).max(0.0);
        if let Some(clip) = assets.get_animation(&animator.clip_id) {
            if let Some(frame) = clip.frame_clamped(animator.frame_index) {
                set_sprite(sprite, &frame.sprite_id);
            }
        }
        return;
    }

    let Some(clip) = assets
        .get_animation(&animator.clip_id)
        .filter(|c| !c.is_empty())
    else {
        log::trace!("animator clip '{}' unresolved or empty", animator.clip_id);
        return;
    };

    let clip_changed = animator.last_clip_id.as_deref() != Some(clip.id.as_str());

    if animator.reset_requested {
        restart_cursor(animator, &clip);
        animator.reset_requested = false;
    }

    if !animator.playing {
        animator.last_clip_id = Some(clip.id.clone());
        return;
    }

    let count = clip.frame_count();
    if animator.frame_index >= count {
        animator.frame_index = count - 1;
    }

    let looping = animator.effective_loop(clip.looping);
    let forward = animator.speed >= 0.0;
    let step = dt * animator.speed.abs();
    let length = clip.length();

    animator.time_into_frame += step;
    animator.clip_time_seconds += step;

    // Whole cycles land back on the same frame; skip them.
    if looping && animator.time_into_frame >= length {
        let cycles = (animator.time_into_frame / length).floor();
        animator.time_into_frame -= cycles * length;
    }

    loop {
        let duration = clip.frames[animator.frame_index].effective_duration();
        if animator.time_into_frame < duration {
            break;
        }
        animator.time_into_frame -= duration;

        let past_end = if forward {
            animator.frame_index += 1;
            animator.frame_index >= count
        } else if animator.frame_index == 0 {
            true
        } else {
            animator.frame_index -= 1;
            false
        };
        if !past_end {
            continue;
        }

        if looping {
            animator.frame_index = if forward { 0 } else { count - 1 };
            continue;
        }

        animator.clip_finished_this_frame = true;
        animator.clip_time_seconds = animator.clip_time_seconds.min(length);

        let next_speed = animator.next_clip_speed.take();
        let next = animator
            .next_clip_id
            .take()
            .and_then(|id| assets.get_animation(&id))
            .filter(|c| !c.is_empty());
        match next {
            Some(next) => chain_into(animator, sprite, &clip, &next, next_speed),
            None => {
                animator.frame_index = if forward { count - 1 } else { 0 };
                animator.time_into_frame = 0.0;
                animator.playing = false;
                set_sprite(sprite, &clip.frames[animator.frame_index].sprite_id);
                animator.last_clip_id = Some(clip.id.clone());
            }
        }
        return;
    }

    if looping && length > 0.0 {
        animator.clip_time_seconds = animator.clip_time_seconds.rem_euclid(length);
    }

    let frame_sprite = &clip.frames[animator.frame_index].sprite_id;
    let previous = sprite.as_deref().map(|s| s.sprite_id.clone()).unwrap_or_default();
    set_sprite(sprite.as_deref_mut(), frame_sprite);
    if clip_changed && previous != *frame_sprite {
        start_crossfade(animator, sprite, &previous, frame_sprite);
    } else {
        animator.pending_crossfade_seconds = None;
        animator.pending_crossfade_freeze = None;
    }

    animator.last_clip_id = Some(clip.id.clone());
}

/// A finished transition clip hands over to the clip it was staged with.
fn chain_into(
    animator: &mut Animator,
    mut sprite: Option<&mut SpriteRenderer>,
    finished: &AnimationClip,
    next: &AnimationClip,
    next_speed: Option<f32>,
) {
    animator.clip_id = next.id.clone();
    // The cursor starts from the destination's direction, not the
    // transition clip's.
    if let Some(speed) = next_speed {
        animator.speed = speed;
    }
    restart_cursor(animator, next);
    animator.playing = true;

    let previous = sprite.as_deref().map(|s| s.sprite_id.clone()).unwrap_or_default();
    let first = &next.frames[animator.frame_index].sprite_id;
    set_sprite(sprite.as_deref_mut(), first);
    start_crossfade(animator, sprite, &previous, first);

    if let Some(state) = animator.pending_state_id.take() {
        log::debug!(
            "transition clip '{}' finished, entering state '{}' ({})",
            finished.id,
            state,
            next.id
        );
        animator.state_id = Some(state);
        animator.state_time_seconds = 0.0;
    }
    animator.last_clip_id = Some(next.id.clone());
}

/// Cursor to the start of `clip` for the current playback direction.
fn restart_cursor(animator: &mut Animator, clip: &AnimationClip) {
    animator.frame_index = if animator.speed < 0.0 {
        clip.frame_count().saturating_sub(1)
    } else {
        0
    };
    animator.time_into_frame = 0.0;
    animator.clip_time_seconds = 0.0;
    animator.cursor_restarted = true;
}

fn set_sprite(sprite: Option<&mut SpriteRenderer>, sprite_id: &str) {
    if let Some(sprite) = sprite {
        if sprite.sprite_id != sprite_id {
            sprite.sprite_id = sprite_id.to_string();
        }
    }
}

/// Resolve and consume the crossfade overrides; start a fade if it would be
/// visible.
fn start_crossfade(
    animator: &mut Animator,
    sprite: Option<&mut SpriteRenderer>,
    from: &str,
    to: &str,
) {
    let duration = animator
        .pending_crossfade_seconds
        .take()
        .unwrap_or(animator.crossfade_seconds);
    let freeze = animator
        .pending_crossfade_freeze
        .take()
        .unwrap_or(animator.crossfade_freeze);

    if from.is_empty() || from == to || !(duration > 0.0) {
        return;
    }
    let Some(sprite) = sprite else {
        return;
    };
    sprite.begin_crossfade(from, duration);
    animator.crossfade_hold_seconds = if freeze { duration } else { 0.0 };
}
