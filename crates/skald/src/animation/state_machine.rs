//! # Animator Controller System — The State Machine
//!
//! Runs first in the tick. For every animator with a controller it decides
//! whether to leave the current state, and if so, which clip plays next.
//!
//! ## Per-entity flow
//!
//! ```text
//! controller unresolved / no states ─▶ skip
//! state time += Δt
//! no state yet ─▶ enter initial state, restart its clip ─▶ done
//! not in a transition clip ─▶ speed = state speed × speedMul
//!
//! candidates = transitions from current state or "*"
//!   - only interruptible ones while a transition clip plays
//!   - drop if state time < MinTimeInState          ┐ gates: never
//!   - drop if normalized clip time < ExitTime      ┘ guard-tested
//! stable sort by priority, highest first
//! first candidate whose guard holds fires:
//!   consume its triggers, stage crossfade overrides
//!   transition clip? ─▶ play it, stage destination as pending
//!   else            ─▶ switch state, play destination clip
//! ```
//!
//! Guard evaluation is pure. The only side effect on the animator's
//! parameters is trigger consumption, and only for the transition that
//! fires.

use std::cmp::Reverse;

use crate::asset::{AssetProvider, Assets};
use crate::ecs::{Scene, World};
use crate::input::{Key, Keyboard};
use crate::time::Time;

use super::animator::Animator;
use super::controller::{AnimatorController, ControllerTransition, LegacyWhen, TransitionCondition};

/// System: run every animator controller for the current [`Time`] delta.
pub fn animator_controller_system(world: &mut World) {
    let Some(dt) = world.get_resource::<Time>().map(Time::delta_secs) else {
        return;
    };
    let Some(assets) = world.resource_remove::<Assets>() else {
        log::trace!("animator_controller_system: no Assets resource");
        return;
    };
    let keyboard = world.resource_remove::<Keyboard>().unwrap_or_default();

    update_controllers(&mut world.scene, &*assets, &keyboard, dt);

    world.insert_resource(keyboard);
    world.insert_resource(assets);
}

/// Run every animator controller in `scene`.
pub fn update_controllers(
    scene: &mut Scene,
    assets: &dyn AssetProvider,
    input: &Keyboard,
    dt: f32,
) {
    for entity in scene.iter_mut() {
        if let Some(animator) = entity.components.animator.as_mut() {
            update_controller(animator, assets, input, dt);
        }
    }
}

/// Run one animator's controller for one tick.
pub fn update_controller(
    animator: &mut Animator,
    assets: &dyn AssetProvider,
    input: &Keyboard,
    dt: f32,
) {
    if animator.controller_id.trim().is_empty() {
        return;
    }
    let Some(controller) = assets.get_controller(&animator.controller_id) else {
        log::trace!("controller '{}' unresolved", animator.controller_id);
        return;
    };
    if controller.states.is_empty() {
        return;
    }

    if animator.state_id.is_some() {
        animator.state_time_seconds += dt.max(0.0);
    }
    let in_transition = animator.pending_state_id.is_some();

    let Some(current) = animator.state_id.clone() else {
        enter_initial_state(animator, &controller);
        return;
    };

    if !in_transition {
        if let Some(state) = controller.get_state(&current) {
            animator.speed = state.speed * animator.speed_mul();
        }
    }

    let normalized_time = normalized_clip_time(animator, assets);
    let mut candidates: Vec<&ControllerTransition> = controller
        .transitions
        .iter()
        .filter(|t| t.matches_from(&current))
        .filter(|t| controller.states.contains_key(&t.to))
        .filter(|t| !in_transition || t.can_interrupt)
        .filter(|t| animator.state_time_seconds >= t.min_time_in_state)
        .filter(|t| t.exit_time.is_none_or(|exit| normalized_time >= exit))
        .collect();
    // Stable: equal priorities keep authoring order.
    candidates.sort_by_key(|t| Reverse(t.priority));

    if let Some(transition) = candidates
        .into_iter()
        .find(|t| guard_holds(t, animator, input))
    {
        fire(animator, &controller, transition);
    }
}

fn enter_initial_state(animator: &mut Animator, controller: &AnimatorController) {
    let Some(initial) = controller.get_state(&controller.initial_state) else {
        log::trace!(
            "controller '{}' initial state '{}' undefined",
            controller.id,
            controller.initial_state
        );
        return;
    };
    log::debug!(
        "controller '{}' starting in '{}'",
        controller.id,
        controller.initial_state
    );
    animator.state_id = Some(controller.initial_state.clone());
    animator.state_time_seconds = 0.0;
    let speed = initial.speed * animator.speed_mul();
    animator.play_clip(&initial.clip_id, speed);
}

/// Current clip time over clip length, or 0 when the clip is unknown.
fn normalized_clip_time(animator: &Animator, assets: &dyn AssetProvider) -> f32 {
    assets
        .get_animation(&animator.clip_id)
        .map(|clip| clip.length())
        .filter(|&length| length > 0.0)
        .map_or(0.0, |length| animator.clip_time_seconds / length)
}

fn fire(animator: &mut Animator, controller: &AnimatorController, transition: &ControllerTransition) {
    let Some(destination) = controller.get_state(&transition.to) else {
        return;
    };

    for name in transition.trigger_names() {
        animator.consume_trigger(name);
    }
    animator.pending_crossfade_seconds = transition.crossfade_seconds.filter(|s| *s >= 0.0);
    animator.pending_crossfade_freeze = transition.crossfade_freeze;

    let transition_clip = transition
        .transition_clip
        .as_deref()
        .filter(|c| !c.trim().is_empty());

    match transition_clip {
        Some(clip_id) => {
            if animator.clip_id == clip_id && animator.playing {
                return;
            }
            log::debug!(
                "'{}': {} -> {} via clip '{}'",
                controller.id,
                transition.from,
                transition.to,
                clip_id
            );
            animator.pending_state_id = Some(transition.to.clone());
            animator.next_clip_id = Some(destination.clip_id.clone());
            animator.next_clip_speed = Some(destination.speed * animator.speed_mul());
            animator.play_clip(clip_id, transition.transition_speed.unwrap_or(1.0));
            animator.state_time_seconds = 0.0;
        }
        None => {
            log::debug!(
                "'{}': {} -> {}",
                controller.id,
                animator.state_id.as_deref().unwrap_or("?"),
                transition.to
            );
            animator.state_id = Some(transition.to.clone());
            animator.state_time_seconds = 0.0;
            animator.pending_state_id = None;
            animator.next_clip_id = None;
            animator.next_clip_speed = None;
            let speed = destination.speed * animator.speed_mul();
            animator.play_clip(&destination.clip_id, speed);
        }
    }
}

// ── Guards ──────────────────────────────────────────────────────────────

/// Whether the transition's guard holds. Never mutates.
pub fn guard_holds(transition: &ControllerTransition, animator: &Animator, input: &Keyboard) -> bool {
    if !transition.conditions.is_empty() {
        transition
            .conditions
            .iter()
            .all(|c| condition_holds(c, animator, input))
    } else if let Some(when) = &transition.when {
        legacy_holds(when, input)
    } else {
        true
    }
}

fn condition_holds(condition: &TransitionCondition, animator: &Animator, input: &Keyboard) -> bool {
    match condition {
        TransitionCondition::Finished => animator.clip_finished_this_frame,
        TransitionCondition::Trigger { name } => animator.has_trigger(name),
        TransitionCondition::Bool { name, value } => {
            animator.get_bool(name).unwrap_or(false) == *value
        }
        TransitionCondition::Float { name, op, value } => {
            op.compare_f32(animator.get_float(name).unwrap_or(0.0), *value)
        }
        TransitionCondition::Int { name, op, value } => {
            op.compare_i32(animator.get_int(name).unwrap_or(0), *value)
        }
        TransitionCondition::PressedAny { keys } => pressed_any(keys, input),
        TransitionCondition::DownAny { keys } => down_any(keys, input),
        TransitionCondition::NoneDown { keys } => none_down(keys, input),
    }
}

fn legacy_holds(when: &LegacyWhen, input: &Keyboard) -> bool {
    (when.pressed_any.is_empty() || pressed_any(&when.pressed_any, input))
        && (when.down_any.is_empty() || down_any(&when.down_any, input))
        && (when.none_down.is_empty() || none_down(&when.none_down, input))
}

fn pressed_any(keys: &[String], input: &Keyboard) -> bool {
    keys.iter()
        .filter_map(|k| k.parse::<Key>().ok())
        .any(|k| input.just_pressed(k))
}

fn down_any(keys: &[String], input: &Keyboard) -> bool {
    keys.iter()
        .filter_map(|k| k.parse::<Key>().ok())
        .any(|k| input.pressed(k))
}

/// An unparsable key name fails the whole condition.
fn none_down(keys: &[String], input: &Keyboard) -> bool {
    keys.iter()
        .all(|k| k.parse::<Key>().is_ok_and(|k| !input.pressed(k)))
}
