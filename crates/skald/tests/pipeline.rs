//! Full-tick behavior through `Runtime::step`.
//!
//! Durations and deltas are binary fractions so frame boundaries are exact.

use skald::animation::{AnimatorController, ControllerTransition, TransitionCondition};
use skald::prelude::*;

fn hero_library() -> AssetLibrary {
    let mut lib = AssetLibrary::new();
    lib.insert_animation(
        AnimationClip::new("idle")
            .looping()
            .frame("idle_0", 0.5)
            .frame("idle_1", 0.5),
    );
    lib.insert_animation(
        AnimationClip::new("windup")
            .frame("windup_0", 0.125)
            .frame("windup_1", 0.125),
    );
    lib.insert_animation(
        AnimationClip::new("attack")
            .looping()
            .frame("attack_0", 0.25)
            .frame("attack_1", 0.25),
    );
    lib.insert_animation(
        AnimationClip::new("combo")
            .frame("c0", 0.125)
            .frame("c1", 0.125)
            .frame_with_events("c2", 0.125, &["swing"])
            .frame("c3", 0.125)
            .frame("c4", 0.125)
            .frame_with_events("c5", 0.125, &["hit"])
            .frame("c6", 0.125),
    );
    lib.insert_controller(
        AnimatorController::new("hero", "idle")
            .state("idle", "idle", 1.0)
            .state("attack", "attack", 1.0)
            .transition(
                ControllerTransition::new("idle", "attack")
                    .via_clip("windup")
                    .when(TransitionCondition::Trigger {
                        name: "attack".into(),
                    }),
            ),
    );
    lib
}

fn spawn_animated(runtime: &mut Runtime, animator: Animator) -> EntityId {
    let id = runtime.scene_mut().spawn("hero");
    let entity = runtime.scene_mut().get_mut(id).unwrap();
    entity.insert(animator);
    entity.insert(SpriteRenderer::default());
    id
}

fn animator(runtime: &Runtime, id: EntityId) -> &Animator {
    runtime.scene().get(id).unwrap().get::<Animator>().unwrap()
}

#[test]
fn transition_clip_chains_on_the_tick_it_finishes() {
    let mut runtime = Runtime::new(hero_library());
    let id = spawn_animated(&mut runtime, Animator::with_controller("hero"));

    runtime.step(0.125);
    assert_eq!(animator(&runtime, id).state_id.as_deref(), Some("idle"));
    assert_eq!(animator(&runtime, id).clip_id, "idle");

    runtime
        .scene_mut()
        .get_mut(id)
        .unwrap()
        .get_mut::<Animator>()
        .unwrap()
        .set_trigger("attack");

    // Controller starts the windup; the same tick plays its first frame.
    runtime.step(0.125);
    let anim = animator(&runtime, id);
    assert_eq!(anim.clip_id, "windup");
    assert_eq!(anim.pending_state_id.as_deref(), Some("attack"));
    assert_eq!(anim.next_clip_id.as_deref(), Some("attack"));
    assert!(!anim.has_trigger("attack"));
    assert_eq!(anim.frame_index, 1);

    // Windup ends: switch to the destination clip within the same tick.
    runtime.step(0.125);
    let anim = animator(&runtime, id);
    assert_eq!(anim.clip_id, "attack");
    assert_eq!(anim.frame_index, 0);
    assert_eq!(anim.time_into_frame, 0.0);
    assert_eq!(anim.clip_time_seconds, 0.0);
    assert!(anim.playing);
    assert_eq!(anim.state_id.as_deref(), Some("attack"));
    assert!(anim.pending_state_id.is_none());
    assert!(anim.clip_finished_this_frame);

    let sprite = runtime.scene().get(id).unwrap().get::<SpriteRenderer>().unwrap();
    assert_eq!(sprite.sprite_id, "attack_0");

    // The latch lasts one tick.
    runtime.step(0.0625);
    assert!(!animator(&runtime, id).clip_finished_this_frame);
}

#[test]
fn reverse_transition_clip_hands_over_to_a_forward_destination() {
    let mut lib = hero_library();
    lib.insert_animation(
        AnimationClip::new("strike")
            .frame("strike_0", 0.125)
            .frame("strike_1", 0.125)
            .frame("strike_2", 0.125),
    );
    lib.insert_controller(
        AnimatorController::new("rewinder", "idle")
            .state("idle", "idle", 1.0)
            .state("strike", "strike", 1.0)
            .transition(
                ControllerTransition::new("idle", "strike")
                    .via_clip_at("windup", -1.0)
                    .when(TransitionCondition::Trigger {
                        name: "attack".into(),
                    }),
            ),
    );
    let mut runtime = Runtime::new(lib);
    let id = spawn_animated(&mut runtime, Animator::with_controller("rewinder"));
    runtime.step(0.125);
    runtime
        .scene_mut()
        .get_mut(id)
        .unwrap()
        .get_mut::<Animator>()
        .unwrap()
        .set_trigger("attack");

    // Windup plays backward from its last frame.
    runtime.step(0.125);
    let anim = animator(&runtime, id);
    assert_eq!(anim.clip_id, "windup");
    assert_eq!(anim.speed, -1.0);
    assert_eq!(anim.frame_index, 0);

    // Handover: the destination starts on its first frame at its own speed.
    runtime.step(0.125);
    let anim = animator(&runtime, id);
    assert_eq!(anim.clip_id, "strike");
    assert_eq!(anim.state_id.as_deref(), Some("strike"));
    assert_eq!(anim.speed, 1.0);
    assert_eq!(anim.frame_index, 0);
    assert!(anim.playing);

    runtime.step(0.125);
    let anim = animator(&runtime, id);
    assert_eq!(anim.frame_index, 1);
    assert!(anim.playing);
    let sprite = runtime.scene().get(id).unwrap().get::<SpriteRenderer>().unwrap();
    assert_eq!(sprite.sprite_id, "strike_1");
}

#[test]
fn repeated_restart_does_not_replay_unplayed_notifies() {
    let mut lib = hero_library();
    lib.insert_controller(
        AnimatorController::new("brawler", "combo")
            .state("combo", "combo", 1.0)
            .transition(ControllerTransition::new("*", "combo").when(
                TransitionCondition::Trigger {
                    name: "again".into(),
                },
            )),
    );
    let mut runtime = Runtime::new(lib);
    let id = spawn_animated(&mut runtime, Animator::with_controller("brawler"));

    // Frames 1 → 2 ("swing") → 3.
    for _ in 0..3 {
        runtime.step(0.125);
    }
    assert_eq!(animator(&runtime, id).frame_index, 3);

    runtime
        .scene_mut()
        .get_mut(id)
        .unwrap()
        .get_mut::<Animator>()
        .unwrap()
        .set_trigger("again");
    runtime.step(0.0625);
    assert_eq!(animator(&runtime, id).frame_index, 0);
    assert!(runtime.events::<AnimationNotifyEvent>().is_empty());
}

#[test]
fn non_looping_clip_stops_on_last_frame() {
    let mut runtime = Runtime::new(hero_library());
    let id = spawn_animated(&mut runtime, Animator::with_clip("windup"));

    runtime.step(1.0);
    let anim = animator(&runtime, id);
    assert!(!anim.playing);
    assert_eq!(anim.frame_index, 1);
    assert_eq!(anim.time_into_frame, 0.0);
    assert_eq!(anim.clip_time_seconds, 0.25);

    runtime.step(1.0);
    assert_eq!(animator(&runtime, id).frame_index, 1);
}

#[test]
fn notifier_catches_up_over_a_long_tick() {
    let mut runtime = Runtime::new(hero_library());
    let id = spawn_animated(&mut runtime, Animator::with_clip("combo"));

    runtime.step(0.125);
    assert_eq!(animator(&runtime, id).frame_index, 1);
    assert!(runtime.events::<AnimationNotifyEvent>().is_empty());

    // Frame 1 → 6 in one tick.
    runtime.step(0.625);
    assert_eq!(animator(&runtime, id).frame_index, 6);
    let events = runtime.events::<AnimationNotifyEvent>();
    let fired: Vec<(usize, &str)> = events
        .iter()
        .map(|e| (e.frame_index, e.event_name.as_str()))
        .collect();
    assert_eq!(fired, [(2, "swing"), (5, "hit")]);
    assert!(events.iter().all(|e| e.entity == id && e.clip_id == "combo"));

    // Events are gone after the next tick.
    runtime.step(0.0);
    assert!(runtime.events::<AnimationNotifyEvent>().is_empty());
}

#[test]
fn gated_transition_is_never_guard_tested() {
    let mut lib = hero_library();
    lib.insert_controller(
        AnimatorController::new("patient", "idle")
            .state("idle", "idle", 1.0)
            .state("attack", "attack", 1.0)
            .transition(
                ControllerTransition::new("idle", "attack")
                    .min_time(1.0)
                    .when(TransitionCondition::Trigger {
                        name: "attack".into(),
                    }),
            ),
    );
    let mut runtime = Runtime::new(lib);
    let id = spawn_animated(&mut runtime, Animator::with_controller("patient"));
    runtime.step(0.25);
    runtime
        .scene_mut()
        .get_mut(id)
        .unwrap()
        .get_mut::<Animator>()
        .unwrap()
        .set_trigger("attack");

    for _ in 0..3 {
        runtime.step(0.25);
        let anim = animator(&runtime, id);
        assert_eq!(anim.state_id.as_deref(), Some("idle"));
        assert!(anim.has_trigger("attack"), "trigger consumed by a gated transition");
    }

    runtime.step(0.25);
    let anim = animator(&runtime, id);
    assert_eq!(anim.state_id.as_deref(), Some("attack"));
    assert!(!anim.has_trigger("attack"));
}

#[test]
fn keyboard_drives_input_conditions() {
    let mut lib = hero_library();
    lib.insert_controller(
        AnimatorController::new("runner", "idle")
            .state("idle", "idle", 1.0)
            .state("run", "attack", 2.0)
            .transition(ControllerTransition::new("idle", "run").when(
                TransitionCondition::DownAny {
                    keys: vec!["left".into(), "RIGHT".into()],
                },
            ))
            .transition(ControllerTransition::new("run", "idle").when(
                TransitionCondition::NoneDown {
                    keys: vec!["Left".into(), "Right".into()],
                },
            )),
    );
    let mut runtime = Runtime::new(lib);
    let id = spawn_animated(&mut runtime, Animator::with_controller("runner"));
    runtime.step(0.0625);

    runtime.keyboard_mut().press(Key::Right);
    runtime.step(0.0625);
    assert_eq!(animator(&runtime, id).state_id.as_deref(), Some("run"));
    assert_eq!(animator(&runtime, id).speed, 2.0);

    runtime.step(0.0625);
    assert_eq!(animator(&runtime, id).state_id.as_deref(), Some("run"));

    runtime.keyboard_mut().release(Key::Right);
    runtime.step(0.0625);
    assert_eq!(animator(&runtime, id).state_id.as_deref(), Some("idle"));
}

#[test]
fn physics_and_collisions_run_after_animation() {
    let mut runtime = Runtime::new(AssetLibrary::new())
        .insert_resource(PhysicsSettings { gravity: Vec2::ZERO });
    let mover = runtime.scene_mut().spawn("mover");
    {
        let e = runtime.scene_mut().get_mut(mover).unwrap();
        e.transform = Transform::from_xy(-2.0, 0.0);
        e.insert(BoxCollider2D::new(1.0, 1.0));
        e.insert(PhysicsBody2D {
            velocity: Vec2::new(4.0, 0.0),
            ..Default::default()
        });
    }
    let wall = runtime.scene_mut().spawn("wall");
    runtime
        .scene_mut()
        .get_mut(wall)
        .unwrap()
        .insert(BoxCollider2D::new(1.0, 1.0));

    runtime.step(0.25);
    assert!(runtime.events::<CollisionEvent>().is_empty());

    runtime.step(0.25);
    let events = runtime.events::<CollisionEvent>();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].phase, CollisionPhase::Enter);
}
