//! Hello Animation: a controller-driven hero, run headless for two seconds.
//!
//! Run with `RUST_LOG=debug` to see state changes and clip chaining.

use skald::prelude::*;

const CLIPS: &[&str] = &[
    r#"{ "Id": "hero_idle", "Loop": true, "Frames": [
        { "Sprite": "hero_idle_0", "Duration": 0.4 },
        { "Sprite": "hero_idle_1", "Duration": 0.4 } ] }"#,
    r#"{ "Id": "hero_run", "Loop": true, "Frames": [
        { "Sprite": "hero_run_0", "Duration": 0.1, "Events": ["footstep"] },
        { "Sprite": "hero_run_1", "Duration": 0.1 },
        { "Sprite": "hero_run_2", "Duration": 0.1, "Events": ["footstep"] },
        { "Sprite": "hero_run_3", "Duration": 0.1 } ] }"#,
    r#"{ "Id": "hero_skid", "Frames": [
        { "Sprite": "hero_skid_0", "Duration": 0.08, "Events": ["dust"] },
        { "Sprite": "hero_skid_1", "Duration": 0.08 } ] }"#,
];

const CONTROLLER: &str = r#"{
    "Id": "hero",
    "InitialState": "idle",
    "States": {
        "idle": { "Clip": "hero_idle" },
        "run":  { "Clip": "hero_run", "Speed": 1.25 }
    },
    "Transitions": [
        { "From": "idle", "To": "run", "When": { "DownAny": ["Left", "Right"] },
          "CrossfadeSeconds": 0.05 },
        { "From": "run", "To": "idle", "TransitionClip": "hero_skid",
          "Conditions": [ { "Type": "NoneDown", "Keys": ["Left", "Right"] } ] }
    ]
}"#;

fn main() {
    env_logger::init();

    let mut library = AssetLibrary::new();
    for clip in CLIPS {
        if let Err(e) = library.load_animation_json(clip) {
            log::error!("bad clip: {e}");
            return;
        }
    }
    if let Err(e) = library.load_controller_json(CONTROLLER) {
        log::error!("bad controller: {e}");
        return;
    }

    let mut runtime = Runtime::new(library);
    let hero = runtime.scene_mut().spawn("hero");
    if let Some(entity) = runtime.scene_mut().get_mut(hero) {
        entity.insert(Animator::with_controller("hero").crossfade(0.1, false));
        entity.insert(SpriteRenderer::default());
    }

    let dt = 1.0 / 60.0;
    let mut last_state = None;
    for tick in 0..120 {
        // Hold Right for half a second, then let go.
        match tick {
            20 => runtime.keyboard_mut().press(Key::Right),
            50 => runtime.keyboard_mut().release(Key::Right),
            _ => {}
        }
        runtime.step(dt);

        for event in runtime.events::<AnimationNotifyEvent>() {
            println!(
                "[{:>5.2}s] {} {}:{} → {}",
                runtime.time().elapsed_secs(),
                event.entity_name,
                event.clip_id,
                event.frame_index,
                event.event_name
            );
        }

        let Some(entity) = runtime.scene().get(hero) else {
            break;
        };
        let (Some(anim), Some(sprite)) = (entity.get::<Animator>(), entity.get::<SpriteRenderer>())
        else {
            continue;
        };
        if anim.state_id != last_state {
            println!(
                "[{:>5.2}s] state {:?} clip '{}' sprite '{}'",
                runtime.time().elapsed_secs(),
                anim.state_id,
                anim.clip_id,
                sprite.sprite_id
            );
            last_state = anim.state_id.clone();
        }
    }

    #[cfg(feature = "diagnostics")]
    for timing in runtime.systems.timings() {
        println!("{:<28} {:>8.1} µs", timing.name, timing.duration_us);
    }
}
