//! The [`Animator`] component: playback cursor, controller state, and
//! parameters for one entity.
//!
//! ## Who writes what
//!
//! Several one-shot fields are set by one system and cleared by another. The
//! ownership is fixed:
//!
//! | Field                         | Set by                         | Cleared by                        |
//! |-------------------------------|--------------------------------|-----------------------------------|
//! | `reset_requested`             | controller / [`Animator::play_clip`] | animation system (same tick)  |
//! | `clip_finished_this_frame`    | animation system               | animation system, next tick       |
//! | `pending_crossfade_*`         | controller (on a match)        | animation system (clip switch)    |
//! | `pending_state_id`/`next_clip_id`/`next_clip_speed` | controller (transition clip) | animation system (chain) or controller (direct switch) |
//! | `cursor_restarted`            | animation system (rewind)      | notifier (same tick)              |
//! | triggers                      | gameplay code                  | controller (when a transition uses them) |
//!
//! Because the controller runs before the animation system, a clip that
//! finishes on tick N is visible to `Finished` conditions on tick N+1 and
//! gone on tick N+2.
//!
//! Only the authoring fields are serialized. Everything else is runtime state
//! and starts fresh on load.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Float parameter multiplying the active state's speed.
pub const SPEED_MUL_PARAM: &str = "speedMul";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Animator {
    // ── Authoring ────────────────────────────────────────────────────
    pub clip_id: String,
    pub playing: bool,
    /// Use `looping` instead of the clip's own loop flag.
    pub loop_override: bool,
    #[serde(rename = "Loop")]
    pub looping: bool,
    /// Signed playback speed. Negative plays backward.
    pub speed: f32,
    pub controller_id: String,
    /// Default crossfade length on clip switches.
    pub crossfade_seconds: f32,
    /// Hold the cursor while a crossfade runs.
    pub crossfade_freeze: bool,

    // ── Playback cursor ──────────────────────────────────────────────
    #[serde(skip)]
    pub frame_index: usize,
    #[serde(skip)]
    pub time_into_frame: f32,
    #[serde(skip)]
    pub clip_time_seconds: f32,
    /// Clip to switch to when the current (transition) clip finishes.
    #[serde(skip)]
    pub next_clip_id: Option<String>,
    /// Speed to play `next_clip_id` at, staged with it.
    #[serde(skip)]
    pub next_clip_speed: Option<f32>,
    #[serde(skip)]
    pub reset_requested: bool,
    /// Set by the animation system when it rewinds the cursor, cleared by
    /// the notifier.
    #[serde(skip)]
    pub cursor_restarted: bool,

    // ── Controller ───────────────────────────────────────────────────
    #[serde(skip)]
    pub state_id: Option<String>,
    /// Destination state while a transition clip plays.
    #[serde(skip)]
    pub pending_state_id: Option<String>,
    #[serde(skip)]
    pub state_time_seconds: f32,

    // ── Parameters (keys stored lowercase) ───────────────────────────
    #[serde(skip)]
    floats: HashMap<String, f32>,
    #[serde(skip)]
    bools: HashMap<String, bool>,
    #[serde(skip)]
    ints: HashMap<String, i32>,
    #[serde(skip)]
    triggers: HashSet<String>,

    // ── Crossfade ────────────────────────────────────────────────────
    #[serde(skip)]
    pub pending_crossfade_seconds: Option<f32>,
    #[serde(skip)]
    pub pending_crossfade_freeze: Option<bool>,
    /// Remaining seconds the cursor is pinned by a freezing crossfade.
    #[serde(skip)]
    pub crossfade_hold_seconds: f32,

    // ── Observation ──────────────────────────────────────────────────
    /// Clip processed by the animation system last tick.
    #[serde(skip)]
    pub last_clip_id: Option<String>,
    /// Clip and frame the notifier last fired for.
    #[serde(skip)]
    pub notify_clip_id: Option<String>,
    #[serde(skip)]
    pub notify_frame: Option<usize>,
    #[serde(skip)]
    pub clip_finished_this_frame: bool,
}

impl Default for Animator {
    fn default() -> Self {
        Self {
            clip_id: String::new(),
            playing: true,
            loop_override: false,
            looping: false,
            speed: 1.0,
            controller_id: String::new(),
            crossfade_seconds: 0.0,
            crossfade_freeze: false,
            frame_index: 0,
            time_into_frame: 0.0,
            clip_time_seconds: 0.0,
            next_clip_id: None,
            next_clip_speed: None,
            reset_requested: false,
            cursor_restarted: false,
            state_id: None,
            pending_state_id: None,
            state_time_seconds: 0.0,
            floats: HashMap::new(),
            bools: HashMap::new(),
            ints: HashMap::new(),
            triggers: HashSet::new(),
            pending_crossfade_seconds: None,
            pending_crossfade_freeze: None,
            crossfade_hold_seconds: 0.0,
            last_clip_id: None,
            notify_clip_id: None,
            notify_frame: None,
            clip_finished_this_frame: false,
        }
    }
}

fn key(name: &str) -> String {
    name.to_lowercase()
}

impl Animator {
    /// Animator playing `clip_id` directly, no controller.
    pub fn with_clip(clip_id: impl Into<String>) -> Self {
        Self {
            clip_id: clip_id.into(),
            ..Default::default()
        }
    }

    /// Animator driven by a controller. The controller assigns the clip on
    /// the first tick.
    pub fn with_controller(controller_id: impl Into<String>) -> Self {
        Self {
            controller_id: controller_id.into(),
            ..Default::default()
        }
    }

    /// Builder: default crossfade.
    pub fn crossfade(mut self, seconds: f32, freeze: bool) -> Self {
        self.crossfade_seconds = seconds;
        self.crossfade_freeze = freeze;
        self
    }

    /// Copy of the authored fields only, with runtime state at defaults.
    pub fn authoring(&self) -> Self {
        Self {
            clip_id: self.clip_id.clone(),
            playing: self.playing,
            loop_override: self.loop_override,
            looping: self.looping,
            speed: self.speed,
            controller_id: self.controller_id.clone(),
            crossfade_seconds: self.crossfade_seconds,
            crossfade_freeze: self.crossfade_freeze,
            ..Self::default()
        }
    }

    /// Switch to `clip_id` at `speed` and restart from the beginning on the
    /// next animation pass.
    pub fn play_clip(&mut self, clip_id: &str, speed: f32) {
        if self.clip_id != clip_id {
            self.clip_id = clip_id.to_string();
        }
        self.speed = speed;
        self.playing = true;
        self.reset_requested = true;
    }

    /// Loop flag after applying the override.
    pub fn effective_loop(&self, clip_loop: bool) -> bool {
        if self.loop_override {
            self.looping
        } else {
            clip_loop
        }
    }

    /// Controller speed multiplier (`speedMul`, default 1).
    pub fn speed_mul(&self) -> f32 {
        self.get_float(SPEED_MUL_PARAM).unwrap_or(1.0)
    }

    // ── Parameters ───────────────────────────────────────────────────

    pub fn set_float(&mut self, name: &str, value: f32) {
        self.floats.insert(key(name), value);
    }

    pub fn get_float(&self, name: &str) -> Option<f32> {
        self.floats.get(&key(name)).copied()
    }

    pub fn set_bool(&mut self, name: &str, value: bool) {
        self.bools.insert(key(name), value);
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.bools.get(&key(name)).copied()
    }

    pub fn set_int(&mut self, name: &str, value: i32) {
        self.ints.insert(key(name), value);
    }

    pub fn get_int(&self, name: &str) -> Option<i32> {
        self.ints.get(&key(name)).copied()
    }

    /// Raise a one-shot trigger. It stays set until a transition that
    /// references it fires.
    pub fn set_trigger(&mut self, name: &str) {
        self.triggers.insert(key(name));
    }

    pub fn has_trigger(&self, name: &str) -> bool {
        self.triggers.contains(&key(name))
    }

    /// Clear a trigger, returning whether it was set.
    pub fn consume_trigger(&mut self, name: &str) -> bool {
        self.triggers.remove(&key(name))
    }

    pub fn reset_triggers(&mut self) {
        self.triggers.clear();
    }
}
