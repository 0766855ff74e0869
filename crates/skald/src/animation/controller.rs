//! Animator controllers: named states and guarded transitions.
//!
//! A controller is an immutable asset describing which clip an animator
//! should play and when to switch. Each state maps to a clip and a speed;
//! each transition moves from a state (or from anywhere, `"*"`) to another
//! state when its gates and guard pass.
//!
//! ```text
//!            Trigger "jump"
//!   idle ───────────────────▶ jump ──┐ Finished
//!    ▲  │                            │
//!    │  │ DownAny [Left, Right]      ▼
//!    │  └──────────────────▶ run    fall
//!    │   NoneDown [Left, Right] │    │
//!    └──────────────────────────┘    │
//!    └───────────────────────────────┘ (via "land" transition clip)
//! ```
//!
//! ## JSON shape
//!
//! ```json
//! {
//!   "Id": "hero",
//!   "InitialState": "idle",
//!   "States": { "idle": { "Clip": "hero_idle", "Speed": 1.0 } },
//!   "Transitions": [
//!     { "From": "*", "To": "hurt", "Priority": 10,
//!       "Conditions": [ { "Type": "Trigger", "Name": "hit" } ] }
//!   ]
//! }
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// Matches any current state in [`ControllerTransition::from`].
pub const ANY_STATE: &str = "*";

/// Tolerance for float `Eq`/`Ne` comparisons.
const FLOAT_EQ_EPSILON: f32 = 1e-5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ControllerState {
    #[serde(rename = "Clip")]
    pub clip_id: String,
    #[serde(default = "one")]
    pub speed: f32,
}

fn one() -> f32 {
    1.0
}

/// Comparison used by numeric parameter conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    #[serde(alias = "==", alias = "=")]
    Eq,
    #[serde(alias = "!=")]
    Ne,
    #[serde(alias = ">")]
    Gt,
    #[serde(alias = ">=")]
    Ge,
    #[serde(alias = "<")]
    Lt,
    #[serde(alias = "<=")]
    Le,
}

impl CompareOp {
    pub fn compare_f32(self, lhs: f32, rhs: f32) -> bool {
        match self {
            CompareOp::Eq => (lhs - rhs).abs() <= FLOAT_EQ_EPSILON,
            CompareOp::Ne => (lhs - rhs).abs() > FLOAT_EQ_EPSILON,
            CompareOp::Gt => lhs > rhs,
            CompareOp::Ge => lhs >= rhs,
            CompareOp::Lt => lhs < rhs,
            CompareOp::Le => lhs <= rhs,
        }
    }

    pub fn compare_i32(self, lhs: i32, rhs: i32) -> bool {
        match self {
            CompareOp::Eq => lhs == rhs,
            CompareOp::Ne => lhs != rhs,
            CompareOp::Gt => lhs > rhs,
            CompareOp::Ge => lhs >= rhs,
            CompareOp::Lt => lhs < rhs,
            CompareOp::Le => lhs <= rhs,
        }
    }
}

/// One clause of a structured guard. All clauses must hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "Type", rename_all_fields = "PascalCase")]
pub enum TransitionCondition {
    /// The current clip finished on the previous animation pass.
    Finished,
    /// A one-shot trigger is set. Consumed when the transition fires.
    Trigger { name: String },
    Bool { name: String, value: bool },
    Float { name: String, op: CompareOp, value: f32 },
    Int { name: String, op: CompareOp, value: i32 },
    /// Any of the keys was pressed this tick.
    PressedAny { keys: Vec<String> },
    /// Any of the keys is held.
    DownAny { keys: Vec<String> },
    /// None of the keys is held.
    NoneDown { keys: Vec<String> },
}

/// Input-only guard shorthand from older controller files. Each non-empty
/// list must hold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LegacyWhen {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pressed_any: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub down_any: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub none_down: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ControllerTransition {
    pub from: String,
    pub to: String,
    /// Clip played once before switching to the destination's clip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_clip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_speed: Option<f32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<TransitionCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<LegacyWhen>,
    #[serde(default)]
    pub priority: i32,
    /// Seconds the current state must have run before this can fire.
    #[serde(default)]
    pub min_time_in_state: f32,
    /// Normalized clip time (0..1) the current clip must have reached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_time: Option<f32>,
    /// Allowed to fire while a transition clip is still playing.
    #[serde(default)]
    pub can_interrupt: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crossfade_seconds: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crossfade_freeze: Option<bool>,
}

impl ControllerTransition {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            transition_clip: None,
            transition_speed: None,
            conditions: Vec::new(),
            when: None,
            priority: 0,
            min_time_in_state: 0.0,
            exit_time: None,
            can_interrupt: false,
            crossfade_seconds: None,
            crossfade_freeze: None,
        }
    }

    pub fn when(mut self, condition: TransitionCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn via_clip(mut self, clip_id: impl Into<String>) -> Self {
        self.transition_clip = Some(clip_id.into());
        self
    }

    /// Speed of the transition clip. Negative plays it backward.
    pub fn via_clip_at(mut self, clip_id: impl Into<String>, speed: f32) -> Self {
        self.transition_clip = Some(clip_id.into());
        self.transition_speed = Some(speed);
        self
    }

    pub fn min_time(mut self, seconds: f32) -> Self {
        self.min_time_in_state = seconds;
        self
    }

    pub fn exit_time(mut self, normalized: f32) -> Self {
        self.exit_time = Some(normalized);
        self
    }

    pub fn interruptible(mut self) -> Self {
        self.can_interrupt = true;
        self
    }

    pub fn crossfade(mut self, seconds: f32, freeze: bool) -> Self {
        self.crossfade_seconds = Some(seconds);
        self.crossfade_freeze = Some(freeze);
        self
    }

    /// Whether this transition applies while in `state`.
    pub fn matches_from(&self, state: &str) -> bool {
        self.from == ANY_STATE || self.from == state
    }

    /// Every trigger name referenced by the structured conditions.
    pub fn trigger_names(&self) -> impl Iterator<Item = &str> {
        self.conditions.iter().filter_map(|c| match c {
            TransitionCondition::Trigger { name } => Some(name.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AnimatorController {
    pub id: String,
    pub initial_state: String,
    #[serde(default)]
    pub states: HashMap<String, ControllerState>,
    #[serde(default)]
    pub transitions: Vec<ControllerTransition>,
}

impl AnimatorController {
    pub fn new(id: impl Into<String>, initial_state: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            initial_state: initial_state.into(),
            states: HashMap::new(),
            transitions: Vec::new(),
        }
    }

    /// Builder: add a state.
    pub fn state(mut self, name: impl Into<String>, clip_id: impl Into<String>, speed: f32) -> Self {
        self.states.insert(
            name.into(),
            ControllerState {
                clip_id: clip_id.into(),
                speed,
            },
        );
        self
    }

    /// Builder: append a transition (authoring order matters for ties).
    pub fn transition(mut self, transition: ControllerTransition) -> Self {
        self.transitions.push(transition);
        self
    }

    pub fn get_state(&self, name: &str) -> Option<&ControllerState> {
        self.states.get(name)
    }

    /// Parse a controller from JSON, checking that the initial state and
    /// every transition destination exist.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let controller: AnimatorController = serde_json::from_str(json)?;
        controller.validate()?;
        Ok(controller)
    }

    pub fn validate(&self) -> Result<(), LoadError> {
        let invalid = |reason: String| LoadError::InvalidAsset {
            asset: self.id.clone(),
            reason,
        };
        if self.states.is_empty() {
            return Ok(());
        }
        if !self.states.contains_key(&self.initial_state) {
            return Err(invalid(format!(
                "initial state '{}' is not defined",
                self.initial_state
            )));
        }
        if let Some(t) = self.transitions.iter().find(|t| !self.states.contains_key(&t.to)) {
            return Err(invalid(format!(
                "transition {} -> {} targets an undefined state",
                t.from, t.to
            )));
        }
        Ok(())
    }
}
