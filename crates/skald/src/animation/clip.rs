//! Animation clips: ordered, timed sprite frames.
//!
//! A clip is an immutable asset. It is loaded once and shared as an
//! `Arc<AnimationClip>` by every animator that plays it.
//!
//! ```text
//! walk (loop)
//! ┌──────────┬──────────┬──────────┐
//! │ walk_0   │ walk_1   │ walk_2   │
//! │ 0.10 s   │ 0.10 s   │ 0.12 s   │
//! │          │ ["step"] │          │
//! └──────────┴──────────┴──────────┘
//! length = 0.32 s
//! ```
//!
//! Frame durations below [`MIN_FRAME_DURATION`] are treated as that floor so
//! playback always makes progress and clip length is never zero for a
//! non-empty clip.

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// Floor applied to every frame duration.
pub const MIN_FRAME_DURATION: f32 = 1e-4;

/// One frame of a clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AnimationFrame {
    #[serde(rename = "Sprite")]
    pub sprite_id: String,
    /// Seconds this frame is shown at speed 1.
    pub duration: f32,
    /// Notify event names fired when playback reaches this frame.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<String>,
}

impl AnimationFrame {
    pub fn new(sprite_id: impl Into<String>, duration: f32) -> Self {
        Self {
            sprite_id: sprite_id.into(),
            duration,
            events: Vec::new(),
        }
    }

    /// Builder: attach a notify event.
    pub fn with_event(mut self, name: impl Into<String>) -> Self {
        self.events.push(name.into());
        self
    }

    /// Duration with the floor applied.
    pub fn effective_duration(&self) -> f32 {
        if self.duration.is_finite() {
            self.duration.max(MIN_FRAME_DURATION)
        } else {
            MIN_FRAME_DURATION
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AnimationClip {
    pub id: String,
    #[serde(rename = "Loop", default)]
    pub looping: bool,
    #[serde(default)]
    pub frames: Vec<AnimationFrame>,
}

impl AnimationClip {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            looping: false,
            frames: Vec::new(),
        }
    }

    /// Builder: enable looping.
    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    /// Builder: append a frame.
    pub fn frame(mut self, sprite_id: impl Into<String>, duration: f32) -> Self {
        self.frames.push(AnimationFrame::new(sprite_id, duration));
        self
    }

    /// Builder: append a frame that fires notify events.
    pub fn frame_with_events(
        mut self,
        sprite_id: impl Into<String>,
        duration: f32,
        events: &[&str],
    ) -> Self {
        let mut frame = AnimationFrame::new(sprite_id, duration);
        frame.events = events.iter().map(|e| e.to_string()).collect();
        self.frames.push(frame);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Total length in seconds: the sum of floored frame durations.
    pub fn length(&self) -> f32 {
        self.frames.iter().map(AnimationFrame::effective_duration).sum()
    }

    /// Frame at `index`, clamped into range. `None` only for an empty clip.
    pub fn frame_clamped(&self, index: usize) -> Option<&AnimationFrame> {
        let last = self.frames.len().checked_sub(1)?;
        self.frames.get(index.min(last))
    }

    /// Parse a clip from JSON.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let clip: AnimationClip = serde_json::from_str(json)?;
        if clip.id.trim().is_empty() {
            return Err(LoadError::InvalidAsset {
                asset: "AnimationClip".into(),
                reason: "clip id is empty".into(),
            });
        }
        Ok(clip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_sums_floored_durations() {
        let clip = AnimationClip::new("blink")
            .frame("open", 0.5)
            .frame("shut", 0.0)
            .frame("open", -1.0);
        assert!((clip.length() - (0.5 + 2.0 * MIN_FRAME_DURATION)).abs() < 1e-6);
    }

    #[test]
    fn frame_clamped_stays_in_range() {
        let clip = AnimationClip::new("a").frame("x", 0.1).frame("y", 0.1);
        assert_eq!(clip.frame_clamped(7).unwrap().sprite_id, "y");
        assert!(AnimationClip::new("empty").frame_clamped(0).is_none());
    }

    #[test]
    fn parses_json_shape() {
        let clip = AnimationClip::from_json(
            r#"{
                "Id": "attack",
                "Loop": false,
                "Frames": [
                    { "Sprite": "atk_0", "Duration": 0.05 },
                    { "Sprite": "atk_1", "Duration": 0.05, "Events": ["hit", "sfx_swing"] }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(clip.id, "attack");
        assert!(!clip.looping);
        assert_eq!(clip.frames[1].events, ["hit", "sfx_swing"]);
    }

    #[test]
    fn empty_id_is_rejected() {
        let err = AnimationClip::from_json(r#"{ "Id": " ", "Frames": [] }"#).unwrap_err();
        assert!(matches!(err, LoadError::InvalidAsset { .. }));
    }
}
