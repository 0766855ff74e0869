//! # Components — Visual Data
//!
//! Plain records attached to entities. No behavior beyond small helpers;
//! systems do the work.
//!
//! - [`SpriteRenderer`]: which sprite to draw, tint, flip, sorting, plus the
//!   runtime crossfade the animation system drives.
//! - [`DebugRender2D`]: debug overlay switches.
//!
//! The physics components live in [`crate::physics2d`] and are re-exported
//! here so every component kind is reachable from one module.
//!
//! ## Crossfade
//!
//! When the animation system swaps the sprite on a clip change it can start a
//! [`Crossfade`]: the renderer keeps the outgoing sprite id and blends from it
//! to the current one over `duration` seconds.
//!
//! ```text
//! weight 0.0 ───────────────▶ 1.0
//!        from_sprite_id        sprite_id
//! ```

use serde::{Deserialize, Serialize};

use crate::math::Vec4;

pub use crate::physics2d::{BodyType2D, BoxCollider2D, PhysicsBody2D, Rigidbody2D};

/// Draws one sprite from the asset provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SpriteRenderer {
    pub sprite_id: String,
    /// RGBA tint multiplier.
    pub color: Vec4,
    pub flip_x: bool,
    pub flip_y: bool,
    pub sorting_layer: i32,
    pub order_in_layer: i32,
    pub visible: bool,
    /// Active blend from a previous sprite. Runtime only.
    #[serde(skip)]
    pub crossfade: Option<Crossfade>,
}

/// An in-progress blend between two sprites.
#[derive(Debug, Clone, PartialEq)]
pub struct Crossfade {
    pub from_sprite_id: String,
    pub duration: f32,
    pub elapsed: f32,
}

impl SpriteRenderer {
    pub fn new(sprite_id: impl Into<String>) -> Self {
        Self {
            sprite_id: sprite_id.into(),
            ..Default::default()
        }
    }

    /// Builder: tint.
    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color;
        self
    }

    /// Start blending from `from_sprite_id` to the current sprite.
    pub fn begin_crossfade(&mut self, from_sprite_id: impl Into<String>, duration: f32) {
        self.crossfade = Some(Crossfade {
            from_sprite_id: from_sprite_id.into(),
            duration,
            elapsed: 0.0,
        });
    }

    /// Advance the active blend, dropping it once complete.
    pub fn advance_crossfade(&mut self, dt: f32) {
        if let Some(fade) = &mut self.crossfade {
            fade.elapsed += dt.max(0.0);
            if fade.elapsed >= fade.duration {
                self.crossfade = None;
            }
        }
    }

    /// Blend weight toward the current sprite: 0 at the start of a fade, 1
    /// when no fade is active.
    pub fn crossfade_weight(&self) -> f32 {
        match &self.crossfade {
            Some(fade) if fade.duration > 0.0 => (fade.elapsed / fade.duration).clamp(0.0, 1.0),
            _ => 1.0,
        }
    }
}

impl Default for SpriteRenderer {
    fn default() -> Self {
        Self {
            sprite_id: String::new(),
            color: Vec4::ONE,
            flip_x: false,
            flip_y: false,
            sorting_layer: 0,
            order_in_layer: 0,
            visible: true,
            crossfade: None,
        }
    }
}

/// Debug overlay switches for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DebugRender2D {
    pub color: Vec4,
    pub show_collider: bool,
    pub show_velocity: bool,
    pub show_name: bool,
    pub line_width: f32,
}

impl Default for DebugRender2D {
    fn default() -> Self {
        Self {
            color: Vec4::new(0.0, 1.0, 0.0, 1.0),
            show_collider: true,
            show_velocity: false,
            show_name: false,
            line_width: 1.0,
        }
    }
}
