//! # Inspect — Text Access to Component Fields
//!
//! Tools (an inspector panel, a console, a test) read and write component
//! fields as text. The [`FieldRegistry`] is a plain table built once by the
//! caller and passed by reference to whatever needs it:
//!
//! ```text
//! FieldRegistry
//!   Transform       Position, Scale, RotationZ
//!   SpriteRenderer  SpriteId, Color, FlipX, ...
//!   Animator        ClipId, Playing, Speed, ...
//!   ...
//!        │
//!        │  each field = name + value type + get/set fn pointers
//!        ▼
//!   describe(entity)        → effective values, with override state
//!   edit(entity, "Speed", "1.5")
//!        parse first; on failure nothing changes
//!        on success write the value and set the override flag
//!   reset_to_prefab(entity, kind)
//! ```
//!
//! Values shown and edited are the *effective* ones: for a prefab instance
//! that doesn't override a kind, that's the prefab root's data. Editing such
//! a field copies the prefab value into the entity first, then applies the
//! change and marks the kind overridden.

use std::fmt::Display;

use crate::components::BodyType2D;
use crate::ecs::{ComponentKind, ComponentSet, Entity};
use crate::error::FieldError;
use crate::math::{Transform, Vec2, Vec3, Vec4};
use crate::prefab::{
    OverrideTarget, Prefab, PrefabInstance, effective_source, effective_transform, reset_to_prefab,
};

// ── Descriptors ──────────────────────────────────────────────────────────

/// Shape of a field's text form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Float,
    Int,
    UInt,
    Bool,
    Text,
    Vec2,
    Vec3,
    Vec4,
    Choice(&'static [&'static str]),
}

impl ValueType {
    /// What a valid value looks like, for error messages.
    pub fn expected(self) -> &'static str {
        match self {
            ValueType::Float => "a number",
            ValueType::Int => "an integer",
            ValueType::UInt => "a non-negative integer",
            ValueType::Bool => "true or false",
            ValueType::Text => "text",
            ValueType::Vec2 => "two numbers",
            ValueType::Vec3 => "three numbers",
            ValueType::Vec4 => "four numbers",
            ValueType::Choice(_) => "one of the listed options",
        }
    }
}

/// One editable field on a target type `T`.
pub struct FieldDescriptor<T> {
    pub name: &'static str,
    pub value_type: ValueType,
    get: fn(&T) -> Option<String>,
    set: fn(&mut T, &str) -> Result<(), FieldError>,
}

impl<T> FieldDescriptor<T> {
    pub fn get(&self, target: &T) -> Option<String> {
        (self.get)(target)
    }

    /// Parse `text` and store it. On error `target` is unchanged.
    pub fn set(&self, target: &mut T, text: &str) -> Result<(), FieldError> {
        (self.set)(target, text)
    }
}

impl<T> std::fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("value_type", &self.value_type)
            .finish()
    }
}

/// A field's current effective value.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldView {
    pub target: OverrideTarget,
    pub name: &'static str,
    pub value_type: ValueType,
    pub value: String,
    /// The entity is a prefab instance and overrides this kind.
    pub overridden: bool,
}

// ── Registry ─────────────────────────────────────────────────────────────

/// Field tables for the transform and every component kind.
#[derive(Debug)]
pub struct FieldRegistry {
    transform: Vec<FieldDescriptor<Transform>>,
    components: Vec<(ComponentKind, Vec<FieldDescriptor<ComponentSet>>)>,
}

impl Default for FieldRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldRegistry {
    /// Build the full table.
    pub fn new() -> Self {
        Self {
            transform: transform_fields(),
            components: vec![
                (ComponentKind::SpriteRenderer, sprite_renderer_fields()),
                (ComponentKind::Animator, animator_fields()),
                (ComponentKind::BoxCollider2D, box_collider_fields()),
                (ComponentKind::PhysicsBody2D, physics_body_fields()),
                (ComponentKind::Rigidbody2D, rigidbody_fields()),
                (ComponentKind::DebugRender2D, debug_render_fields()),
                (ComponentKind::PrefabInstance, prefab_instance_fields()),
            ],
        }
    }

    pub fn transform_fields(&self) -> &[FieldDescriptor<Transform>] {
        &self.transform
    }

    pub fn component_fields(&self, kind: ComponentKind) -> &[FieldDescriptor<ComponentSet>] {
        self.components
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, fields)| fields.as_slice())
            .unwrap_or(&[])
    }

    /// Effective values of every field on `entity`: transform first, then
    /// each component kind that has an effective value.
    pub fn describe(&self, entity: &Entity, prefab: Option<&Prefab>) -> Vec<FieldView> {
        let instance = entity.get::<PrefabInstance>();
        let mut out = Vec::new();

        let transform = effective_transform(entity, prefab);
        let overridden = instance.is_some_and(|i| i.overrides.transform);
        for field in &self.transform {
            if let Some(value) = field.get(&transform) {
                out.push(FieldView {
                    target: OverrideTarget::Transform,
                    name: field.name,
                    value_type: field.value_type,
                    value,
                    overridden,
                });
            }
        }

        for (kind, fields) in &self.components {
            let Some(source) = effective_source(entity, prefab, *kind) else {
                continue;
            };
            let overridden = instance.is_some_and(|i| i.overrides.get(*kind));
            for field in fields {
                if let Some(value) = field.get(source) {
                    out.push(FieldView {
                        target: OverrideTarget::Component(*kind),
                        name: field.name,
                        value_type: field.value_type,
                        value,
                        overridden,
                    });
                }
            }
        }
        out
    }

    /// Effective value of one field.
    pub fn read(
        &self,
        entity: &Entity,
        prefab: Option<&Prefab>,
        target: OverrideTarget,
        field: &str,
    ) -> Result<String, FieldError> {
        match target {
            OverrideTarget::Transform => {
                let descriptor = find(&self.transform, "Transform", field)?;
                let transform = effective_transform(entity, prefab);
                descriptor
                    .get(&transform)
                    .ok_or_else(|| unknown("Transform", field))
            }
            OverrideTarget::Component(kind) => {
                let descriptor = find(self.component_fields(kind), kind.name(), field)?;
                let source = effective_source(entity, prefab, kind)
                    .ok_or(FieldError::MissingComponent(kind))?;
                descriptor
                    .get(source)
                    .ok_or(FieldError::MissingComponent(kind))
            }
        }
    }

    /// Parse `text` into one field of `entity`.
    ///
    /// The edit starts from the effective value, so editing a field a
    /// prefab instance inherits copies the prefab's component in first. On
    /// success the matching override flag is set. On failure the entity is
    /// untouched.
    pub fn edit(
        &self,
        entity: &mut Entity,
        prefab: Option<&Prefab>,
        target: OverrideTarget,
        field: &str,
        text: &str,
    ) -> Result<(), FieldError> {
        match target {
            OverrideTarget::Transform => {
                let descriptor = find(&self.transform, "Transform", field)?;
                let mut transform = effective_transform(entity, prefab);
                descriptor.set(&mut transform, text)?;
                entity.transform = transform;
            }
            OverrideTarget::Component(kind) => {
                let descriptor = find(self.component_fields(kind), kind.name(), field)?;
                let component = effective_source(entity, prefab, kind)
                    .and_then(|source| source.cloned(kind))
                    .ok_or(FieldError::MissingComponent(kind))?;
                let mut scratch = ComponentSet::default();
                scratch.insert(component);
                descriptor.set(&mut scratch, text)?;
                if let Some(component) = scratch.remove(kind) {
                    entity.components.insert(component);
                }
            }
        }
        if let Some(instance) = entity.get_mut::<PrefabInstance>() {
            instance.overrides.set_target(target, true);
        }
        Ok(())
    }

    /// Clear an override and restore the prefab value. `false` if `entity`
    /// isn't an instance of a prefab with a root.
    pub fn reset_to_prefab(&self, entity: &mut Entity, prefab: &Prefab, target: OverrideTarget) -> bool {
        reset_to_prefab(entity, prefab, target)
    }
}

fn find<'a, T>(
    fields: &'a [FieldDescriptor<T>],
    kind: &str,
    name: &str,
) -> Result<&'a FieldDescriptor<T>, FieldError> {
    fields
        .iter()
        .find(|f| f.name.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| unknown(kind, name))
}

fn unknown(kind: &str, field: &str) -> FieldError {
    FieldError::UnknownField {
        kind: kind.to_string(),
        field: field.to_string(),
    }
}

// ── Parsing and formatting ───────────────────────────────────────────────

fn format_error(field: &str, value_type: ValueType, text: &str) -> FieldError {
    FieldError::Format {
        field: field.to_string(),
        expected: value_type.expected(),
        value: text.to_string(),
    }
}

fn parse_f32(field: &str, text: &str) -> Result<f32, FieldError> {
    text.trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format_error(field, ValueType::Float, text))
}

fn parse_i32(field: &str, text: &str) -> Result<i32, FieldError> {
    text.trim()
        .parse()
        .map_err(|_| format_error(field, ValueType::Int, text))
}

fn parse_u32(field: &str, text: &str) -> Result<u32, FieldError> {
    let trimmed = text.trim();
    let parsed = match trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => trimmed.parse(),
    };
    parsed.map_err(|_| format_error(field, ValueType::UInt, text))
}

fn parse_bool(field: &str, text: &str) -> Result<bool, FieldError> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(format_error(field, ValueType::Bool, text)),
    }
}

fn parse_text(_field: &str, text: &str) -> Result<String, FieldError> {
    Ok(text.trim().to_string())
}

/// Split "1, 2", "1 2", "(1, 2)" or "[1,2]" into exactly `N` numbers.
fn parse_floats<const N: usize>(
    field: &str,
    text: &str,
    value_type: ValueType,
) -> Result<[f32; N], FieldError> {
    let inner = text
        .trim()
        .trim_start_matches(['(', '['])
        .trim_end_matches([')', ']']);
    let parts: Vec<&str> = inner
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != N {
        return Err(format_error(field, value_type, text));
    }
    let mut out = [0.0; N];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format_error(field, value_type, text))?;
    }
    Ok(out)
}

fn parse_vec2(field: &str, text: &str) -> Result<Vec2, FieldError> {
    parse_floats::<2>(field, text, ValueType::Vec2).map(Vec2::from_array)
}

fn parse_vec3(field: &str, text: &str) -> Result<Vec3, FieldError> {
    parse_floats::<3>(field, text, ValueType::Vec3).map(Vec3::from_array)
}

fn parse_vec4(field: &str, text: &str) -> Result<Vec4, FieldError> {
    parse_floats::<4>(field, text, ValueType::Vec4).map(Vec4::from_array)
}

const BODY_TYPES: &[&str] = &["Dynamic", "Kinematic", "Static"];

fn parse_body_type(field: &str, text: &str) -> Result<BodyType2D, FieldError> {
    match text.trim().to_ascii_lowercase().as_str() {
        "dynamic" => Ok(BodyType2D::Dynamic),
        "kinematic" => Ok(BodyType2D::Kinematic),
        "static" => Ok(BodyType2D::Static),
        _ => Err(format_error(field, ValueType::Choice(BODY_TYPES), text)),
    }
}

fn show<T: Display>(value: &T) -> String {
    value.to_string()
}

fn show_vec2(v: &Vec2) -> String {
    format!("{}, {}", v.x, v.y)
}

fn show_vec3(v: &Vec3) -> String {
    format!("{}, {}, {}", v.x, v.y, v.z)
}

fn show_vec4(v: &Vec4) -> String {
    format!("{}, {}, {}, {}", v.x, v.y, v.z, v.w)
}

fn show_body_type(body: &BodyType2D) -> String {
    format!("{body:?}")
}

// ── Tables ───────────────────────────────────────────────────────────────

fn transform_fields() -> Vec<FieldDescriptor<Transform>> {
    vec![
        FieldDescriptor {
            name: "Position",
            value_type: ValueType::Vec3,
            get: |t| Some(show_vec3(&t.position)),
            set: |t, text| {
                t.position = parse_vec3("Position", text)?;
                Ok(())
            },
        },
        FieldDescriptor {
            name: "Scale",
            value_type: ValueType::Vec3,
            get: |t| Some(show_vec3(&t.scale)),
            set: |t, text| {
                t.scale = parse_vec3("Scale", text)?;
                Ok(())
            },
        },
        FieldDescriptor {
            name: "RotationZ",
            value_type: ValueType::Float,
            get: |t| Some(show(&t.rotation_z_degrees())),
            set: |t, text| {
                let degrees = parse_f32("RotationZ", text)?;
                t.set_rotation_z_degrees(degrees);
                Ok(())
            },
        },
    ]
}

/// One component field: slot in the set, kind, name, type, struct field,
/// parser, formatter.
macro_rules! field {
    ($slot:ident, $kind:ident, $name:literal, $ty:ident $(($arg:expr))?, $field:ident, $parse:ident, $show:ident) => {
        FieldDescriptor {
            name: $name,
            value_type: ValueType::$ty $(($arg))?,
            get: |set| set.$slot.as_ref().map(|c| $show(&c.$field)),
            set: |set, text| {
                let value = $parse($name, text)?;
                let component = set
                    .$slot
                    .as_mut()
                    .ok_or(FieldError::MissingComponent(ComponentKind::$kind))?;
                component.$field = value;
                Ok(())
            },
        }
    };
}

fn sprite_renderer_fields() -> Vec<FieldDescriptor<ComponentSet>> {
    vec![
        field!(sprite_renderer, SpriteRenderer, "SpriteId", Text, sprite_id, parse_text, show),
        field!(sprite_renderer, SpriteRenderer, "Color", Vec4, color, parse_vec4, show_vec4),
        field!(sprite_renderer, SpriteRenderer, "FlipX", Bool, flip_x, parse_bool, show),
        field!(sprite_renderer, SpriteRenderer, "FlipY", Bool, flip_y, parse_bool, show),
        field!(sprite_renderer, SpriteRenderer, "SortingLayer", Int, sorting_layer, parse_i32, show),
        field!(sprite_renderer, SpriteRenderer, "OrderInLayer", Int, order_in_layer, parse_i32, show),
        field!(sprite_renderer, SpriteRenderer, "Visible", Bool, visible, parse_bool, show),
    ]
}

fn animator_fields() -> Vec<FieldDescriptor<ComponentSet>> {
    vec![
        field!(animator, Animator, "ClipId", Text, clip_id, parse_text, show),
        field!(animator, Animator, "Playing", Bool, playing, parse_bool, show),
        field!(animator, Animator, "LoopOverride", Bool, loop_override, parse_bool, show),
        field!(animator, Animator, "Loop", Bool, looping, parse_bool, show),
        field!(animator, Animator, "Speed", Float, speed, parse_f32, show),
        field!(animator, Animator, "ControllerId", Text, controller_id, parse_text, show),
        field!(animator, Animator, "CrossfadeSeconds", Float, crossfade_seconds, parse_f32, show),
        field!(animator, Animator, "CrossfadeFreeze", Bool, crossfade_freeze, parse_bool, show),
    ]
}

fn box_collider_fields() -> Vec<FieldDescriptor<ComponentSet>> {
    vec![
        field!(box_collider, BoxCollider2D, "Size", Vec2, size, parse_vec2, show_vec2),
        field!(box_collider, BoxCollider2D, "Offset", Vec2, offset, parse_vec2, show_vec2),
        field!(box_collider, BoxCollider2D, "IsTrigger", Bool, is_trigger, parse_bool, show),
        field!(box_collider, BoxCollider2D, "Layer", UInt, layer, parse_u32, show),
        field!(box_collider, BoxCollider2D, "Mask", UInt, mask, parse_u32, show),
    ]
}

fn physics_body_fields() -> Vec<FieldDescriptor<ComponentSet>> {
    vec![
        field!(physics_body, PhysicsBody2D, "Velocity", Vec2, velocity, parse_vec2, show_vec2),
        field!(physics_body, PhysicsBody2D, "Acceleration", Vec2, acceleration, parse_vec2, show_vec2),
        field!(physics_body, PhysicsBody2D, "MaxSpeed", Float, max_speed, parse_f32, show),
        field!(physics_body, PhysicsBody2D, "IsStatic", Bool, is_static, parse_bool, show),
    ]
}

fn rigidbody_fields() -> Vec<FieldDescriptor<ComponentSet>> {
    vec![
        field!(rigidbody, Rigidbody2D, "BodyType", Choice(BODY_TYPES), body_type, parse_body_type, show_body_type),
        field!(rigidbody, Rigidbody2D, "Mass", Float, mass, parse_f32, show),
        field!(rigidbody, Rigidbody2D, "GravityScale", Float, gravity_scale, parse_f32, show),
        field!(rigidbody, Rigidbody2D, "LinearDrag", Float, linear_drag, parse_f32, show),
        field!(rigidbody, Rigidbody2D, "AngularVelocity", Float, angular_velocity, parse_f32, show),
        field!(rigidbody, Rigidbody2D, "Velocity", Vec2, velocity, parse_vec2, show_vec2),
        field!(rigidbody, Rigidbody2D, "FixedRotation", Bool, fixed_rotation, parse_bool, show),
    ]
}

fn debug_render_fields() -> Vec<FieldDescriptor<ComponentSet>> {
    vec![
        field!(debug_render, DebugRender2D, "Color", Vec4, color, parse_vec4, show_vec4),
        field!(debug_render, DebugRender2D, "ShowCollider", Bool, show_collider, parse_bool, show),
        field!(debug_render, DebugRender2D, "ShowVelocity", Bool, show_velocity, parse_bool, show),
        field!(debug_render, DebugRender2D, "ShowName", Bool, show_name, parse_bool, show),
        field!(debug_render, DebugRender2D, "LineWidth", Float, line_width, parse_f32, show),
    ]
}

fn prefab_instance_fields() -> Vec<FieldDescriptor<ComponentSet>> {
    vec![
        field!(prefab_instance, PrefabInstance, "PrefabId", Text, prefab_id, parse_text, show),
        field!(prefab_instance, PrefabInstance, "UsePrefabTransform", Bool, use_prefab_transform, parse_bool, show),
    ]
}
