//! # Component — A Closed Set of Plain Records
//!
//! Every component kind the runtime knows about is listed in
//! [`ComponentKind`]. There is no open registration and no runtime type
//! reflection: systems and tools dispatch with a `match`.
//!
//! ## Storage
//!
//! [`ComponentSet`] holds one `Option` slot per kind. Adding a kind that is
//! already present replaces it. Because the slots are plain fields, a system
//! can borrow two different kinds mutably at once by destructuring:
//!
//! ```ignore
//! let ComponentSet { animator, sprite_renderer, .. } = &mut entity.components;
//! ```
//!
//! Generic code goes through the [`ComponentData`] trait (`set.get::<T>()`)
//! or the [`Component`] tagged union when the kind is only known at runtime.

use std::fmt;

use crate::animation::Animator;
use crate::components::{DebugRender2D, SpriteRenderer};
use crate::physics2d::{BoxCollider2D, PhysicsBody2D, Rigidbody2D};
use crate::prefab::PrefabInstance;

/// Every component kind an entity can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKind {
    SpriteRenderer,
    Animator,
    BoxCollider2D,
    PhysicsBody2D,
    Rigidbody2D,
    DebugRender2D,
    PrefabInstance,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 7] = [
        ComponentKind::SpriteRenderer,
        ComponentKind::Animator,
        ComponentKind::BoxCollider2D,
        ComponentKind::PhysicsBody2D,
        ComponentKind::Rigidbody2D,
        ComponentKind::DebugRender2D,
        ComponentKind::PrefabInstance,
    ];

    /// Kinds that a prefab instance can inherit from its template.
    pub const MERGEABLE: [ComponentKind; 6] = [
        ComponentKind::SpriteRenderer,
        ComponentKind::Animator,
        ComponentKind::BoxCollider2D,
        ComponentKind::PhysicsBody2D,
        ComponentKind::Rigidbody2D,
        ComponentKind::DebugRender2D,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ComponentKind::SpriteRenderer => "SpriteRenderer",
            ComponentKind::Animator => "Animator",
            ComponentKind::BoxCollider2D => "BoxCollider2D",
            ComponentKind::PhysicsBody2D => "PhysicsBody2D",
            ComponentKind::Rigidbody2D => "Rigidbody2D",
            ComponentKind::DebugRender2D => "DebugRender2D",
            ComponentKind::PrefabInstance => "PrefabInstance",
        }
    }

    /// Case-insensitive lookup by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn is_mergeable(self) -> bool {
        self != ComponentKind::PrefabInstance
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One component value of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    SpriteRenderer(SpriteRenderer),
    Animator(Animator),
    BoxCollider2D(BoxCollider2D),
    PhysicsBody2D(PhysicsBody2D),
    Rigidbody2D(Rigidbody2D),
    DebugRender2D(DebugRender2D),
    PrefabInstance(PrefabInstance),
}

impl Component {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::SpriteRenderer(_) => ComponentKind::SpriteRenderer,
            Component::Animator(_) => ComponentKind::Animator,
            Component::BoxCollider2D(_) => ComponentKind::BoxCollider2D,
            Component::PhysicsBody2D(_) => ComponentKind::PhysicsBody2D,
            Component::Rigidbody2D(_) => ComponentKind::Rigidbody2D,
            Component::DebugRender2D(_) => ComponentKind::DebugRender2D,
            Component::PrefabInstance(_) => ComponentKind::PrefabInstance,
        }
    }
}

/// Typed access to one slot of a [`ComponentSet`].
pub trait ComponentData: Clone + Into<Component> + 'static {
    const KIND: ComponentKind;

    fn slot(set: &ComponentSet) -> &Option<Self>;
    fn slot_mut(set: &mut ComponentSet) -> &mut Option<Self>;
}

macro_rules! component_data {
    ($ty:ident, $field:ident) => {
        impl ComponentData for $ty {
            const KIND: ComponentKind = ComponentKind::$ty;

            fn slot(set: &ComponentSet) -> &Option<Self> {
                &set.$field
            }

            fn slot_mut(set: &mut ComponentSet) -> &mut Option<Self> {
                &mut set.$field
            }
        }

        impl From<$ty> for Component {
            fn from(value: $ty) -> Self {
                Component::$ty(value)
            }
        }
    };
}

component_data!(SpriteRenderer, sprite_renderer);
component_data!(Animator, animator);
component_data!(BoxCollider2D, box_collider);
component_data!(PhysicsBody2D, physics_body);
component_data!(Rigidbody2D, rigidbody);
component_data!(DebugRender2D, debug_render);
component_data!(PrefabInstance, prefab_instance);

/// At most one component per kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentSet {
    pub sprite_renderer: Option<SpriteRenderer>,
    pub animator: Option<Animator>,
    pub box_collider: Option<BoxCollider2D>,
    pub physics_body: Option<PhysicsBody2D>,
    pub rigidbody: Option<Rigidbody2D>,
    pub debug_render: Option<DebugRender2D>,
    pub prefab_instance: Option<PrefabInstance>,
}

impl ComponentSet {
    pub fn get<T: ComponentData>(&self) -> Option<&T> {
        T::slot(self).as_ref()
    }

    pub fn get_mut<T: ComponentData>(&mut self) -> Option<&mut T> {
        T::slot_mut(self).as_mut()
    }

    /// Store `component` in its slot, returning whatever was there.
    pub fn insert(&mut self, component: impl Into<Component>) -> Option<Component> {
        match component.into() {
            Component::SpriteRenderer(c) => self.sprite_renderer.replace(c).map(Into::into),
            Component::Animator(c) => self.animator.replace(c).map(Into::into),
            Component::BoxCollider2D(c) => self.box_collider.replace(c).map(Into::into),
            Component::PhysicsBody2D(c) => self.physics_body.replace(c).map(Into::into),
            Component::Rigidbody2D(c) => self.rigidbody.replace(c).map(Into::into),
            Component::DebugRender2D(c) => self.debug_render.replace(c).map(Into::into),
            Component::PrefabInstance(c) => self.prefab_instance.replace(c).map(Into::into),
        }
    }

    /// Empty the slot for `kind`, returning its contents.
    pub fn remove(&mut self, kind: ComponentKind) -> Option<Component> {
        match kind {
            ComponentKind::SpriteRenderer => self.sprite_renderer.take().map(Into::into),
            ComponentKind::Animator => self.animator.take().map(Into::into),
            ComponentKind::BoxCollider2D => self.box_collider.take().map(Into::into),
            ComponentKind::PhysicsBody2D => self.physics_body.take().map(Into::into),
            ComponentKind::Rigidbody2D => self.rigidbody.take().map(Into::into),
            ComponentKind::DebugRender2D => self.debug_render.take().map(Into::into),
            ComponentKind::PrefabInstance => self.prefab_instance.take().map(Into::into),
        }
    }

    /// Clone the component of `kind` out of the set.
    pub fn cloned(&self, kind: ComponentKind) -> Option<Component> {
        match kind {
            ComponentKind::SpriteRenderer => self.sprite_renderer.clone().map(Into::into),
            ComponentKind::Animator => self.animator.clone().map(Into::into),
            ComponentKind::BoxCollider2D => self.box_collider.clone().map(Into::into),
            ComponentKind::PhysicsBody2D => self.physics_body.clone().map(Into::into),
            ComponentKind::Rigidbody2D => self.rigidbody.clone().map(Into::into),
            ComponentKind::DebugRender2D => self.debug_render.clone().map(Into::into),
            ComponentKind::PrefabInstance => self.prefab_instance.clone().map(Into::into),
        }
    }

    pub fn has(&self, kind: ComponentKind) -> bool {
        match kind {
            ComponentKind::SpriteRenderer => self.sprite_renderer.is_some(),
            ComponentKind::Animator => self.animator.is_some(),
            ComponentKind::BoxCollider2D => self.box_collider.is_some(),
            ComponentKind::PhysicsBody2D => self.physics_body.is_some(),
            ComponentKind::Rigidbody2D => self.rigidbody.is_some(),
            ComponentKind::DebugRender2D => self.debug_render.is_some(),
            ComponentKind::PrefabInstance => self.prefab_instance.is_some(),
        }
    }

    /// Kinds present, in [`ComponentKind::ALL`] order.
    pub fn kinds(&self) -> impl Iterator<Item = ComponentKind> + '_ {
        ComponentKind::ALL.into_iter().filter(|k| self.has(*k))
    }

    pub fn len(&self) -> usize {
        self.kinds().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_round_trip() {
        for kind in ComponentKind::ALL {
            assert_eq!(ComponentKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(
            ComponentKind::from_name("boxcollider2d"),
            Some(ComponentKind::BoxCollider2D)
        );
        assert_eq!(ComponentKind::from_name("Mesh"), None);
    }

    #[test]
    fn prefab_instance_is_not_mergeable() {
        assert!(!ComponentKind::PrefabInstance.is_mergeable());
        assert!(ComponentKind::MERGEABLE.iter().all(|k| k.is_mergeable()));
    }

    #[test]
    fn typed_and_tagged_access_agree() {
        let mut set = ComponentSet::default();
        set.insert(SpriteRenderer::new("hero_idle_0"));
        set.insert(Rigidbody2D::default());

        assert_eq!(set.get::<SpriteRenderer>().unwrap().sprite_id, "hero_idle_0");
        assert!(set.get::<Animator>().is_none());
        assert_eq!(
            set.kinds().collect::<Vec<_>>(),
            vec![ComponentKind::SpriteRenderer, ComponentKind::Rigidbody2D]
        );

        let cloned = set.cloned(ComponentKind::Rigidbody2D).unwrap();
        assert_eq!(cloned.kind(), ComponentKind::Rigidbody2D);
    }

    #[test]
    fn disjoint_mutable_borrows() {
        let mut set = ComponentSet::default();
        set.insert(SpriteRenderer::new("a"));
        set.insert(Animator::default());

        let ComponentSet {
            animator,
            sprite_renderer,
            ..
        } = &mut set;
        let (Some(animator), Some(sprite)) = (animator.as_mut(), sprite_renderer.as_mut()) else {
            panic!("both slots filled");
        };
        animator.speed = 2.0;
        sprite.sprite_id = "b".into();

        assert_eq!(set.get::<Animator>().unwrap().speed, 2.0);
        assert_eq!(set.get::<SpriteRenderer>().unwrap().sprite_id, "b");
    }
}
