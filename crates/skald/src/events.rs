//! # Event Bus — Typed Per-Tick Messages
//!
//! Systems publish plain structs; downstream code reads them back by type.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ EventBus                                     │
//! │                                              │
//! │  buffers: HashMap<TypeId, Box<dyn Buffer>>   │
//! │    AnimationNotifyEvent → Vec<…>             │
//! │    CollisionEvent       → Vec<…>             │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! `publish` appends, `read` returns everything of that type since the last
//! `clear`, `clear` wipes every buffer. Order within a type is publish order;
//! nothing is promised across types.

use std::any::{Any, TypeId};
use std::collections::HashMap;

/// Type-erased handle to one `Vec<T>` so `clear` can reach every buffer.
trait EventBuffer: Send + Sync {
    fn clear(&mut self);
    fn len(&self) -> usize;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Send + Sync + 'static> EventBuffer for Vec<T> {
    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Typed publish/read queue. Stored as a resource in the
/// [`World`](crate::ecs::World).
#[derive(Default)]
pub struct EventBus {
    buffers: HashMap<TypeId, Box<dyn EventBuffer>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event to its type's buffer.
    pub fn publish<T: Send + Sync + 'static>(&mut self, event: T) {
        let buffer = self
            .buffers
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(Vec::<T>::new()));
        // Keyed by TypeId, so the downcast always matches.
        if let Some(events) = buffer.as_any_mut().downcast_mut::<Vec<T>>() {
            events.push(event);
        }
    }

    /// All events of type `T` published since the last [`clear`](Self::clear).
    pub fn read<T: Send + Sync + 'static>(&self) -> &[T] {
        self.buffers
            .get(&TypeId::of::<T>())
            .and_then(|b| b.as_any().downcast_ref::<Vec<T>>())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Wipe every buffer.
    pub fn clear(&mut self) {
        for buffer in self.buffers.values_mut() {
            buffer.clear();
        }
    }

    /// Total number of buffered events across all types.
    pub fn len(&self) -> usize {
        self.buffers.values().map(|b| b.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
