//! # System — Functions That Operate on the World
//!
//! A system is just a function that takes `&mut World` and does something with
//! it: walk the scene, mutate components, read or publish to resources.
//!
//! ## Ordering
//!
//! The per-tick pipeline is order-sensitive. The controller picks a clip, the
//! animation system advances it, the notifier reads the advanced cursor, and
//! physics runs last. A [`Schedule`] is therefore a plain `Vec` run front to
//! back; there is no dependency graph and no parallelism.
//!
//! ```text
//! Schedule::run
//!   ├─ animator_controller_system
//!   ├─ animation_system
//!   ├─ animation_notifier_system
//!   ├─ physics_system
//!   └─ collision_system
//! ```
//!
//! With the `diagnostics` feature each run records how long every system took.

use super::world::World;

/// A system that can be executed on a [`World`].
///
/// Any `FnMut(&mut World)` implements this trait, so you can use closures or
/// function pointers directly.
pub trait System {
    fn run(&mut self, world: &mut World);
}

/// Blanket impl: any `FnMut(&mut World)` is a `System`.
impl<F: FnMut(&mut World)> System for F {
    fn run(&mut self, world: &mut World) {
        (self)(world);
    }
}

struct NamedSystem {
    name: String,
    system: Box<dyn System>,
}

/// Per-system timing recorded during a single run.
#[cfg(feature = "diagnostics")]
#[derive(Debug, Clone)]
pub struct SystemTiming {
    pub name: String,
    pub duration_us: f64,
}

/// An ordered list of systems to run.
pub struct Schedule {
    systems: Vec<NamedSystem>,
    /// Per-system timings from the most recent `run()` call.
    #[cfg(feature = "diagnostics")]
    timings: Vec<SystemTiming>,
}

impl Schedule {
    pub fn new() -> Self {
        Self {
            systems: Vec::new(),
            #[cfg(feature = "diagnostics")]
            timings: Vec::new(),
        }
    }

    /// Add a system to the end of the schedule, named after its type.
    pub fn add_system<S: System + 'static>(&mut self, system: S) -> &mut Self {
        let name = short_system_name(std::any::type_name::<S>());
        self.add_named_system(name, system)
    }

    /// Add a system under an explicit name (useful for closures).
    pub fn add_named_system<S: System + 'static>(
        &mut self,
        name: impl Into<String>,
        system: S,
    ) -> &mut Self {
        self.systems.push(NamedSystem {
            name: name.into(),
            system: Box::new(system),
        });
        self
    }

    /// Run all systems in order on the given world.
    pub fn run(&mut self, world: &mut World) {
        #[cfg(feature = "diagnostics")]
        {
            self.timings.clear();
            for ns in &mut self.systems {
                let start = std::time::Instant::now();
                ns.system.run(world);
                let elapsed = start.elapsed();
                self.timings.push(SystemTiming {
                    name: ns.name.clone(),
                    duration_us: elapsed.as_secs_f64() * 1_000_000.0,
                });
            }
        }
        #[cfg(not(feature = "diagnostics"))]
        {
            for ns in &mut self.systems {
                ns.system.run(world);
            }
        }
    }

    /// Names in run order.
    pub fn system_names(&self) -> impl Iterator<Item = &str> {
        self.systems.iter().map(|s| s.name.as_str())
    }

    /// Timings from the most recent [`run`](Self::run).
    #[cfg(feature = "diagnostics")]
    pub fn timings(&self) -> &[SystemTiming] {
        &self.timings
    }

    /// Returns the number of systems in this schedule.
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip the module path from a fully-qualified type name, keeping only the
/// last meaningful segment (e.g. `skald::animation::playback::animation_system`
/// → `animation_system`, `{{closure}}` → `<closure>`).
fn short_system_name(full: &str) -> String {
    let name = full.rsplit("::").next().unwrap_or(full);
    if name.contains("closure") {
        "<closure>".to_string()
    } else {
        name.to_string()
    }
}
