//! Keyboard input state.
//!
//! The [`Input`] resource tracks which keys are currently pressed, just
//! pressed this tick, or just released this tick. The host feeds it with
//! [`Input::press`]/[`Input::release`] and the runtime clears the per-tick
//! edges after every step.
//!
//! Controller transitions name keys as strings; [`Key::from_str`] parses them
//! case-insensitively. A name that doesn't parse never satisfies a condition.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

/// Tracks the state of a set of inputs.
///
/// - `pressed`: currently held down
/// - `just_pressed`: pressed this tick (not held last tick)
/// - `just_released`: released this tick
#[derive(Debug, Clone)]
pub struct Input<T: Eq + Hash + Copy> {
    pressed: HashSet<T>,
    just_pressed: HashSet<T>,
    just_released: HashSet<T>,
}

impl<T: Eq + Hash + Copy> Input<T> {
    pub fn new() -> Self {
        Self {
            pressed: HashSet::new(),
            just_pressed: HashSet::new(),
            just_released: HashSet::new(),
        }
    }

    /// Returns `true` if the input is currently held down.
    pub fn pressed(&self, input: T) -> bool {
        self.pressed.contains(&input)
    }

    /// Returns `true` if the input was pressed this tick.
    pub fn just_pressed(&self, input: T) -> bool {
        self.just_pressed.contains(&input)
    }

    /// Returns `true` if the input was released this tick.
    pub fn just_released(&self, input: T) -> bool {
        self.just_released.contains(&input)
    }

    /// Call when an input is pressed.
    pub fn press(&mut self, input: T) {
        if self.pressed.insert(input) {
            self.just_pressed.insert(input);
        }
    }

    /// Call when an input is released.
    pub fn release(&mut self, input: T) {
        if self.pressed.remove(&input) {
            self.just_released.insert(input);
        }
    }

    /// Clear per-tick state. Called at the end of each step.
    pub fn clear_just(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

impl<T: Eq + Hash + Copy> Default for Input<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Logical keys the simulation understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Space,
    Enter,
    Escape,
    Shift,
    Control,
    Tab,
    A,
    B,
    C,
    D,
    E,
    F,
    Q,
    R,
    S,
    W,
    X,
    Z,
}

impl Key {
    pub const ALL: [Key; 22] = [
        Key::Up,
        Key::Down,
        Key::Left,
        Key::Right,
        Key::Space,
        Key::Enter,
        Key::Escape,
        Key::Shift,
        Key::Control,
        Key::Tab,
        Key::A,
        Key::B,
        Key::C,
        Key::D,
        Key::E,
        Key::F,
        Key::Q,
        Key::R,
        Key::S,
        Key::W,
        Key::X,
        Key::Z,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Key::Up => "Up",
            Key::Down => "Down",
            Key::Left => "Left",
            Key::Right => "Right",
            Key::Space => "Space",
            Key::Enter => "Enter",
            Key::Escape => "Escape",
            Key::Shift => "Shift",
            Key::Control => "Control",
            Key::Tab => "Tab",
            Key::A => "A",
            Key::B => "B",
            Key::C => "C",
            Key::D => "D",
            Key::E => "E",
            Key::F => "F",
            Key::Q => "Q",
            Key::R => "R",
            Key::S => "S",
            Key::W => "W",
            Key::X => "X",
            Key::Z => "Z",
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a key name doesn't match any [`Key`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKey(pub String);

impl fmt::Display for UnknownKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown key \"{}\"", self.0)
    }
}

impl std::error::Error for UnknownKey {}

impl FromStr for Key {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Key::ALL
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownKey(s.to_string()))
    }
}

/// Keyboard state as seen by the controller system.
pub type Keyboard = Input<Key>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_sets_edges_once() {
        let mut input = Keyboard::new();
        input.press(Key::Space);
        assert!(input.pressed(Key::Space));
        assert!(input.just_pressed(Key::Space));

        input.clear_just();
        input.press(Key::Space);
        assert!(input.pressed(Key::Space));
        assert!(!input.just_pressed(Key::Space));
    }

    #[test]
    fn release_sets_just_released() {
        let mut input = Keyboard::new();
        input.press(Key::A);
        input.clear_just();
        input.release(Key::A);
        assert!(!input.pressed(Key::A));
        assert!(input.just_released(Key::A));

        // Releasing a key that isn't held is a no-op.
        input.release(Key::B);
        assert!(!input.just_released(Key::B));
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("space".parse::<Key>(), Ok(Key::Space));
        assert_eq!("LEFT".parse::<Key>(), Ok(Key::Left));
        assert_eq!(" w ".parse::<Key>(), Ok(Key::W));
        assert!("Jump".parse::<Key>().is_err());
    }
}
