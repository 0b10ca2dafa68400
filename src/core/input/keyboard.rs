//=========================================================================
// Keyboard State
//=========================================================================
//
// Held-key tracking and the per-frame key-release monitor.
//
// Architecture:
//   HostEvent::KeyDown/KeyUp → KeyboardState (HashSet of held keys)
//                                  │ once per frame
//                                  ▼
//   KeyMonitor::poll → listed keys released since last frame
//                    → Handler::key_pressed
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashSet;

//=== Internal Dependencies ===============================================

use super::event::{KeyCode, Modifiers};

//=== KeyboardState =======================================================

/// Keys currently held down, as reported by the host.
#[derive(Debug, Default, Clone)]
pub struct KeyboardState {
    keys_down: HashSet<KeyCode>,
    modifiers: Modifiers,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn press(&mut self, key: KeyCode, modifiers: Modifiers) {
        self.modifiers = modifiers;
        self.keys_down.insert(key);
    }

    pub(crate) fn release(&mut self, key: KeyCode, modifiers: Modifiers) {
        self.modifiers = modifiers;
        self.keys_down.remove(&key);
    }

    /// Forgets every held key (the window lost focus).
    pub(crate) fn clear(&mut self) {
        self.keys_down.clear();
        self.modifiers = Modifiers::NONE;
    }

    /// Returns `true` while `key` is held.
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Modifier state of the most recent key event.
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn held(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.keys_down.iter().copied()
    }
}

//=== KeyMonitor ==========================================================

/// Watches a list of keys and reports each one once it is released.
///
/// A key counts as pressed when it was seen held at one poll and is no
/// longer held at a later poll.
#[derive(Debug, Default, Clone)]
pub struct KeyMonitor {
    keys: Vec<KeyCode>,
    held: HashSet<KeyCode>,
}

impl KeyMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the watched keys. Duplicates are dropped, order is kept.
    pub fn set_key_list<I>(&mut self, keys: I)
    where
        I: IntoIterator<Item = KeyCode>,
    {
        self.keys.clear();
        self.held.clear();
        for key in keys {
            if !self.keys.contains(&key) {
                self.keys.push(key);
            }
        }
    }

    pub fn key_list(&self) -> &[KeyCode] {
        &self.keys
    }

    /// Forgets which watched keys were held, so nothing fires on the next
    /// poll.
    pub(crate) fn reset(&mut self) {
        self.held.clear();
    }

    /// Compares the watched keys against `keyboard` and returns the ones
    /// released since the previous poll, in key-list order.
    pub fn poll(&mut self, keyboard: &KeyboardState) -> Vec<KeyCode> {
        let mut released = Vec::new();
        for &key in &self.keys {
            if keyboard.is_key_down(key) {
                self.held.insert(key);
            } else if self.held.remove(&key) {
                released.push(key);
            }
        }
        released
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    //=====================================================================
    // KeyboardState Tests
    //=====================================================================

    #[test]
    fn press_and_release_track_held_keys() {
        let mut keyboard = KeyboardState::new();
        keyboard.press(KeyCode::KeyA, Modifiers::SHIFT);
        assert!(keyboard.is_key_down(KeyCode::KeyA));
        assert!(keyboard.modifiers().shift);

        keyboard.release(KeyCode::KeyA, Modifiers::NONE);
        assert!(!keyboard.is_key_down(KeyCode::KeyA));
        assert_eq!(keyboard.modifiers(), Modifiers::NONE);
    }

    #[test]
    fn clear_forgets_everything() {
        let mut keyboard = KeyboardState::new();
        keyboard.press(KeyCode::KeyW, Modifiers::NONE);
        keyboard.press(KeyCode::Space, Modifiers::NONE);
        keyboard.clear();
        assert_eq!(keyboard.held().count(), 0);
    }

    //=====================================================================
    // KeyMonitor Tests
    //=====================================================================

    #[test]
    fn fires_on_release_not_press() {
        let mut keyboard = KeyboardState::new();
        let mut monitor = KeyMonitor::new();
        monitor.set_key_list([KeyCode::KeyP]);

        keyboard.press(KeyCode::KeyP, Modifiers::NONE);
        assert!(monitor.poll(&keyboard).is_empty());
        assert!(monitor.poll(&keyboard).is_empty());

        keyboard.release(KeyCode::KeyP, Modifiers::NONE);
        assert_eq!(monitor.poll(&keyboard), vec![KeyCode::KeyP]);
        assert!(monitor.poll(&keyboard).is_empty());
    }

    #[test]
    fn press_and_release_between_polls_is_missed() {
        let mut keyboard = KeyboardState::new();
        let mut monitor = KeyMonitor::new();
        monitor.set_key_list([KeyCode::KeyP]);

        keyboard.press(KeyCode::KeyP, Modifiers::NONE);
        keyboard.release(KeyCode::KeyP, Modifiers::NONE);
        assert!(monitor.poll(&keyboard).is_empty());
    }

    #[test]
    fn unlisted_keys_are_ignored() {
        let mut keyboard = KeyboardState::new();
        let mut monitor = KeyMonitor::new();
        monitor.set_key_list([KeyCode::KeyA]);

        keyboard.press(KeyCode::KeyB, Modifiers::NONE);
        monitor.poll(&keyboard);
        keyboard.release(KeyCode::KeyB, Modifiers::NONE);
        assert!(monitor.poll(&keyboard).is_empty());
    }

    #[test]
    fn key_list_has_no_length_limit() {
        let keys: Vec<KeyCode> = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789"
            .chars()
            .filter_map(KeyCode::from_char)
            .collect();
        let mut keyboard = KeyboardState::new();
        let mut monitor = KeyMonitor::new();
        monitor.set_key_list(keys.iter().copied());

        keyboard.press(KeyCode::Digit9, Modifiers::NONE);
        monitor.poll(&keyboard);
        keyboard.release(KeyCode::Digit9, Modifiers::NONE);
        assert_eq!(monitor.poll(&keyboard), vec![KeyCode::Digit9]);
        assert_eq!(monitor.key_list().len(), 36);
    }

    #[test]
    fn reset_swallows_pending_release() {
        let mut keyboard = KeyboardState::new();
        let mut monitor = KeyMonitor::new();
        monitor.set_key_list([KeyCode::KeyQ]);

        keyboard.press(KeyCode::KeyQ, Modifiers::NONE);
        monitor.poll(&keyboard);
        keyboard.clear();
        monitor.reset();
        assert!(monitor.poll(&keyboard).is_empty());
    }

    #[test]
    fn duplicate_keys_are_dropped() {
        let mut monitor = KeyMonitor::new();
        monitor.set_key_list([KeyCode::KeyA, KeyCode::KeyB, KeyCode::KeyA]);
        assert_eq!(monitor.key_list(), &[KeyCode::KeyA, KeyCode::KeyB]);
    }
}
