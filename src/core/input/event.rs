//=========================================================================
// Host Events
//=========================================================================
//
// The raw input contract between the host window and the dispatcher.
//
// The host delivers every event exactly once, in arrival order, through
// the engine's event channel. Coordinates are client pixels with the
// origin at the top-left corner.
//
// Event Flow:
// ```text
// Host window (winit, native message loop, test harness)
//         ↓
//    HostEvent (this module)
//         ↓
//    Engine channel ──> Dispatcher::dispatch
//         ↓
//    widgets / KeyboardState / Handler hooks
// ```
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::caller::AudioId;

//=== MouseButton =========================================================

/// Physical mouse button identifier.
///
/// Only `Left` and `Right` reach `Handler::mouse_button_action`; the
/// others are tracked but not forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    /// Side, thumb and macro buttons.
    Other,
}

//=== KeyCode =============================================================

/// Physical keyboard key identifier.
///
/// Represents the key location, not the character produced. Text input
/// arrives separately as [`HostEvent::Char`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    //--- Numeric Keys -----------------------------------------------------

    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    //--- Alphabetic Keys --------------------------------------------------

    KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI,
    KeyJ, KeyK, KeyL, KeyM, KeyN, KeyO, KeyP, KeyQ, KeyR,
    KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,

    //--- Arrow Keys -------------------------------------------------------

    ArrowDown,
    ArrowLeft,
    ArrowRight,
    ArrowUp,

    //--- Function Keys ----------------------------------------------------

    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,

    //--- Modifier Keys ----------------------------------------------------

    ShiftLeft,
    ShiftRight,
    ControlLeft,
    ControlRight,
    AltLeft,
    AltRight,

    //--- Special Keys -----------------------------------------------------

    Space,
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,

    /// A key the host could not map.
    Unidentified,
}

impl KeyCode {
    /// Maps a letter (either case), digit or space to its key.
    ///
    /// Used to build key lists from strings such as `"WASD "`.
    pub fn from_char(c: char) -> Option<Self> {
        use KeyCode::*;

        const LETTERS: [KeyCode; 26] = [
            KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI, KeyJ, KeyK, KeyL, KeyM,
            KeyN, KeyO, KeyP, KeyQ, KeyR, KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,
        ];
        const DIGITS: [KeyCode; 10] = [
            Digit0, Digit1, Digit2, Digit3, Digit4, Digit5, Digit6, Digit7, Digit8, Digit9,
        ];

        match c {
            'a'..='z' => Some(LETTERS[(c as u8 - b'a') as usize]),
            'A'..='Z' => Some(LETTERS[(c as u8 - b'A') as usize]),
            '0'..='9' => Some(DIGITS[(c as u8 - b'0') as usize]),
            ' ' => Some(Space),
            '\t' => Some(Tab),
            '\r' | '\n' => Some(Enter),
            _ => None,
        }
    }
}

//=== Modifiers ===========================================================

/// Modifier key state (Shift, Ctrl, Alt) at the time of an event.
///
/// Left and right variants are not distinguished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
        alt: false,
    };

    pub const CTRL: Self = Self {
        shift: false,
        ctrl: true,
        alt: false,
    };

    pub const ALT: Self = Self {
        shift: false,
        ctrl: false,
        alt: true,
    };
}

//=== HostEvent ===========================================================

/// A discrete event from the host window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    //--- Lifecycle --------------------------------------------------------

    /// The window exists; `Handler::start` runs and frames begin.
    Create,

    /// The window is closing; `Handler::end` runs and the loop exits.
    Destroy,

    /// The host asks for a repaint outside the regular frame.
    Paint,

    Resize { width: u32, height: u32 },

    /// The window gained (`true`) or lost (`false`) keyboard focus.
    Focus(bool),

    //--- Pointer ----------------------------------------------------------

    MouseDown {
        button: MouseButton,
        x: i32,
        y: i32,
        modifiers: Modifiers,
    },

    MouseUp {
        button: MouseButton,
        x: i32,
        y: i32,
        modifiers: Modifiers,
    },

    DoubleClick {
        button: MouseButton,
        x: i32,
        y: i32,
        modifiers: Modifiers,
    },

    MouseMove {
        x: i32,
        y: i32,
        modifiers: Modifiers,
    },

    /// Wheel rotation at the cursor. One notch is 120 units, positive
    /// away from the user.
    MouseWheel {
        x: i32,
        y: i32,
        delta: i32,
        modifiers: Modifiers,
    },

    //--- Keyboard ---------------------------------------------------------

    KeyDown { key: KeyCode, modifiers: Modifiers },

    KeyUp { key: KeyCode, modifiers: Modifiers },

    /// A typed character, after keyboard layout translation.
    Char(char),

    //--- Devices ----------------------------------------------------------

    /// The audio device finished playing a source.
    PlaybackFinished(AudioId),
}

//=========================================================================
// Unit Tests
//=========================================================================
