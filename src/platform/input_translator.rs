//=========================================================================
// Input Translator
//=========================================================================
//
// Converts winit window events into engine HostEvents.
//
// Architecture:
//   winit WindowEvent → InputTranslator → HostEvent(s) → Engine channel
//
// Stateful tracking:
// - Modifiers are cached from ModifiersChanged and stamped on every
//   subsequent key and pointer event.
// - The cursor position is cached from CursorMoved, since winit reports
//   button and wheel events without coordinates.
// - A second left press close in time and space to the first becomes a
//   DoubleClick, which winit does not report on its own.
//
// Unmapped keys (F13-F24, numpad, media keys) are dropped.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::{Duration, Instant};

use log::trace;
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, KeyEvent, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent},
    keyboard::{KeyCode as WinitKeyCode, ModifiersState, PhysicalKey},
};

//=== Internal Dependencies ===============================================

use crate::core::input::{HostEvent, KeyCode, Modifiers, MouseButton};

//=== Constants ===========================================================

/// Wheel units per notch.
pub const WHEEL_DELTA: i32 = 120;

/// Pixels of scrolling counted as one notch for touchpad deltas.
const PIXELS_PER_NOTCH: f64 = 40.0;

const DOUBLE_CLICK_TIME: Duration = Duration::from_millis(500);
const DOUBLE_CLICK_DISTANCE: i32 = 4;

//=== InputTranslator =====================================================

/// Turns winit window events into [`HostEvent`]s.
#[derive(Debug, Default)]
pub struct InputTranslator {
    modifiers: Modifiers,
    cursor: (i32, i32),
    last_press: Option<(MouseButton, i32, i32, Instant)>,
}

impl InputTranslator {
    //--- Construction -----------------------------------------------------

    pub fn new() -> Self {
        Self::default()
    }

    //--- State ------------------------------------------------------------

    /// Updates cached modifier state (applied to subsequent events).
    pub fn update_modifiers(&mut self, state: ModifiersState) {
        self.modifiers = Modifiers::from(state);
    }

    pub fn current_modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn cursor(&self) -> (i32, i32) {
        self.cursor
    }

    //--- Translation ------------------------------------------------------

    /// Translates one window event, appending the results to `out`.
    ///
    /// Returns the number of events appended.
    pub fn translate(&mut self, event: &WindowEvent, out: &mut Vec<HostEvent>) -> usize {
        let before = out.len();

        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => out.push(HostEvent::Destroy),
            WindowEvent::RedrawRequested => out.push(HostEvent::Paint),
            WindowEvent::Resized(size) => out.push(HostEvent::Resize {
                width: size.width,
                height: size.height,
            }),
            WindowEvent::Focused(focused) => out.push(HostEvent::Focus(*focused)),
            WindowEvent::ModifiersChanged(modifiers) => self.update_modifiers(modifiers.state()),
            WindowEvent::KeyboardInput { event, .. } => self.process_key_event(event, out),
            WindowEvent::CursorMoved { position, .. } => out.push(self.process_cursor(*position)),
            WindowEvent::MouseInput { state, button, .. } => {
                out.push(self.process_mouse_button(*button, *state, Instant::now()))
            }
            WindowEvent::MouseWheel { delta, .. } => out.push(self.process_wheel(*delta)),
            other => trace!(target: "platform::input", "Ignoring {:?}", other),
        }

        out.len() - before
    }

    /// Key down/up plus any typed characters.
    fn process_key_event(&self, key_event: &KeyEvent, out: &mut Vec<HostEvent>) {
        if let Some(event) = self.process_key(key_event.physical_key, key_event.state) {
            out.push(event);
        }

        if key_event.state == ElementState::Pressed {
            if let Some(text) = &key_event.text {
                out.extend(text.chars().filter(|c| !c.is_control()).map(HostEvent::Char));
            }
        }
    }

    fn process_key(&self, physical: PhysicalKey, state: ElementState) -> Option<HostEvent> {
        let key = match physical {
            PhysicalKey::Code(code) => KeyCode::from(code),
            PhysicalKey::Unidentified(_) => return None,
        };
        if key == KeyCode::Unidentified {
            return None;
        }

        let modifiers = self.modifiers;
        Some(match state {
            ElementState::Pressed => HostEvent::KeyDown { key, modifiers },
            ElementState::Released => HostEvent::KeyUp { key, modifiers },
        })
    }

    fn process_cursor(&mut self, position: PhysicalPosition<f64>) -> HostEvent {
        self.cursor = (position.x.round() as i32, position.y.round() as i32);
        HostEvent::MouseMove {
            x: self.cursor.0,
            y: self.cursor.1,
            modifiers: self.modifiers,
        }
    }

    fn process_mouse_button(
        &mut self,
        button: WinitMouseButton,
        state: ElementState,
        now: Instant,
    ) -> HostEvent {
        let button = MouseButton::from(button);
        let (x, y) = self.cursor;
        let modifiers = self.modifiers;

        match state {
            ElementState::Released => HostEvent::MouseUp { button, x, y, modifiers },
            ElementState::Pressed => {
                let double = self.last_press.take().is_some_and(|(b, px, py, at)| {
                    b == button
                        && now.saturating_duration_since(at) <= DOUBLE_CLICK_TIME
                        && (x - px).abs() <= DOUBLE_CLICK_DISTANCE
                        && (y - py).abs() <= DOUBLE_CLICK_DISTANCE
                });

                if double {
                    HostEvent::DoubleClick { button, x, y, modifiers }
                } else {
                    self.last_press = Some((button, x, y, now));
                    HostEvent::MouseDown { button, x, y, modifiers }
                }
            }
        }
    }

    fn process_wheel(&self, delta: MouseScrollDelta) -> HostEvent {
        let delta = match delta {
            MouseScrollDelta::LineDelta(_, lines) => (lines * WHEEL_DELTA as f32).round() as i32,
            MouseScrollDelta::PixelDelta(pixels) => {
                (pixels.y / PIXELS_PER_NOTCH * f64::from(WHEEL_DELTA)).round() as i32
            }
        };
        HostEvent::MouseWheel {
            x: self.cursor.0,
            y: self.cursor.1,
            delta,
            modifiers: self.modifiers,
        }
    }
}

//=========================================================================
// Winit Conversions
//=========================================================================

/// Winit normalizes platform keys (macOS Cmd → Ctrl, Option → Alt).
impl From<ModifiersState> for Modifiers {
    fn from(state: ModifiersState) -> Self {
        Self {
            shift: state.shift_key(),
            ctrl: state.control_key(),
            alt: state.alt_key(),
        }
    }
}

impl From<WinitKeyCode> for KeyCode {
    fn from(code: WinitKeyCode) -> Self {
        use WinitKeyCode::*;
        match code {
            //--- Digits -------------------------------------------------------

            Digit0 => KeyCode::Digit0, Digit1 => KeyCode::Digit1,
            Digit2 => KeyCode::Digit2, Digit3 => KeyCode::Digit3,
            Digit4 => KeyCode::Digit4, Digit5 => KeyCode::Digit5,
            Digit6 => KeyCode::Digit6, Digit7 => KeyCode::Digit7,
            Digit8 => KeyCode::Digit8, Digit9 => KeyCode::Digit9,

            //--- Letters ------------------------------------------------------

            KeyA => KeyCode::KeyA, KeyB => KeyCode::KeyB, KeyC => KeyCode::KeyC,
            KeyD => KeyCode::KeyD, KeyE => KeyCode::KeyE, KeyF => KeyCode::KeyF,
            KeyG => KeyCode::KeyG, KeyH => KeyCode::KeyH, KeyI => KeyCode::KeyI,
            KeyJ => KeyCode::KeyJ, KeyK => KeyCode::KeyK, KeyL => KeyCode::KeyL,
            KeyM => KeyCode::KeyM, KeyN => KeyCode::KeyN, KeyO => KeyCode::KeyO,
            KeyP => KeyCode::KeyP, KeyQ => KeyCode::KeyQ, KeyR => KeyCode::KeyR,
            KeyS => KeyCode::KeyS, KeyT => KeyCode::KeyT, KeyU => KeyCode::KeyU,
            KeyV => KeyCode::KeyV, KeyW => KeyCode::KeyW, KeyX => KeyCode::KeyX,
            KeyY => KeyCode::KeyY, KeyZ => KeyCode::KeyZ,

            //--- Arrows -------------------------------------------------------

            ArrowUp => KeyCode::ArrowUp,
            ArrowDown => KeyCode::ArrowDown,
            ArrowLeft => KeyCode::ArrowLeft,
            ArrowRight => KeyCode::ArrowRight,

            //--- Function -----------------------------------------------------

            F1 => KeyCode::F1, F2 => KeyCode::F2, F3 => KeyCode::F3,
            F4 => KeyCode::F4, F5 => KeyCode::F5, F6 => KeyCode::F6,
            F7 => KeyCode::F7, F8 => KeyCode::F8, F9 => KeyCode::F9,
            F10 => KeyCode::F10, F11 => KeyCode::F11, F12 => KeyCode::F12,

            //--- Modifiers ----------------------------------------------------

            ShiftLeft => KeyCode::ShiftLeft,
            ShiftRight => KeyCode::ShiftRight,
            ControlLeft => KeyCode::ControlLeft,
            ControlRight => KeyCode::ControlRight,
            AltLeft => KeyCode::AltLeft,
            AltRight => KeyCode::AltRight,

            //--- Special ------------------------------------------------------

            Space => KeyCode::Space,
            Enter => KeyCode::Enter,
            Escape => KeyCode::Escape,
            Tab => KeyCode::Tab,
            Backspace => KeyCode::Backspace,
            Delete => KeyCode::Delete,

            _ => KeyCode::Unidentified,
        }
    }
}

/// Back/Forward/Other → Other.
impl From<WinitMouseButton> for MouseButton {
    fn from(button: WinitMouseButton) -> Self {
        match button {
            WinitMouseButton::Left => MouseButton::Left,
            WinitMouseButton::Right => MouseButton::Right,
            WinitMouseButton::Middle => MouseButton::Middle,
            _ => MouseButton::Other,
        }
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalSize;

    fn make_modifiers(shift: bool, ctrl: bool, alt: bool) -> ModifiersState {
        let mut state = ModifiersState::empty();
        if shift { state.insert(ModifiersState::SHIFT); }
        if ctrl { state.insert(ModifiersState::CONTROL); }
        if alt { state.insert(ModifiersState::ALT); }
        state
    }

    fn translated(translator: &mut InputTranslator, event: WindowEvent) -> Vec<HostEvent> {
        let mut out = Vec::new();
        translator.translate(&event, &mut out);
        out
    }

    //=====================================================================
    // Window Events
    //=====================================================================

    #[test]
    fn lifecycle_events() {
        let mut translator = InputTranslator::new();
        assert_eq!(translated(&mut translator, WindowEvent::CloseRequested), vec![HostEvent::Destroy]);
        assert_eq!(translated(&mut translator, WindowEvent::RedrawRequested), vec![HostEvent::Paint]);
        assert_eq!(translated(&mut translator, WindowEvent::Focused(false)), vec![HostEvent::Focus(false)]);
        assert_eq!(
            translated(&mut translator, WindowEvent::Resized(PhysicalSize::new(800, 600))),
            vec![HostEvent::Resize { width: 800, height: 600 }]
        );
    }

    #[test]
    fn unrelated_events_are_ignored() {
        let mut translator = InputTranslator::new();
        assert!(translated(&mut translator, WindowEvent::Occluded(true)).is_empty());
    }

    //=====================================================================
    // Keyboard
    //=====================================================================

    #[test]
    fn key_events_carry_modifiers() {
        let mut translator = InputTranslator::new();
        translator.update_modifiers(make_modifiers(false, true, false));

        let event = translator.process_key(PhysicalKey::Code(WinitKeyCode::KeyS), ElementState::Pressed);
        assert_eq!(
            event,
            Some(HostEvent::KeyDown { key: KeyCode::KeyS, modifiers: Modifiers::CTRL })
        );

        translator.update_modifiers(make_modifiers(true, false, false));
        let event = translator.process_key(PhysicalKey::Code(WinitKeyCode::KeyS), ElementState::Released);
        assert_eq!(
            event,
            Some(HostEvent::KeyUp { key: KeyCode::KeyS, modifiers: Modifiers::SHIFT })
        );
    }

    #[test]
    fn unmapped_keys_are_dropped() {
        let translator = InputTranslator::new();
        assert_eq!(
            translator.process_key(PhysicalKey::Code(WinitKeyCode::F13), ElementState::Pressed),
            None
        );
    }

    #[test]
    fn keycode_conversion() {
        assert_eq!(KeyCode::from(WinitKeyCode::KeyA), KeyCode::KeyA);
        assert_eq!(KeyCode::from(WinitKeyCode::Digit7), KeyCode::Digit7);
        assert_eq!(KeyCode::from(WinitKeyCode::F5), KeyCode::F5);
        assert_eq!(KeyCode::from(WinitKeyCode::ShiftRight), KeyCode::ShiftRight);
        assert_eq!(KeyCode::from(WinitKeyCode::NumpadAdd), KeyCode::Unidentified);
    }

    //=====================================================================
    // Pointer
    //=====================================================================

    #[test]
    fn buttons_use_last_cursor_position() {
        let mut translator = InputTranslator::new();
        translator.process_cursor(PhysicalPosition::new(10.4, 20.6));
        translator.update_modifiers(make_modifiers(false, false, true));

        let event = translator.process_mouse_button(WinitMouseButton::Right, ElementState::Released, Instant::now());
        assert_eq!(
            event,
            HostEvent::MouseUp { button: MouseButton::Right, x: 10, y: 21, modifiers: Modifiers::ALT }
        );
    }

    #[test]
    fn quick_second_press_is_double_click() {
        let mut translator = InputTranslator::new();
        let t0 = Instant::now();

        let first = translator.process_mouse_button(WinitMouseButton::Left, ElementState::Pressed, t0);
        assert!(matches!(first, HostEvent::MouseDown { .. }));

        let second = translator.process_mouse_button(
            WinitMouseButton::Left,
            ElementState::Pressed,
            t0 + Duration::from_millis(200),
        );
        assert!(matches!(second, HostEvent::DoubleClick { button: MouseButton::Left, .. }));

        let third = translator.process_mouse_button(
            WinitMouseButton::Left,
            ElementState::Pressed,
            t0 + Duration::from_millis(300),
        );
        assert!(matches!(third, HostEvent::MouseDown { .. }));
    }

    #[test]
    fn slow_or_distant_press_is_not_double_click() {
        let mut translator = InputTranslator::new();
        let t0 = Instant::now();

        translator.process_mouse_button(WinitMouseButton::Left, ElementState::Pressed, t0);
        let slow = translator.process_mouse_button(
            WinitMouseButton::Left,
            ElementState::Pressed,
            t0 + Duration::from_millis(900),
        );
        assert!(matches!(slow, HostEvent::MouseDown { .. }));

        translator.process_cursor(PhysicalPosition::new(50.0, 50.0));
        let moved = translator.process_mouse_button(
            WinitMouseButton::Left,
            ElementState::Pressed,
            t0 + Duration::from_millis(1000),
        );
        assert!(matches!(moved, HostEvent::MouseDown { .. }));
    }

    #[test]
    fn wheel_lines_scale_to_notches() {
        let mut translator = InputTranslator::new();
        translator.process_cursor(PhysicalPosition::new(5.0, 6.0));

        assert_eq!(
            translator.process_wheel(MouseScrollDelta::LineDelta(0.0, -2.0)),
            HostEvent::MouseWheel { x: 5, y: 6, delta: -240, modifiers: Modifiers::NONE }
        );
        assert_eq!(
            translator.process_wheel(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 40.0))),
            HostEvent::MouseWheel { x: 5, y: 6, delta: 120, modifiers: Modifiers::NONE }
        );
    }

    #[test]
    fn mouse_button_conversion() {
        assert_eq!(MouseButton::from(WinitMouseButton::Left), MouseButton::Left);
        assert_eq!(MouseButton::from(WinitMouseButton::Middle), MouseButton::Middle);
        assert_eq!(MouseButton::from(WinitMouseButton::Back), MouseButton::Other);
    }
}
