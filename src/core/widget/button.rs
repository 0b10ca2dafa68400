//=========================================================================
// Button
//=========================================================================
//
// Push button that fires when clicked or when Space is pressed while it
// has focus.
//
// Click qualification:
// ```text
//   PointerDown(Left) ──> armed ──PointerUp(Left) inside bounds──> Fire
//                           ├────PointerUp(Left) outside─────────> disarm
//                           └────PointerUp(other button)─────────> disarm
// ```
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::{focus_key, FontSpec, WidgetInput, WidgetResponse, DEFAULT_BOUNDS};
use crate::core::caller::ListenerRegistry;
use crate::core::geometry::Rect;
use crate::core::input::{KeyCode, MouseButton};

//=== Button ==============================================================

#[derive(Debug, Clone)]
pub struct Button {
    label: String,
    bounds: Rect,
    enabled: bool,
    visible: bool,
    font: Option<FontSpec>,
    armed: bool,
    listeners: ListenerRegistry,
}

impl Button {
    /// A hidden, enabled button at the default bounds.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            bounds: DEFAULT_BOUNDS,
            enabled: true,
            visible: false,
            font: None,
            armed: false,
            listeners: ListenerRegistry::new(),
        }
    }

    //--- Properties -------------------------------------------------------

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    pub fn font(&self) -> Option<&FontSpec> {
        self.font.as_ref()
    }

    pub fn set_font(&mut self, font: FontSpec) {
        self.font = Some(font);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling also drops a pending click.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.armed = false;
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.armed = false;
    }

    /// True between a left press on the button and the matching release.
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn listeners_mut(&mut self) -> &mut ListenerRegistry {
        &mut self.listeners
    }

    //--- Input ------------------------------------------------------------

    pub fn handle(&mut self, input: WidgetInput) -> WidgetResponse {
        if !self.enabled || !self.visible {
            return WidgetResponse::Ignored;
        }

        match input {
            WidgetInput::PointerDown { button: MouseButton::Left, .. }
            | WidgetInput::DoubleClick { button: MouseButton::Left, .. } => {
                self.armed = true;
                WidgetResponse::Consumed
            }
            WidgetInput::PointerUp { button: MouseButton::Left, x, y } => {
                if std::mem::take(&mut self.armed) && self.bounds.contains(x, y) {
                    WidgetResponse::Fire
                } else {
                    WidgetResponse::Consumed
                }
            }
            WidgetInput::PointerUp { .. } => {
                self.armed = false;
                WidgetResponse::Consumed
            }
            WidgetInput::KeyDown { key: KeyCode::Space, .. } => WidgetResponse::Fire,
            WidgetInput::KeyDown { key, modifiers } => {
                focus_key(key, modifiers).unwrap_or(WidgetResponse::Consumed)
            }
            _ => WidgetResponse::Consumed,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
