//=========================================================================
// TextBox
//=========================================================================
//
// Single-line text entry that fires when Enter is pressed.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::{focus_key, FontSpec, WidgetInput, WidgetResponse, DEFAULT_BOUNDS};
use crate::core::caller::ListenerRegistry;
use crate::core::geometry::{Color, Rect};
use crate::core::input::KeyCode;

//=== TextBox =============================================================

#[derive(Debug, Clone)]
pub struct TextBox {
    text: String,
    bounds: Rect,
    enabled: bool,
    visible: bool,
    font: Option<FontSpec>,
    fore_color: Color,
    back_color: Color,
    listeners: ListenerRegistry,
}

impl TextBox {
    /// A hidden, enabled text box at the default bounds, black on white.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bounds: DEFAULT_BOUNDS,
            enabled: true,
            visible: false,
            font: None,
            fore_color: Color::BLACK,
            back_color: Color::WHITE,
            listeners: ListenerRegistry::new(),
        }
    }

    //--- Properties -------------------------------------------------------

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
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

    pub fn fore_color(&self) -> Color {
        self.fore_color
    }

    pub fn set_fore_color(&mut self, color: Color) {
        self.fore_color = color;
    }

    pub fn back_color(&self) -> Color {
        self.back_color
    }

    pub fn set_back_color(&mut self, color: Color) {
        self.back_color = color;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
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
            WidgetInput::KeyDown { key: KeyCode::Enter, .. } => WidgetResponse::Fire,
            WidgetInput::KeyDown { key: KeyCode::Backspace, .. } => {
                self.text.pop();
                WidgetResponse::Consumed
            }
            WidgetInput::KeyDown { key, modifiers } => {
                focus_key(key, modifiers).unwrap_or(WidgetResponse::Consumed)
            }
            // Tab, Enter and Backspace arrive as control characters too.
            WidgetInput::Char(c) if !c.is_control() => {
                self.text.push(c);
                WidgetResponse::Consumed
            }
            _ => WidgetResponse::Consumed,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
