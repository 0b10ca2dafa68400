//=========================================================================
// Widgets
//=========================================================================
//
// Buttons and text boxes that turn host input into listener
// notifications, plus the manager that owns them and tracks focus.
//
// Routing:
// ```text
//   pointer event ──> captured button, else topmost visible widget at (x, y)
//   key / char    ──> focused widget
//                         │ handle(WidgetInput)
//                         ▼
//                    WidgetResponse
//                      Fire          ──> Routed::Fired(Caller)
//                      FocusNext/Previous, Blur, Consumed ──> Routed::Handled
//                      Ignored       ──> Routed::Unhandled (game sees it)
// ```
//
// Focus order is creation order. Focus cycling skips hidden and disabled
// widgets and wraps around at both ends.
//
//=========================================================================

mod button;
mod text_box;

//=== External Dependencies ===============================================

use log::debug;
use slotmap::SlotMap;

//=== Internal Dependencies ===============================================

use crate::core::caller::{Caller, ListenerRegistry, WidgetId};
use crate::core::geometry::Rect;
use crate::core::input::{KeyCode, Modifiers, MouseButton};

//=== Public API ==========================================================

pub use self::button::Button;
pub use self::text_box::TextBox;

//=== Shared Types ========================================================

/// Bounds of a freshly created widget.
pub const DEFAULT_BOUNDS: Rect = Rect::new(0, 0, 100, 25);

/// Font request forwarded to the host renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontSpec {
    pub name: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub size: u32,
}

/// Input delivered to a single widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetInput {
    PointerDown { button: MouseButton, x: i32, y: i32 },
    PointerUp { button: MouseButton, x: i32, y: i32 },
    DoubleClick { button: MouseButton, x: i32, y: i32 },
    KeyDown { key: KeyCode, modifiers: Modifiers },
    Char(char),
}

/// What a widget did with an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetResponse {
    /// Notify the widget's listeners.
    Fire,
    FocusNext,
    FocusPrevious,
    /// Give focus back to the game window.
    Blur,
    Consumed,
    /// Disabled or hidden; the input falls through to the game.
    Ignored,
}

/// Tab, Shift+Tab and Escape handling shared by every widget.
fn focus_key(key: KeyCode, modifiers: Modifiers) -> Option<WidgetResponse> {
    match key {
        KeyCode::Tab if modifiers.shift => Some(WidgetResponse::FocusPrevious),
        KeyCode::Tab => Some(WidgetResponse::FocusNext),
        KeyCode::Escape => Some(WidgetResponse::Blur),
        _ => None,
    }
}

//=== Widget ==============================================================

#[derive(Debug, Clone)]
pub enum Widget {
    Button(Button),
    TextBox(TextBox),
}

impl Widget {
    pub fn bounds(&self) -> Rect {
        match self {
            Self::Button(b) => b.bounds(),
            Self::TextBox(t) => t.bounds(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Button(b) => b.is_enabled(),
            Self::TextBox(t) => t.is_enabled(),
        }
    }

    pub fn is_visible(&self) -> bool {
        match self {
            Self::Button(b) => b.is_visible(),
            Self::TextBox(t) => t.is_visible(),
        }
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        match self {
            Self::Button(b) => b.listeners(),
            Self::TextBox(t) => t.listeners(),
        }
    }

    pub fn listeners_mut(&mut self) -> &mut ListenerRegistry {
        match self {
            Self::Button(b) => b.listeners_mut(),
            Self::TextBox(t) => t.listeners_mut(),
        }
    }

    fn handle(&mut self, input: WidgetInput) -> WidgetResponse {
        match self {
            Self::Button(b) => b.handle(input),
            Self::TextBox(t) => t.handle(input),
        }
    }

    fn caller(&self, id: WidgetId) -> Caller {
        match self {
            Self::Button(_) => Caller::Button(id),
            Self::TextBox(_) => Caller::TextBox(id),
        }
    }

    fn can_focus(&self) -> bool {
        self.is_enabled() && self.is_visible()
    }
}

//=== Routed ==============================================================

/// Outcome of routing host input through the widget layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routed {
    /// No widget took the input; forward it to the game.
    Unhandled,
    Handled,
    /// A widget fired; notify this caller's listeners.
    Fired(Caller),
}

//=== WidgetManager =======================================================

#[derive(Debug, Default)]
pub struct WidgetManager {
    widgets: SlotMap<WidgetId, Widget>,
    order: Vec<WidgetId>,
    focused: Option<WidgetId>,
    captured: Option<WidgetId>,
}

impl WidgetManager {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Ownership --------------------------------------------------------

    pub fn create_button(&mut self, label: impl Into<String>) -> WidgetId {
        self.insert(Widget::Button(Button::new(label)))
    }

    pub fn create_text_box(&mut self, text: impl Into<String>) -> WidgetId {
        self.insert(Widget::TextBox(TextBox::new(text)))
    }

    fn insert(&mut self, widget: Widget) -> WidgetId {
        let id = self.widgets.insert(widget);
        self.order.push(id);
        id
    }

    pub fn remove(&mut self, id: WidgetId) -> Option<Widget> {
        let widget = self.widgets.remove(id)?;
        self.order.retain(|w| *w != id);
        if self.focused == Some(id) {
            self.focused = None;
        }
        if self.captured == Some(id) {
            self.captured = None;
        }
        Some(widget)
    }

    pub fn get(&self, id: WidgetId) -> Option<&Widget> {
        self.widgets.get(id)
    }

    pub fn get_mut(&mut self, id: WidgetId) -> Option<&mut Widget> {
        self.widgets.get_mut(id)
    }

    pub fn button(&self, id: WidgetId) -> Option<&Button> {
        match self.widgets.get(id)? {
            Widget::Button(b) => Some(b),
            Widget::TextBox(_) => None,
        }
    }

    pub fn button_mut(&mut self, id: WidgetId) -> Option<&mut Button> {
        match self.widgets.get_mut(id)? {
            Widget::Button(b) => Some(b),
            Widget::TextBox(_) => None,
        }
    }

    pub fn text_box(&self, id: WidgetId) -> Option<&TextBox> {
        match self.widgets.get(id)? {
            Widget::TextBox(t) => Some(t),
            Widget::Button(_) => None,
        }
    }

    pub fn text_box_mut(&mut self, id: WidgetId) -> Option<&mut TextBox> {
        match self.widgets.get_mut(id)? {
            Widget::TextBox(t) => Some(t),
            Widget::Button(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Topmost (most recently created) visible widget containing the point.
    pub fn widget_at(&self, x: i32, y: i32) -> Option<WidgetId> {
        self.order.iter().rev().copied().find(|id| {
            self.widgets
                .get(*id)
                .is_some_and(|w| w.is_visible() && w.bounds().contains(x, y))
        })
    }

    //--- Focus ------------------------------------------------------------

    /// The focused widget, as long as it can still take input.
    pub fn focused(&self) -> Option<WidgetId> {
        self.focused.filter(|id| self.can_focus(*id))
    }

    /// Focuses `id`. Returns `false` if it is unknown, hidden or disabled.
    pub fn focus(&mut self, id: WidgetId) -> bool {
        if !self.can_focus(id) {
            return false;
        }
        self.focused = Some(id);
        true
    }

    pub fn clear_focus(&mut self) {
        self.focused = None;
    }

    pub fn focus_next(&mut self) -> Option<WidgetId> {
        self.cycle_focus(true)
    }

    pub fn focus_previous(&mut self) -> Option<WidgetId> {
        self.cycle_focus(false)
    }

    fn can_focus(&self, id: WidgetId) -> bool {
        self.widgets.get(id).is_some_and(Widget::can_focus)
    }

    fn cycle_focus(&mut self, forward: bool) -> Option<WidgetId> {
        let count = self.order.len();
        if count == 0 {
            self.focused = None;
            return None;
        }

        let current = self
            .focused
            .and_then(|id| self.order.iter().position(|w| *w == id));

        let next = (1..=count).find_map(|step| {
            let index = match (current, forward) {
                (Some(i), true) => (i + step) % count,
                (Some(i), false) => (i + count - step % count) % count,
                (None, true) => step - 1,
                (None, false) => count - step,
            };
            let id = self.order[index];
            self.can_focus(id).then_some(id)
        });

        self.focused = next;
        next
    }

    //--- Routing ----------------------------------------------------------

    /// Routes a pointer press, release or double click.
    ///
    /// A left release goes to the button that captured the left press even
    /// when the pointer has left it. Other releases leave the capture alone.
    pub fn route_pointer(&mut self, input: WidgetInput) -> Routed {
        let (x, y) = match input {
            WidgetInput::PointerDown { x, y, .. }
            | WidgetInput::PointerUp { x, y, .. }
            | WidgetInput::DoubleClick { x, y, .. } => (x, y),
            _ => return Routed::Unhandled,
        };

        let is_release = matches!(input, WidgetInput::PointerUp { .. });
        let target = match input {
            WidgetInput::PointerUp { button: MouseButton::Left, .. } => {
                self.captured.take().or_else(|| self.widget_at(x, y))
            }
            _ => self.widget_at(x, y),
        };
        let Some(id) = target else {
            return Routed::Unhandled;
        };

        let routed = self.deliver(id, input);

        if !is_release && routed != Routed::Unhandled {
            self.focus(id);
            if matches!(self.button(id), Some(b) if b.is_armed()) {
                self.captured = Some(id);
            }
        }
        routed
    }

    /// Routes a key press to the focused widget.
    pub fn route_key(&mut self, key: KeyCode, modifiers: Modifiers) -> Routed {
        match self.focused() {
            Some(id) => self.deliver(id, WidgetInput::KeyDown { key, modifiers }),
            None => Routed::Unhandled,
        }
    }

    /// Routes a typed character to the focused widget.
    pub fn route_char(&mut self, c: char) -> Routed {
        match self.focused() {
            Some(id) => self.deliver(id, WidgetInput::Char(c)),
            None => Routed::Unhandled,
        }
    }

    fn deliver(&mut self, id: WidgetId, input: WidgetInput) -> Routed {
        let Some(widget) = self.widgets.get_mut(id) else {
            return Routed::Unhandled;
        };
        let caller = widget.caller(id);

        match widget.handle(input) {
            WidgetResponse::Fire => {
                debug!(target: "widget", "{:?} fired", caller);
                Routed::Fired(caller)
            }
            WidgetResponse::FocusNext => {
                self.focus_next();
                Routed::Handled
            }
            WidgetResponse::FocusPrevious => {
                self.focus_previous();
                Routed::Handled
            }
            WidgetResponse::Blur => {
                self.clear_focus();
                Routed::Handled
            }
            WidgetResponse::Consumed => Routed::Handled,
            WidgetResponse::Ignored => Routed::Unhandled,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    //--- Test Helpers -----------------------------------------------------

    fn place(manager: &mut WidgetManager, id: WidgetId, bounds: Rect) {
        match manager.get_mut(id).unwrap() {
            Widget::Button(b) => {
                b.set_bounds(bounds);
                b.show();
            }
            Widget::TextBox(t) => {
                t.set_bounds(bounds);
                t.show();
            }
        }
    }

    fn three_widgets() -> (WidgetManager, [WidgetId; 3]) {
        let mut manager = WidgetManager::new();
        let a = manager.create_button("a");
        let b = manager.create_text_box("b");
        let c = manager.create_button("c");
        place(&mut manager, a, Rect::new(0, 0, 50, 20));
        place(&mut manager, b, Rect::new(0, 30, 50, 50));
        place(&mut manager, c, Rect::new(0, 60, 50, 80));
        (manager, [a, b, c])
    }

    fn left(kind: fn(MouseButton, i32, i32) -> WidgetInput, x: i32, y: i32) -> WidgetInput {
        kind(MouseButton::Left, x, y)
    }

    fn down(button: MouseButton, x: i32, y: i32) -> WidgetInput {
        WidgetInput::PointerDown { button, x, y }
    }

    fn up(button: MouseButton, x: i32, y: i32) -> WidgetInput {
        WidgetInput::PointerUp { button, x, y }
    }

    //=====================================================================
    // Hit Tests
    //=====================================================================

    #[test]
    fn widget_at_ignores_hidden() {
        let mut manager = WidgetManager::new();
        let id = manager.create_button("hidden");
        assert_eq!(manager.widget_at(10, 10), None);

        manager.button_mut(id).unwrap().show();
        assert_eq!(manager.widget_at(10, 10), Some(id));
    }

    #[test]
    fn widget_at_prefers_topmost() {
        let mut manager = WidgetManager::new();
        let below = manager.create_button("below");
        let above = manager.create_button("above");
        place(&mut manager, below, Rect::new(0, 0, 100, 100));
        place(&mut manager, above, Rect::new(10, 10, 20, 20));

        assert_eq!(manager.widget_at(15, 15), Some(above));
        assert_eq!(manager.widget_at(50, 50), Some(below));
    }

    //=====================================================================
    // Focus Tests
    //=====================================================================

    #[test]
    fn focus_cycles_in_creation_order_and_wraps() {
        let (mut manager, [a, b, c]) = three_widgets();

        assert_eq!(manager.focus_next(), Some(a));
        assert_eq!(manager.focus_next(), Some(b));
        assert_eq!(manager.focus_next(), Some(c));
        assert_eq!(manager.focus_next(), Some(a));
        assert_eq!(manager.focus_previous(), Some(c));
    }

    #[test]
    fn focus_previous_from_nothing_starts_at_end() {
        let (mut manager, [_, _, c]) = three_widgets();
        assert_eq!(manager.focus_previous(), Some(c));
    }

    #[test]
    fn focus_skips_disabled_and_hidden() {
        let (mut manager, [a, b, c]) = three_widgets();
        manager.text_box_mut(b).unwrap().set_enabled(false);
        manager.button_mut(c).unwrap().hide();

        manager.focus(a);
        assert_eq!(manager.focus_next(), Some(a));
        assert!(!manager.focus(b));
    }

    #[test]
    fn focus_is_lost_when_widget_disabled() {
        let (mut manager, [a, _, _]) = three_widgets();
        manager.focus(a);
        manager.button_mut(a).unwrap().set_enabled(false);
        assert_eq!(manager.focused(), None);
    }

    #[test]
    fn no_focusable_widget_clears_focus() {
        let mut manager = WidgetManager::new();
        manager.create_button("hidden");
        assert_eq!(manager.focus_next(), None);
        assert_eq!(manager.focused(), None);
    }

    //=====================================================================
    // Routing Tests
    //=====================================================================

    #[test]
    fn click_on_button_fires_and_focuses() {
        let (mut manager, [a, _, _]) = three_widgets();

        assert_eq!(manager.route_pointer(left(down, 5, 5)), Routed::Handled);
        assert_eq!(manager.focused(), Some(a));
        assert_eq!(manager.route_pointer(left(up, 6, 6)), Routed::Fired(Caller::Button(a)));
    }

    #[test]
    fn release_outside_goes_to_captured_button() {
        let (mut manager, [a, _, _]) = three_widgets();

        manager.route_pointer(left(down, 5, 5));
        assert_eq!(manager.route_pointer(left(up, 300, 300)), Routed::Handled);
        assert!(!manager.button(a).unwrap().is_armed());
    }

    #[test]
    fn other_button_release_keeps_left_capture() {
        let (mut manager, [a, _, _]) = three_widgets();

        manager.route_pointer(left(down, 5, 5));
        assert_eq!(manager.route_pointer(up(MouseButton::Right, 300, 300)), Routed::Unhandled);
        assert!(manager.button(a).unwrap().is_armed());

        assert_eq!(manager.route_pointer(left(up, 300, 300)), Routed::Handled);
        assert!(!manager.button(a).unwrap().is_armed());

        // a press elsewhere dragged onto the button must not fire it
        assert_eq!(manager.route_pointer(left(down, 300, 5)), Routed::Unhandled);
        assert_eq!(manager.route_pointer(left(up, 5, 5)), Routed::Handled);
    }

    #[test]
    fn click_on_empty_space_is_unhandled() {
        let (mut manager, _) = three_widgets();
        assert_eq!(manager.route_pointer(left(down, 300, 5)), Routed::Unhandled);
        assert_eq!(manager.focused(), None);
    }

    #[test]
    fn click_on_disabled_widget_falls_through() {
        let (mut manager, [a, _, _]) = three_widgets();
        manager.button_mut(a).unwrap().set_enabled(false);
        assert_eq!(manager.route_pointer(left(down, 5, 5)), Routed::Unhandled);
    }

    #[test]
    fn keys_go_to_focused_widget() {
        let (mut manager, [a, b, _]) = three_widgets();
        assert_eq!(manager.route_key(KeyCode::Space, Modifiers::NONE), Routed::Unhandled);

        manager.focus(a);
        assert_eq!(
            manager.route_key(KeyCode::Space, Modifiers::NONE),
            Routed::Fired(Caller::Button(a))
        );

        assert_eq!(manager.route_key(KeyCode::Tab, Modifiers::NONE), Routed::Handled);
        assert_eq!(manager.focused(), Some(b));
        assert_eq!(
            manager.route_key(KeyCode::Enter, Modifiers::NONE),
            Routed::Fired(Caller::TextBox(b))
        );

        assert_eq!(manager.route_key(KeyCode::Escape, Modifiers::NONE), Routed::Handled);
        assert_eq!(manager.focused(), None);
    }

    #[test]
    fn chars_edit_focused_text_box() {
        let (mut manager, [_, b, _]) = three_widgets();
        manager.focus(b);
        manager.route_char('!');
        assert_eq!(manager.text_box(b).unwrap().text(), "b!");
    }

    #[test]
    fn remove_clears_focus_and_order() {
        let (mut manager, [a, b, _]) = three_widgets();
        manager.focus(a);
        assert!(manager.remove(a).is_some());
        assert_eq!(manager.focused(), None);
        assert_eq!(manager.focus_next(), Some(b));
        assert_eq!(manager.len(), 2);
    }
}
