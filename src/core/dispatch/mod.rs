//=========================================================================
// Dispatcher
//=========================================================================
//
// Routes host events and frame ticks to the single active game handler.
//
// Event Flow:
// ```text
//   HostEvent ──> Dispatcher::dispatch
//                   ├─ Create / Destroy      ──> Handler::start / end
//                   ├─ pointer, key, char    ──> WidgetManager (first)
//                   │                              └─ unhandled ──> Handler hooks
//                   ├─ KeyDown / KeyUp       ──> KeyboardState (always)
//                   └─ PlaybackFinished      ──> AudioService
//
//   Dispatcher::frame (once per frame delay, after Create)
//     1. drain timer firings          4. Handler::tick
//     2. deliver notifications        5. Handler::check_keyboard + key monitor
//     3. Handler::paint               6. audio pump, deliver notifications
// ```
//
// Notification delivery walks a snapshot of the source's listeners taken
// before the first callback. Listeners added during a pass wait for the
// next one. A listener that is already borrowed (it fired something that
// fired back into it) is skipped.
//
//=========================================================================

mod config;
mod context;
mod event_collector;
mod script;

//=== External Dependencies ===============================================

use log::{debug, trace, warn};

//=== Internal Dependencies ===============================================

use crate::core::caller::{Caller, Target};
use crate::core::geometry::Rect;
use crate::core::input::{HostEvent, KeyCode, Modifiers, MouseButton};
use crate::core::widget::{Routed, WidgetInput};

//=== Public API ==========================================================

pub use self::config::{
    EngineConfig, DEFAULT_FRAME_RATE, DEFAULT_HEIGHT, DEFAULT_TITLE, DEFAULT_WIDTH,
};
pub use self::context::Context;
pub use self::script::{names as script_names, ScriptArgs, ScriptHandler};

pub(crate) use self::event_collector::{EventCollector, TickControl};

#[cfg(test)]
pub(crate) use self::context::headless;

//=== MouseAction =========================================================

/// A left or right button press or release over the game window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseAction {
    pub is_left: bool,
    pub is_down: bool,
    pub x: i32,
    pub y: i32,
    pub modifiers: Modifiers,
}

//=== Handler =============================================================

/// Game code driven by the dispatcher.
///
/// Every hook except [`Handler::tick`] defaults to doing nothing.
pub trait Handler {
    /// Runs once before the run loop starts. May change the configuration.
    fn initialize(&mut self, _config: &mut EngineConfig) {}

    /// The window exists.
    fn start(&mut self, _ctx: &mut Context) {}

    /// The window is closing.
    fn end(&mut self, _ctx: &mut Context) {}

    /// Per-frame game logic.
    fn tick(&mut self, ctx: &mut Context);

    /// Draws the frame. `area` is the client rect.
    fn paint(&mut self, _ctx: &mut Context, _area: Rect) {}

    fn mouse_button_action(&mut self, _ctx: &mut Context, _action: MouseAction) {}

    /// `delta` is in wheel units, 120 per notch.
    fn mouse_wheel_action(
        &mut self,
        _ctx: &mut Context,
        _x: i32,
        _y: i32,
        _delta: i32,
        _modifiers: Modifiers,
    ) {
    }

    fn mouse_move(&mut self, _ctx: &mut Context, _x: i32, _y: i32, _modifiers: Modifiers) {}

    /// Called once per frame to poll held keys through [`Context::is_key_down`].
    fn check_keyboard(&mut self, _ctx: &mut Context) {}

    /// A key from the key list was released.
    fn key_pressed(&mut self, _ctx: &mut Context, _key: KeyCode) {}

    /// A timer, widget or audio source this handler listens to fired.
    fn call_action(&mut self, _ctx: &mut Context, _caller: Caller) {}
}

//=== Dispatcher ==========================================================

/// Owns the handler and its context and drives both.
pub struct Dispatcher<H: Handler> {
    handler: H,
    ctx: Context,
    started: bool,
    ended: bool,
}

impl<H: Handler> Dispatcher<H> {
    pub fn new(handler: H, ctx: Context) -> Self {
        Self {
            handler,
            ctx,
            started: false,
            ended: false,
        }
    }

    //--- Accessors --------------------------------------------------------

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.ctx
    }

    /// `Create` has been dispatched.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// `Destroy` has been dispatched; no more frames run.
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn into_handler(self) -> H {
        self.handler
    }

    //--- Events -----------------------------------------------------------

    /// Routes one host event, then delivers any notifications it caused.
    pub fn dispatch(&mut self, event: HostEvent) {
        if self.ended {
            trace!(target: "dispatch", "Dropping {:?} after Destroy", event);
            return;
        }

        match event {
            HostEvent::Create => {
                if !self.started {
                    debug!(target: "dispatch", "start");
                    self.started = true;
                    self.handler.start(&mut self.ctx);
                }
            }
            HostEvent::Destroy => {
                debug!(target: "dispatch", "end");
                self.ended = true;
                self.handler.end(&mut self.ctx);
            }
            HostEvent::Paint => {
                let area = self.ctx.client_rect();
                self.handler.paint(&mut self.ctx, area);
            }
            HostEvent::Resize { width, height } => {
                self.ctx.set_client_size(width, height);
            }
            HostEvent::Focus(focused) => {
                self.ctx.set_focused(focused);
            }

            HostEvent::MouseDown { button, x, y, modifiers } => {
                let routed = self.ctx.widgets.route_pointer(WidgetInput::PointerDown { button, x, y });
                self.pointer(routed, button, true, x, y, modifiers);
            }
            HostEvent::MouseUp { button, x, y, modifiers } => {
                let routed = self.ctx.widgets.route_pointer(WidgetInput::PointerUp { button, x, y });
                self.pointer(routed, button, false, x, y, modifiers);
            }
            HostEvent::DoubleClick { button, x, y, modifiers } => {
                let routed = self.ctx.widgets.route_pointer(WidgetInput::DoubleClick { button, x, y });
                self.pointer(routed, button, true, x, y, modifiers);
            }
            HostEvent::MouseMove { x, y, modifiers } => {
                self.handler.mouse_move(&mut self.ctx, x, y, modifiers);
            }
            HostEvent::MouseWheel { x, y, delta, modifiers } => {
                self.handler
                    .mouse_wheel_action(&mut self.ctx, x, y, delta, modifiers);
            }

            HostEvent::KeyDown { key, modifiers } => {
                self.ctx.keyboard_mut().press(key, modifiers);
                let routed = self.ctx.widgets.route_key(key, modifiers);
                self.widget_fired(routed);
            }
            HostEvent::KeyUp { key, modifiers } => {
                self.ctx.keyboard_mut().release(key, modifiers);
            }
            HostEvent::Char(c) => {
                let routed = self.ctx.widgets.route_char(c);
                self.widget_fired(routed);
            }

            HostEvent::PlaybackFinished(id) => {
                if let Some(caller) = self.ctx.audio.playback_finished(id) {
                    self.ctx.notify(caller);
                }
            }
        }

        self.deliver();
    }

    fn pointer(
        &mut self,
        routed: Routed,
        button: MouseButton,
        is_down: bool,
        x: i32,
        y: i32,
        modifiers: Modifiers,
    ) {
        if routed != Routed::Unhandled {
            self.widget_fired(routed);
            return;
        }

        let is_left = match button {
            MouseButton::Left => true,
            MouseButton::Right => false,
            MouseButton::Middle | MouseButton::Other => return,
        };
        let action = MouseAction {
            is_left,
            is_down,
            x,
            y,
            modifiers,
        };
        self.handler.mouse_button_action(&mut self.ctx, action);
    }

    fn widget_fired(&mut self, routed: Routed) {
        if let Routed::Fired(caller) = routed {
            self.ctx.notify(caller);
        }
    }

    //--- Frames -----------------------------------------------------------

    /// Runs one frame. Returns `false` (and does nothing) before `Create`
    /// or after `Destroy`.
    pub fn frame(&mut self) -> bool {
        if !self.started || self.ended {
            return false;
        }

        for caller in self.ctx.timers.drain_fired() {
            self.ctx.notify(caller);
        }
        self.deliver();

        let area = self.ctx.client_rect();
        self.handler.paint(&mut self.ctx, area);
        self.handler.tick(&mut self.ctx);

        self.handler.check_keyboard(&mut self.ctx);
        if self.ctx.is_focused() {
            for key in self.ctx.poll_released_keys() {
                self.handler.key_pressed(&mut self.ctx, key);
            }
        }

        self.ctx.audio.pump();
        self.deliver();
        true
    }

    //--- Delivery ---------------------------------------------------------

    /// Delivers queued notifications until the queue is empty, including
    /// any queued by the listeners themselves.
    pub fn deliver(&mut self) {
        while let Some(caller) = self.ctx.next_pending() {
            let Some(listeners) = self.ctx.listeners_of(caller) else {
                trace!(target: "dispatch", "{:?} was destroyed before delivery", caller);
                continue;
            };

            let handler = &mut self.handler;
            let ctx = &mut self.ctx;
            let notified = listeners.notify_all(|target| match target {
                Target::Handler => handler.call_action(ctx, caller),
                Target::Object(_) => {
                    let Some(listener) = target.upgrade() else {
                        return;
                    };
                    let Ok(mut listener) = listener.try_borrow_mut() else {
                        warn!(target: "dispatch", "Listener busy, skipped {:?}", caller);
                        return;
                    };
                    listener.call_action(ctx, caller);
                }
            });

            if !notified {
                trace!(target: "dispatch", "{:?} fired with no listeners", caller);
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::caller::Listener;
    use std::cell::RefCell;
    use std::rc::Rc;

    //--- Test Helpers -----------------------------------------------------

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Start,
        End,
        Tick,
        Paint(Rect),
        Mouse(MouseAction),
        Wheel(i32),
        Move(i32, i32),
        CheckKeyboard,
        KeyPressed(KeyCode),
        Action(Caller),
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
    }

    impl Recorder {
        fn take(&mut self) -> Vec<Call> {
            std::mem::take(&mut self.calls)
        }
    }

    impl Handler for Recorder {
        fn start(&mut self, _ctx: &mut Context) {
            self.calls.push(Call::Start);
        }
        fn end(&mut self, _ctx: &mut Context) {
            self.calls.push(Call::End);
        }
        fn tick(&mut self, _ctx: &mut Context) {
            self.calls.push(Call::Tick);
        }
        fn paint(&mut self, _ctx: &mut Context, area: Rect) {
            self.calls.push(Call::Paint(area));
        }
        fn mouse_button_action(&mut self, _ctx: &mut Context, action: MouseAction) {
            self.calls.push(Call::Mouse(action));
        }
        fn mouse_wheel_action(&mut self, _: &mut Context, _: i32, _: i32, delta: i32, _: Modifiers) {
            self.calls.push(Call::Wheel(delta));
        }
        fn mouse_move(&mut self, _ctx: &mut Context, x: i32, y: i32, _modifiers: Modifiers) {
            self.calls.push(Call::Move(x, y));
        }
        fn check_keyboard(&mut self, _ctx: &mut Context) {
            self.calls.push(Call::CheckKeyboard);
        }
        fn key_pressed(&mut self, _ctx: &mut Context, key: KeyCode) {
            self.calls.push(Call::KeyPressed(key));
        }
        fn call_action(&mut self, _ctx: &mut Context, caller: Caller) {
            self.calls.push(Call::Action(caller));
        }
    }

    fn started() -> (Dispatcher<Recorder>, std::sync::Arc<crate::core::timer::ManualScheduler>) {
        let (ctx, scheduler) = headless();
        let mut dispatcher = Dispatcher::new(Recorder::default(), ctx);
        dispatcher.dispatch(HostEvent::Create);
        dispatcher.handler_mut().take();
        (dispatcher, scheduler)
    }

    fn mouse_down(button: MouseButton, x: i32, y: i32) -> HostEvent {
        HostEvent::MouseDown { button, x, y, modifiers: Modifiers::NONE }
    }

    fn mouse_up(button: MouseButton, x: i32, y: i32) -> HostEvent {
        HostEvent::MouseUp { button, x, y, modifiers: Modifiers::NONE }
    }

    fn key_down(key: KeyCode) -> HostEvent {
        HostEvent::KeyDown { key, modifiers: Modifiers::NONE }
    }

    fn key_up(key: KeyCode) -> HostEvent {
        HostEvent::KeyUp { key, modifiers: Modifiers::NONE }
    }

    //=====================================================================
    // Lifecycle Tests
    //=====================================================================

    #[test]
    fn frames_wait_for_create() {
        let (ctx, _) = headless();
        let mut dispatcher = Dispatcher::new(Recorder::default(), ctx);

        assert!(!dispatcher.frame());
        assert!(dispatcher.handler().calls.is_empty());

        dispatcher.dispatch(HostEvent::Create);
        assert!(dispatcher.frame());
        assert_eq!(
            dispatcher.handler_mut().take(),
            vec![
                Call::Start,
                Call::Paint(Rect::new(0, 0, 640, 480)),
                Call::Tick,
                Call::CheckKeyboard,
            ]
        );
    }

    #[test]
    fn create_starts_once() {
        let (mut dispatcher, _) = started();
        dispatcher.dispatch(HostEvent::Create);
        assert!(dispatcher.handler().calls.is_empty());
    }

    #[test]
    fn destroy_ends_and_stops_frames() {
        let (mut dispatcher, _) = started();
        dispatcher.dispatch(HostEvent::Destroy);
        assert!(dispatcher.is_ended());
        assert!(!dispatcher.frame());

        dispatcher.dispatch(HostEvent::Paint);
        assert_eq!(dispatcher.handler_mut().take(), vec![Call::End]);
    }

    #[test]
    fn resize_changes_paint_area() {
        let (mut dispatcher, _) = started();
        dispatcher.dispatch(HostEvent::Resize { width: 320, height: 200 });
        dispatcher.dispatch(HostEvent::Paint);
        assert_eq!(
            dispatcher.handler_mut().take(),
            vec![Call::Paint(Rect::new(0, 0, 320, 200))]
        );
    }

    //=====================================================================
    // Pointer Tests
    //=====================================================================

    #[test]
    fn only_left_and_right_buttons_reach_handler() {
        let (mut dispatcher, _) = started();
        dispatcher.dispatch(mouse_down(MouseButton::Left, 1, 2));
        dispatcher.dispatch(mouse_up(MouseButton::Right, 3, 4));
        dispatcher.dispatch(mouse_down(MouseButton::Middle, 5, 6));
        dispatcher.dispatch(mouse_down(MouseButton::Other, 7, 8));

        let calls = dispatcher.handler_mut().take();
        assert_eq!(
            calls,
            vec![
                Call::Mouse(MouseAction { is_left: true, is_down: true, x: 1, y: 2, modifiers: Modifiers::NONE }),
                Call::Mouse(MouseAction { is_left: false, is_down: false, x: 3, y: 4, modifiers: Modifiers::NONE }),
            ]
        );
    }

    #[test]
    fn move_and_wheel_are_forwarded() {
        let (mut dispatcher, _) = started();
        dispatcher.dispatch(HostEvent::MouseMove { x: 9, y: 10, modifiers: Modifiers::NONE });
        dispatcher.dispatch(HostEvent::MouseWheel { x: 0, y: 0, delta: -120, modifiers: Modifiers::NONE });
        assert_eq!(dispatcher.handler_mut().take(), vec![Call::Move(9, 10), Call::Wheel(-120)]);
    }

    #[test]
    fn button_click_notifies_listeners_not_mouse_hook() {
        let (mut dispatcher, _) = started();
        let ctx = dispatcher.context_mut();
        let id = ctx.widgets.create_button("ok");
        let button = ctx.widgets.button_mut(id).unwrap();
        button.show();
        button.listeners_mut().add_listener(Target::handler());

        dispatcher.dispatch(mouse_down(MouseButton::Left, 10, 10));
        dispatcher.dispatch(mouse_up(MouseButton::Left, 12, 12));
        assert_eq!(
            dispatcher.handler_mut().take(),
            vec![Call::Action(Caller::Button(id))]
        );
    }

    #[test]
    fn click_on_disabled_button_reaches_game() {
        let (mut dispatcher, _) = started();
        let ctx = dispatcher.context_mut();
        let id = ctx.widgets.create_button("off");
        let button = ctx.widgets.button_mut(id).unwrap();
        button.show();
        button.set_enabled(false);

        dispatcher.dispatch(mouse_down(MouseButton::Left, 10, 10));
        assert_eq!(dispatcher.handler().calls.len(), 1);
    }

    //=====================================================================
    // Keyboard Tests
    //=====================================================================

    #[test]
    fn key_list_fires_on_release_during_frames() {
        let (mut dispatcher, _) = started();
        dispatcher.context_mut().set_key_list("K");

        dispatcher.dispatch(key_down(KeyCode::KeyK));
        dispatcher.frame();
        assert!(dispatcher.context().is_key_down(KeyCode::KeyK));
        dispatcher.dispatch(key_up(KeyCode::KeyK));
        dispatcher.frame();

        let presses: Vec<_> = dispatcher
            .handler_mut()
            .take()
            .into_iter()
            .filter(|c| matches!(c, Call::KeyPressed(_)))
            .collect();
        assert_eq!(presses, vec![Call::KeyPressed(KeyCode::KeyK)]);
    }

    #[test]
    fn key_monitor_is_idle_without_focus() {
        let (mut dispatcher, _) = started();
        dispatcher.context_mut().set_key_list("K");

        dispatcher.dispatch(key_down(KeyCode::KeyK));
        dispatcher.frame();
        dispatcher.dispatch(HostEvent::Focus(false));
        dispatcher.frame();
        dispatcher.dispatch(HostEvent::Focus(true));
        dispatcher.frame();

        assert!(!dispatcher
            .handler()
            .calls
            .iter()
            .any(|c| matches!(c, Call::KeyPressed(_))));
    }

    #[test]
    fn enter_in_focused_text_box_notifies() {
        let (mut dispatcher, _) = started();
        let ctx = dispatcher.context_mut();
        let id = ctx.widgets.create_text_box("name");
        let text_box = ctx.widgets.text_box_mut(id).unwrap();
        text_box.show();
        text_box.listeners_mut().add_listener(Target::handler());
        ctx.widgets.focus(id);

        dispatcher.dispatch(HostEvent::Char('!'));
        dispatcher.dispatch(key_down(KeyCode::Enter));
        assert_eq!(
            dispatcher.handler_mut().take(),
            vec![Call::Action(Caller::TextBox(id))]
        );
        assert_eq!(dispatcher.context().widgets.text_box(id).unwrap().text(), "name!");
    }

    //=====================================================================
    // Delivery Tests
    //=====================================================================

    #[test]
    fn timer_firing_is_delivered_on_next_frame() {
        let (mut dispatcher, scheduler) = started();
        let id = dispatcher
            .context_mut()
            .timers
            .create(5, true, Some(Target::handler()));
        dispatcher.context_mut().timers.get_mut(id).unwrap().start();

        assert!(scheduler.fire_timer(id));
        dispatcher.frame();
        assert_eq!(dispatcher.handler().calls.first(), Some(&Call::Action(Caller::Timer(id))));
    }

    #[test]
    fn object_listeners_receive_caller() {
        let (mut dispatcher, scheduler) = started();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let listener = {
            let seen = Rc::clone(&seen);
            Rc::new(RefCell::new(move |_: &mut Context, caller: Caller| {
                seen.borrow_mut().push(caller);
            }))
        };

        let id = dispatcher
            .context_mut()
            .timers
            .create(5, false, Some(Target::object(&listener)));
        dispatcher.context_mut().timers.get_mut(id).unwrap().start();
        scheduler.fire_timer(id);
        dispatcher.frame();

        assert_eq!(*seen.borrow(), vec![Caller::Timer(id)]);
        assert!(!dispatcher.context().timers.get(id).unwrap().is_running());
    }

    struct Chain {
        next: Option<Caller>,
        hits: u32,
    }

    impl Listener for Chain {
        fn call_action(&mut self, ctx: &mut Context, _caller: Caller) {
            self.hits += 1;
            if let Some(next) = self.next.take() {
                ctx.notify(next);
            }
        }
    }

    #[test]
    fn notifications_queued_by_listeners_are_delivered() {
        let (mut dispatcher, _) = started();
        let ctx = dispatcher.context_mut();
        let first = ctx.timers.create(5, true, None);
        let second = ctx.timers.create(5, true, Some(Target::handler()));
        let chain = Rc::new(RefCell::new(Chain { next: Some(Caller::Timer(second)), hits: 0 }));
        ctx.timers
            .get_mut(first)
            .unwrap()
            .listeners_mut()
            .add_listener(Target::object(&chain));

        ctx.notify(Caller::Timer(first));
        dispatcher.deliver();

        assert_eq!(chain.borrow().hits, 1);
        assert_eq!(dispatcher.handler_mut().take(), vec![Call::Action(Caller::Timer(second))]);
    }

    #[test]
    fn busy_listener_is_skipped() {
        let (mut dispatcher, _) = started();
        let chain = Rc::new(RefCell::new(Chain { next: None, hits: 0 }));
        let ctx = dispatcher.context_mut();
        let id = ctx.timers.create(5, true, Some(Target::object(&chain)));

        let _held = chain.borrow_mut();
        ctx.notify(Caller::Timer(id));
        dispatcher.deliver();
        drop(_held);

        assert_eq!(chain.borrow().hits, 0);
    }

    #[test]
    fn dropped_listener_is_not_called() {
        let (mut dispatcher, _) = started();
        let chain = Rc::new(RefCell::new(Chain { next: None, hits: 0 }));
        let ctx = dispatcher.context_mut();
        let id = ctx.timers.create(5, true, Some(Target::object(&chain)));
        drop(chain);

        ctx.notify(Caller::Timer(id));
        dispatcher.deliver();
        assert_eq!(
            dispatcher.context().timers.get(id).unwrap().listeners().len(),
            0
        );
    }
}
