//=========================================================================
// Context
//=========================================================================
//
// Engine services handed to every handler hook and listener.
//
// Ownership:
//   Dispatcher
//     ├─ Handler (game code)
//     └─ Context
//          ├─ EngineConfig, client rect, focus flag
//          ├─ KeyboardState + KeyMonitor
//          ├─ TimerService / WidgetManager / AudioService
//          └─ pending: VecDeque<Caller>   (notifications awaiting delivery)
//
// Sources never reach listeners themselves. Firing only pushes a `Caller`
// onto `pending`, and the dispatcher drains it.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::VecDeque;

use log::{debug, info};

//=== Internal Dependencies ===============================================

use super::config::EngineConfig;
use crate::core::audio::AudioService;
use crate::core::caller::{Caller, ListenerRegistry};
use crate::core::geometry::Rect;
use crate::core::input::{KeyCode, KeyMonitor, KeyboardState};
use crate::core::timer::TimerService;
use crate::core::widget::WidgetManager;

//=== Context =============================================================

/// Host services available while the engine runs.
pub struct Context {
    config: EngineConfig,
    client: Rect,
    focused: bool,
    keyboard: KeyboardState,
    key_monitor: KeyMonitor,

    pub timers: TimerService,
    pub widgets: WidgetManager,
    pub audio: AudioService,

    pending: VecDeque<Caller>,
    quit: bool,
}

impl Context {
    //--- Construction -----------------------------------------------------

    pub fn new(config: EngineConfig, timers: TimerService, audio: AudioService) -> Self {
        let client = Rect::from_origin_size(0, 0, config.width as i32, config.height as i32);
        let mut key_monitor = KeyMonitor::new();
        key_monitor.set_key_list(config.key_list().iter().copied());

        Self {
            config,
            client,
            focused: true,
            keyboard: KeyboardState::new(),
            key_monitor,
            timers,
            widgets: WidgetManager::new(),
            audio,
            pending: VecDeque::new(),
            quit: false,
        }
    }

    //--- Window -----------------------------------------------------------

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Drawable area, origin at the top-left corner.
    pub fn client_rect(&self) -> Rect {
        self.client
    }

    pub(crate) fn set_client_size(&mut self, width: u32, height: u32) {
        self.config.width = width;
        self.config.height = height;
        self.client = Rect::from_origin_size(0, 0, width as i32, height as i32);
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.config.title = title.into();
    }

    /// Changes the frame rate from the next frame on.
    pub fn set_frame_rate(&mut self, fps: u32) -> bool {
        let changed = self.config.set_frame_rate(fps);
        if changed {
            debug!(target: "engine", "Frame rate set to {} fps", fps);
        }
        changed
    }

    /// Whether the game window has keyboard focus.
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub(crate) fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        if !focused {
            self.keyboard.clear();
            self.key_monitor.reset();
        }
    }

    /// Asks the engine to close the window after the current event.
    pub fn quit(&mut self) {
        info!(target: "engine", "Quit requested");
        self.quit = true;
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    //--- Keyboard ---------------------------------------------------------

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keyboard.is_key_down(key)
    }

    pub fn keyboard(&self) -> &KeyboardState {
        &self.keyboard
    }

    pub(crate) fn keyboard_mut(&mut self) -> &mut KeyboardState {
        &mut self.keyboard
    }

    /// Keys reported through `Handler::key_pressed`, from characters.
    pub fn set_key_list(&mut self, keys: &str) {
        self.config.set_key_list(keys);
        self.key_monitor
            .set_key_list(self.config.key_list().iter().copied());
    }

    pub fn set_keys<I>(&mut self, keys: I)
    where
        I: IntoIterator<Item = KeyCode>,
    {
        self.config.set_keys(keys);
        self.key_monitor
            .set_key_list(self.config.key_list().iter().copied());
    }

    /// Watched keys released since the last call.
    pub(crate) fn poll_released_keys(&mut self) -> Vec<KeyCode> {
        self.key_monitor.poll(&self.keyboard)
    }

    //--- Notifications ----------------------------------------------------

    /// Queues a notification for `caller`'s listeners.
    pub fn notify(&mut self, caller: Caller) {
        self.pending.push_back(caller);
    }

    pub fn pending_notifications(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn next_pending(&mut self) -> Option<Caller> {
        self.pending.pop_front()
    }

    /// Pruned copy of the listeners registered on `caller`, or `None` if
    /// the source has been destroyed.
    pub(crate) fn listeners_of(&mut self, caller: Caller) -> Option<ListenerRegistry> {
        let registry = match caller {
            Caller::Timer(id) => self.timers.get_mut(id)?.listeners_mut(),
            Caller::Button(id) | Caller::TextBox(id) => self.widgets.get_mut(id)?.listeners_mut(),
            Caller::Audio(id) => self.audio.get_mut(id)?.listeners_mut(),
        };
        Some(registry.snapshot())
    }
}

//=== Test Support ========================================================

#[cfg(test)]
pub(crate) fn headless() -> (Context, std::sync::Arc<crate::core::timer::ManualScheduler>) {
    use std::sync::Arc;

    use crate::core::timer::ManualScheduler;

    let (scheduler, fired) = ManualScheduler::new();
    let scheduler = Arc::new(scheduler);
    let timers = TimerService::new(scheduler.clone(), fired);
    let ctx = Context::new(EngineConfig::new(), timers, AudioService::default());
    (ctx, scheduler)
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::caller::Target;
    use crate::core::input::Modifiers;

    #[test]
    fn client_rect_follows_config() {
        let (mut ctx, _) = headless();
        assert_eq!(ctx.client_rect(), Rect::new(0, 0, 640, 480));

        ctx.set_client_size(800, 600);
        assert_eq!(ctx.client_rect(), Rect::new(0, 0, 800, 600));
        assert_eq!(ctx.config().width, 800);
    }

    #[test]
    fn losing_focus_releases_keys() {
        let (mut ctx, _) = headless();
        ctx.keyboard_mut().press(KeyCode::KeyA, Modifiers::NONE);
        assert!(ctx.is_key_down(KeyCode::KeyA));

        ctx.set_focused(false);
        assert!(!ctx.is_key_down(KeyCode::KeyA));
        assert!(!ctx.is_focused());
    }

    #[test]
    fn key_list_reaches_monitor() {
        let (mut ctx, _) = headless();
        ctx.set_key_list("p");

        ctx.keyboard_mut().press(KeyCode::KeyP, Modifiers::NONE);
        assert!(ctx.poll_released_keys().is_empty());
        ctx.keyboard_mut().release(KeyCode::KeyP, Modifiers::NONE);
        assert_eq!(ctx.poll_released_keys(), vec![KeyCode::KeyP]);
    }

    #[test]
    fn notifications_queue_in_order() {
        let (mut ctx, _) = headless();
        let a = ctx.timers.create(10, true, None);
        let b = ctx.widgets.create_button("b");

        ctx.notify(Caller::Timer(a));
        ctx.notify(Caller::Button(b));
        assert_eq!(ctx.pending_notifications(), 2);
        assert_eq!(ctx.next_pending(), Some(Caller::Timer(a)));
        assert_eq!(ctx.next_pending(), Some(Caller::Button(b)));
        assert_eq!(ctx.next_pending(), None);
    }

    #[test]
    fn listeners_of_destroyed_source_is_none() {
        let (mut ctx, _) = headless();
        let id = ctx.timers.create(10, true, Some(Target::handler()));
        assert_eq!(ctx.listeners_of(Caller::Timer(id)).map(|r| r.len()), Some(1));

        ctx.timers.destroy(id);
        assert!(ctx.listeners_of(Caller::Timer(id)).is_none());
    }

    #[test]
    fn quit_is_sticky() {
        let (mut ctx, _) = headless();
        assert!(!ctx.quit_requested());
        ctx.quit();
        assert!(ctx.quit_requested());
    }
}
