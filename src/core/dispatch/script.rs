//=========================================================================
// Script Handler
//=========================================================================
//
// A `Handler` whose hooks are closures looked up by name at call time.
//
// Scripting front ends bind their functions here under fixed names
// ("update", "draw", "mouseAction", ...). A hook with nothing bound is
// skipped, so a script only defines the callbacks it needs.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::fmt;

use log::trace;

//=== Internal Dependencies ===============================================

use super::{Context, EngineConfig, Handler, MouseAction};
use crate::core::caller::Caller;
use crate::core::geometry::Rect;
use crate::core::input::{KeyCode, Modifiers};

//=== Callback Names ======================================================

/// Callback names a `ScriptHandler` looks up for each engine hook.
pub mod names {
    pub const START: &str = "start";
    pub const END: &str = "end";
    pub const UPDATE: &str = "update";
    pub const DRAW: &str = "draw";
    pub const MOUSE_ACTION: &str = "mouseAction";
    pub const MOUSE_WHEEL_ACTION: &str = "mouseWheelAction";
    pub const MOUSE_MOVE: &str = "mouseMove";
    pub const CHECK_KEYBOARD: &str = "checkKeyboard";
    pub const KEY_PRESSED: &str = "keyPressed";
    pub const CALL_ACTION: &str = "callAction";
}

use self::names::*;

//=== ScriptArgs ==========================================================

/// Arguments passed to a script callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptArgs {
    None,
    Draw(Rect),
    Mouse(MouseAction),
    Wheel {
        x: i32,
        y: i32,
        delta: i32,
        modifiers: Modifiers,
    },
    Move {
        x: i32,
        y: i32,
        modifiers: Modifiers,
    },
    Key(KeyCode),
    Caller(Caller),
}

//=== ScriptHandler =======================================================

type Callback = Box<dyn FnMut(&mut Context, ScriptArgs)>;
type Initializer = Box<dyn FnOnce(&mut EngineConfig)>;

/// Registry of named callbacks driven as a [`Handler`].
#[derive(Default)]
pub struct ScriptHandler {
    callbacks: HashMap<String, Callback>,
    initializer: Option<Initializer>,
}

impl ScriptHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `callback` under `name`, replacing any earlier binding.
    /// Returns `true` if a binding was replaced.
    pub fn bind<F>(&mut self, name: impl Into<String>, callback: F) -> bool
    where
        F: FnMut(&mut Context, ScriptArgs) + 'static,
    {
        self.callbacks
            .insert(name.into(), Box::new(callback))
            .is_some()
    }

    /// Fluent form of [`ScriptHandler::bind`].
    pub fn with<F>(mut self, name: impl Into<String>, callback: F) -> Self
    where
        F: FnMut(&mut Context, ScriptArgs) + 'static,
    {
        self.bind(name, callback);
        self
    }

    pub fn unbind(&mut self, name: &str) -> bool {
        self.callbacks.remove(name).is_some()
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.callbacks.contains_key(name)
    }

    /// Adjusts the configuration before the run loop starts.
    pub fn on_initialize<F>(&mut self, initializer: F)
    where
        F: FnOnce(&mut EngineConfig) + 'static,
    {
        self.initializer = Some(Box::new(initializer));
    }

    /// Calls the callback bound to `name`. Returns `false` if none is.
    pub fn call(&mut self, name: &str, ctx: &mut Context, args: ScriptArgs) -> bool {
        match self.callbacks.get_mut(name) {
            Some(callback) => {
                callback(ctx, args);
                true
            }
            None => {
                trace!(target: "dispatch", "No script callback bound to {:?}", name);
                false
            }
        }
    }
}

impl fmt::Debug for ScriptHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.callbacks.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ScriptHandler")
            .field("callbacks", &names)
            .field("initializer", &self.initializer.is_some())
            .finish()
    }
}

//=== Handler Bridge ======================================================

impl Handler for ScriptHandler {
    fn initialize(&mut self, config: &mut EngineConfig) {
        if let Some(initializer) = self.initializer.take() {
            initializer(config);
        }
    }

    fn start(&mut self, ctx: &mut Context) {
        self.call(START, ctx, ScriptArgs::None);
    }

    fn end(&mut self, ctx: &mut Context) {
        self.call(END, ctx, ScriptArgs::None);
    }

    fn tick(&mut self, ctx: &mut Context) {
        self.call(UPDATE, ctx, ScriptArgs::None);
    }

    fn paint(&mut self, ctx: &mut Context, area: Rect) {
        self.call(DRAW, ctx, ScriptArgs::Draw(area));
    }

    fn mouse_button_action(&mut self, ctx: &mut Context, action: MouseAction) {
        self.call(MOUSE_ACTION, ctx, ScriptArgs::Mouse(action));
    }

    fn mouse_wheel_action(&mut self, ctx: &mut Context, x: i32, y: i32, delta: i32, modifiers: Modifiers) {
        self.call(MOUSE_WHEEL_ACTION, ctx, ScriptArgs::Wheel { x, y, delta, modifiers });
    }

    fn mouse_move(&mut self, ctx: &mut Context, x: i32, y: i32, modifiers: Modifiers) {
        self.call(MOUSE_MOVE, ctx, ScriptArgs::Move { x, y, modifiers });
    }

    fn check_keyboard(&mut self, ctx: &mut Context) {
        self.call(CHECK_KEYBOARD, ctx, ScriptArgs::None);
    }

    fn key_pressed(&mut self, ctx: &mut Context, key: KeyCode) {
        self.call(KEY_PRESSED, ctx, ScriptArgs::Key(key));
    }

    fn call_action(&mut self, ctx: &mut Context, caller: Caller) {
        self.call(CALL_ACTION, ctx, ScriptArgs::Caller(caller));
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dispatch::{headless, Dispatcher};
    use crate::core::input::HostEvent;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recording(log: &Rc<RefCell<Vec<(String, ScriptArgs)>>>, name: &str) -> impl FnMut(&mut Context, ScriptArgs) {
        let log = Rc::clone(log);
        let name = name.to_string();
        move |_, args| log.borrow_mut().push((name.clone(), args))
    }

    #[test]
    fn callback_names_are_public() {
        use crate::core::dispatch::script_names;
        assert_eq!(script_names::UPDATE, "update");
        assert_eq!(script_names::MOUSE_ACTION, "mouseAction");

        let script = ScriptHandler::new().with(script_names::DRAW, |_, _| {});
        assert!(script.is_bound("draw"));
    }

    #[test]
    fn unbound_hooks_are_skipped() {
        let (mut ctx, _) = headless();
        let mut script = ScriptHandler::new();
        assert!(!script.call(UPDATE, &mut ctx, ScriptArgs::None));
    }

    #[test]
    fn bind_replaces_and_unbind_removes() {
        let mut script = ScriptHandler::new();
        assert!(!script.bind(UPDATE, |_, _| {}));
        assert!(script.bind(UPDATE, |_, _| {}));
        assert!(script.is_bound(UPDATE));
        assert!(script.unbind(UPDATE));
        assert!(!script.unbind(UPDATE));
    }

    #[test]
    fn hooks_map_to_named_callbacks() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let script = ScriptHandler::new()
            .with(START, recording(&log, START))
            .with(UPDATE, recording(&log, UPDATE))
            .with(DRAW, recording(&log, DRAW))
            .with(MOUSE_MOVE, recording(&log, MOUSE_MOVE));

        let (ctx, _) = headless();
        let mut dispatcher = Dispatcher::new(script, ctx);
        dispatcher.dispatch(HostEvent::Create);
        dispatcher.dispatch(HostEvent::MouseMove { x: 3, y: 4, modifiers: Modifiers::NONE });
        dispatcher.frame();

        let names: Vec<String> = log.borrow().iter().map(|(n, _)| n.clone()).collect();
        assert_eq!(names, vec![START, MOUSE_MOVE, DRAW, UPDATE]);
        assert_eq!(
            log.borrow()[1].1,
            ScriptArgs::Move { x: 3, y: 4, modifiers: Modifiers::NONE }
        );
    }

    #[test]
    fn initializer_runs_once() {
        let mut script = ScriptHandler::new();
        script.on_initialize(|config| config.title = "Scripted".to_string());

        let mut config = EngineConfig::new();
        script.initialize(&mut config);
        assert_eq!(config.title, "Scripted");

        let mut other = EngineConfig::new();
        script.initialize(&mut other);
        assert_eq!(other.title, "Game Engine");
    }
}
