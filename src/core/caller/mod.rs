//=========================================================================
// Callers and Listeners
//=========================================================================
//
// Identity of event sources ("callers") and the observers they notify.
//
// Architecture:
// ```text
//   Timer / Button / TextBox / Audio        (event sources)
//          │ fire
//          ▼
//   Context.pending: VecDeque<Caller>       (queued on the main thread)
//          │ Dispatcher::deliver
//          ▼
//   ListenerRegistry::snapshot ──> Target::Handler ──> Handler::call_action
//                               └> Target::Object  ──> Listener::call_action
// ```
//
// Sources never call listeners directly. They only queue their own
// `Caller` id; delivery happens on the dispatcher with a snapshot of the
// source's registry.
//
//=========================================================================

mod registry;

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use slotmap::new_key_type;

//=== Internal Dependencies ===============================================

use crate::core::dispatch::Context;

//=== Public API ==========================================================

pub use self::registry::ListenerRegistry;

//=== Source Ids ==========================================================

new_key_type! {
    /// Handle of a timer owned by [`crate::core::timer::TimerService`].
    pub struct TimerId;

    /// Handle of a button or text box owned by
    /// [`crate::core::widget::WidgetManager`].
    pub struct WidgetId;

    /// Handle of an audio source owned by [`crate::core::audio::AudioService`].
    pub struct AudioId;
}

//=== CallerType ==========================================================

/// Kind of event source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallerType {
    TextBox,
    Button,
    Timer,
    Audio,
}

//=== Caller ==============================================================

/// The event source that fired, passed to every listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Caller {
    Timer(TimerId),
    Button(WidgetId),
    TextBox(WidgetId),
    Audio(AudioId),
}

impl Caller {
    pub fn kind(&self) -> CallerType {
        match self {
            Self::Timer(_) => CallerType::Timer,
            Self::Button(_) => CallerType::Button,
            Self::TextBox(_) => CallerType::TextBox,
            Self::Audio(_) => CallerType::Audio,
        }
    }
}

//=== Listener ============================================================

/// An observer that reacts when one of the sources it listens to fires.
///
/// Closures taking `(&mut Context, Caller)` implement this trait, so
/// `Rc<RefCell<F>>` can be registered directly.
pub trait Listener {
    fn call_action(&mut self, ctx: &mut Context, caller: Caller);
}

impl<F> Listener for F
where
    F: FnMut(&mut Context, Caller),
{
    fn call_action(&mut self, ctx: &mut Context, caller: Caller) {
        self(ctx, caller)
    }
}

//=== Target ==============================================================

/// A registry entry: the active game handler, or a weakly held listener.
///
/// The registry never keeps an object listener alive. Once its last `Rc`
/// is dropped the entry is pruned on the next notification.
#[derive(Clone)]
pub enum Target {
    /// The handler passed to [`crate::engine::Engine::run`].
    Handler,
    Object(Weak<RefCell<dyn Listener>>),
}

impl Target {
    pub fn handler() -> Self {
        Self::Handler
    }

    pub fn object<L: Listener + 'static>(listener: &Rc<RefCell<L>>) -> Self {
        let listener: Rc<RefCell<dyn Listener>> = listener.clone();
        Self::Object(Rc::downgrade(&listener))
    }

    /// False once an object listener has been dropped.
    pub fn is_alive(&self) -> bool {
        match self {
            Self::Handler => true,
            Self::Object(weak) => weak.strong_count() > 0,
        }
    }

    /// The listener behind an object target, if still alive.
    pub fn upgrade(&self) -> Option<Rc<RefCell<dyn Listener>>> {
        match self {
            Self::Handler => None,
            Self::Object(weak) => weak.upgrade(),
        }
    }

    fn address(&self) -> Option<*const ()> {
        match self {
            Self::Handler => None,
            Self::Object(weak) => Some(weak.as_ptr().cast::<()>()),
        }
    }
}

impl PartialEq for Target {
    /// Object targets compare by allocation, not by value.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Handler, Self::Handler) => true,
            (Self::Object(_), Self::Object(_)) => self.address() == other.address(),
            _ => false,
        }
    }
}

impl Eq for Target {}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handler => f.write_str("Target::Handler"),
            Self::Object(weak) => f
                .debug_struct("Target::Object")
                .field("address", &weak.as_ptr().cast::<()>())
                .field("alive", &self.is_alive())
                .finish(),
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
