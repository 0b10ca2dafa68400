//=========================================================================
// Timers
//=========================================================================
//
// Periodic event sources with a Stopped/Running state machine.
//
// State machine:
// ```text
//            start()                       set_delay() while running
//   Stopped ─────────> Running ─┐          (stop + start, new ticket)
//      ▲                  │  ▲  │
//      │  stop() / drop   │  └──┘
//      └──────────────────┘
//      └── one-shot firing ──┘
// ```
//
// Firings arrive from the `Scheduler` as messages and are matched
// against the current ticket on the main thread, so listener code never
// runs on a scheduler thread.
//
//=========================================================================

mod scheduler;

//=== External Dependencies ===============================================

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Receiver;
use log::trace;
use slotmap::SlotMap;

//=== Internal Dependencies ===============================================

use crate::core::caller::{Caller, ListenerRegistry, Target, TimerId};

//=== Public API ==========================================================

pub use self::scheduler::{ManualScheduler, ScheduleTicket, Scheduler, ThreadScheduler, TimerFired};

//=== Timer ===============================================================

/// A periodic notification source.
///
/// The delay is in milliseconds and never below 1. Timers are created
/// stopped. Dropping a running timer cancels its schedule.
pub struct Timer {
    id: TimerId,
    delay: u32,
    repeat: bool,
    ticket: Option<ScheduleTicket>,
    listeners: ListenerRegistry,
    scheduler: Arc<dyn Scheduler>,
}

impl Timer {
    fn new(id: TimerId, delay: u32, repeat: bool, scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            id,
            delay: delay.max(1),
            repeat,
            ticket: None,
            listeners: ListenerRegistry::new(),
            scheduler,
        }
    }

    //--- State Machine ----------------------------------------------------

    /// Starts periodic firing. No-op if already running.
    pub fn start(&mut self) {
        if self.ticket.is_some() {
            return;
        }
        let period = Duration::from_millis(u64::from(self.delay));
        self.ticket = Some(self.scheduler.schedule(self.id, period));
        trace!(target: "timer", "{:?} started ({} ms)", self.id, self.delay);
    }

    /// Cancels periodic firing. No-op if already stopped.
    pub fn stop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            self.scheduler.cancel(ticket);
            trace!(target: "timer", "{:?} stopped", self.id);
        }
    }

    /// Sets the delay (clamped to at least 1 ms). A running timer is
    /// restarted so the new delay applies immediately.
    pub fn set_delay(&mut self, delay: u32) {
        self.delay = delay.max(1);
        if self.is_running() {
            self.stop();
            self.start();
        }
    }

    pub fn set_repeat(&mut self, repeat: bool) {
        self.repeat = repeat;
    }

    /// Handles one scheduler firing.
    ///
    /// Returns `true` when listeners must be notified. Firings for an old
    /// ticket or for a stopped timer are ignored. A one-shot timer stops
    /// after its first valid firing.
    pub fn on_fired(&mut self, ticket: ScheduleTicket) -> bool {
        if self.ticket != Some(ticket) {
            return false;
        }
        if !self.repeat {
            self.stop();
        }
        true
    }

    //--- Accessors --------------------------------------------------------

    pub fn id(&self) -> TimerId {
        self.id
    }

    pub fn is_running(&self) -> bool {
        self.ticket.is_some()
    }

    pub fn delay(&self) -> u32 {
        self.delay
    }

    pub fn repeat(&self) -> bool {
        self.repeat
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn listeners_mut(&mut self) -> &mut ListenerRegistry {
        &mut self.listeners
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Timer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timer")
            .field("id", &self.id)
            .field("delay", &self.delay)
            .field("repeat", &self.repeat)
            .field("running", &self.is_running())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

//=== TimerService ========================================================

/// Owns every timer and the receiving end of the firing queue.
pub struct TimerService {
    timers: SlotMap<TimerId, Timer>,
    scheduler: Arc<dyn Scheduler>,
    fired: Receiver<TimerFired>,
}

impl TimerService {
    pub fn new(scheduler: Arc<dyn Scheduler>, fired: Receiver<TimerFired>) -> Self {
        Self {
            timers: SlotMap::with_key(),
            scheduler,
            fired,
        }
    }

    /// A service backed by a [`ThreadScheduler`].
    pub fn threaded() -> Self {
        let (scheduler, fired) = ThreadScheduler::new();
        Self::new(Arc::new(scheduler), fired)
    }

    /// Creates a stopped timer, optionally registering a first listener.
    pub fn create(&mut self, delay: u32, repeat: bool, listener: Option<Target>) -> TimerId {
        let scheduler = Arc::clone(&self.scheduler);
        let id = self
            .timers
            .insert_with_key(|id| Timer::new(id, delay, repeat, scheduler));

        if let (Some(target), Some(timer)) = (listener, self.timers.get_mut(id)) {
            timer.listeners_mut().add_listener(target);
        }
        id
    }

    pub fn get(&self, id: TimerId) -> Option<&Timer> {
        self.timers.get(id)
    }

    pub fn get_mut(&mut self, id: TimerId) -> Option<&mut Timer> {
        self.timers.get_mut(id)
    }

    /// Stops and removes a timer. Returns `false` for an unknown id.
    pub fn destroy(&mut self, id: TimerId) -> bool {
        self.timers.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Consumes queued firings and returns the timers whose listeners must
    /// be notified, in arrival order.
    pub fn drain_fired(&mut self) -> Vec<Caller> {
        let mut callers = Vec::new();
        for fired in self.fired.try_iter() {
            let Some(timer) = self.timers.get_mut(fired.timer) else {
                continue;
            };
            if timer.on_fired(fired.ticket) {
                callers.push(Caller::Timer(fired.timer));
            }
        }
        callers
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
