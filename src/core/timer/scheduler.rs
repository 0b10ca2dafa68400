//=========================================================================
// Schedulers
//=========================================================================
//
// Periodic callback providers behind `Timer`.
//
// Architecture:
// ```text
//   Timer::start ──schedule(timer, period)──> Scheduler ──> ScheduleTicket
//                                                 │ every period
//                                                 ▼
//                       Sender<TimerFired> ──> TimerService::drain_fired
//                                                 (main thread, per frame)
// ```
//
// A scheduler never runs listener code. It only pushes `TimerFired`
// messages, which the main loop matches against the timer's current
// ticket so firings that raced with `stop()` are dropped.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, select, tick, unbounded, Receiver, Sender};
use log::{debug, error};
use parking_lot::Mutex;

//=== Internal Dependencies ===============================================

use crate::core::caller::TimerId;

//=== Messages ============================================================

/// Identifies one `schedule` call. A restarted timer gets a new ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScheduleTicket(u64);

/// One period elapsed for `timer` under `ticket`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFired {
    pub timer: TimerId,
    pub ticket: ScheduleTicket,
}

//=== Scheduler ===========================================================

/// Host service that invokes a periodic callback until cancelled.
///
/// Firings may be produced on any thread and are delivered as
/// [`TimerFired`] messages on the channel returned at construction.
pub trait Scheduler: Send + Sync {
    fn schedule(&self, timer: TimerId, period: Duration) -> ScheduleTicket;

    /// Cancelling an unknown or already cancelled ticket is a no-op.
    fn cancel(&self, ticket: ScheduleTicket);
}

//--- Ticket Source -------------------------------------------------------

#[derive(Debug, Default)]
struct TicketSource(AtomicU64);

impl TicketSource {
    fn next(&self) -> ScheduleTicket {
        ScheduleTicket(self.0.fetch_add(1, Ordering::Relaxed))
    }
}

//=== ThreadScheduler =====================================================

/// Runs each schedule on its own worker thread driven by a crossbeam
/// `tick` channel.
///
/// Workers exit when cancelled, when the scheduler is dropped, or when
/// the firing receiver is gone.
pub struct ThreadScheduler {
    fired: Sender<TimerFired>,
    tickets: TicketSource,
    workers: Mutex<HashMap<ScheduleTicket, Sender<()>>>,
}

impl ThreadScheduler {
    pub fn new() -> (Self, Receiver<TimerFired>) {
        let (fired, receiver) = unbounded();
        let scheduler = Self {
            fired,
            tickets: TicketSource::default(),
            workers: Mutex::new(HashMap::new()),
        };
        (scheduler, receiver)
    }

    /// Number of schedules that have not been cancelled.
    pub fn active(&self) -> usize {
        self.workers.lock().len()
    }
}

impl Scheduler for ThreadScheduler {
    fn schedule(&self, timer: TimerId, period: Duration) -> ScheduleTicket {
        let ticket = self.tickets.next();
        let (cancel_tx, cancel_rx) = bounded::<()>(1);
        let fired = self.fired.clone();

        let spawned = thread::Builder::new()
            .name(format!("timer-{}", ticket.0))
            .spawn(move || {
                let ticker = tick(period);
                loop {
                    select! {
                        recv(ticker) -> _ => {
                            if fired.send(TimerFired { timer, ticket }).is_err() {
                                break;
                            }
                        }
                        // Explicit cancel or dropped sender.
                        recv(cancel_rx) -> _ => break,
                    }
                }
            });

        match spawned {
            Ok(_) => {
                debug!(target: "timer", "scheduled {:?} every {:?}", ticket, period);
                self.workers.lock().insert(ticket, cancel_tx);
            }
            Err(e) => {
                error!(target: "timer", "failed to spawn timer worker: {}", e);
            }
        }

        ticket
    }

    fn cancel(&self, ticket: ScheduleTicket) {
        if let Some(cancel) = self.workers.lock().remove(&ticket) {
            let _ = cancel.send(());
            debug!(target: "timer", "cancelled {:?}", ticket);
        }
    }
}

impl Drop for ThreadScheduler {
    fn drop(&mut self) {
        for (_, cancel) in self.workers.lock().drain() {
            let _ = cancel.send(());
        }
    }
}

//=== ManualScheduler =====================================================

/// Deterministic scheduler that only fires when told to.
///
/// Used by tests and by hosts that drive time themselves.
pub struct ManualScheduler {
    fired: Sender<TimerFired>,
    tickets: TicketSource,
    active: Mutex<HashMap<ScheduleTicket, (TimerId, Duration)>>,
}

impl ManualScheduler {
    pub fn new() -> (Self, Receiver<TimerFired>) {
        let (fired, receiver) = unbounded();
        let scheduler = Self {
            fired,
            tickets: TicketSource::default(),
            active: Mutex::new(HashMap::new()),
        };
        (scheduler, receiver)
    }

    /// Emits one firing for `ticket`. Returns `false` if it is not active.
    pub fn fire(&self, ticket: ScheduleTicket) -> bool {
        let Some(&(timer, _)) = self.active.lock().get(&ticket) else {
            return false;
        };
        self.fired.send(TimerFired { timer, ticket }).is_ok()
    }

    /// Emits one firing for the active schedule of `timer`.
    pub fn fire_timer(&self, timer: TimerId) -> bool {
        match self.ticket_of(timer) {
            Some(ticket) => self.fire(ticket),
            None => false,
        }
    }

    pub fn ticket_of(&self, timer: TimerId) -> Option<ScheduleTicket> {
        self.active
            .lock()
            .iter()
            .find(|(_, (t, _))| *t == timer)
            .map(|(ticket, _)| *ticket)
    }

    /// Period of the active schedule of `timer`.
    pub fn period_of(&self, timer: TimerId) -> Option<Duration> {
        self.active
            .lock()
            .values()
            .find(|(t, _)| *t == timer)
            .map(|(_, period)| *period)
    }

    pub fn active(&self) -> usize {
        self.active.lock().len()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, timer: TimerId, period: Duration) -> ScheduleTicket {
        let ticket = self.tickets.next();
        self.active.lock().insert(ticket, (timer, period));
        ticket
    }

    fn cancel(&self, ticket: ScheduleTicket) {
        self.active.lock().remove(&ticket);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn timer_id() -> TimerId {
        let mut ids: SlotMap<TimerId, ()> = SlotMap::with_key();
        ids.insert(())
    }

    //=====================================================================
    // ManualScheduler Tests
    //=====================================================================

    #[test]
    fn manual_fire_sends_message() {
        let (scheduler, rx) = ManualScheduler::new();
        let timer = timer_id();
        let ticket = scheduler.schedule(timer, Duration::from_millis(5));

        assert!(scheduler.fire(ticket));
        assert_eq!(rx.try_recv().unwrap(), TimerFired { timer, ticket });
    }

    #[test]
    fn manual_cancelled_ticket_does_not_fire() {
        let (scheduler, rx) = ManualScheduler::new();
        let ticket = scheduler.schedule(timer_id(), Duration::from_millis(5));

        scheduler.cancel(ticket);
        scheduler.cancel(ticket);

        assert!(!scheduler.fire(ticket));
        assert!(rx.try_recv().is_err());
        assert_eq!(scheduler.active(), 0);
    }

    #[test]
    fn tickets_are_unique() {
        let (scheduler, _rx) = ManualScheduler::new();
        let timer = timer_id();
        let a = scheduler.schedule(timer, Duration::from_millis(1));
        let b = scheduler.schedule(timer, Duration::from_millis(1));
        assert_ne!(a, b);
    }

    //=====================================================================
    // ThreadScheduler Tests
    //=====================================================================

    #[test]
    fn thread_scheduler_fires_periodically() {
        let (scheduler, rx) = ThreadScheduler::new();
        let timer = timer_id();
        let ticket = scheduler.schedule(timer, Duration::from_millis(2));

        let first = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        let second = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(first, TimerFired { timer, ticket });
        assert_eq!(second.ticket, ticket);

        scheduler.cancel(ticket);
        assert_eq!(scheduler.active(), 0);
    }

    #[test]
    fn thread_scheduler_stops_after_cancel() {
        let (scheduler, rx) = ThreadScheduler::new();
        let ticket = scheduler.schedule(timer_id(), Duration::from_millis(1));
        rx.recv_timeout(Duration::from_secs(2)).unwrap();

        scheduler.cancel(ticket);
        // Let the worker observe the cancel, then flush what raced in.
        thread::sleep(Duration::from_millis(20));
        while rx.try_recv().is_ok() {}

        thread::sleep(Duration::from_millis(20));
        assert!(rx.try_recv().is_err());
    }
}
