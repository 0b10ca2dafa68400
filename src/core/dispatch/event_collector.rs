//=========================================================================
// Event Collector
//=========================================================================
//
// Host event collector with bounded draining and shutdown detection.
//
// Architecture:
//   Receiver<HostEvent> → collect_frame(wait) → events → TickControl
//
// Waits for the first event at most until the next frame is due, then
// drains what is already queued, up to a fixed cap per call.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};
use log::warn;

//=== Internal Dependencies ===============================================

use crate::core::input::HostEvent;

//=== TickControl =========================================================

/// Run loop control signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TickControl {
    Continue,
    /// `Destroy` was collected or the host hung up. No events follow.
    Exit,
}

//=== EventCollector ======================================================

pub(crate) struct EventCollector {
    receiver: Receiver<HostEvent>,
    events: Vec<HostEvent>,
    disconnected: bool,
}

impl EventCollector {
    pub(crate) const MAX_EVENTS_PER_FRAME: usize = 100;

    pub(crate) fn new(receiver: Receiver<HostEvent>) -> Self {
        Self {
            receiver,
            events: Vec::with_capacity(16),
            disconnected: false,
        }
    }

    /// Collects pending host events, blocking at most `wait` for the first.
    pub(crate) fn collect_frame(&mut self, wait: Duration) -> TickControl {
        self.events.clear();

        match self.receiver.recv_timeout(wait) {
            Ok(event) => {
                if self.push(event) == TickControl::Exit {
                    return TickControl::Exit;
                }
            }
            Err(RecvTimeoutError::Disconnected) => return self.hang_up(),
            Err(RecvTimeoutError::Timeout) => return TickControl::Continue,
        }

        while self.events.len() < Self::MAX_EVENTS_PER_FRAME {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.push(event) == TickControl::Exit {
                        return TickControl::Exit;
                    }
                }
                Err(TryRecvError::Disconnected) => return self.hang_up(),
                Err(TryRecvError::Empty) => break,
            }
        }

        if self.events.len() >= Self::MAX_EVENTS_PER_FRAME {
            warn!(
                target: "engine",
                "Event queue backlog: drained {} events this frame",
                self.events.len()
            );
        }

        TickControl::Continue
    }

    /// Events collected by the last call, in arrival order.
    #[cfg(test)]
    pub(crate) fn events(&self) -> &[HostEvent] {
        &self.events
    }

    pub(crate) fn take_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.events)
    }

    /// The host dropped every sender.
    pub(crate) fn is_disconnected(&self) -> bool {
        self.disconnected
    }

    fn push(&mut self, event: HostEvent) -> TickControl {
        self.events.push(event);
        match event {
            HostEvent::Destroy => TickControl::Exit,
            _ => TickControl::Continue,
        }
    }

    fn hang_up(&mut self) -> TickControl {
        self.disconnected = true;
        TickControl::Exit
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
