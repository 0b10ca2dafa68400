//=========================================================================
// Listener Registry
//=========================================================================
//
// Ordered, duplicate-free list of targets owned by one event source.
//
// Notification always works on a snapshot taken before the first
// callback, so listeners may add or remove entries while being notified:
// - targets added during a pass are first called on the next pass
// - targets removed during a pass are still called in that pass
//
//=========================================================================

//=== External Dependencies ===============================================

use log::trace;

//=== Internal Dependencies ===============================================

use super::Target;

//=== ListenerRegistry ====================================================

#[derive(Debug, Clone, Default)]
pub struct ListenerRegistry {
    targets: Vec<Target>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `target`. Returns `false` if it is already registered.
    pub fn add_listener(&mut self, target: Target) -> bool {
        if self.targets.contains(&target) {
            return false;
        }
        self.targets.push(target);
        true
    }

    /// Unregisters `target`. Returns `false` if it was not registered.
    pub fn remove_listener(&mut self, target: &Target) -> bool {
        match self.targets.iter().position(|t| t == target) {
            Some(index) => {
                self.targets.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, target: &Target) -> bool {
        self.targets.contains(target)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Drops dead object targets and returns a copy of what is left.
    pub fn snapshot(&mut self) -> ListenerRegistry {
        let before = self.targets.len();
        self.targets.retain(Target::is_alive);

        let pruned = before - self.targets.len();
        if pruned > 0 {
            trace!(target: "dispatch", "pruned {} dropped listener(s)", pruned);
        }

        self.clone()
    }

    /// Calls `notify` once per target in registration order.
    ///
    /// Returns `false` when there is nobody to notify.
    pub fn notify_all<F>(&self, mut notify: F) -> bool
    where
        F: FnMut(&Target),
    {
        if self.targets.is_empty() {
            return false;
        }
        for target in &self.targets {
            notify(target);
        }
        true
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
