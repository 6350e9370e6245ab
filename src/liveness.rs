// src/liveness.rs

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

// Even epochs are inactive, odd epochs are active.
const INACTIVE_START: u64 = 0;

/// Tracks whether the view that started an operation is still interested in
/// its result.
///
/// Every activation and deactivation advances the epoch. A [`Ticket`] taken
/// when an operation starts is current only while no transition happened
/// since, so late responses can be dropped before they touch shared state.
#[derive(Debug, Clone)]
pub struct Liveness {
    epoch: Arc<AtomicU64>,
}

impl Default for Liveness {
    fn default() -> Self {
        Self {
            epoch: Arc::new(AtomicU64::new(INACTIVE_START)),
        }
    }
}

impl Liveness {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new active period, invalidating older tickets.
    pub fn activate(&self) -> Ticket {
        let mut current = self.epoch.load(Ordering::Acquire);
        loop {
            let next = if current % 2 == 0 { current + 1 } else { current + 2 };
            match self
                .epoch
                .compare_exchange(current, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return self.ticket_at(next),
                Err(actual) => current = actual,
            }
        }
    }

    /// Ends the active period; outstanding tickets become stale.
    pub fn deactivate(&self) {
        let _ = self
            .epoch
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |e| {
                (e % 2 == 1).then_some(e + 1)
            });
    }

    pub fn is_active(&self) -> bool {
        self.epoch.load(Ordering::Acquire) % 2 == 1
    }

    pub fn ticket(&self) -> Ticket {
        self.ticket_at(self.epoch.load(Ordering::Acquire))
    }

    fn ticket_at(&self, epoch: u64) -> Ticket {
        Ticket {
            epoch,
            liveness: self.clone(),
        }
    }
}

/// Snapshot of a [`Liveness`] epoch.
#[derive(Debug, Clone)]
pub struct Ticket {
    epoch: u64,
    liveness: Liveness,
}

impl Ticket {
    /// True while the view is active and unchanged since the ticket was taken.
    pub fn is_current(&self) -> bool {
        self.epoch % 2 == 1 && self.liveness.epoch.load(Ordering::Acquire) == self.epoch
    }

    /// True when the ticket was taken during an active period that has since
    /// ended. Tickets taken while inactive never go stale.
    pub fn is_stale(&self) -> bool {
        self.epoch % 2 == 1 && self.liveness.epoch.load(Ordering::Acquire) != self.epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_goes_stale_on_deactivate() {
        let liveness = Liveness::new();
        let ticket = liveness.activate();
        assert!(ticket.is_current());
        liveness.deactivate();
        assert!(!ticket.is_current());
        assert!(!liveness.is_active());
    }

    #[test]
    fn reactivation_invalidates_older_tickets() {
        let liveness = Liveness::new();
        let first = liveness.activate();
        let second = liveness.activate();
        assert!(!first.is_current());
        assert!(second.is_current());
    }

    #[test]
    fn inactive_ticket_is_never_current() {
        let liveness = Liveness::new();
        let ticket = liveness.ticket();
        assert!(!ticket.is_current());
        liveness.activate();
        assert!(!ticket.is_stale());
    }

    #[test]
    fn stale_only_after_transition() {
        let liveness = Liveness::new();
        let ticket = liveness.activate();
        assert!(!ticket.is_stale());
        liveness.activate();
        assert!(ticket.is_stale());
    }
}
